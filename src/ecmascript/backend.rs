// This module generates ECMAScript from a checked program. The output is a single
// function expression taking the host's globals object and returning the entry point.
// Every IR function becomes lambda_N, declared up front so functions can refer to
// each other in any order, and every register becomes a local variable rN (with the
// register's debug name appended when it has one). Enum values go through the
// encoding strategy cache: construction, literal elements and stateful match cases
// all use the element's encoding. A match lowers to an if / else if chain whose final
// else calls fail(), and a loop lowers to for (;;) with break.

//! ECMAScript code generation.

use super::encoding::{EncodingElement, EncodingStrategyCache};
use super::enum_codegen::{
    write_case_check, write_construct, write_constructor_function, write_get_state,
};
use crate::core::{CodegenResult, EnumElementRef, Value};
use crate::ir::print::write_quoted;
use crate::ir::{
    CheckedProgram, Function, Instruction, InstructionSequence, MatchCaseKind, RegisterId,
};
use log::trace;
use std::fmt::{self, Write};
use std::io;

const INDENT: &str = "    ";

/// Writes `program` as ECMAScript to `output`.
pub fn generate_ecmascript<W: io::Write>(
    program: &CheckedProgram,
    cache: &mut EncodingStrategyCache<'_>,
    output: &mut W,
) -> CodegenResult<()> {
    let mut generator = ModuleGenerator {
        program,
        cache,
        out: String::new(),
    };
    generator.module()?;
    output.write_all(generator.out.as_bytes())?;
    Ok(())
}

/// Generates `program` as ECMAScript text with a fresh strategy cache.
pub fn generate_ecmascript_string(program: &CheckedProgram) -> CodegenResult<String> {
    let mut cache = EncodingStrategyCache::new(&program.enums);
    let mut output = Vec::new();
    generate_ecmascript(program, &mut cache, &mut output)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

struct ModuleGenerator<'p, 'c, 'e> {
    program: &'p CheckedProgram,
    cache: &'c mut EncodingStrategyCache<'e>,
    out: String,
}

impl ModuleGenerator<'_, '_, '_> {
    fn line(&mut self, depth: usize, text: &str) -> fmt::Result {
        for _ in 0..depth {
            self.out.write_str(INDENT)?;
        }
        self.out.write_str(text)?;
        self.out.write_char('\n')
    }

    fn module(&mut self) -> fmt::Result {
        self.line(0, "(function (globals)")?;
        self.line(0, "{")?;
        self.line(1, "\"use strict\";")?;
        self.line(1, "var fail = function () { throw \"fail\"; };")?;
        for id in 0..self.program.functions.len() {
            self.line(1, &format!("var lambda_{id};"))?;
        }
        let program = self.program;
        for (id, function) in program.functions.iter().enumerate() {
            trace!("generating lambda_{id} for {}", function.name);
            self.function(id, function)?;
        }
        if !program.functions.is_empty() {
            self.line(1, "return lambda_0;")?;
        }
        self.line(0, "})")
    }

    fn function(&mut self, id: usize, function: &Function) -> fmt::Result {
        let parameters: Vec<String> = (0..function.parameter_count)
            .map(|parameter| register_name(function, RegisterId::new(parameter)))
            .collect();
        self.line(
            1,
            &format!("lambda_{id} = function ({})", parameters.join(", ")),
        )?;
        self.line(1, "{")?;
        self.sequence(function, &function.body, 2)?;
        self.line(
            2,
            &format!("return {};", register_name(function, function.return_value)),
        )?;
        self.line(1, "};")
    }

    fn sequence(
        &mut self,
        function: &Function,
        sequence: &InstructionSequence,
        depth: usize,
    ) -> fmt::Result {
        for instruction in sequence {
            self.instruction(function, instruction, depth)?;
        }
        Ok(())
    }

    fn instruction(
        &mut self,
        function: &Function,
        instruction: &Instruction,
        depth: usize,
    ) -> fmt::Result {
        let name = |register| register_name(function, register);
        match instruction {
            Instruction::Call(call) => {
                let arguments: Vec<String> = call.arguments.iter().map(|&a| name(a)).collect();
                self.line(
                    depth,
                    &format!(
                        "var {} = {}({});",
                        name(call.result),
                        name(call.callee),
                        arguments.join(", ")
                    ),
                )
            }
            Instruction::Literal(literal) => {
                let value = self.value(&literal.value)?;
                self.line(depth, &format!("var {} = {};", name(literal.into), value))
            }
            Instruction::Tuple(tuple) => {
                let elements: Vec<String> = tuple.elements.iter().map(|&e| name(e)).collect();
                self.line(
                    depth,
                    &format!("var {} = [{}];", name(tuple.result), elements.join(", ")),
                )
            }
            Instruction::ReadStruct(read) => self.line(
                depth,
                &format!(
                    "var {} = {}[{}];",
                    name(read.into),
                    name(read.from_object),
                    read.member
                ),
            ),
            Instruction::EnumConstruct(construct) => {
                let element = self.element(construct.which);
                let mut text = format!("var {} = ", name(construct.into));
                write_construct(&mut text, &element, &name(construct.state))?;
                text.push(';');
                self.line(depth, &text)
            }
            Instruction::Global(into) => {
                self.line(depth, &format!("var {} = globals;", name(*into)))
            }
            Instruction::Match(match_) => {
                let key = name(match_.key);
                self.line(depth, &format!("var {};", name(match_.result)))?;
                for (index, case) in match_.cases.iter().enumerate() {
                    let mut condition = String::from(if index == 0 { "if (" } else { "else if (" });
                    let bound = match case.kind {
                        MatchCaseKind::Value(case_key) => {
                            write!(condition, "{key} === {}", name(case_key))?;
                            None
                        }
                        MatchCaseKind::StatefulEnum {
                            element,
                            state_into,
                        } => {
                            let element = self.element(element);
                            write_case_check(&mut condition, &element, &key)?;
                            let mut binding = format!("var {} = ", name(state_into));
                            write_get_state(&mut binding, &element, &key)?;
                            binding.push(';');
                            Some(binding)
                        }
                    };
                    condition.push(')');
                    self.line(depth, &condition)?;
                    self.line(depth, "{")?;
                    if let Some(binding) = bound {
                        self.line(depth + 1, &binding)?;
                    }
                    self.sequence(function, &case.action, depth + 1)?;
                    if let Some(value) = case.value {
                        self.line(
                            depth + 1,
                            &format!("{} = {};", name(match_.result), name(value)),
                        )?;
                    }
                    self.line(depth, "}")?;
                }
                if match_.cases.is_empty() {
                    self.line(depth, "fail();")
                } else {
                    self.line(depth, "else")?;
                    self.line(depth, "{")?;
                    self.line(depth + 1, "fail();")?;
                    self.line(depth, "}")
                }
            }
            Instruction::Loop(body) => {
                self.line(depth, "for (;;)")?;
                self.line(depth, "{")?;
                self.sequence(function, body, depth + 1)?;
                self.line(depth, "}")
            }
            Instruction::Break => self.line(depth, "break;"),
        }
    }

    fn element(&mut self, element: EnumElementRef) -> EncodingElement {
        *self.cache.require(element.enumeration).element(element.which)
    }

    fn value(&mut self, value: &Value) -> Result<String, fmt::Error> {
        let mut text = String::new();
        match value {
            Value::Unit => text.push_str("undefined"),
            Value::Integer(integer) => write!(text, "{integer}")?,
            Value::String(string) => write_quoted(&mut text, string)?,
            Value::FunctionPointer(id) => write!(text, "lambda_{id}")?,
            Value::EnumElement { element, state } => {
                let encoding = self.element(*element);
                let payload = match state {
                    Some(state) => self.value(state)?,
                    None => "undefined".to_string(),
                };
                write_construct(&mut text, &encoding, &payload)?;
            }
            Value::EnumConstructor(element) => {
                let encoding = self.element(*element);
                write_constructor_function(&mut text, &encoding)?;
            }
            Value::Tuple(elements) => {
                text.push('[');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        text.push_str(", ");
                    }
                    let element = self.value(element)?;
                    text.push_str(&element);
                }
                text.push(']');
            }
        }
        Ok(text)
    }
}

/// `rN`, or `rN_name` for registers with a debug name.
fn register_name(function: &Function, register: RegisterId) -> String {
    match function.register_name(register) {
        Some(debug_name) => {
            let sanitized: String = debug_name
                .chars()
                .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
                .collect();
            format!("r{}_{}", register.0, sanitized)
        }
        None => format!("r{}", register.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Enumeration, EnumerationElement, Type};
    use crate::ir::MatchCase;

    fn r(id: u32) -> RegisterId {
        RegisterId::new(id)
    }

    fn option_program(body: Vec<Instruction>, registers: u32, return_value: u32) -> CheckedProgram {
        CheckedProgram {
            functions: vec![Function::new("main", 1, registers, r(return_value), body.into())],
            enums: vec![Enumeration::new(
                "Option",
                vec![
                    EnumerationElement::stateless("none"),
                    EnumerationElement::stateful("some", Type::integer(0, 10)),
                ],
            )],
            ..CheckedProgram::default()
        }
    }

    #[test]
    fn test_module_shape() {
        let program = option_program(vec![], 1, 0);
        let text = generate_ecmascript_string(&program).unwrap();
        assert_eq!(
            text,
            "(function (globals)
{
    \"use strict\";
    var fail = function () { throw \"fail\"; };
    var lambda_0;
    lambda_0 = function (r0)
    {
        return r0;
    };
    return lambda_0;
})
"
        );
    }

    #[test]
    fn test_direct_enum_construct_and_match() {
        let some = EnumElementRef::new(0, 1);
        let body = vec![
            Instruction::enum_construct(r(1), some, r(0), Type::integer(0, 10)),
            Instruction::literal(
                r(2),
                Value::enum_element(EnumElementRef::new(0, 0)),
                Type::Enumeration(0),
            ),
            Instruction::match_(
                r(1),
                vec![
                    MatchCase {
                        kind: MatchCaseKind::StatefulEnum {
                            element: some,
                            state_into: r(3),
                        },
                        action: InstructionSequence::new(),
                        value: Some(r(3)),
                    },
                    MatchCase {
                        kind: MatchCaseKind::Value(r(2)),
                        action: vec![Instruction::Loop(vec![Instruction::Break].into())].into(),
                        value: None,
                    },
                ],
                r(4),
            ),
        ];
        let program = option_program(body, 5, 4);
        let text = generate_ecmascript_string(&program).unwrap();

        let expected = "        var r1 = r0;
        var r2 = undefined;
        var r4;
        if (((typeof r1 === \"number\") && (r1 >= 0) && (r1 <= 10)))
        {
            var r3 = r1;
            r4 = r3;
        }
        else if (r1 === r2)
        {
            for (;;)
            {
                break;
            }
        }
        else
        {
            fail();
        }
        return r4;
";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn test_literal_values() {
        let body = vec![
            Instruction::literal(
                r(1),
                Value::Tuple(vec![
                    Value::String("a\"b".to_string()),
                    Value::FunctionPointer(0),
                    Value::enum_element_with_state(EnumElementRef::new(0, 1), Value::Integer(3)),
                    Value::EnumConstructor(EnumElementRef::new(0, 1)),
                    Value::Unit,
                ]),
                Type::Tuple(vec![]),
            ),
            Instruction::Global(r(2)),
            Instruction::read_struct(r(2), 4, r(3)),
            Instruction::call(r(3), vec![r(1), r(0)], r(4)),
        ];
        let mut program = option_program(body, 5, 4);
        program.functions[0].register_names[1] = Some("my-tuple".to_string());
        let text = generate_ecmascript_string(&program).unwrap();

        let tuple = concat!(
            "var r1_my_tuple = [\"a\\\"b\", lambda_0, 3, ",
            "function (state) { return state; }, undefined];"
        );
        assert!(text.contains(tuple), "{text}");
        assert!(text.contains("var r2 = globals;"));
        assert!(text.contains("var r3 = r2[4];"));
        assert!(text.contains("var r4 = r3(r1_my_tuple, r0);"));
    }
}
