//! Textual rendering of a checked program.
//!
//! The output is the format read by [`crate::text_ir::parse_program`]; printing and
//! re-parsing yields the same program apart from debug names of registers that had
//! none. Registers print as `%name` when they carry a debug name and `%index`
//! otherwise.

use super::{CheckedProgram, Function, Instruction, InstructionSequence, MatchCaseKind, RegisterId};
use crate::core::{EnumElementRef, Type, Value};
use std::fmt::{self, Write};

const INDENT: &str = "    ";

struct Printer<'p, 'f, W> {
    program: &'p CheckedProgram,
    out: &'f mut W,
}

impl<'p, 'f, W: Write> Printer<'p, 'f, W> {
    fn program(&mut self) -> fmt::Result {
        let mut first = true;
        let mut separate = |out: &mut W| -> fmt::Result {
            if !std::mem::replace(&mut first, false) {
                writeln!(out)?;
            }
            Ok(())
        };

        for enumeration in &self.program.enums {
            separate(self.out)?;
            writeln!(self.out, "enum {} {{", enumeration.name)?;
            for element in &enumeration.elements {
                write!(self.out, "{INDENT}{}", element.name)?;
                if let Some(state) = &element.state {
                    write!(self.out, "(")?;
                    self.type_(state)?;
                    write!(self.out, ")")?;
                }
                writeln!(self.out, ",")?;
            }
            writeln!(self.out, "}}")?;
        }
        for structure in &self.program.structs {
            separate(self.out)?;
            writeln!(self.out, "struct {} {{", structure.name)?;
            for member in &structure.members {
                write!(self.out, "{INDENT}{}: ", member.name)?;
                self.type_(&member.what)?;
                writeln!(self.out, ",")?;
            }
            writeln!(self.out, "}}")?;
        }
        for interface in &self.program.interfaces {
            separate(self.out)?;
            writeln!(self.out, "interface {}", interface.name)?;
        }
        for function in &self.program.functions {
            separate(self.out)?;
            self.function(function)?;
        }
        Ok(())
    }

    fn function(&mut self, function: &Function) -> fmt::Result {
        write!(self.out, "fn {}(", function.name)?;
        for parameter in 0..function.parameter_count {
            if parameter > 0 {
                write!(self.out, ", ")?;
            }
            self.register(function, RegisterId::new(parameter))?;
        }
        write!(self.out, ") -> ")?;
        self.register(function, function.return_value)?;
        writeln!(self.out, " {{")?;
        self.sequence(function, &function.body, 1)?;
        writeln!(self.out, "}}")
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

    fn indent(&mut self, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            self.out.write_str(INDENT)?;
        }
        Ok(())
    }

    fn instruction(
        &mut self,
        function: &Function,
        instruction: &Instruction,
        depth: usize,
    ) -> fmt::Result {
        self.indent(depth)?;
        if let Some(result) = instruction.result() {
            self.register(function, result)?;
            write!(self.out, " = ")?;
        }
        match instruction {
            Instruction::Call(call) => {
                write!(self.out, "call ")?;
                self.register(function, call.callee)?;
                self.register_list(function, &call.arguments)?;
            }
            Instruction::Literal(literal) => {
                write!(self.out, "literal ")?;
                self.value(&literal.value)?;
                write!(self.out, " : ")?;
                self.type_(&literal.type_of)?;
            }
            Instruction::Tuple(tuple) => {
                write!(self.out, "tuple")?;
                self.register_list(function, &tuple.elements)?;
            }
            Instruction::ReadStruct(read) => {
                write!(self.out, "read_struct ")?;
                self.register(function, read.from_object)?;
                write!(self.out, ".{}", read.member)?;
            }
            Instruction::EnumConstruct(construct) => {
                write!(self.out, "enum_construct ")?;
                self.element(construct.which)?;
                write!(self.out, "(")?;
                self.register(function, construct.state)?;
                write!(self.out, ")")?;
            }
            Instruction::Global(_) => write!(self.out, "global")?,
            Instruction::Match(match_) => {
                write!(self.out, "match ")?;
                self.register(function, match_.key)?;
                writeln!(self.out, " {{")?;
                for case in &match_.cases {
                    self.indent(depth + 1)?;
                    write!(self.out, "case ")?;
                    match case.kind {
                        MatchCaseKind::Value(key) => self.register(function, key)?,
                        MatchCaseKind::StatefulEnum {
                            element,
                            state_into,
                        } => {
                            self.element(element)?;
                            write!(self.out, "(")?;
                            self.register(function, state_into)?;
                            write!(self.out, ")")?;
                        }
                    }
                    writeln!(self.out, " {{")?;
                    self.sequence(function, &case.action, depth + 2)?;
                    self.indent(depth + 1)?;
                    write!(self.out, "}}")?;
                    if let Some(value) = case.value {
                        write!(self.out, " yield ")?;
                        self.register(function, value)?;
                    }
                    writeln!(self.out)?;
                }
                self.indent(depth)?;
                write!(self.out, "}}")?;
            }
            Instruction::Loop(body) => {
                writeln!(self.out, "loop {{")?;
                self.sequence(function, body, depth + 1)?;
                self.indent(depth)?;
                write!(self.out, "}}")?;
            }
            Instruction::Break => write!(self.out, "break")?,
        }
        writeln!(self.out)
    }

    fn register(&mut self, function: &Function, register: RegisterId) -> fmt::Result {
        match function.register_name(register) {
            Some(name) => write!(self.out, "%{name}"),
            None => write!(self.out, "%{}", register.0),
        }
    }

    fn register_list(&mut self, function: &Function, registers: &[RegisterId]) -> fmt::Result {
        write!(self.out, "(")?;
        for (index, &register) in registers.iter().enumerate() {
            if index > 0 {
                write!(self.out, ", ")?;
            }
            self.register(function, register)?;
        }
        write!(self.out, ")")
    }

    fn element(&mut self, element: EnumElementRef) -> fmt::Result {
        match self.program.enums.get(element.enumeration as usize) {
            Some(enumeration) => match enumeration.element(element.which) {
                Some(declared) => write!(self.out, "{}.{}", enumeration.name, declared.name),
                None => write!(self.out, "{}.#{}", enumeration.name, element.which),
            },
            None => write!(self.out, "#{}.#{}", element.enumeration, element.which),
        }
    }

    fn value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::Unit => write!(self.out, "unit"),
            Value::Integer(integer) => write!(self.out, "{integer}"),
            Value::String(string) => write_quoted(self.out, string),
            Value::FunctionPointer(id) => match self.program.functions.get(*id as usize) {
                Some(function) => write!(self.out, "@{}", function.name),
                None => write!(self.out, "@#{id}"),
            },
            Value::EnumElement { element, state } => {
                self.element(*element)?;
                if let Some(state) = state {
                    write!(self.out, "(")?;
                    self.value(state)?;
                    write!(self.out, ")")?;
                }
                Ok(())
            }
            Value::EnumConstructor(element) => {
                write!(self.out, "constructor ")?;
                self.element(*element)
            }
            Value::Tuple(elements) => {
                write!(self.out, "(")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(self.out, ", ")?;
                    }
                    self.value(element)?;
                }
                write!(self.out, ")")
            }
        }
    }

    fn type_(&mut self, type_: &Type) -> fmt::Result {
        match type_ {
            Type::Unit => write!(self.out, "unit"),
            Type::String => write!(self.out, "string"),
            Type::HostValue => write!(self.out, "host"),
            Type::IntegerRange(range) => write!(self.out, "int {range}"),
            Type::Enumeration(id) => match self.program.enums.get(*id as usize) {
                Some(enumeration) => write!(self.out, "enum {}", enumeration.name),
                None => write!(self.out, "enum #{id}"),
            },
            Type::EnumConstructor(element) => {
                write!(self.out, "constructor ")?;
                self.element(*element)
            }
            Type::FunctionPointer { parameters, result } => {
                write!(self.out, "function")?;
                self.type_list(parameters)?;
                write!(self.out, " -> ")?;
                self.type_(result)
            }
            Type::Tuple(elements) => {
                write!(self.out, "tuple")?;
                self.type_list(elements)
            }
            Type::Structure(id) => match self.program.structs.get(*id as usize) {
                Some(structure) => write!(self.out, "struct {}", structure.name),
                None => write!(self.out, "struct #{id}"),
            },
            Type::Interface(id) => match self.program.interfaces.get(*id as usize) {
                Some(interface) => write!(self.out, "interface {}", interface.name),
                None => write!(self.out, "interface #{id}"),
            },
        }
    }

    fn type_list(&mut self, types: &[Type]) -> fmt::Result {
        write!(self.out, "(")?;
        for (index, type_) in types.iter().enumerate() {
            if index > 0 {
                write!(self.out, ", ")?;
            }
            self.type_(type_)?;
        }
        write!(self.out, ")")
    }
}

/// Writes `text` as a double-quoted string literal.
pub(crate) fn write_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in text.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            ch if ch.is_control() => write!(out, "\\u{{{:x}}}", ch as u32)?,
            ch => out.write_char(ch)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for CheckedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer {
            program: self,
            out: f,
        }
        .program()
    }
}

impl CheckedProgram {
    /// Renders one function in the textual format.
    pub fn print_function(&self, function: &Function) -> String {
        let mut out = String::new();
        let mut printer = Printer {
            program: self,
            out: &mut out,
        };
        // Writing into a String cannot fail.
        let _ = printer.function(function);
        out
    }
}
