//! IR verifier.
//!
//! Checks the invariants the passes take for granted: every register id is in
//! range, every register is written at most once, operands are defined before
//! they are read (a nested sequence sees what was defined before it was entered,
//! and its own definitions go out of scope when it ends), `break` only appears
//! inside a loop, and enum and function references point into the program's
//! tables.

use super::{CheckedProgram, Function, Instruction, InstructionSequence, MatchCaseKind, RegisterId};
use crate::core::{EnumElementRef, Value, VerifyError, VerifyResult};

/// Verifies every function of `program`.
pub fn verify_program(program: &CheckedProgram) -> VerifyResult<()> {
    for function in &program.functions {
        verify_function(function, program)?;
    }
    Ok(())
}

/// Verifies one function against the tables of `program`.
pub fn verify_function(function: &Function, program: &CheckedProgram) -> VerifyResult<()> {
    Verifier::new(function, program).run()
}

struct Verifier<'a> {
    function: &'a Function,
    program: &'a CheckedProgram,
    /// Registers visible at the current point.
    visible: Vec<bool>,
    /// Registers written anywhere so far.
    written: Vec<bool>,
    /// Definitions in program order, truncated when a nested sequence ends.
    scope: Vec<RegisterId>,
    loop_depth: usize,
}

impl<'a> Verifier<'a> {
    fn new(function: &'a Function, program: &'a CheckedProgram) -> Self {
        let count = function.number_of_registers as usize;
        Self {
            function,
            program,
            visible: vec![false; count],
            written: vec![false; count],
            scope: Vec::new(),
            loop_depth: 0,
        }
    }

    fn name(&self) -> String {
        self.function.name.clone()
    }

    fn run(mut self) -> VerifyResult<()> {
        let function = self.function;
        if function.register_names.len() != function.number_of_registers as usize {
            return Err(VerifyError::RegisterNameCount {
                function: self.name(),
                names: function.register_names.len(),
                count: function.number_of_registers,
            });
        }
        if function.parameter_count > function.number_of_registers {
            return Err(VerifyError::TooManyParameters {
                function: self.name(),
                parameters: function.parameter_count,
                count: function.number_of_registers,
            });
        }
        self.check_range(function.return_value)?;

        for parameter in 0..function.parameter_count {
            self.define(RegisterId::new(parameter))?;
        }
        self.sequence(&function.body)?;

        if !self.visible[function.return_value.index()] {
            return Err(VerifyError::ReturnValueUndefined {
                function: self.name(),
                register: function.return_value,
            });
        }
        Ok(())
    }

    fn check_range(&self, register: RegisterId) -> VerifyResult<()> {
        if register.index() >= self.visible.len() {
            return Err(VerifyError::RegisterOutOfRange {
                function: self.name(),
                register,
                count: self.function.number_of_registers,
            });
        }
        Ok(())
    }

    fn define(&mut self, register: RegisterId) -> VerifyResult<()> {
        self.check_range(register)?;
        if self.written[register.index()] {
            return Err(VerifyError::RegisterRedefined {
                function: self.name(),
                register,
            });
        }
        self.written[register.index()] = true;
        self.visible[register.index()] = true;
        self.scope.push(register);
        Ok(())
    }

    fn read(&self, register: RegisterId) -> VerifyResult<()> {
        self.check_range(register)?;
        if !self.visible[register.index()] {
            return Err(VerifyError::UseBeforeDefinition {
                function: self.name(),
                register,
            });
        }
        Ok(())
    }

    fn sequence(&mut self, sequence: &InstructionSequence) -> VerifyResult<()> {
        for instruction in sequence {
            self.instruction(instruction)?;
        }
        Ok(())
    }

    /// Verifies a nested sequence. `bound` is defined on entry, `value` is read
    /// at the end, and everything defined inside is forgotten afterwards.
    fn nested(
        &mut self,
        sequence: &InstructionSequence,
        bound: Option<RegisterId>,
        value: Option<RegisterId>,
    ) -> VerifyResult<()> {
        let mark = self.scope.len();
        if let Some(bound) = bound {
            self.define(bound)?;
        }
        self.sequence(sequence)?;
        if let Some(value) = value {
            self.read(value)?;
        }
        for register in self.scope.drain(mark..) {
            self.visible[register.index()] = false;
        }
        Ok(())
    }

    fn instruction(&mut self, instruction: &Instruction) -> VerifyResult<()> {
        match instruction {
            Instruction::Call(call) => {
                self.read(call.callee)?;
                for &argument in &call.arguments {
                    self.read(argument)?;
                }
                self.define(call.result)
            }
            Instruction::Literal(literal) => {
                self.value(&literal.value)?;
                self.define(literal.into)
            }
            Instruction::Tuple(tuple) => {
                for &element in &tuple.elements {
                    self.read(element)?;
                }
                self.define(tuple.result)
            }
            Instruction::ReadStruct(read) => {
                self.read(read.from_object)?;
                self.define(read.into)
            }
            Instruction::EnumConstruct(construct) => {
                self.element(construct.which, true)?;
                self.read(construct.state)?;
                self.define(construct.into)
            }
            Instruction::Global(into) => self.define(*into),
            Instruction::Match(match_) => {
                self.read(match_.key)?;
                for case in &match_.cases {
                    match case.kind {
                        MatchCaseKind::Value(key) => {
                            self.read(key)?;
                            self.nested(&case.action, None, case.value)?;
                        }
                        MatchCaseKind::StatefulEnum {
                            element,
                            state_into,
                        } => {
                            self.element(element, true)?;
                            self.nested(&case.action, Some(state_into), case.value)?;
                        }
                    }
                }
                self.define(match_.result)
            }
            Instruction::Loop(body) => {
                self.loop_depth += 1;
                let result = self.nested(body, None, None);
                self.loop_depth -= 1;
                result
            }
            Instruction::Break => {
                if self.loop_depth == 0 {
                    return Err(VerifyError::BreakOutsideLoop {
                        function: self.name(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Checks that `element` exists and whether it carries state as expected.
    fn element(&self, element: EnumElementRef, with_state: bool) -> VerifyResult<()> {
        let enumeration = self
            .program
            .enums
            .get(element.enumeration as usize)
            .ok_or_else(|| VerifyError::UnknownEnum {
                function: self.name(),
                enumeration: element.enumeration,
            })?;
        let declared = enumeration
            .element(element.which)
            .ok_or_else(|| VerifyError::UnknownEnumElement {
                function: self.name(),
                enumeration: element.enumeration,
                which: element.which,
            })?;
        match (declared.state.is_some(), with_state) {
            (false, true) => Err(VerifyError::StatelessElement {
                function: self.name(),
                enumeration: element.enumeration,
                which: element.which,
            }),
            (true, false) => Err(VerifyError::MissingState {
                function: self.name(),
                enumeration: element.enumeration,
                which: element.which,
            }),
            _ => Ok(()),
        }
    }

    fn value(&self, value: &Value) -> VerifyResult<()> {
        match value {
            Value::FunctionPointer(callee) => {
                if *callee as usize >= self.program.functions.len() {
                    return Err(VerifyError::UnknownFunction {
                        function: self.name(),
                        callee: *callee,
                    });
                }
                Ok(())
            }
            Value::EnumElement { element, state } => {
                self.element(*element, state.is_some())?;
                match state {
                    Some(state) => self.value(state),
                    None => Ok(()),
                }
            }
            Value::EnumConstructor(element) => self.element(*element, true),
            Value::Tuple(elements) => elements.iter().try_for_each(|element| self.value(element)),
            Value::Unit | Value::Integer(_) | Value::String(_) => Ok(()),
        }
    }
}
