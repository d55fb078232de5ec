// This module defines the register-based instruction IR of a checked program. Each
// function owns one top-level instruction sequence; loops and match cases own nested
// sequences, so a body forms a tree. All sequences of a function share one flat,
// densely numbered register space, and registers 0..parameter_count hold the
// parameters. Instructions are a sum type; helpers expose each instruction's defined
// register and its operands so that passes such as dead code elimination and the
// verifier can walk the tree without matching on every variant themselves.

//! Instruction IR.
//!
//! # Structure
//!
//! - [`CheckedProgram`] - functions plus the enum, struct and interface tables
//! - [`Function`] - one top-level [`InstructionSequence`] over virtual registers
//! - [`Instruction`] - call, literal, tuple, read_struct, enum_construct, global,
//!   match, loop and break
//!
//! Function 0 of a program is its entry point.

pub(crate) mod print;
pub mod verify;

use crate::core::{
    EnumElementRef, Enumeration, FunctionId, Interface, StructMemberId, Structure, Type, Value,
};
use std::fmt;

pub use verify::{verify_function, verify_program};

/// A virtual register: a dense index into its function's register space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterId(pub u32);

impl RegisterId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInstruction {
    pub callee: RegisterId,
    pub arguments: Vec<RegisterId>,
    pub result: RegisterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralInstruction {
    pub into: RegisterId,
    pub value: Value,
    pub type_of: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleInstruction {
    pub elements: Vec<RegisterId>,
    pub result: RegisterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStructInstruction {
    pub from_object: RegisterId,
    pub member: StructMemberId,
    pub into: RegisterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstructInstruction {
    pub into: RegisterId,
    pub which: EnumElementRef,
    pub state: RegisterId,
    pub state_type: Type,
}

/// What a match case compares the key against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCaseKind {
    /// Applies when the key equals the value held in this register.
    Value(RegisterId),
    /// Applies when the key is the given stateful enum element; its payload is
    /// bound to `state_into` for the case's action.
    StatefulEnum {
        element: EnumElementRef,
        state_into: RegisterId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCase {
    pub kind: MatchCaseKind,
    pub action: InstructionSequence,
    /// Register whose value becomes the match result; `None` when the action
    /// never falls through (for example because it breaks out of a loop).
    pub value: Option<RegisterId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInstruction {
    pub key: RegisterId,
    pub cases: Vec<MatchCase>,
    pub result: RegisterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Call(CallInstruction),
    Literal(LiteralInstruction),
    Tuple(TupleInstruction),
    ReadStruct(ReadStructInstruction),
    EnumConstruct(EnumConstructInstruction),
    Global(RegisterId),
    Match(MatchInstruction),
    Loop(InstructionSequence),
    Break,
}

impl Instruction {
    pub fn call(callee: RegisterId, arguments: Vec<RegisterId>, result: RegisterId) -> Self {
        Instruction::Call(CallInstruction {
            callee,
            arguments,
            result,
        })
    }

    pub fn literal(into: RegisterId, value: Value, type_of: Type) -> Self {
        Instruction::Literal(LiteralInstruction {
            into,
            value,
            type_of,
        })
    }

    pub fn tuple(elements: Vec<RegisterId>, result: RegisterId) -> Self {
        Instruction::Tuple(TupleInstruction { elements, result })
    }

    pub fn read_struct(from_object: RegisterId, member: StructMemberId, into: RegisterId) -> Self {
        Instruction::ReadStruct(ReadStructInstruction {
            from_object,
            member,
            into,
        })
    }

    pub fn enum_construct(
        into: RegisterId,
        which: EnumElementRef,
        state: RegisterId,
        state_type: Type,
    ) -> Self {
        Instruction::EnumConstruct(EnumConstructInstruction {
            into,
            which,
            state,
            state_type,
        })
    }

    pub fn match_(key: RegisterId, cases: Vec<MatchCase>, result: RegisterId) -> Self {
        Instruction::Match(MatchInstruction { key, cases, result })
    }

    /// The register this instruction writes, if any.
    pub fn result(&self) -> Option<RegisterId> {
        match self {
            Instruction::Call(call) => Some(call.result),
            Instruction::Literal(literal) => Some(literal.into),
            Instruction::Tuple(tuple) => Some(tuple.result),
            Instruction::ReadStruct(read) => Some(read.into),
            Instruction::EnumConstruct(construct) => Some(construct.into),
            Instruction::Global(into) => Some(*into),
            Instruction::Match(match_) => Some(match_.result),
            Instruction::Loop(_) | Instruction::Break => None,
        }
    }

    /// Visits the registers this instruction reads itself. Registers read inside
    /// nested sequences are not included; for `match` the case keys and case
    /// values are.
    pub fn for_each_operand(&self, mut visit: impl FnMut(RegisterId)) {
        match self {
            Instruction::Call(call) => {
                visit(call.callee);
                call.arguments.iter().copied().for_each(visit);
            }
            Instruction::Tuple(tuple) => tuple.elements.iter().copied().for_each(visit),
            Instruction::ReadStruct(read) => visit(read.from_object),
            Instruction::EnumConstruct(construct) => visit(construct.state),
            Instruction::Match(match_) => {
                visit(match_.key);
                for case in &match_.cases {
                    if let MatchCaseKind::Value(key) = case.kind {
                        visit(key);
                    }
                    if let Some(value) = case.value {
                        visit(value);
                    }
                }
            }
            Instruction::Literal(_)
            | Instruction::Global(_)
            | Instruction::Loop(_)
            | Instruction::Break => {}
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Instruction::Call(_))
    }
}

/// An ordered list of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSequence {
    pub(crate) instructions: Vec<Instruction>,
}

impl InstructionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Number of instructions in this sequence and every nested one.
    pub fn total_instructions(&self) -> usize {
        self.iter()
            .map(|instruction| {
                1 + match instruction {
                    Instruction::Loop(body) => body.total_instructions(),
                    Instruction::Match(match_) => match_
                        .cases
                        .iter()
                        .map(|case| case.action.total_instructions())
                        .sum(),
                    _ => 0,
                }
            })
            .sum()
    }

    /// Visits the function ids referenced by literals, in program order.
    pub fn for_each_function(&self, visit: &mut impl FnMut(FunctionId)) {
        for instruction in self.iter() {
            match instruction {
                Instruction::Literal(literal) => literal.value.for_each_function(visit),
                Instruction::Loop(body) => body.for_each_function(visit),
                Instruction::Match(match_) => {
                    for case in &match_.cases {
                        case.action.for_each_function(visit);
                    }
                }
                _ => {}
            }
        }
    }

    /// Same traversal order as [`InstructionSequence::for_each_function`].
    pub fn for_each_function_mut(&mut self, visit: &mut impl FnMut(&mut FunctionId)) {
        for instruction in &mut self.instructions {
            match instruction {
                Instruction::Literal(literal) => literal.value.for_each_function_mut(visit),
                Instruction::Loop(body) => body.for_each_function_mut(visit),
                Instruction::Match(match_) => {
                    for case in &mut match_.cases {
                        case.action.for_each_function_mut(visit);
                    }
                }
                _ => {}
            }
        }
    }
}

impl From<Vec<Instruction>> for InstructionSequence {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl FromIterator<Instruction> for InstructionSequence {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub parameter_count: u32,
    pub return_value: RegisterId,
    pub number_of_registers: u32,
    /// Optional debug name per register; always `number_of_registers` long.
    pub register_names: Vec<Option<String>>,
    pub body: InstructionSequence,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        parameter_count: u32,
        number_of_registers: u32,
        return_value: RegisterId,
        body: InstructionSequence,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_count,
            return_value,
            number_of_registers,
            register_names: vec![None; number_of_registers as usize],
            body,
        }
    }

    pub fn register_name(&self, register: RegisterId) -> Option<&str> {
        self.register_names
            .get(register.index())
            .and_then(|name| name.as_deref())
    }
}

/// A program that passed semantic checking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedProgram {
    pub functions: Vec<Function>,
    pub enums: Vec<Enumeration>,
    pub structs: Vec<Structure>,
    pub interfaces: Vec<Interface>,
}

impl CheckedProgram {
    pub fn new() -> Self {
        Self::default()
    }
}
