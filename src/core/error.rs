// This module defines the error types of tessel using the thiserror crate. The core
// passes (dead code elimination, encoding strategy selection) cannot fail on a checked
// program, so errors only arise at the surfaces around them: ParseError for the
// textual IR (syntax errors with positions and unresolved names), VerifyError for IR
// that breaks the register and scoping invariants the passes rely on, and
// CodegenError for failures while writing generated code to the caller's stream.
// Each variant carries the context needed for a useful message, and every error type
// comes with a Result alias.

//! Error types for tessel.

use crate::ir::RegisterId;
use thiserror::Error;

/// Errors produced while reading the textual IR.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{line}:{column}: {reason}")]
    Syntax {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Undefined register %{name} in function {function}")]
    UndefinedRegister { function: String, name: String },

    #[error("Register %{name} defined twice in function {function}")]
    DuplicateRegister { function: String, name: String },

    #[error("Undefined function @{name}")]
    UndefinedFunction { name: String },

    #[error("Duplicate function definition: {name}")]
    DuplicateFunction { name: String },

    #[error("Undefined {kind} {name}")]
    UndefinedType { kind: &'static str, name: String },

    #[error("Duplicate {kind} definition: {name}")]
    DuplicateType { kind: &'static str, name: String },

    #[error("Enum {enumeration} has no element {element}")]
    UndefinedEnumElement { enumeration: String, element: String },

    #[error(transparent)]
    Invalid(#[from] VerifyError),
}

/// Violations of the IR invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("{function}: register {register} out of range ({count} registers)")]
    RegisterOutOfRange {
        function: String,
        register: RegisterId,
        count: u32,
    },

    #[error("{function}: register {register} defined more than once")]
    RegisterRedefined { function: String, register: RegisterId },

    #[error("{function}: register {register} used before its definition")]
    UseBeforeDefinition { function: String, register: RegisterId },

    #[error("{function}: break outside of a loop")]
    BreakOutsideLoop { function: String },

    #[error("{function}: return value {register} is never defined")]
    ReturnValueUndefined { function: String, register: RegisterId },

    #[error("{function}: {parameters} parameters but only {count} registers")]
    TooManyParameters {
        function: String,
        parameters: u32,
        count: u32,
    },

    #[error("{function}: {names} register names for {count} registers")]
    RegisterNameCount {
        function: String,
        names: usize,
        count: u32,
    },

    #[error("{function}: unknown enum {enumeration}")]
    UnknownEnum { function: String, enumeration: u32 },

    #[error("{function}: enum {enumeration} has no element {which}")]
    UnknownEnumElement {
        function: String,
        enumeration: u32,
        which: u32,
    },

    #[error("{function}: element {which} of enum {enumeration} carries no state")]
    StatelessElement {
        function: String,
        enumeration: u32,
        which: u32,
    },

    #[error("{function}: element {which} of enum {enumeration} requires state")]
    MissingState {
        function: String,
        enumeration: u32,
        which: u32,
    },

    #[error("{function}: unknown function {callee}")]
    UnknownFunction { function: String, callee: u32 },
}

/// Errors while writing generated code.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to write generated code: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting generated code failed")]
    Format(#[from] std::fmt::Error),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type VerifyResult<T> = Result<T, VerifyError>;
pub type CodegenResult<T> = Result<T, CodegenError>;
