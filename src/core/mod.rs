// This module holds the vocabulary shared by every other part of tessel: the core
// type descriptions a checked program attaches to its values, the compile-time values
// literals materialize, and the error types of the surfaces that can fail (text IR
// parsing, IR verification and code generation). Apart from the register ids named in
// verifier errors, nothing in here depends on the IR, the passes or the backend.

//! Core tessel vocabulary.
//!
//! # Key Components
//!
//! ## Types (`types`)
//! - Core type descriptions used to classify runtime representations
//! - Enum, struct and interface tables of a checked program
//!
//! ## Values (`value`)
//! - Compile-time values carried by `literal` instructions
//!
//! ## Errors (`error`)
//! - `ParseError`, `VerifyError` and `CodegenError` built with `thiserror`

pub mod error;
pub mod types;
pub mod value;

pub use error::{
    CodegenError, CodegenResult, ParseError, ParseResult, VerifyError, VerifyResult,
};
pub use types::{
    EnumElementId, EnumElementRef, EnumId, Enumeration, EnumerationElement, FunctionId,
    IntegerRange, Interface, InterfaceId, StructId, StructMemberId, Structure, StructureMember,
    Type,
};
pub use value::Value;
