//! Tessel - a register IR with dead code elimination and an ECMAScript backend.
//!
//! Programs are checked, register-based instruction trees. The optimizer removes
//! registers whose values are never needed and compacts the register space; the
//! ECMAScript backend chooses, per enum, a runtime encoding that avoids wrapping
//! payloads whenever the payloads' possible values cannot be confused.
//!
//! # Primary Usage
//!
//! ```
//! use tessel::text_ir::parse_program;
//! use tessel::optimize::optimize;
//! use tessel::ecmascript::generate_ecmascript_string;
//!
//! let mut program = parse_program(
//!     "fn main(%x) -> %x {
//!         %unused = global
//!     }",
//! )?;
//! optimize(&mut program);
//! assert_eq!(program.functions[0].number_of_registers, 1);
//!
//! let script = generate_ecmascript_string(&program)?;
//! assert!(script.contains("lambda_0 = function (r0_x)"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Types, literal values and error types
//! - [`ir`] - Instructions, functions, the verifier and the printer
//! - [`optimize`] - Dead code elimination and unused function removal
//! - [`ecmascript`] - Value sets, enum encoding strategies and code generation
//! - [`text_ir`] - Textual IR parser and FileCheck-style test runner

pub mod core;
pub mod ecmascript;
pub mod ir;
pub mod optimize;
pub mod text_ir;

// Re-export common types from organized modules
pub use self::core::{
    CodegenError, EnumId, Enumeration, EnumerationElement, FunctionId, ParseError, Type, Value,
    VerifyError,
};
pub use self::ecmascript::{
    generate_ecmascript, EncodingElement, EncodingStrategy, EncodingStrategyCache,
    SafeIntegerRange, StatefulEncoding, ValueSet,
};
pub use self::ir::{CheckedProgram, Function, Instruction, InstructionSequence, RegisterId};
pub use self::optimize::{optimize, remove_dead_code, DeadCodeStats, OptimizationOptions};
pub use self::text_ir::parse_program;
