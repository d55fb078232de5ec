//! Textual IR: a readable form of a checked program, used by tests and the CLI.
//!
//! ```text
//! ; Comments start with a semicolon
//! enum Option {
//!     none,
//!     some(int 0..10),
//! }
//!
//! struct Pair { first: string, second: host }
//! interface Console
//!
//! fn main(%input) -> %result {
//!     %one = literal 1 : int 0..10
//!     %some = enum_construct Option.some(%one)
//!     %result = match %some {
//!         case Option.some(%payload) {
//!         } yield %payload
//!     }
//! }
//! ```
//!
//! Registers are `%name` or `%number`; named registers keep their name as a debug
//! name. Types are `unit`, `string`, `host`, `int A..B`, `enum E`, `struct S`,
//! `interface I`, `constructor E.e`, `function(T, ...) -> T` and `tuple(T, ...)`.
//! Literal values are integers, quoted strings, `unit`, `@function`, `E.e`,
//! `E.e(value)`, `constructor E.e` and `(value, ...)` tuples.
//!
//! Type declarations must precede their use; functions may be referenced before
//! they are defined. The first function is the entry point.

pub mod check;
pub mod parser;

pub use check::{CheckDirective, RunDirective, TestRunner, TestSpec};
pub use parser::parse_program;
