// The ECMAScript backend. Values of the language map onto the host's dynamically
// typed values; the value-set algebra describes which host values a compiled value
// may be, and the encoding strategy cache uses it to decide, per enum, whether
// payloads can stand for the enum value directly or must be wrapped in a tagged
// array. The backend module then generates a whole program, and enum_codegen holds
// the expressions that construct and inspect encoded enum values.

//! ECMAScript backend.
//!
//! ```
//! use tessel::ecmascript::{EncodingStrategyCache, EncodingElement, StatefulEncoding};
//! use tessel::core::{Enumeration, EnumerationElement, Type};
//!
//! let enums = [Enumeration::new(
//!     "Option",
//!     vec![
//!         EnumerationElement::stateful("some", Type::integer(0, 10)),
//!         EnumerationElement::stateless("none"),
//!     ],
//! )];
//! let mut cache = EncodingStrategyCache::new(&enums);
//! let strategy = cache.require(0);
//! assert!(matches!(
//!     strategy.element(0),
//!     EncodingElement::Stateful(StatefulEncoding::Direct(_))
//! ));
//! ```

pub mod backend;
pub mod encoding;
pub mod enum_codegen;
pub mod value;
pub mod value_set;

pub use backend::{generate_ecmascript, generate_ecmascript_string};
pub use encoding::{
    value_set_of, EncodingElement, EncodingStrategy, EncodingStrategyCache, StatefulEncoding,
};
pub use value::EcmascriptValue;
pub use value_set::{SafeIntegerRange, ValueSet, MAX_SAFE_INTEGER};
