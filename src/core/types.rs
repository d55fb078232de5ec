// Core type descriptions of a checked program. A type here carries just enough
// information to classify how a value of that type is represented at runtime: the
// ECMAScript backend maps every type to a value set, and enum payload types decide
// whether an enum can be encoded without boxing. Enumerations, structures and
// interfaces live in tables owned by the checked program and are referred to by
// dense ids.

//! Core type descriptions and the program's type tables.

use std::fmt;

/// Index into [`CheckedProgram::enums`](crate::ir::CheckedProgram::enums).
pub type EnumId = u32;
/// Position of an element within its enumeration.
pub type EnumElementId = u32;
/// Index into [`CheckedProgram::structs`](crate::ir::CheckedProgram::structs).
pub type StructId = u32;
/// Index into [`CheckedProgram::interfaces`](crate::ir::CheckedProgram::interfaces).
pub type InterfaceId = u32;
/// Index into [`CheckedProgram::functions`](crate::ir::CheckedProgram::functions).
pub type FunctionId = u32;
/// Position of a member within a structure or tuple.
pub type StructMemberId = u32;

/// Inclusive range of unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerRange {
    pub minimum: u64,
    pub maximum: u64,
}

impl IntegerRange {
    pub fn new(minimum: u64, maximum: u64) -> Self {
        assert!(minimum <= maximum, "empty integer range {minimum}..{maximum}");
        Self { minimum, maximum }
    }
}

/// Refers to one element of one enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumElementRef {
    pub enumeration: EnumId,
    pub which: EnumElementId,
}

impl EnumElementRef {
    pub fn new(enumeration: EnumId, which: EnumElementId) -> Self {
        Self { enumeration, which }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Unit,
    String,
    IntegerRange(IntegerRange),
    Enumeration(EnumId),
    /// The function value that wraps a payload into the given element.
    EnumConstructor(EnumElementRef),
    FunctionPointer {
        parameters: Vec<Type>,
        result: Box<Type>,
    },
    Tuple(Vec<Type>),
    Structure(StructId),
    Interface(InterfaceId),
    /// A value owned by the embedding host; nothing is known about its shape.
    HostValue,
}

impl Type {
    pub fn integer(minimum: u64, maximum: u64) -> Self {
        Type::IntegerRange(IntegerRange::new(minimum, maximum))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationElement {
    pub name: String,
    /// Payload type; `None` for payload-less elements.
    pub state: Option<Type>,
}

impl EnumerationElement {
    pub fn stateless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
        }
    }

    pub fn stateful(name: impl Into<String>, state: Type) -> Self {
        Self {
            name: name.into(),
            state: Some(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub name: String,
    pub elements: Vec<EnumerationElement>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>, elements: Vec<EnumerationElement>) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }

    pub fn has_stateful_element(&self) -> bool {
        self.elements.iter().any(|element| element.state.is_some())
    }

    pub fn element(&self, which: EnumElementId) -> Option<&EnumerationElement> {
        self.elements.get(which as usize)
    }

    pub fn find_element(&self, name: &str) -> Option<EnumElementId> {
        self.elements
            .iter()
            .position(|element| element.name == name)
            .map(|index| index as EnumElementId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureMember {
    pub name: String,
    pub what: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub name: String,
    pub members: Vec<StructureMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
}

impl fmt::Display for IntegerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.minimum, self.maximum)
    }
}
