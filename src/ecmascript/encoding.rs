// This module chooses how the values of each enum are represented in ECMAScript.
// Payload-less elements become constants (false/true for two-element enums, integer
// tags otherwise). When an enum has payload-carrying elements, the cache first tries
// to represent every payload as itself: this works when the payloads' value sets are
// pairwise disjoint, and when every payload-less element can still be given a
// constant outside all of them. If anything collides, every stateful element falls
// back to a [tag, payload] array and every payload-less element to its ordinal.
// Strategies are computed on first use and memoized; nested enums are resolved
// through the same cache.

//! Enum encoding strategies and their cache.

use super::value::EcmascriptValue;
use super::value_set::{SafeIntegerRange, ValueSet};
use crate::core::{EnumElementId, EnumId, Enumeration, Type};
use hashbrown::{HashMap, HashSet};
use log::debug;
use std::fmt;

/// How a payload-carrying element is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatefulEncoding {
    /// The payload is the representation; it occupies these values.
    Direct(ValueSet),
    /// `[tag, payload]`.
    Indirect(u64),
}

/// How one enum element is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingElement {
    Stateless(EcmascriptValue),
    Stateful(StatefulEncoding),
}

impl EncodingElement {
    /// Values this element may take at runtime.
    pub fn value_set(&self) -> ValueSet {
        match self {
            EncodingElement::Stateless(tag) => tag.value_set(),
            EncodingElement::Stateful(StatefulEncoding::Direct(payload)) => *payload,
            EncodingElement::Stateful(StatefulEncoding::Indirect(_)) => ValueSet::array(),
        }
    }
}

impl fmt::Display for EncodingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingElement::Stateless(tag) => write!(f, "stateless {tag}"),
            EncodingElement::Stateful(StatefulEncoding::Direct(payload)) => {
                write!(f, "direct {payload}")
            }
            EncodingElement::Stateful(StatefulEncoding::Indirect(tag)) => {
                write!(f, "indirect {tag}")
            }
        }
    }
}

/// One element encoding per enum element, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingStrategy {
    elements: Vec<EncodingElement>,
}

impl EncodingStrategy {
    pub fn elements(&self) -> &[EncodingElement] {
        &self.elements
    }

    pub fn element(&self, which: EnumElementId) -> &EncodingElement {
        &self.elements[which as usize]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Every runtime value an enum with this strategy may take.
pub fn value_set_of(strategy: &EncodingStrategy) -> ValueSet {
    strategy
        .elements
        .iter()
        .fold(ValueSet::empty(), |set, element| set.union(&element.value_set()))
}

/// Memoized encoding strategies for the enums of one program.
pub struct EncodingStrategyCache<'a> {
    enums: &'a [Enumeration],
    entries: HashMap<EnumId, EncodingStrategy>,
    in_progress: HashSet<EnumId>,
}

impl<'a> EncodingStrategyCache<'a> {
    pub fn new(enums: &'a [Enumeration]) -> Self {
        Self {
            enums,
            entries: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// The strategy of enum `id`, computed on first request.
    ///
    /// Panics if `id` is not part of the enum table, or if the enum contains
    /// itself through its payload types.
    pub fn require(&mut self, id: EnumId) -> &EncodingStrategy {
        assert!(
            (id as usize) < self.enums.len(),
            "enum {id} is not part of the program ({} enums)",
            self.enums.len()
        );
        if !self.entries.contains_key(&id) {
            let strategy = self.define(id);
            self.entries.insert(id, strategy);
        }
        &self.entries[&id]
    }

    /// The values a value of type `type_` may take at runtime.
    pub fn value_set_of_type(&mut self, type_: &Type) -> ValueSet {
        match type_ {
            Type::Unit => ValueSet::undefined(),
            Type::String => ValueSet::string(),
            Type::IntegerRange(range) => {
                ValueSet::integer_range(SafeIntegerRange::clamped(range.minimum, range.maximum))
            }
            Type::Enumeration(id) => value_set_of(self.require(*id)),
            Type::EnumConstructor(_) | Type::FunctionPointer { .. } => ValueSet::function(),
            Type::Tuple(_) | Type::Structure(_) => ValueSet::array(),
            Type::Interface(_) => ValueSet::object(),
            Type::HostValue => ValueSet::anything(),
        }
    }

    fn define(&mut self, id: EnumId) -> EncodingStrategy {
        assert!(
            self.in_progress.insert(id),
            "enum {id} contains itself through its payload types"
        );
        let enums = self.enums;
        let enumeration = &enums[id as usize];

        let elements = if !enumeration.has_stateful_element() {
            stateless_elements(enumeration)
        } else if let Some(direct) = self.try_direct(enumeration) {
            debug!("enum {}: payloads encoded directly", enumeration.name);
            direct
        } else {
            debug!(
                "enum {}: payloads collide, falling back to tagged arrays",
                enumeration.name
            );
            fallback_elements(enumeration)
        };

        self.in_progress.remove(&id);
        EncodingStrategy { elements }
    }

    /// Encodes every payload as itself, or returns `None` on any collision.
    fn try_direct(&mut self, enumeration: &Enumeration) -> Option<Vec<EncodingElement>> {
        let mut used = ValueSet::empty();
        let mut elements: Vec<Option<EncodingElement>> = vec![None; enumeration.elements.len()];

        for (index, element) in enumeration.elements.iter().enumerate() {
            let Some(state) = &element.state else {
                continue;
            };
            let payload = self.value_set_of_type(state);
            if payload.is_empty() || !used.merge_without_intersection(&payload) {
                return None;
            }
            elements[index] = Some(EncodingElement::Stateful(StatefulEncoding::Direct(payload)));
        }

        for (index, element) in enumeration.elements.iter().enumerate() {
            if element.state.is_some() {
                continue;
            }
            let candidates = [
                EcmascriptValue::Undefined,
                EcmascriptValue::Null,
                EcmascriptValue::Integer(index as u64),
            ];
            let tag = candidates
                .into_iter()
                .find(|tag| used.merge_without_intersection(&tag.value_set()))?;
            elements[index] = Some(EncodingElement::Stateless(tag));
        }

        elements.into_iter().collect()
    }
}

fn stateless_elements(enumeration: &Enumeration) -> Vec<EncodingElement> {
    let count = enumeration.elements.len();
    (0..count)
        .map(|index| {
            EncodingElement::Stateless(if count == 2 {
                EcmascriptValue::Boolean(index == 1)
            } else {
                EcmascriptValue::Integer(index as u64)
            })
        })
        .collect()
}

fn fallback_elements(enumeration: &Enumeration) -> Vec<EncodingElement> {
    enumeration
        .elements
        .iter()
        .enumerate()
        .map(|(index, element)| match element.state {
            Some(_) => EncodingElement::Stateful(StatefulEncoding::Indirect(index as u64)),
            None => EncodingElement::Stateless(EcmascriptValue::Integer(index as u64)),
        })
        .collect()
}
