//! Compile-time values.
//!
//! A `literal` instruction materializes one of these into a register. Values may
//! nest (tuples, enum payloads), and may refer to functions of the program by id,
//! which is why unused-function removal has to walk into them.

use super::types::{EnumElementRef, FunctionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Unit,
    Integer(u64),
    String(String),
    FunctionPointer(FunctionId),
    EnumElement {
        element: EnumElementRef,
        state: Option<Box<Value>>,
    },
    /// The function that wraps its argument into `element`.
    EnumConstructor(EnumElementRef),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn enum_element(element: EnumElementRef) -> Self {
        Value::EnumElement {
            element,
            state: None,
        }
    }

    pub fn enum_element_with_state(element: EnumElementRef, state: Value) -> Self {
        Value::EnumElement {
            element,
            state: Some(Box::new(state)),
        }
    }

    /// Visits every function id referenced by this value, depth first and left to
    /// right.
    pub fn for_each_function(&self, visit: &mut impl FnMut(FunctionId)) {
        match self {
            Value::FunctionPointer(id) => visit(*id),
            Value::EnumElement {
                state: Some(state), ..
            } => state.for_each_function(visit),
            Value::Tuple(elements) => {
                for element in elements {
                    element.for_each_function(visit);
                }
            }
            Value::Unit
            | Value::Integer(_)
            | Value::String(_)
            | Value::EnumElement { state: None, .. }
            | Value::EnumConstructor(_) => {}
        }
    }

    /// Same traversal order as [`Value::for_each_function`], allowing the ids to be
    /// rewritten.
    pub fn for_each_function_mut(&mut self, visit: &mut impl FnMut(&mut FunctionId)) {
        match self {
            Value::FunctionPointer(id) => visit(id),
            Value::EnumElement {
                state: Some(state), ..
            } => state.for_each_function_mut(visit),
            Value::Tuple(elements) => {
                for element in elements {
                    element.for_each_function_mut(visit);
                }
            }
            Value::Unit
            | Value::Integer(_)
            | Value::String(_)
            | Value::EnumElement { state: None, .. }
            | Value::EnumConstructor(_) => {}
        }
    }
}
