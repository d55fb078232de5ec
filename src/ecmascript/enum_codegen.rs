//! ECMAScript expressions for constructing and inspecting encoded enum values.
//!
//! Each function writes a single expression. `subject` and `payload` are
//! expressions themselves and are evaluated more than once by case checks, so
//! callers pass plain identifiers.

use super::encoding::{EncodingElement, StatefulEncoding};
use super::value_set::ValueSet;
use std::fmt::{self, Write};

/// Writes the value of `element` holding `payload`. For stateless elements
/// `payload` is ignored.
pub fn write_construct<W: Write>(
    out: &mut W,
    element: &EncodingElement,
    payload: &str,
) -> fmt::Result {
    match element {
        EncodingElement::Stateless(tag) => write!(out, "{tag}"),
        EncodingElement::Stateful(StatefulEncoding::Direct(_)) => out.write_str(payload),
        EncodingElement::Stateful(StatefulEncoding::Indirect(tag)) => {
            write!(out, "[{tag}, {payload}]")
        }
    }
}

/// Writes a function that wraps its argument into `element`.
pub fn write_constructor_function<W: Write>(out: &mut W, element: &EncodingElement) -> fmt::Result {
    out.write_str("function (state) { return ")?;
    write_construct(out, element, "state")?;
    out.write_str("; }")
}

/// Writes a boolean expression that is true when `subject` is a value of
/// `element`.
pub fn write_case_check<W: Write>(
    out: &mut W,
    element: &EncodingElement,
    subject: &str,
) -> fmt::Result {
    match element {
        EncodingElement::Stateless(tag) => write!(out, "({subject} === {tag})"),
        EncodingElement::Stateful(StatefulEncoding::Direct(payload)) => {
            write_value_set_check(out, payload, subject)
        }
        EncodingElement::Stateful(StatefulEncoding::Indirect(tag)) => write!(
            out,
            "((typeof {subject} !== \"number\") && ({subject}[0] === {tag}))"
        ),
    }
}

/// Writes the payload of `subject`, which must be a value of `element`.
pub fn write_get_state<W: Write>(
    out: &mut W,
    element: &EncodingElement,
    subject: &str,
) -> fmt::Result {
    match element {
        EncodingElement::Stateless(_) => out.write_str("undefined"),
        EncodingElement::Stateful(StatefulEncoding::Direct(_)) => out.write_str(subject),
        EncodingElement::Stateful(StatefulEncoding::Indirect(_)) => write!(out, "{subject}[1]"),
    }
}

/// Writes a boolean expression that is true when `subject` lies in `set`.
pub fn write_value_set_check<W: Write>(out: &mut W, set: &ValueSet, subject: &str) -> fmt::Result {
    let s = subject;
    let mut tests = Vec::new();
    if let (Some(first), Some(last)) = (set.integer.first(), set.integer.last()) {
        if first == last {
            tests.push(format!("({s} === {first})"));
        } else {
            tests.push(format!(
                "((typeof {s} === \"number\") && ({s} >= {first}) && ({s} <= {last}))"
            ));
        }
    }
    if set.undefined {
        tests.push(format!("({s} === undefined)"));
    }
    if set.null {
        tests.push(format!("({s} === null)"));
    }
    if set.string {
        tests.push(format!("(typeof {s} === \"string\")"));
    }
    if set.array {
        tests.push(format!("Array.isArray({s})"));
    }
    if set.object {
        tests.push(format!(
            "((typeof {s} === \"object\") && ({s} !== null) && !Array.isArray({s}))"
        ));
    }
    if set.function {
        tests.push(format!("(typeof {s} === \"function\")"));
    }
    if set.bool_true {
        tests.push(format!("({s} === true)"));
    }
    if set.bool_false {
        tests.push(format!("({s} === false)"));
    }

    match tests.len() {
        0 => out.write_str("false"),
        1 => out.write_str(&tests[0]),
        _ => write!(out, "({})", tests.join(" || ")),
    }
}
