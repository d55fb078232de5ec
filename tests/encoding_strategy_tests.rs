//! Encoding strategy cache and value-set tests.

use tessel::core::{Enumeration, EnumerationElement, Type};
use tessel::ecmascript::{
    value_set_of, EcmascriptValue, EncodingElement, EncodingStrategyCache, SafeIntegerRange,
    StatefulEncoding, ValueSet, MAX_SAFE_INTEGER,
};

fn stateless(name: &str) -> EnumerationElement {
    EnumerationElement::stateless(name)
}

fn stateful(name: &str, state: Type) -> EnumerationElement {
    EnumerationElement::stateful(name, state)
}

fn direct_range(first: u64, last: u64) -> EncodingElement {
    EncodingElement::Stateful(StatefulEncoding::Direct(ValueSet::integer_range(
        SafeIntegerRange::new(first, last),
    )))
}

#[test]
fn test_disjoint_payload_and_stateless_element() {
    let enums = [Enumeration::new(
        "E",
        vec![stateful("a", Type::integer(0, 10)), stateless("b")],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[
        direct_range(0, 10),
        EncodingElement::Stateless(EcmascriptValue::Undefined),
    ]);
    assert_eq!(value_set_of(strategy).to_string(), "{int 0..10, undefined}");
}

#[test]
fn test_overlapping_payloads_are_wrapped() {
    let enums = [Enumeration::new(
        "E",
        vec![
            stateful("a", Type::integer(0, 10)),
            stateful("b", Type::integer(5, 15)),
        ],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[
        EncodingElement::Stateful(StatefulEncoding::Indirect(0)),
        EncodingElement::Stateful(StatefulEncoding::Indirect(1)),
    ]);
    assert_eq!(value_set_of(strategy), ValueSet::array());
}

#[test]
fn test_touching_payload_ranges_are_wrapped() {
    let enums = [Enumeration::new(
        "E",
        vec![
            stateful("a", Type::integer(0, 10)),
            stateful("b", Type::integer(11, 20)),
        ],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[
        EncodingElement::Stateful(StatefulEncoding::Indirect(0)),
        EncodingElement::Stateful(StatefulEncoding::Indirect(1)),
    ]);
    assert_eq!(value_set_of(strategy), ValueSet::array());
}

#[test]
fn test_payload_ranges_one_apart_are_direct() {
    let enums = [Enumeration::new(
        "E",
        vec![
            stateful("a", Type::integer(0, 10)),
            stateful("b", Type::integer(12, 20)),
        ],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[direct_range(0, 10), direct_range(12, 20)]);
    assert_eq!(value_set_of(strategy).to_string(), "{int 0..20}");
}

#[test]
fn test_two_stateless_elements_are_native_booleans() {
    let enums = [Enumeration::new("Bool", vec![stateless("false"), stateless("true")])];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[
        EncodingElement::Stateless(EcmascriptValue::Boolean(false)),
        EncodingElement::Stateless(EcmascriptValue::Boolean(true)),
    ]);
    assert_eq!(value_set_of(strategy), ValueSet::any_boolean());
}

#[test]
fn test_payloads_of_different_categories_stay_direct() {
    let enums = [Enumeration::new(
        "Json",
        vec![
            stateful("text", Type::String),
            stateful("number", Type::integer(0, 100)),
            stateful("list", Type::Tuple(vec![Type::String])),
            stateless("nothing"),
        ],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(
        strategy.element(0),
        &EncodingElement::Stateful(StatefulEncoding::Direct(ValueSet::string()))
    );
    assert_eq!(strategy.element(1), &direct_range(0, 100));
    assert_eq!(
        strategy.element(2),
        &EncodingElement::Stateful(StatefulEncoding::Direct(ValueSet::array()))
    );
    assert_eq!(
        strategy.element(3),
        &EncodingElement::Stateless(EcmascriptValue::Undefined)
    );
}

#[test]
fn test_host_payload_leaves_no_room() {
    let enums = [Enumeration::new(
        "Dynamic",
        vec![stateful("host", Type::HostValue), stateless("none")],
    )];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(0);

    assert_eq!(strategy.elements(), &[
        EncodingElement::Stateful(StatefulEncoding::Indirect(0)),
        EncodingElement::Stateless(EcmascriptValue::Integer(1)),
    ]);
}

#[test]
fn test_nested_enum_payload_uses_inner_encoding() {
    let enums = [
        Enumeration::new("Bool", vec![stateless("no"), stateless("yes")]),
        Enumeration::new(
            "Maybe",
            vec![stateful("just", Type::Enumeration(0)), stateless("nothing")],
        ),
    ];
    let mut cache = EncodingStrategyCache::new(&enums);
    let strategy = cache.require(1);

    assert_eq!(strategy.elements(), &[
        EncodingElement::Stateful(StatefulEncoding::Direct(ValueSet::any_boolean())),
        EncodingElement::Stateless(EcmascriptValue::Undefined),
    ]);
}

#[test]
fn test_every_element_gets_an_encoding() {
    let enums = [
        Enumeration::new("One", vec![stateless("only")]),
        Enumeration::new("Three", vec![stateless("a"), stateless("b"), stateless("c")]),
        Enumeration::new("Unit", vec![stateful("u", Type::Unit), stateless("n")]),
        Enumeration::new(
            "Big",
            vec![stateful("huge", Type::integer(0, u64::MAX)), stateless("small")],
        ),
        Enumeration::new(
            "Mixed",
            vec![
                stateless("first"),
                stateful("f", Type::FunctionPointer {
                    parameters: vec![],
                    result: Box::new(Type::Unit),
                }),
                stateful("i", Type::Interface(0)),
                stateless("last"),
            ],
        ),
    ];
    let mut cache = EncodingStrategyCache::new(&enums);
    for (id, enumeration) in enums.iter().enumerate() {
        let strategy = cache.require(id as u32);
        assert_eq!(strategy.len(), enumeration.elements.len(), "{}", enumeration.name);
        assert!(!value_set_of(strategy).is_empty(), "{}", enumeration.name);
    }
}

#[test]
fn test_integer_types_clamp_to_safe_integers() {
    let enums: [Enumeration; 0] = [];
    let mut cache = EncodingStrategyCache::new(&enums);
    let set = cache.value_set_of_type(&Type::integer(10, u64::MAX));
    assert_eq!(set.integer.first(), Some(10));
    assert_eq!(set.integer.last(), Some(MAX_SAFE_INTEGER));
}

#[test]
fn test_merge_collision_is_symmetric() {
    let ranges = [
        SafeIntegerRange::empty(),
        SafeIntegerRange::new(0, 0),
        SafeIntegerRange::new(0, 10),
        SafeIntegerRange::new(5, 15),
        SafeIntegerRange::new(11, 20),
        SafeIntegerRange::new(100, 200),
    ];
    for a in ranges {
        for b in ranges {
            let mut ab = a;
            let mut ba = b;
            assert_eq!(
                ab.merge_without_intersection(b),
                ba.merge_without_intersection(a),
                "{a:?} / {b:?}"
            );
        }
    }

    let sets = [
        ValueSet::undefined(),
        ValueSet::string().union(&ValueSet::undefined()),
        ValueSet::integer_range(SafeIntegerRange::new(0, 3)),
        ValueSet::anything(),
    ];
    for a in sets {
        for b in sets {
            assert_eq!(
                { a }.merge_without_intersection(&b),
                { b }.merge_without_intersection(&a)
            );
        }
    }
}
