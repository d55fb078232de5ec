//! End-to-end tests: textual IR through the optimizer into ECMAScript.

use tessel::ecmascript::{generate_ecmascript, generate_ecmascript_string, EncodingStrategyCache};
use tessel::optimize::optimize;
use tessel::text_ir::parse_program;

fn compile(source: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut program =
        parse_program(source).unwrap_or_else(|e| panic!("Failed to parse program: {}", e));
    optimize(&mut program);
    generate_ecmascript_string(&program).unwrap_or_else(|e| panic!("Codegen failed: {}", e))
}

#[test]
fn test_boolean_enum_compiles_to_native_booleans() {
    let script = compile(
        r#"
enum Bool { no, yes }

fn main() -> %result {
    %yes = literal Bool.yes : enum Bool
    %no = literal Bool.no : enum Bool
    %result = match %yes {
        case %no {
        } yield %no
        case %yes {
        } yield %yes
    }
}
"#,
    );
    assert!(script.contains("var r0_yes = true;"), "{script}");
    assert!(script.contains("var r1_no = false;"), "{script}");
    assert!(script.contains("if (r0_yes === r1_no)"), "{script}");
    assert!(script.contains("else if (r0_yes === r0_yes)"), "{script}");
}

#[test]
fn test_indirect_enum_wraps_payloads() {
    let script = compile(
        r#"
enum Number { small(int 0..10), big(int 5..100) }

fn main(%n) -> %out {
    %wrapped = enum_construct Number.big(%n)
    %out = match %wrapped {
        case Number.small(%s) {
        } yield %s
        case Number.big(%b) {
        } yield %b
    }
}
"#,
    );
    assert!(script.contains("var r1_wrapped = [1, r0_n];"), "{script}");
    assert!(script.contains(
        "if (((typeof r1_wrapped !== \"number\") && (r1_wrapped[0] === 0)))"
    ), "{script}");
    assert!(script.contains("var r3_s = r1_wrapped[1];"), "{script}");
    assert!(script.contains(
        "else if (((typeof r1_wrapped !== \"number\") && (r1_wrapped[0] === 1)))"
    ), "{script}");
    assert!(script.contains("r2_out = r4_b;"), "{script}");
}

#[test]
fn test_unreachable_functions_are_not_emitted() {
    let script = compile(
        r#"
fn main(%x) -> %r {
    %f = literal @helper : function(int 0..1) -> int 0..1
    %r = call %f(%x)
}
fn helper(%y) -> %y {
}
fn orphan() -> %u {
    %u = literal unit : unit
}
"#,
    );
    assert!(script.contains("var lambda_0;\n    var lambda_1;\n    lambda_0"), "{script}");
    assert!(!script.contains("lambda_2"), "{script}");
    assert!(script.contains("var r1_f = lambda_1;"), "{script}");
    assert!(script.contains("var r2_r = r1_f(r0_x);"), "{script}");
    assert!(script.ends_with("    return lambda_0;\n})\n"), "{script}");
}

#[test]
fn test_dead_registers_do_not_reach_the_output() {
    let script = compile(
        r#"
fn main(%console) -> %console {
    %log = read_struct %console.0
    %message = literal "dead" : string
    %unused = tuple(%message)
    loop {
        %g = global
        break
    }
}
"#,
    );
    assert!(!script.contains("dead"), "{script}");
    assert!(!script.contains("globals;"), "{script}");
    assert!(!script.contains("r1_log"), "{script}");
    assert!(script.contains("for (;;)\n        {\n            break;\n        }"), "{script}");
}

#[test]
fn test_empty_match_always_fails() {
    let script = compile(
        r#"
fn main(%x) -> %r {
    %r = match %x {
    }
}
"#,
    );
    assert!(
        script.contains("        var r1_r;\n        fail();\n        return r1_r;\n"),
        "{script}"
    );
}

#[test]
fn test_writes_to_any_io_sink() {
    let program = parse_program("fn main() -> %g { %g = global }")
        .unwrap_or_else(|e| panic!("Failed to parse program: {}", e));
    let mut cache = EncodingStrategyCache::new(&program.enums);
    let mut sink: Vec<u8> = Vec::new();
    generate_ecmascript(&program, &mut cache, &mut sink).unwrap();

    let text = String::from_utf8(sink).unwrap();
    assert!(text.starts_with("(function (globals)\n{\n    \"use strict\";\n"));
    assert!(text.contains("        var r0_g = globals;\n        return r0_g;\n"));
}
