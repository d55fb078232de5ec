//! FileCheck-style tests for textual IR files
//!
//! Each file under tests/filetest carries its own RUN and CHECK directives.

use std::fs;
use std::path::Path;
use tessel::text_ir::{TestRunner, TestSpec};

/// Test helper that runs a textual IR file through FileCheck validation
fn run_filecheck_test(file: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/filetest")
        .join(file);
    let contents = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    let spec = TestSpec::parse(&contents)
        .unwrap_or_else(|e| panic!("Failed to parse test spec from {}: {}", file, e));
    assert!(!spec.run_directives.is_empty(), "{} has no RUN line", file);

    let runner = TestRunner::new(false);
    runner
        .run_test(&spec)
        .unwrap_or_else(|e| panic!("Test {} failed: {}", file, e));
}

#[test]
fn test_dce_chain_filecheck() {
    run_filecheck_test("dce_chain.tir");
}

#[test]
fn test_encoding_filecheck() {
    run_filecheck_test("encoding.tir");
}

#[test]
fn test_ecmascript_filecheck() {
    run_filecheck_test("ecmascript.tir");
}

#[test]
fn test_unused_functions_filecheck() {
    run_filecheck_test("unused_functions.tir");
}

#[test]
fn test_invalid_program_is_reported() {
    let spec = TestSpec::parse(
        concat!(
            "; RUN: %tessel --print-ir %s\n; CHECK: Printing IR\n",
            "fn main() -> %x {\n    %x = global\n    break\n}\n",
        ),
    )
    .unwrap();
    let error = TestRunner::new(false).run_test(&spec).unwrap_err();
    assert_eq!(error, "main: break outside of a loop");
}

#[test]
fn test_failed_check_is_reported() {
    let spec = TestSpec::parse(
        "; RUN: %tessel --print-ir\n; CHECK: %y = global\nfn main() -> %x {\n    %x = global\n}\n",
    )
    .unwrap();
    let error = TestRunner::new(false).run_test(&spec).unwrap_err();
    assert!(error.contains("'%y = global' not found"), "{error}");
}
