//! Dead code elimination tests over programs written in textual IR.

use std::collections::BTreeSet;
use tessel::ir::{CheckedProgram, Function, Instruction, InstructionSequence, MatchCaseKind};
use tessel::optimize::{remove_dead_code, remove_dead_code_from_function};
use tessel::text_ir::parse_program;

fn parse(source: &str) -> CheckedProgram {
    parse_program(source).unwrap_or_else(|e| panic!("Failed to parse program: {}", e))
}

/// Registers defined anywhere in `sequence`, including match case bindings.
fn collect_definitions(sequence: &InstructionSequence, defined: &mut Vec<u32>) {
    for instruction in sequence {
        if let Some(result) = instruction.result() {
            defined.push(result.0);
        }
        match instruction {
            Instruction::Match(match_) => {
                for case in &match_.cases {
                    if let MatchCaseKind::StatefulEnum { state_into, .. } = case.kind {
                        defined.push(state_into.0);
                    }
                    collect_definitions(&case.action, defined);
                }
            }
            Instruction::Loop(body) => collect_definitions(body, defined),
            _ => {}
        }
    }
}

fn count_calls(sequence: &InstructionSequence) -> usize {
    sequence
        .iter()
        .map(|instruction| match instruction {
            Instruction::Call(_) => 1,
            Instruction::Match(match_) => match_.cases.iter().map(|c| count_calls(&c.action)).sum(),
            Instruction::Loop(body) => count_calls(body),
            _ => 0,
        })
        .sum()
}

fn check_operands(sequence: &InstructionSequence, count: u32) {
    for instruction in sequence {
        instruction.for_each_operand(|operand| {
            assert!(operand.0 < count, "operand {operand} out of range ({count} registers)")
        });
        match instruction {
            Instruction::Match(match_) => {
                for case in &match_.cases {
                    check_operands(&case.action, count);
                }
            }
            Instruction::Loop(body) => check_operands(body, count),
            _ => {}
        }
    }
}

/// Every register in `0..number_of_registers` is defined exactly once, and nothing else is.
fn assert_compact(function: &Function) {
    let mut defined: Vec<u32> = (0..function.parameter_count).collect();
    collect_definitions(&function.body, &mut defined);
    let unique: BTreeSet<u32> = defined.iter().copied().collect();
    assert_eq!(unique.len(), defined.len(), "a register is defined twice");
    let expected: BTreeSet<u32> = (0..function.number_of_registers).collect();
    assert_eq!(unique, expected, "register space of {} has gaps", function.name);
    assert_eq!(
        function.register_names.len(),
        function.number_of_registers as usize
    );
    assert!(function.return_value.0 < function.number_of_registers);
    check_operands(&function.body, function.number_of_registers);
}

const PROGRAMS: &[&str] = &[
    r#"
fn main() -> %2 {
    %0 = literal @main : function() -> unit
    %1 = literal 1 : int 0..1
    %2 = call %0(%0)
    %3 = literal 2 : int 0..2
}
"#,
    r#"
fn main(%x) -> %x {
    %a = literal 1 : int 0..1
    %b = tuple(%a)
    %c = tuple(%b, %x)
    %f = global
    %r = call %f(%x)
}
"#,
    r#"
enum Option { none, some(int 0..10) }

fn main(%input) -> %out {
    %none = literal Option.none : enum Option
    %some = enum_construct Option.some(%input)
    %unused = tuple(%input)
    %out = match %some {
        case Option.some(%payload) {
            %dead = tuple(%payload)
        } yield %payload
        case %none {
            loop {
                %also_dead = global
            }
        }
    }
}
"#,
    r#"
struct Console { log: function(string) -> unit }

fn main(%console) -> %console {
    %log = read_struct %console.0
    %text = literal "hello" : string
    %ignored = read_struct %console.0
    loop {
        %done = call %log(%text)
        %counter = tuple(%done)
        break
    }
}
"#,
];

#[test]
fn test_calls_survive_and_operands_stay_in_range() {
    for source in PROGRAMS {
        let mut program = parse(source);
        let calls_before: Vec<usize> =
            program.functions.iter().map(|f| count_calls(&f.body)).collect();

        remove_dead_code(&mut program);

        for (function, calls) in program.functions.iter().zip(calls_before) {
            assert_eq!(count_calls(&function.body), calls, "a call was removed");
            assert_compact(function);
        }
    }
}

#[test]
fn test_second_run_is_a_no_op() {
    for source in PROGRAMS {
        let mut program = parse(source);
        remove_dead_code(&mut program);
        let once = program.clone();

        for function in &mut program.functions {
            let stats = remove_dead_code_from_function(function);
            assert_eq!(stats.layers, 1);
            assert_eq!(stats.registers_removed, 0);
            assert_eq!(stats.instructions_removed, 0);
        }
        assert_eq!(program, once);
    }
}

#[test]
fn test_unread_literals_around_a_call() {
    let mut program = parse(PROGRAMS[0]);
    let stats = remove_dead_code_from_function(&mut program.functions[0]);

    assert_eq!(stats.layers, 2);
    assert_eq!(stats.registers_removed, 2);
    assert_eq!(stats.instructions_removed, 2);
    assert_eq!(
        program.to_string(),
        "fn main() -> %1 {\n    %0 = literal @main : function() -> unit\n    %1 = call %0(%0)\n}\n"
    );
}

#[test]
fn test_chain_takes_one_layer_per_link() {
    let mut program = parse(PROGRAMS[1]);
    let stats = remove_dead_code_from_function(&mut program.functions[0]);

    assert_eq!(stats.layers, 4);
    assert_eq!(stats.registers_removed, 3);
    assert_eq!(
        program.to_string(),
        "fn main(%x) -> %x {\n    %f = global\n    %r = call %f(%x)\n}\n"
    );
}

#[test]
fn test_match_keeps_bindings_and_drops_empty_loops() {
    let mut program = parse(PROGRAMS[2]);
    remove_dead_code(&mut program);

    let expected = "enum Option {
    none,
    some(int 0..10),
}

fn main(%input) -> %out {
    %none = literal Option.none : enum Option
    %some = enum_construct Option.some(%input)
    %out = match %some {
        case Option.some(%payload) {
        } yield %payload
        case %none {
        }
    }
}
";
    assert_eq!(program.to_string(), expected);
    assert_eq!(program.functions[0].number_of_registers, 5);
}

#[test]
fn test_unread_enum_construct_and_its_payload_are_removed() {
    let mut program = parse(
        r#"
enum Option { none, some(int 0..10) }
fn main(%x) -> %x {
    %one = literal 1 : int 0..10
    %wrapped = enum_construct Option.some(%one)
}
"#,
    );
    let stats = remove_dead_code_from_function(&mut program.functions[0]);

    // The construct dies first, which leaves the literal unread for the next layer.
    assert_eq!(stats.layers, 3);
    assert_eq!(stats.registers_removed, 2);
    assert_eq!(stats.instructions_removed, 2);
    let main = &program.functions[0];
    assert!(main.body.is_empty());
    assert_eq!(main.number_of_registers, 1);
    let printed = program.to_string();
    assert!(printed.ends_with("fn main(%x) -> %x {\n}\n"), "{printed}");
    assert!(!printed.contains("enum_construct"), "{printed}");
    assert!(!printed.contains("%one"), "{printed}");
}

#[test]
fn test_loop_with_call_survives() {
    let mut program = parse(PROGRAMS[3]);
    remove_dead_code(&mut program);

    let main = &program.functions[0];
    assert_eq!(main.number_of_registers, 4);
    let printed = program.to_string();
    let kept_loop = "    loop {\n        %done = call %log(%text)\n        break\n    }\n";
    assert!(printed.contains(kept_loop), "{printed}");
    assert!(!printed.contains("%ignored"));
    assert!(!printed.contains("%counter"));
}
