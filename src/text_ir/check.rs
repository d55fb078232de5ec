//! FileCheck-style test validation for textual IR files.
//!
//! A test file is a textual IR program whose comment lines carry `RUN` and `CHECK`
//! directives. Each `RUN` line names a sequence of actions that are applied, in
//! order, to a fresh copy of the parsed program; their output is then matched
//! against the `CHECK` directives the way LLVM's FileCheck would.

use super::parse_program;
use crate::ecmascript::{generate_ecmascript_string, EncodingStrategyCache};
use crate::ir::CheckedProgram;
use crate::optimize::{optimize, remove_dead_code, remove_unused_functions};

/// A CHECK directive extracted from a test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckDirective {
    /// CHECK: pattern - Match on this or a later line
    Check(String),
    /// CHECK-LABEL: pattern - Label for a section
    CheckLabel(String),
    /// CHECK-NEXT: pattern - Match on the next line
    CheckNext(String),
    /// CHECK-NOT: pattern - Must not occur before the next positive match
    CheckNot(String),
    /// CHECK-EMPTY - Match empty line
    CheckEmpty,
    /// COM: comment - Comment, ignored
    Comment(String),
}

/// A RUN directive specifying how to execute the test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirective {
    pub command: String,
    pub args: Vec<String>,
}

/// Test specification extracted from a test file
#[derive(Debug)]
pub struct TestSpec {
    pub run_directives: Vec<RunDirective>,
    pub check_directives: Vec<CheckDirective>,
    pub program_text: String,
}

impl TestSpec {
    /// Splits a test file into directives and program text.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut run_directives = Vec::new();
        let mut check_directives = Vec::new();
        let mut program_lines = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if let Some(command) = trimmed.strip_prefix("; RUN:") {
                let mut parts = command.split_whitespace();
                let Some(command) = parts.next() else {
                    return Err(format!("line {}: RUN directive without a command", number + 1));
                };
                run_directives.push(RunDirective {
                    command: command.to_string(),
                    args: parts.map(str::to_string).collect(),
                });
            } else if let Some(pattern) = trimmed.strip_prefix("; CHECK-LABEL:") {
                check_directives.push(CheckDirective::CheckLabel(pattern.trim().to_string()));
            } else if let Some(pattern) = trimmed.strip_prefix("; CHECK-NEXT:") {
                check_directives.push(CheckDirective::CheckNext(pattern.trim().to_string()));
            } else if let Some(pattern) = trimmed.strip_prefix("; CHECK-NOT:") {
                check_directives.push(CheckDirective::CheckNot(pattern.trim().to_string()));
            } else if trimmed.starts_with("; CHECK-EMPTY") {
                check_directives.push(CheckDirective::CheckEmpty);
            } else if let Some(pattern) = trimmed.strip_prefix("; CHECK:") {
                check_directives.push(CheckDirective::Check(pattern.trim().to_string()));
            } else if let Some(comment) = trimmed.strip_prefix("; COM:") {
                check_directives.push(CheckDirective::Comment(comment.trim().to_string()));
            } else {
                program_lines.push(line);
            }
        }

        Ok(TestSpec {
            run_directives,
            check_directives,
            program_text: program_lines.join("\n"),
        })
    }
}

/// Test runner that executes textual IR tests
pub struct TestRunner {
    verbose: bool,
}

impl TestRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run a test and validate the output of every RUN directive
    pub fn run_test(&self, spec: &TestSpec) -> Result<(), String> {
        let program = parse_program(&spec.program_text).map_err(|e| e.to_string())?;

        for run in &spec.run_directives {
            let output = self.execute_command(program.clone(), run)?;
            if self.verbose {
                println!("Output of {} {}:\n{}", run.command, run.args.join(" "), output);
            }
            self.validate_output(&output, &spec.check_directives)?;
        }

        Ok(())
    }

    /// Apply the RUN directive's actions in order and collect what they print
    fn execute_command(
        &self,
        mut program: CheckedProgram,
        run: &RunDirective,
    ) -> Result<String, String> {
        let mut output = Vec::new();

        for arg in &run.args {
            match arg.as_str() {
                "--dce" => remove_dead_code(&mut program),
                "--remove-unused-functions" => {
                    remove_unused_functions(&mut program);
                }
                "--optimize" => optimize(&mut program),
                "--print-ir" => {
                    output.push("Printing IR".to_string());
                    output.push(program.to_string());
                }
                "--emit-ecmascript" => {
                    let text = generate_ecmascript_string(&program).map_err(|e| e.to_string())?;
                    output.push(text);
                }
                "--print-encoding" => print_encoding(&program, &mut output),
                // Input placeholders such as %s
                other if other.starts_with('%') => {}
                other => return Err(format!("unknown RUN argument '{other}'")),
            }
        }

        Ok(output.join("\n"))
    }

    /// Validate output against CHECK directives
    pub fn validate_output(
        &self,
        output: &str,
        directives: &[CheckDirective],
    ) -> Result<(), String> {
        let output_lines: Vec<&str> = output.lines().collect();
        let mut line_idx = 0;
        let mut pending_not: Vec<&str> = Vec::new();

        for directive in directives {
            match directive {
                CheckDirective::Comment(_) => continue,

                CheckDirective::CheckNot(pattern) => pending_not.push(pattern.as_str()),

                CheckDirective::Check(pattern) | CheckDirective::CheckLabel(pattern) => {
                    let name = match directive {
                        CheckDirective::CheckLabel(_) => "CHECK-LABEL",
                        _ => "CHECK",
                    };
                    let found = output_lines[line_idx..]
                        .iter()
                        .position(|line| line.contains(pattern.as_str()));

                    match found {
                        Some(idx) => {
                            check_absent(&output_lines[line_idx..line_idx + idx], &pending_not)?;
                            pending_not.clear();
                            line_idx += idx + 1;
                            if self.verbose {
                                println!("{name}: '{pattern}' found at line {}", line_idx - 1);
                            }
                        }
                        None => {
                            return Err(format!("{name}: pattern '{pattern}' not found in output"));
                        }
                    }
                }

                CheckDirective::CheckNext(pattern) => {
                    let Some(line) = output_lines.get(line_idx) else {
                        return Err(format!("CHECK-NEXT: no more lines, expected '{pattern}'"));
                    };
                    if !line.contains(pattern.as_str()) {
                        return Err(format!("CHECK-NEXT: expected '{pattern}' but got '{line}'"));
                    }
                    pending_not.clear();

                    if self.verbose {
                        println!("CHECK-NEXT: '{pattern}' matches at line {line_idx}");
                    }
                    line_idx += 1;
                }

                CheckDirective::CheckEmpty => {
                    let Some(line) = output_lines.get(line_idx) else {
                        continue; // End of output counts as empty
                    };
                    if !line.trim().is_empty() {
                        return Err(format!("CHECK-EMPTY: expected empty line but got '{line}'"));
                    }

                    if self.verbose {
                        println!("CHECK-EMPTY: matches at line {line_idx}");
                    }
                    line_idx += 1;
                }
            }
        }

        let rest = output_lines.get(line_idx..).unwrap_or_default();
        check_absent(rest, &pending_not)
    }
}

fn check_absent(lines: &[&str], patterns: &[&str]) -> Result<(), String> {
    for pattern in patterns {
        if let Some(line) = lines.iter().find(|line| line.contains(*pattern)) {
            return Err(format!("CHECK-NOT: pattern '{pattern}' found in '{line}'"));
        }
    }
    Ok(())
}

/// One `Encoding <enum>` block per enum, one line per element.
fn print_encoding(program: &CheckedProgram, output: &mut Vec<String>) {
    let mut cache = EncodingStrategyCache::new(&program.enums);
    for (id, enumeration) in program.enums.iter().enumerate() {
        output.push(format!("Encoding {}", enumeration.name));
        let strategy = cache.require(id as u32);
        for (element, encoding) in enumeration.elements.iter().zip(strategy.elements()) {
            output.push(format!("{}: {encoding}", element.name));
        }
        output.push("End Encoding".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let content = r#"; RUN: %tessel --print-ir %s
; CHECK: Printing IR
; CHECK-LABEL: fn main
; CHECK-NEXT: %1 = global
; CHECK-NOT: call
; COM: This is a comment
fn main() -> %1 {
    %1 = global
}"#;

        let spec = TestSpec::parse(content).unwrap();
        assert_eq!(spec.run_directives.len(), 1);
        assert_eq!(spec.run_directives[0].args, vec!["--print-ir", "%s"]);
        assert_eq!(spec.check_directives.len(), 5);
        assert!(spec.program_text.contains("fn main()"));
    }

    #[test]
    fn test_check_matching() {
        let runner = TestRunner::new(false);
        let output = "Printing IR\nfn test() -> %0 {\n    %0 = global\n}\n";

        let directives = vec![
            CheckDirective::Check("Printing IR".to_string()),
            CheckDirective::CheckLabel("fn test".to_string()),
            CheckDirective::CheckNext("global".to_string()),
        ];

        runner.validate_output(output, &directives).unwrap();
    }

    #[test]
    fn test_check_next_failure() {
        let runner = TestRunner::new(false);
        let output = "Line 1\nLine 2\nLine 3\n";

        let directives = vec![
            CheckDirective::Check("Line 1".to_string()),
            CheckDirective::CheckNext("Line 3".to_string()),
        ];

        let result = runner.validate_output(output, &directives);
        assert!(result.unwrap_err().contains("CHECK-NEXT"));
    }

    #[test]
    fn test_check_not_is_scoped_to_the_next_match() {
        let runner = TestRunner::new(false);
        let output = "a\nb\nc\n";

        let before = vec![
            CheckDirective::CheckNot("c".to_string()),
            CheckDirective::Check("b".to_string()),
        ];
        runner.validate_output(output, &before).unwrap();

        let trailing = vec![
            CheckDirective::Check("a".to_string()),
            CheckDirective::CheckNot("c".to_string()),
        ];
        assert!(runner
            .validate_output(output, &trailing)
            .unwrap_err()
            .contains("CHECK-NOT"));
    }

    #[test]
    fn test_run_actions_apply_in_order() {
        let content = r#"; RUN: %tessel --print-ir --dce --print-ir
; CHECK: Printing IR
; CHECK: %dead = global
; CHECK: Printing IR
; CHECK-NOT: %dead
; CHECK: fn main
fn main(%x) -> %x {
    %dead = global
}"#;
        let spec = TestSpec::parse(content).unwrap();
        TestRunner::new(false).run_test(&spec).unwrap();
    }

    #[test]
    fn test_print_encoding() {
        let program = parse_program("enum Option { none, some(int 0..10) }").unwrap();
        let mut output = Vec::new();
        print_encoding(&program, &mut output);
        assert_eq!(
            output,
            vec![
                "Encoding Option",
                "none: stateless undefined",
                "some: direct {int 0..10}",
                "End Encoding",
            ]
        );
    }
}
