//! Removal of functions the entry point can never reach.
//!
//! A function is reachable when function 0 is, or when a reachable function
//! materializes a pointer to it in a literal. Unreachable functions are dropped and
//! every remaining function pointer is renumbered.

use crate::core::FunctionId;
use crate::ir::CheckedProgram;
use log::debug;

/// Drops every function not reachable from function 0. Returns how many were
/// removed.
pub fn remove_unused_functions(program: &mut CheckedProgram) -> usize {
    let count = program.functions.len();
    if count == 0 {
        return 0;
    }

    let mut used = vec![false; count];
    let mut worklist: Vec<FunctionId> = vec![0];
    while let Some(id) = worklist.pop() {
        if std::mem::replace(&mut used[id as usize], true) {
            continue;
        }
        program.functions[id as usize]
            .body
            .for_each_function(&mut |callee| worklist.push(callee));
    }

    let mut new_ids: Vec<Option<FunctionId>> = vec![None; count];
    let mut next: FunctionId = 0;
    for (old, &is_used) in used.iter().enumerate() {
        if is_used {
            new_ids[old] = Some(next);
            next += 1;
        }
    }
    let removed = count - next as usize;
    if removed == 0 {
        return 0;
    }

    let functions = std::mem::take(&mut program.functions);
    program.functions = functions
        .into_iter()
        .zip(used)
        .filter_map(|(function, is_used)| is_used.then_some(function))
        .collect();
    for function in &mut program.functions {
        function.body.for_each_function_mut(&mut |id| {
            *id = match new_ids[*id as usize] {
                Some(new) => new,
                None => unreachable!("function {id} is referenced from a reachable function"),
            };
        });
    }

    debug!("removed {removed} unused functions, {next} left");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Type, Value};
    use crate::ir::{Function, Instruction, RegisterId};

    fn pointer_to(id: FunctionId) -> Instruction {
        Instruction::literal(
            RegisterId::new(0),
            Value::Tuple(vec![Value::FunctionPointer(id)]),
            Type::Tuple(vec![Type::FunctionPointer {
                parameters: vec![],
                result: Box::new(Type::Unit),
            }]),
        )
    }

    fn function(name: &str, body: Vec<Instruction>) -> Function {
        Function::new(name, 0, 1, RegisterId::new(0), body.into())
    }

    #[test]
    fn test_keeps_transitively_referenced_functions() {
        let unit = Instruction::literal(RegisterId::new(0), Value::Unit, Type::Unit);
        let mut program = CheckedProgram {
            functions: vec![
                function("main", vec![pointer_to(2)]),
                function("dead", vec![pointer_to(3)]),
                function("helper", vec![pointer_to(3)]),
                function("leaf", vec![unit]),
            ],
            ..CheckedProgram::default()
        };

        assert_eq!(remove_unused_functions(&mut program), 1);
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["main", "helper", "leaf"]);
        assert_eq!(program.functions[0].body.instructions(), &[pointer_to(1)]);
        assert_eq!(program.functions[1].body.instructions(), &[pointer_to(2)]);
    }

    #[test]
    fn test_recursive_reference_terminates() {
        let mut program = CheckedProgram {
            functions: vec![function("main", vec![pointer_to(0)])],
            ..CheckedProgram::default()
        };
        assert_eq!(remove_unused_functions(&mut program), 0);
        assert_eq!(program.functions.len(), 1);
    }
}
