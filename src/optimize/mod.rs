// Optimization passes over a checked program. Dead code elimination compacts each
// function's register space; unused function removal drops functions that the entry
// point cannot reach. optimize runs both in that order, since deleting dead literals
// can leave functions unreferenced. OptimizationOptions selects which passes run.

//! Optimization passes.

mod dead_code;
mod unused_functions;

pub use dead_code::{remove_dead_code, remove_dead_code_from_function, DeadCodeStats};
pub use unused_functions::remove_unused_functions;

use crate::ir::CheckedProgram;

/// Selects the passes [`optimize_with`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationOptions {
    pub remove_dead_code: bool,
    pub remove_unused_functions: bool,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            remove_dead_code: true,
            remove_unused_functions: true,
        }
    }
}

/// Runs every pass.
pub fn optimize(program: &mut CheckedProgram) {
    optimize_with(program, &OptimizationOptions::default());
}

pub fn optimize_with(program: &mut CheckedProgram, options: &OptimizationOptions) {
    if options.remove_dead_code {
        remove_dead_code(program);
    }
    if options.remove_unused_functions {
        remove_unused_functions(program);
    }
}
