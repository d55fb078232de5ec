// This module implements dead code elimination over the instruction IR. A single
// layer computes which registers are read anywhere in the function (parameters and
// the return value count as read; calls also keep their own result alive), assigns
// dense new ids to the live registers in increasing order, and rebuilds every
// instruction sequence through that renumbering, dropping producers whose result
// died. Removing one producer can leave the registers it read unused, so layers
// repeat until one removes nothing. The per-layer liveness and renumbering arrays
// are allocated from a bumpalo arena that is reset between layers.

//! Fixpoint dead code elimination with register compaction.

use crate::ir::{
    CallInstruction, CheckedProgram, EnumConstructInstruction, Function, Instruction,
    InstructionSequence, LiteralInstruction, MatchCase, MatchCaseKind, MatchInstruction,
    ReadStructInstruction, RegisterId, TupleInstruction,
};
use bumpalo::Bump;
use log::{debug, trace};
use std::fmt;

/// What one run of dead code elimination did to a function.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeadCodeStats {
    /// Layers executed, including the final one that removed nothing.
    pub layers: usize,
    pub registers_removed: usize,
    pub instructions_removed: usize,
}

impl fmt::Display for DeadCodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layers, {} registers and {} instructions removed",
            self.layers, self.registers_removed, self.instructions_removed
        )
    }
}

/// Removes dead registers from every function of `program`.
///
/// Running it a second time changes nothing.
pub fn remove_dead_code(program: &mut CheckedProgram) {
    let mut arena = Bump::new();
    for function in &mut program.functions {
        let stats = remove_dead_code_with_arena(function, &mut arena);
        debug!("{}: {}", function.name, stats);
    }
}

/// Removes dead registers from one function.
pub fn remove_dead_code_from_function(function: &mut Function) -> DeadCodeStats {
    let mut arena = Bump::new();
    remove_dead_code_with_arena(function, &mut arena)
}

fn remove_dead_code_with_arena(function: &mut Function, arena: &mut Bump) -> DeadCodeStats {
    let mut stats = DeadCodeStats::default();
    let instructions_before = function.body.total_instructions();
    loop {
        let removed = remove_one_layer(function, arena);
        arena.reset();
        stats.layers += 1;
        if removed == 0 {
            break;
        }
        trace!(
            "{}: layer {} removed {} registers, {} left",
            function.name,
            stats.layers,
            removed,
            function.number_of_registers
        );
        stats.registers_removed += removed;
    }
    stats.instructions_removed = instructions_before - function.body.total_instructions();
    stats
}

/// Runs one liveness scan and rewrite. Returns the number of registers removed.
fn remove_one_layer(function: &mut Function, arena: &Bump) -> usize {
    let count = function.number_of_registers as usize;

    let read = arena.alloc_slice_fill_copy(count, false);
    read[..function.parameter_count as usize].fill(true);
    read[function.return_value.index()] = true;
    mark_used_registers(&function.body, read);

    let new_ids = arena.alloc_slice_fill_copy(count, None::<RegisterId>);
    let mut live = 0u32;
    for (old, &is_read) in read.iter().enumerate() {
        if is_read {
            new_ids[old] = Some(RegisterId::new(live));
            live += 1;
        }
    }

    let plan = Renumbering { new_ids };
    function.body = plan.sequence(std::mem::take(&mut function.body));
    function.return_value = plan.operand(function.return_value);
    let names = std::mem::take(&mut function.register_names);
    function.register_names = names
        .into_iter()
        .zip(read.iter())
        .filter_map(|(name, &is_read)| is_read.then_some(name))
        .collect();
    function.number_of_registers = live;

    count - live as usize
}

/// Marks every register read by `sequence`, scanning backward and recursing into
/// nested sequences.
fn mark_used_registers(sequence: &InstructionSequence, read: &mut [bool]) {
    for instruction in sequence.iter().rev() {
        instruction.for_each_operand(|register| read[register.index()] = true);
        match instruction {
            Instruction::Call(call) => read[call.result.index()] = true,
            Instruction::Match(match_) => {
                read[match_.result.index()] = true;
                for case in &match_.cases {
                    if let MatchCaseKind::StatefulEnum { state_into, .. } = case.kind {
                        read[state_into.index()] = true;
                    }
                    mark_used_registers(&case.action, read);
                }
            }
            Instruction::Loop(body) => mark_used_registers(body, read),
            Instruction::Literal(_)
            | Instruction::Tuple(_)
            | Instruction::ReadStruct(_)
            | Instruction::EnumConstruct(_)
            | Instruction::Global(_)
            | Instruction::Break => {}
        }
    }
}

/// Old register id to new register id; `None` for dead registers.
struct Renumbering<'a> {
    new_ids: &'a [Option<RegisterId>],
}

impl Renumbering<'_> {
    fn get(&self, register: RegisterId) -> Option<RegisterId> {
        self.new_ids[register.index()]
    }

    /// Remaps a register the liveness scan marked as read.
    fn operand(&self, register: RegisterId) -> RegisterId {
        match self.get(register) {
            Some(new) => new,
            None => unreachable!("register {register} is read but was not marked live"),
        }
    }

    fn operands(&self, registers: Vec<RegisterId>) -> Vec<RegisterId> {
        registers.into_iter().map(|register| self.operand(register)).collect()
    }

    fn sequence(&self, sequence: InstructionSequence) -> InstructionSequence {
        sequence
            .instructions
            .into_iter()
            .filter_map(|instruction| self.instruction(instruction))
            .collect()
    }

    /// Rewrites one instruction, or returns `None` when it is dropped.
    fn instruction(&self, instruction: Instruction) -> Option<Instruction> {
        match instruction {
            Instruction::Call(call) => Some(Instruction::Call(CallInstruction {
                callee: self.operand(call.callee),
                arguments: self.operands(call.arguments),
                result: self.operand(call.result),
            })),
            Instruction::Literal(literal) => {
                let into = self.get(literal.into)?;
                Some(Instruction::Literal(LiteralInstruction { into, ..literal }))
            }
            Instruction::Tuple(tuple) => {
                let result = self.get(tuple.result)?;
                Some(Instruction::Tuple(TupleInstruction {
                    elements: self.operands(tuple.elements),
                    result,
                }))
            }
            Instruction::ReadStruct(read) => {
                let into = self.get(read.into)?;
                Some(Instruction::ReadStruct(ReadStructInstruction {
                    from_object: self.operand(read.from_object),
                    member: read.member,
                    into,
                }))
            }
            Instruction::EnumConstruct(construct) => {
                let into = self.get(construct.into)?;
                Some(Instruction::EnumConstruct(EnumConstructInstruction {
                    into,
                    state: self.operand(construct.state),
                    ..construct
                }))
            }
            Instruction::Global(into) => self.get(into).map(Instruction::Global),
            Instruction::Match(match_) => Some(Instruction::Match(MatchInstruction {
                key: self.operand(match_.key),
                cases: match_
                    .cases
                    .into_iter()
                    .map(|case| self.case(case))
                    .collect(),
                result: self.operand(match_.result),
            })),
            Instruction::Loop(body) => {
                let body = self.sequence(body);
                (!body.is_empty()).then_some(Instruction::Loop(body))
            }
            Instruction::Break => Some(Instruction::Break),
        }
    }

    fn case(&self, case: MatchCase) -> MatchCase {
        let kind = match case.kind {
            MatchCaseKind::Value(key) => MatchCaseKind::Value(self.operand(key)),
            MatchCaseKind::StatefulEnum {
                element,
                state_into,
            } => MatchCaseKind::StatefulEnum {
                element,
                state_into: self.operand(state_into),
            },
        };
        MatchCase {
            kind,
            action: self.sequence(case.action),
            value: case.value.map(|value| self.operand(value)),
        }
    }
}
