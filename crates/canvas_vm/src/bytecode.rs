//! The flat program representation produced by the trace builder and
//! consumed by both the interpreter and the assembly emitter: one linear
//! instruction stream, no tree, no position map, no debug side table.

use serde::{Deserialize, Serialize};

use crate::ops::Op;

/// A single instruction. `imm` carries the literal for `Push`; every other
/// opcode ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    pub imm: Option<i32>,
}

impl Instruction {
    pub fn new(op: Op) -> Self {
        Self { op, imm: None }
    }

    pub fn push(value: i32) -> Self {
        Self { op: Op::Push, imm: Some(value) }
    }
}

/// Diagnostic metadata carried alongside a `Program` — not consulted by
/// either back end, but useful when a trace is serialized and inspected or
/// replayed without re-tokenizing the source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub grid_width: usize,
    pub grid_height: usize,
    pub codel_size: usize,
}

/// The finished, branch-free trace: a straight line of instructions ending
/// in `Exit`. No position map, no per-node debug tree — just
/// the instructions plus the metadata above.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub metadata: ProgramMetadata,
}

impl Program {
    pub fn new() -> Self {
        Self { instructions: Vec::new(), metadata: ProgramMetadata::default() }
    }

    pub fn with_metadata(metadata: ProgramMetadata) -> Self {
        Self { instructions: Vec::new(), metadata }
    }

    pub fn push_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn ends_in_exit(&self) -> bool {
        matches!(self.instructions.last(), Some(Instruction { op: Op::Exit, .. }))
    }
}
