//! # canvas_codegen
//!
//! The second of the two back ends a traced [`canvas_vm::Program`] can run
//! through: instead of interpreting the instructions in-process, this crate
//! emits x86-64 Mach-O-compatible assembly text for them. The
//! emitted `.s` file still needs an external assembler and linker — shelling
//! out to those is `canvas_codec`'s job, not this crate's.
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Piet    │ →  │ canvas_vm │ →  │ Assembly    │ →  │ as + ld     │
//! │  Image   │    │ Program   │    │ (.s text)   │    │ (external)  │
//! └──────────┘    └───────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! ## Stack layout
//!
//! `%r12` holds the live stack head, one past the last occupied dword in a
//! fixed 512-entry `.data` buffer. No heap, no dynamic growth: overflow
//! beyond the buffer is undefined the same way it would be in hand-written
//! assembly, since this emitter does no bounds checking of its own (the
//! interpreter back end is where overflow is actually caught).

mod asm;
mod error;

pub use error::VmError;

use std::io::Write;

use canvas_vm::Program;

/// Emit assembly text for `program` to `out`. See [`asm::emit`] for the
/// per-instruction mapping.
pub fn compile_to_asm(program: &Program, out: &mut dyn Write) -> Result<(), VmError> {
    asm::emit(program, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_vm::{Instruction, Op, ProgramMetadata};

    #[test]
    fn compiles_a_small_program_to_text() {
        let mut program = Program::with_metadata(ProgramMetadata::default());
        program.push_instruction(Instruction::push(72));
        program.push_instruction(Instruction::new(Op::CharOut));
        program.push_instruction(Instruction::new(Op::Exit));

        let mut out = Vec::new();
        compile_to_asm(&program, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("push_imm 72"));
        assert!(text.contains("call    _chout"));
        assert!(text.contains("exit_program"));
    }

    #[test]
    fn roll_has_no_assembly_mapping() {
        let mut program = Program::with_metadata(ProgramMetadata::default());
        program.push_instruction(Instruction::new(Op::Roll));
        program.push_instruction(Instruction::new(Op::Exit));

        let mut out = Vec::new();
        let err = compile_to_asm(&program, &mut out).unwrap_err();
        assert!(matches!(err, VmError::UnsupportedOp(Op::Roll)));
    }
}
