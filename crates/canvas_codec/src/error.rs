//! This crate's half of the error taxonomy: everything that can
//! go wrong above the VM/codegen layer — a bad image file, or an external
//! assembler/linker that isn't there or rejects the generated assembly.

use std::fmt;

#[derive(Debug)]
pub enum VmError {
    /// The input file is missing, unreadable, or not a decodable image.
    InputError(String),
    ToolchainError(String),
    Vm(canvas_vm::VmError),
    Codegen(canvas_codegen::VmError),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::InputError(msg) => write!(f, "input error: {msg}"),
            VmError::ToolchainError(msg) => write!(f, "toolchain error: {msg}"),
            VmError::Vm(err) => write!(f, "{err}"),
            VmError::Codegen(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<canvas_vm::VmError> for VmError {
    fn from(err: canvas_vm::VmError) -> Self {
        VmError::Vm(err)
    }
}

impl From<canvas_codegen::VmError> for VmError {
    fn from(err: canvas_codegen::VmError) -> Self {
        VmError::Codegen(err)
    }
}

impl VmError {
    /// 1 for a decode failure, 2 for everything else this crate can report
    /// (unsupported opcode, toolchain failure, VM fault).
    pub fn exit_code(&self) -> i32 {
        match self {
            VmError::InputError(_) => 1,
            _ => 2,
        }
    }
}
