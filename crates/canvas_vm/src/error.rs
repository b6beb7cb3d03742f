use std::fmt;

use crate::ops::Op;

/// Error taxonomy for the core. Stack underflow is deliberately absent: in
/// Piet it is a routine, silent noop and never surfaces as an `Err`.
#[derive(Debug)]
pub enum VmError {
    /// Image file missing or undecodable.
    InputError(String),
    /// A codel fell outside the 20-entry palette while strict decoding was requested.
    UnmappedColor(u8, u8, u8),
    /// Push into a full stack.
    StackOverflow,
    /// `NumIn`/`CharIn` ran past the end of input, or the bytes read did
    /// not decode as the requested shape (number or codepoint).
    InvalidInput,
    /// An opcode the builder or emitter is not allowed to produce.
    UnsupportedOp(Op),
    /// The external assembler or linker failed.
    ToolchainError(String),
    /// The underlying stdio stream itself faulted (not a parse failure).
    Io(String),
}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}

impl PartialEq for VmError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (VmError::InputError(a), VmError::InputError(b)) => a == b,
            (VmError::UnmappedColor(r1, g1, b1), VmError::UnmappedColor(r2, g2, b2)) => {
                (r1, g1, b1) == (r2, g2, b2)
            }
            (VmError::StackOverflow, VmError::StackOverflow) => true,
            (VmError::InvalidInput, VmError::InvalidInput) => true,
            (VmError::UnsupportedOp(a), VmError::UnsupportedOp(b)) => a == b,
            (VmError::ToolchainError(a), VmError::ToolchainError(b)) => a == b,
            (VmError::Io(a), VmError::Io(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::InputError(msg) => write!(f, "input error: {msg}"),
            VmError::UnmappedColor(r, g, b) => {
                write!(f, "unmapped color: RGB({r}, {g}, {b})")
            }
            VmError::StackOverflow => write!(f, "stack overflow"),
            VmError::InvalidInput => write!(f, "invalid or exhausted input"),
            VmError::UnsupportedOp(op) => write!(f, "unsupported opcode: {op:?}"),
            VmError::ToolchainError(msg) => write!(f, "toolchain error: {msg}"),
            VmError::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for VmError {}
