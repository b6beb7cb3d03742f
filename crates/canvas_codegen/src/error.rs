//! This crate's half of the error taxonomy: the emitter only ever
//! fails for one reason, an opcode it has no assembly mapping for.

use std::fmt;
use std::io;

use canvas_vm::Op;

#[derive(Debug)]
pub enum VmError {
    /// `NumOut`, `NumIn`, `CharIn`, and `Roll` have no assembly mapping
    /// and fail emission rather than emit silently.
    UnsupportedOp(Op),
    /// The destination (a file, a buffer) rejected a write.
    Io(io::Error),
}

impl PartialEq for VmError {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (VmError::UnsupportedOp(a), VmError::UnsupportedOp(b)) if a == b)
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::UnsupportedOp(op) => write!(f, "opcode has no assembly mapping: {op:?}"),
            VmError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<io::Error> for VmError {
    fn from(err: io::Error) -> Self {
        VmError::Io(err)
    }
}
