//! IMP Error Types
//!
//! Every failure the machine can signal. All of them are fatal to a run:
//! the interpreter unwinds to its caller and makes no promise about the
//! stack or cursor it leaves behind.

use std::io;

use thiserror::Error;

use crate::vm::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    // Decoding
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),
    #[error("unexpected end of program: {needed} byte(s) needed at offset {offset}")]
    UnexpectedEnd { offset: usize, needed: usize },
    #[error("address {0:#x} does not fit the host address space")]
    AddressOutOfRange(u64),

    // Stack
    #[error("stack overflow (limit {0})")]
    StackOverflow(usize),
    #[error("stack underflow")]
    StackUnderflow,
    #[error("invalid stack access at depth {depth} (stack holds {len})")]
    InvalidStackAccess { depth: u64, len: usize },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    // Arithmetic
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Integer underflow")]
    IntegerUnderflow,
    #[error("division by zero")]
    DivisionByZero,

    // Calls
    #[error("cannot call integer")]
    NotCallable,
    #[error("unknown native function #{0}")]
    UnknownNative(u32),
    #[error("native function failed: {0}")]
    Native(String),

    // Images
    #[error("invalid image magic number")]
    InvalidMagicNumber,
    #[error("incompatible image version {0}")]
    InvalidImageVersion(u8),
    #[error("image is too short")]
    ImageTooShort,
    #[error("entry point {0:#x} lies outside the code")]
    InvalidEntryPoint(u64),

    // IO boundary
    #[error("io error: {0}")]
    Io(String),
}

impl From<io::Error> for VmError {
    fn from(err: io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}

pub type VmResult<T> = Result<T, VmError>;
