//! Native functions ("protos")
//!
//! Routines implemented in Rust and callable from bytecode. A native gets the
//! whole interpreter by mutable reference and owns its net stack effect.

pub mod registry;

use crate::error::VmResult;
use crate::vm::Interpreter;

pub use registry::NativeRegistry;

/// Native function handle as it appears in bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

impl From<u32> for NativeId {
    fn from(id: u32) -> Self {
        NativeId(id)
    }
}

impl From<NativeId> for u32 {
    fn from(id: NativeId) -> Self {
        id.0
    }
}

/// Signature of a native routine
pub type NativeFn = fn(&mut Interpreter) -> VmResult<()>;
