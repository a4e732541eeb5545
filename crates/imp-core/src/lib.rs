//! IMP Virtual Machine - Core Library
//!
//! Execution core of the IMP stack machine: value model, operand/frame stack,
//! bytecode reader and the interpreter loop, plus the image loader and the
//! native registry a host needs to drive it.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod native;
pub mod loader;

// Re-export commonly used types
pub use error::{VmError, VmResult};
pub use config::VmConfig;
pub use bytecode::{assemble, Instruction, Opcode, Program};
pub use vm::{Interpreter, Step, Value, ValueKind};
pub use native::{NativeFn, NativeId, NativeRegistry};
pub use loader::{ImageLoader, LoadedImage};
