pub mod interp;
pub mod stack;
pub mod value;

pub use interp::{Interpreter, Step};
pub use stack::Stack;
pub use value::{Value, ValueKind};
