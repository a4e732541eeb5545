//! Runtime Value Representation
//!
//! A closed set of three word-sized operand kinds. Values are `Copy`; nothing
//! here allocates.

use std::fmt;

use crate::native::NativeId;

/// Runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer
    Int(i64),

    /// Program counter: a return address or a callee entry point
    Addr(usize),

    /// Handle to a natively implemented routine
    Proto(NativeId),
}

/// Tag of a [`Value`], used in type errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Addr,
    Proto,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Addr(_) => ValueKind::Addr,
            Value::Proto(_) => ValueKind::Proto,
        }
    }

    /// The untagged machine word behind this value.
    pub fn raw(&self) -> i64 {
        match *self {
            Value::Int(v) => v,
            Value::Addr(addr) => addr as i64,
            Value::Proto(id) => i64::from(id.0),
        }
    }

    /// Branch truthiness: non-zero is true, whatever the tag.
    pub fn is_truthy(&self) -> bool {
        self.raw() != 0
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => write!(f, "int"),
            ValueKind::Addr => write!(f, "addr"),
            ValueKind::Proto => write!(f, "proto"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Addr(addr) => write!(f, "@{:#x}", addr),
            Value::Proto(id) => write!(f, "proto#{}", id.0),
        }
    }
}
