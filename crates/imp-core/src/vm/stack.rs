//! Operand/Frame Stack
//!
//! One growable sequence of values that holds expression operands, call
//! arguments and return addresses alike. Frames have no structure of their
//! own; slots are addressed by depth from the top (depth 0 is the top).

use crate::error::{VmError, VmResult};
use super::value::{Value, ValueKind};

/// Initial allocation; the stack grows on demand up to `max_size`.
const INITIAL_CAPACITY: usize = 256;

/// VM execution stack
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    max_size: usize,
}

impl Stack {
    /// Create new stack with maximum size
    pub fn new(max_size: usize) -> Self {
        Stack {
            values: Vec::with_capacity(max_size.min(INITIAL_CAPACITY)),
            max_size,
        }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) -> VmResult<()> {
        if self.values.len() >= self.max_size {
            return Err(VmError::StackOverflow(self.max_size));
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> VmResult<Value> {
        self.values.pop().ok_or(VmError::StackUnderflow)
    }

    /// Pop a value that must be tagged `Int`
    pub fn pop_int(&mut self) -> VmResult<i64> {
        match self.pop()? {
            Value::Int(v) => Ok(v),
            other => Err(VmError::TypeMismatch {
                expected: ValueKind::Int,
                found: other.kind(),
            }),
        }
    }

    /// Pop a value that must be tagged `Addr`
    pub fn pop_addr(&mut self) -> VmResult<usize> {
        match self.pop()? {
            Value::Addr(addr) => Ok(addr),
            other => Err(VmError::TypeMismatch {
                expected: ValueKind::Addr,
                found: other.kind(),
            }),
        }
    }

    /// Top of stack without removing it
    pub fn top(&self) -> VmResult<Value> {
        self.values.last().copied().ok_or(VmError::StackUnderflow)
    }

    /// Read the slot `depth` positions below the top
    pub fn peek(&self, depth: u64) -> VmResult<Value> {
        let index = self.index_of(depth)?;
        Ok(self.values[index])
    }

    /// Overwrite the slot `depth` positions below the top
    pub fn poke(&mut self, depth: u64, value: Value) -> VmResult<()> {
        let index = self.index_of(depth)?;
        self.values[index] = value;
        Ok(())
    }

    /// Discard `count` values from the top
    pub fn shrink(&mut self, count: usize) -> VmResult<()> {
        let len = self
            .values
            .len()
            .checked_sub(count)
            .ok_or(VmError::StackUnderflow)?;
        self.values.truncate(len);
        Ok(())
    }

    fn index_of(&self, depth: u64) -> VmResult<usize> {
        let len = self.values.len();
        usize::try_from(depth)
            .ok()
            .filter(|&d| d < len)
            .map(|d| len - 1 - d)
            .ok_or(VmError::InvalidStackAccess { depth, len })
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bottom-to-top view of the stack
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Clear stack
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
