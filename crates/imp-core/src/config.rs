//! IMP Configuration
//!
//! Runtime limits for the interpreter. Configuration specifies constraints
//! only; enforcement is handled by the stack.

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of values the operand/frame stack may hold
    pub max_stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_stack_size: 1 << 16,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the stack limit
    pub fn with_max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }
}
