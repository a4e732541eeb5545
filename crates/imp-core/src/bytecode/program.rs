//! Program Buffer
//!
//! Immutable bytecode with typed reads at a caller-owned cursor. Every read
//! advances the cursor by exactly the width of the type; a read that would
//! run past the end fails and leaves the cursor untouched.
//! Multi-byte operands are little-endian.

use crate::error::{VmError, VmResult};
use super::opcode::Opcode;

/// Immutable bytecode buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Program { code: code.into() }
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    fn read_array<const N: usize>(&self, pc: &mut usize) -> VmResult<[u8; N]> {
        let bytes = pc
            .checked_add(N)
            .and_then(|end| self.code.get(*pc..end))
            .ok_or(VmError::UnexpectedEnd { offset: *pc, needed: N })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        *pc += N;
        Ok(out)
    }

    pub fn read_u8(&self, pc: &mut usize) -> VmResult<u8> {
        let [byte] = self.read_array::<1>(pc)?;
        Ok(byte)
    }

    pub fn read_u32(&self, pc: &mut usize) -> VmResult<u32> {
        self.read_array(pc).map(u32::from_le_bytes)
    }

    pub fn read_u64(&self, pc: &mut usize) -> VmResult<u64> {
        self.read_array(pc).map(u64::from_le_bytes)
    }

    pub fn read_i64(&self, pc: &mut usize) -> VmResult<i64> {
        self.read_array(pc).map(i64::from_le_bytes)
    }

    /// Read a 64-bit code address and narrow it to the host `usize`
    pub fn read_addr(&self, pc: &mut usize) -> VmResult<usize> {
        let raw = self.read_u64(pc)?;
        usize::try_from(raw).map_err(|_| VmError::AddressOutOfRange(raw))
    }

    /// Read and decode one opcode byte
    pub fn read_opcode(&self, pc: &mut usize) -> VmResult<Opcode> {
        let byte = self.read_u8(pc)?;
        Opcode::from_u8(byte).ok_or(VmError::InvalidOpcode(byte))
    }
}

impl From<Vec<u8>> for Program {
    fn from(code: Vec<u8>) -> Self {
        Program { code }
    }
}
