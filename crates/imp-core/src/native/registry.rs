//! Native Registry
//!
//! Table of natives the host makes available to a program. Ids are handed out
//! in registration order and are what `PUSH_PROTO` carries; an id that was
//! never registered fails closed when called.

use std::fmt;

use crate::error::{VmError, VmResult};
use super::{NativeFn, NativeId};

#[derive(Clone, Default)]
pub struct NativeRegistry {
    entries: Vec<(&'static str, NativeFn)>,
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|&(name, _)| name))
            .finish()
    }
}

impl NativeRegistry {
    /// Empty registry; every id is unknown
    pub fn new() -> Self {
        NativeRegistry { entries: Vec::new() }
    }

    /// Register a native and return the id bytecode must use for it
    pub fn register(&mut self, name: &'static str, native: NativeFn) -> NativeId {
        let id = NativeId(self.entries.len() as u32);
        self.entries.push((name, native));
        id
    }

    /// Resolve an id to its routine
    pub fn get(&self, id: NativeId) -> VmResult<NativeFn> {
        self.entries
            .get(id.0 as usize)
            .map(|&(_, native)| native)
            .ok_or(VmError::UnknownNative(id.0))
    }

    pub fn lookup(&self, name: &str) -> Option<NativeId> {
        self.entries
            .iter()
            .position(|&(n, _)| n == name)
            .map(|i| NativeId(i as u32))
    }

    pub fn name(&self, id: NativeId) -> Option<&'static str> {
        self.entries.get(id.0 as usize).map(|&(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
