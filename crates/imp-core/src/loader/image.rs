//! Image Loader
//!
//! Loads and validates IMP program images.
//! This layer performs structural validation only; the code itself is not
//! inspected until it runs.

use crate::bytecode::Program;
use crate::error::{VmError, VmResult};

/// Image magic: "IMPB"
const IMAGE_MAGIC: [u8; 4] = *b"IMPB";

/// Supported image version
const VERSION_MAJOR: u8 = 1;

/// Magic, version block, entry point, code length
const HEADER_SIZE: usize = 4 + 4 + 8 + 8;

/// Loaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub program: Program,
    pub entry_point: usize,
}

/// Image loader
pub struct ImageLoader;

impl ImageLoader {
    /// Load an image from raw bytes
    pub fn load(bytes: &[u8]) -> VmResult<LoadedImage> {
        if bytes.len() < HEADER_SIZE {
            return Err(VmError::ImageTooShort);
        }

        if bytes[0..4] != IMAGE_MAGIC {
            return Err(VmError::InvalidMagicNumber);
        }

        // Version: major, minor, patch, reserved
        let major = bytes[4];
        if major != VERSION_MAJOR {
            return Err(VmError::InvalidImageVersion(major));
        }

        let mut cursor = 8;
        let entry_point = Self::read_u64(bytes, &mut cursor);
        let code_len = Self::read_u64(bytes, &mut cursor);

        let code = usize::try_from(code_len)
            .ok()
            .and_then(|len| cursor.checked_add(len))
            .and_then(|end| bytes.get(cursor..end))
            .ok_or(VmError::ImageTooShort)?;

        let entry = usize::try_from(entry_point)
            .ok()
            .filter(|&e| e < code.len())
            .ok_or(VmError::InvalidEntryPoint(entry_point))?;

        Ok(LoadedImage {
            program: Program::new(code),
            entry_point: entry,
        })
    }

    /// Build an image around `code`
    pub fn write(entry_point: usize, code: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + code.len());
        buf.extend_from_slice(&IMAGE_MAGIC);
        buf.extend_from_slice(&[VERSION_MAJOR, 0, 0, 0]);
        buf.extend_from_slice(&(entry_point as u64).to_le_bytes());
        buf.extend_from_slice(&(code.len() as u64).to_le_bytes());
        buf.extend_from_slice(code);
        buf
    }

    // Caller has checked the header length.
    fn read_u64(bytes: &[u8], cursor: &mut usize) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[*cursor..*cursor + 8]);
        *cursor += 8;
        u64::from_le_bytes(raw)
    }
}
