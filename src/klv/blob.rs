//! Opaque byte values and bounded blob transfer.
//!
//! Reads and writes go through [`bytes::Buf`] / [`bytes::BufMut`], so the
//! same functions work over slices, `Bytes`, `VecDeque<u8>`, `Vec<u8>`,
//! and fixed `&mut [u8]` windows.

use bytes::{Buf, BufMut, Bytes};
use std::fmt;
use std::ops::Deref;

use crate::error::{Error, Result};

/// A plain byte sequence whose internal structure is not decoded.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(Bytes);

impl Blob {
    /// Create an empty blob.
    pub fn new() -> Self {
        Self(Bytes::new())
    }

    /// The blob's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the blob, returning its shared byte buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02X}")?;
        }
        write!(f, ")")
    }
}

impl From<Bytes> for Blob {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

/// Consume exactly `length` bytes from `buf` as a blob.
///
/// Fails with [`Error::BufferUnderrun`] if fewer than `length` bytes remain.
pub fn read_blob<B: Buf>(buf: &mut B, length: usize) -> Result<Blob> {
    if buf.remaining() < length {
        return Err(Error::underrun(length, buf.remaining()));
    }
    Ok(Blob(buf.copy_to_bytes(length)))
}

/// Write the blob's bytes into a region of at most `max_length` bytes.
///
/// Fails with [`Error::BufferOverflow`] without touching `buf` if the blob
/// is longer than `max_length` or than the writable room left in `buf`.
pub fn write_blob<B: BufMut>(value: &Blob, buf: &mut B, max_length: usize) -> Result<()> {
    write_bytes(value.as_bytes(), buf, max_length)
}

/// Number of bytes the blob occupies when written.
pub fn blob_length(value: &Blob) -> usize {
    value.len()
}

/// Bounded write of raw bytes; shared by every fixed-shape writer.
pub(crate) fn write_bytes<B: BufMut>(bytes: &[u8], buf: &mut B, max_length: usize) -> Result<()> {
    let available = max_length.min(buf.remaining_mut());
    if bytes.len() > available {
        return Err(Error::overflow(bytes.len(), available));
    }
    buf.put_slice(bytes);
    Ok(())
}
