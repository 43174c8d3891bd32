//! Read cursor over an immutable byte sequence.
//!
//! Every read is all-or-nothing: a request for more bytes than remain fails
//! with [`Error::BufferUnderrun`] and leaves the cursor where it was.

use bytes::Bytes;

use crate::error::{Error, Result};

/// A cursor over owned bytes.
///
/// Slices handed out by [`Buffer::read`] share the underlying allocation,
/// so frame payloads are not copied.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Bytes,
    pos: usize,
}

impl Buffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Total length of the underlying sequence, read or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::BufferUnderrun {
                requested: n,
                remaining,
            });
        }
        Ok(())
    }

    /// Return the next `n` bytes and advance past them.
    pub fn read(&mut self, n: usize) -> Result<Bytes> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Return the next `n` bytes without advancing.
    pub fn peek(&self, n: usize) -> Result<Bytes> {
        self.check(n)?;
        Ok(self.data.slice(self.pos..self.pos + n))
    }

    /// Advance past `n` bytes without returning them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Big-endian 24-bit integer, as used by the frame length field.
    pub fn read_u24(&mut self) -> Result<u32> {
        let [a, b, c] = self.read_array()?;
        Ok(((a as u32) << 16) | ((b as u32) << 8) | (c as u32))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Consume the buffer, returning whatever has not been read yet.
    pub fn into_remaining(self) -> Bytes {
        self.data.slice(self.pos..)
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&'static [u8]> for Buffer {
    fn from(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data))
    }
}
