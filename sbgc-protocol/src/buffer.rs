//! Fixed-capacity payload buffer
//!
//! A [`CommandBuffer`] holds one command's payload with independent write
//! and read cursors. Outgoing commands are built by writing fields into it;
//! incoming payloads are decoded by reading fields out of it. All bounds
//! checks live here:
//!
//! ```text
//! 0 <= read_pos <= write_pos <= capacity <= MAX_PAYLOAD_SIZE
//! ```

use core::convert::Infallible;

use crate::error::{ProtocolError, Result};
use crate::stream::{ByteSink, ByteSource};
use crate::MAX_PAYLOAD_SIZE;

/// Payload storage for a single command
///
/// Never shared between two in-flight commands. Reuse it by calling
/// [`CommandBuffer::reset`] between sends.
#[derive(Clone)]
pub struct CommandBuffer {
    data: [u8; MAX_PAYLOAD_SIZE],
    capacity: usize,
    write_pos: usize,
    read_pos: usize,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuffer {
    /// Create a buffer that can hold the largest payload the protocol allows
    pub const fn new() -> Self {
        Self::with_capacity(MAX_PAYLOAD_SIZE as u8)
    }

    /// Create a buffer limited to `capacity` bytes
    pub const fn with_capacity(capacity: u8) -> Self {
        Self {
            data: [0; MAX_PAYLOAD_SIZE],
            capacity: capacity as usize,
            write_pos: 0,
            read_pos: 0,
        }
    }

    /// Create a full-capacity buffer whose written span is `bytes`
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::new();
        if bytes.len() > buffer.capacity {
            return Err(ProtocolError::CapacityExceeded);
        }
        buffer.data[..bytes.len()].copy_from_slice(bytes);
        buffer.write_pos = bytes.len();
        Ok(buffer)
    }

    /// Maximum number of bytes this buffer accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.write_pos
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }

    /// Bytes that can still be written
    pub fn remaining(&self) -> usize {
        self.capacity - self.write_pos
    }

    /// Bytes written but not yet read
    pub fn unread(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.read_pos
    }

    /// The written span, `payload[0..write_pos)`
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Modulo-256 sum of the written span
    pub fn checksum(&self) -> u8 {
        crate::codec::payload_checksum(self.as_slice())
    }

    /// Move the read cursor back to the start, keeping the contents
    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    /// Logically truncate the buffer; both cursors go back to zero
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
    }

    /// Mutable view of the next `len` free bytes, advancing the write cursor
    ///
    /// The caller must have checked `len <= remaining()`.
    pub(crate) fn claim(&mut self, len: usize) -> &mut [u8] {
        let start = self.write_pos;
        self.write_pos += len;
        &mut self.data[start..start + len]
    }
}

impl core::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("capacity", &self.capacity)
            .field("read_pos", &self.read_pos)
            .field("payload", &self.as_slice())
            .finish()
    }
}

impl PartialEq for CommandBuffer {
    /// Buffers are equal when their written spans are equal
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for CommandBuffer {}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "CommandBuffer {{ capacity: {}, read_pos: {}, payload: {=[u8]} }}",
            self.capacity,
            self.read_pos,
            self.as_slice()
        )
    }
}

// The batched overrides below behave exactly like the byte-at-a-time
// defaults: whatever fits is processed, the cursor moves by that much, and
// then the error is reported.
impl ByteSink for CommandBuffer {
    type TransportError = Infallible;

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.write_pos == self.capacity {
            return Err(ProtocolError::CapacityExceeded);
        }
        self.data[self.write_pos] = byte;
        self.write_pos += 1;
        Ok(())
    }

    fn write_buffer(&mut self, bytes: &[u8]) -> Result<()> {
        let n = bytes.len().min(self.remaining());
        self.claim(n).copy_from_slice(&bytes[..n]);
        if n < bytes.len() {
            return Err(ProtocolError::CapacityExceeded);
        }
        Ok(())
    }

    // Stale bytes from before a reset must not show up in reserved fields
    fn write_empty_buffer(&mut self, count: usize) -> Result<()> {
        let n = count.min(self.remaining());
        self.claim(n).fill(0);
        if n < count {
            return Err(ProtocolError::CapacityExceeded);
        }
        Ok(())
    }
}

impl ByteSource for CommandBuffer {
    type TransportError = Infallible;

    fn read_byte(&mut self) -> Result<u8> {
        if self.read_pos == self.write_pos {
            return Err(ProtocolError::Underrun);
        }
        let byte = self.data[self.read_pos];
        self.read_pos += 1;
        Ok(byte)
    }

    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = buf.len().min(self.unread());
        buf[..n].copy_from_slice(&self.data[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        if n < buf.len() {
            return Err(ProtocolError::Underrun);
        }
        Ok(())
    }

    /// Moves the read cursor instead of reading byte by byte.
    fn skip_bytes(&mut self, count: usize) -> Result<()> {
        let n = count.min(self.unread());
        self.read_pos += n;
        if n < count {
            return Err(ProtocolError::Underrun);
        }
        Ok(())
    }
}
