//! Little-endian byte streams
//!
//! [`ByteSink`] and [`ByteSource`] each require a single byte primitive and
//! derive every field helper from it, so a helper always moves the cursor
//! by exactly the number of bytes it logically writes or reads. Multi-byte
//! values are little-endian; strings are a length byte followed by raw
//! bytes with no terminator.

use heapless::{String, Vec};
use sbgc_hal::{TransportRx, TransportTx};

use crate::error::{ProtocolError, Result};

/// Longest string a one-byte length prefix can describe
pub const MAX_STRING_LENGTH: usize = 255;

/// Destination for little-endian protocol fields
pub trait ByteSink {
    /// Failure type of the underlying channel
    type TransportError;

    /// Write a single byte, advancing the write position by one
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::TransportError>;

    /// Write a 16-bit word, low byte first
    fn write_word(&mut self, value: u16) -> Result<(), Self::TransportError> {
        let [low, high] = value.to_le_bytes();
        self.write_byte(low)?;
        self.write_byte(high)
    }

    /// Write a signed 16-bit word in two's complement
    fn write_i16(&mut self, value: i16) -> Result<(), Self::TransportError> {
        self.write_word(value as u16)
    }

    /// Write a 32-bit long as two words, low word first
    fn write_long(&mut self, value: u32) -> Result<(), Self::TransportError> {
        self.write_word(value as u16)?;
        self.write_word((value >> 16) as u16)
    }

    /// Write a signed 32-bit long in two's complement
    fn write_i32(&mut self, value: i32) -> Result<(), Self::TransportError> {
        self.write_long(value as u32)
    }

    /// Write the raw IEEE-754 bytes of `value`
    fn write_float(&mut self, value: f32) -> Result<(), Self::TransportError> {
        self.write_buffer(&value.to_le_bytes())
    }

    /// Write a length-prefixed string
    ///
    /// Fails without writing anything if `text` is longer than
    /// [`MAX_STRING_LENGTH`] bytes.
    fn write_string(&mut self, text: &str) -> Result<(), Self::TransportError> {
        let bytes = text.as_bytes();
        if bytes.len() > MAX_STRING_LENGTH {
            return Err(ProtocolError::StringTooLong { len: bytes.len() });
        }
        self.write_byte(bytes.len() as u8)?;
        self.write_buffer(bytes)
    }

    /// Write raw bytes
    fn write_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::TransportError> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Write each word of `words`; the count is not written
    fn write_word_array(&mut self, words: &[u16]) -> Result<(), Self::TransportError> {
        for &word in words {
            self.write_word(word)?;
        }
        Ok(())
    }

    /// Write `count` zero bytes for reserved fields
    fn write_empty_buffer(&mut self, count: usize) -> Result<(), Self::TransportError> {
        for _ in 0..count {
            self.write_byte(0)?;
        }
        Ok(())
    }
}

/// Source of little-endian protocol fields
pub trait ByteSource {
    /// Failure type of the underlying channel
    type TransportError;

    /// Read a single byte, advancing the read position by one
    fn read_byte(&mut self) -> Result<u8, Self::TransportError>;

    /// Read a 16-bit word, low byte first
    fn read_word(&mut self) -> Result<u16, Self::TransportError> {
        let low = self.read_byte()?;
        let high = self.read_byte()?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a signed 16-bit word
    fn read_i16(&mut self) -> Result<i16, Self::TransportError> {
        Ok(self.read_word()? as i16)
    }

    /// Read a 32-bit long as two words, low word first
    fn read_long(&mut self) -> Result<u32, Self::TransportError> {
        let low = self.read_word()? as u32;
        let high = self.read_word()? as u32;
        Ok(low | (high << 16))
    }

    /// Read a signed 32-bit long
    fn read_i32(&mut self) -> Result<i32, Self::TransportError> {
        Ok(self.read_long()? as i32)
    }

    /// Read a float from its raw IEEE-754 bytes
    fn read_float(&mut self) -> Result<f32, Self::TransportError> {
        Ok(f32::from_le_bytes(self.read_byte_array()?))
    }

    /// Fill `buf` with the next `buf.len()` bytes
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<(), Self::TransportError> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Read exactly `N` bytes into an array
    fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N], Self::TransportError> {
        let mut bytes = [0u8; N];
        self.read_buffer(&mut bytes)?;
        Ok(bytes)
    }

    /// Fill `words` with the next `words.len()` words
    fn read_word_array(&mut self, words: &mut [u16]) -> Result<(), Self::TransportError> {
        for slot in words.iter_mut() {
            *slot = self.read_word()?;
        }
        Ok(())
    }

    /// Read a length-prefixed string
    fn read_string(&mut self) -> Result<String<MAX_STRING_LENGTH>, Self::TransportError> {
        let len = self.read_byte()? as usize;
        let mut bytes = Vec::<u8, MAX_STRING_LENGTH>::new();
        for _ in 0..len {
            let byte = self.read_byte()?;
            // len <= 255, so this never overflows
            let _ = bytes.push(byte);
        }
        String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidString)
    }

    /// Read and discard `count` bytes
    fn skip_bytes(&mut self, count: usize) -> Result<(), Self::TransportError> {
        for _ in 0..count {
            self.read_byte()?;
        }
        Ok(())
    }
}

/// Field-level access to a transport
///
/// Wraps a transport (or a `&mut` borrow of one) so the stream helpers can
/// write fields straight onto the wire or read them straight off it. Every
/// helper still goes byte by byte through the transport; zero fill really
/// sends zeros.
#[derive(Debug)]
pub struct TransportStream<T> {
    inner: T,
}

impl<T> TransportStream<T> {
    /// Wrap a transport
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Unwrap the transport
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: TransportTx> ByteSink for TransportStream<T> {
    type TransportError = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), T::Error> {
        self.inner.write_byte(byte).map_err(ProtocolError::Transport)
    }
}

impl<T: TransportRx> ByteSource for TransportStream<T> {
    type TransportError = T::Error;

    fn read_byte(&mut self) -> Result<u8, T::Error> {
        self.inner.read_byte().map_err(ProtocolError::Transport)
    }
}
