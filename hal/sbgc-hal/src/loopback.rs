//! In-memory loopback transport
//!
//! Bytes written to the loopback can be read back in the same order. Used
//! for host-side testing and simulation, where a frame is encoded into the
//! loopback and decoded from it without any hardware attached.

use heapless::Deque;

use crate::transport::{TransportRx, TransportTx};

/// Errors from the loopback transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopbackError {
    /// No space left for the written byte
    Full,
    /// Nothing to read
    Empty,
}

impl core::fmt::Display for LoopbackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoopbackError::Full => f.write_str("loopback buffer full"),
            LoopbackError::Empty => f.write_str("loopback buffer empty"),
        }
    }
}

/// Bounded FIFO that acts as both ends of a serial link
#[derive(Debug, Clone)]
pub struct LoopbackTransport<const N: usize> {
    queue: Deque<u8, N>,
}

impl<const N: usize> Default for LoopbackTransport<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LoopbackTransport<N> {
    /// Create an empty loopback
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Queue raw bytes as if they had arrived on the wire
    ///
    /// Stops at the first byte that does not fit.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), LoopbackError> {
        for &byte in bytes {
            self.queue.push_back(byte).map_err(|_| LoopbackError::Full)?;
        }
        Ok(())
    }

    /// Move every queued byte into `out`, returning how many were moved
    ///
    /// Bytes that do not fit in `out` stay queued.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// XOR the queued byte at `index` with `mask` to simulate line noise
    ///
    /// Returns false if `index` is past the end of the queue.
    pub fn corrupt(&mut self, index: usize, mask: u8) -> bool {
        match self.queue.iter_mut().nth(index) {
            Some(byte) => {
                *byte ^= mask;
                true
            }
            None => false,
        }
    }

    /// Number of queued bytes
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued byte
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<const N: usize> TransportTx for LoopbackTransport<N> {
    type Error = LoopbackError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.queue.push_back(byte).map_err(|_| LoopbackError::Full)
    }
}

impl<const N: usize> TransportRx for LoopbackTransport<N> {
    type Error = LoopbackError;

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.queue.pop_front().ok_or(LoopbackError::Empty)
    }

    fn bytes_available(&mut self) -> u16 {
        u16::try_from(self.queue.len()).unwrap_or(u16::MAX)
    }
}
