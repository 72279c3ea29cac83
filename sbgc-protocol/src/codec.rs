//! Frame encoding and decoding for serial API version 1.
//!
//! Frame format:
//! - MARKER (1 byte): '>' synchronization byte
//! - COMMAND (1 byte): command identifier
//! - SIZE (1 byte): payload length (0-255)
//! - HEADER CHECKSUM (1 byte): (COMMAND + SIZE) mod 256
//! - PAYLOAD (0-255 bytes): command-specific data
//! - PAYLOAD CHECKSUM (1 byte): sum of all PAYLOAD bytes mod 256
//!
//! The pull-style functions ([`write_command`], [`read_command`]) drive a
//! transport directly and handle one frame per call. [`FrameParser`] is the
//! push-style equivalent for receive loops that get bytes in chunks.

use sbgc_hal::{TransportRx, TransportTx};

use crate::buffer::CommandBuffer;
use crate::command::{Command, RawCommand};
use crate::error::{ProtocolError, Result};
use crate::stream::ByteSink;

/// Serial API version implemented by this codec
pub const PROTOCOL_VERSION: u8 = 1;

/// Frame synchronization byte for version 1 frames
pub const PACKET_MARKER: u8 = b'>';

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Marker, command id, size, header checksum and payload checksum
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Header fields of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Command identifier
    pub command_id: u8,
    /// Number of payload bytes that follow the header
    pub payload_size: u8,
}

/// Outcome of [`resync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncStatus {
    /// A marker was found and consumed; the header comes next
    Synced,
    /// No bytes were waiting before a marker turned up
    Idle,
    /// The discard budget ran out before a marker turned up
    Exhausted,
}

/// Checksum over the header: `(command_id + payload_size) mod 256`
pub const fn header_checksum(command_id: u8, payload_size: u8) -> u8 {
    command_id.wrapping_add(payload_size)
}

/// Checksum over the payload: sum of all bytes mod 256
pub fn payload_checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Serialize `command` and write the frame to `tx`
///
/// Transport failures are returned as-is and never retried. The version
/// reported by the command does not change the framing.
pub fn write_command<C, T>(command: &C, tx: &mut T) -> Result<(), T::Error>
where
    C: Command + ?Sized,
    T: TransportTx + ?Sized,
{
    let command_id = command.command_id();
    let payload = command.payload().as_slice();
    // The buffer never holds more than MAX_PAYLOAD_SIZE bytes
    let payload_size = payload.len() as u8;

    tx.write_all(&[
        PACKET_MARKER,
        command_id,
        payload_size,
        header_checksum(command_id, payload_size),
    ])
    .map_err(ProtocolError::Transport)?;
    tx.write_all(payload).map_err(ProtocolError::Transport)?;
    tx.write_byte(payload_checksum(payload))
        .map_err(ProtocolError::Transport)?;
    tx.flush().map_err(ProtocolError::Transport)?;

    trace!("TX cmd={=u8} size={=u8}", command_id, payload_size);
    Ok(())
}

/// Serialize `command` into `out`
///
/// Returns the number of bytes written. For callers that hand whole
/// frames to a DMA or a buffered writer.
pub fn encode_frame<C: Command + ?Sized>(command: &C, out: &mut [u8]) -> Result<usize> {
    let command_id = command.command_id();
    let payload = command.payload().as_slice();
    let payload_size = payload.len() as u8;
    let frame_len = FRAME_OVERHEAD + payload.len();
    if out.len() < frame_len {
        return Err(ProtocolError::CapacityExceeded);
    }

    out[0] = PACKET_MARKER;
    out[1] = command_id;
    out[2] = payload_size;
    out[3] = header_checksum(command_id, payload_size);
    out[4..4 + payload.len()].copy_from_slice(payload);
    out[4 + payload.len()] = payload_checksum(payload);

    Ok(frame_len)
}

/// Read one frame from `rx` into `buffer`
///
/// `buffer` is reset first. On success its written span is the payload and
/// its read cursor is at zero, ready for field decoding.
///
/// Failures leave the transport wherever the failed read left it:
/// - `Framing` if the first byte is not the marker (nothing else is read)
/// - `HeaderChecksumMismatch` before any payload byte is read
/// - `PayloadTooLarge` if the payload does not fit `buffer`; the payload
///   stays unread and the error carries its size for [`drain_payload`]
/// - `PayloadChecksumMismatch` after the whole frame was consumed; the
///   buffer is emptied so no part of the corrupt payload is exposed
pub fn read_command<T>(rx: &mut T, buffer: &mut CommandBuffer) -> Result<FrameHeader, T::Error>
where
    T: TransportRx + ?Sized,
{
    let found = rx.read_byte().map_err(ProtocolError::Transport)?;
    if found != PACKET_MARKER {
        warn!("RX expected marker, got {=u8:#x}", found);
        return Err(ProtocolError::Framing { found });
    }
    read_command_after_marker(rx, buffer)
}

/// Read the rest of a frame whose marker has already been consumed
///
/// Same contract as [`read_command`] minus the marker check.
pub fn read_command_after_marker<T>(
    rx: &mut T,
    buffer: &mut CommandBuffer,
) -> Result<FrameHeader, T::Error>
where
    T: TransportRx + ?Sized,
{
    let command_id = rx.read_byte().map_err(ProtocolError::Transport)?;
    let payload_size = rx.read_byte().map_err(ProtocolError::Transport)?;
    let found = rx.read_byte().map_err(ProtocolError::Transport)?;

    let expected = header_checksum(command_id, payload_size);
    if found != expected {
        warn!(
            "RX header checksum mismatch: expected {=u8:#x}, got {=u8:#x}",
            expected,
            found
        );
        return Err(ProtocolError::HeaderChecksumMismatch { expected, found });
    }

    buffer.reset();
    if payload_size as usize > buffer.capacity() {
        warn!(
            "RX payload of {=u8} bytes exceeds buffer capacity {=usize}",
            payload_size,
            buffer.capacity()
        );
        return Err(ProtocolError::PayloadTooLarge {
            command_id,
            payload_size,
        });
    }

    let mut sum = 0u8;
    for _ in 0..payload_size {
        let byte = rx.read_byte().map_err(ProtocolError::Transport)?;
        buffer.write_byte(byte).map_err(ProtocolError::widen)?;
        sum = sum.wrapping_add(byte);
    }

    let found = rx.read_byte().map_err(ProtocolError::Transport)?;
    if found != sum {
        warn!(
            "RX payload checksum mismatch for cmd {=u8}: expected {=u8:#x}, got {=u8:#x}",
            command_id,
            sum,
            found
        );
        buffer.reset();
        return Err(ProtocolError::PayloadChecksumMismatch {
            expected: sum,
            found,
        });
    }

    trace!("RX cmd={=u8} size={=u8}", command_id, payload_size);
    Ok(FrameHeader {
        command_id,
        payload_size,
    })
}

/// Discard bytes until a marker has been consumed
///
/// Never blocks: stops as soon as the transport reports nothing
/// available. Reads at most `budget` bytes, the marker included, so a
/// budget of zero reads nothing and returns `Exhausted`.
pub fn resync<T>(rx: &mut T, budget: usize) -> Result<SyncStatus, T::Error>
where
    T: TransportRx + ?Sized,
{
    let mut discarded = 0;
    loop {
        if discarded == budget {
            debug!("resync gave up after {=usize} bytes", discarded);
            return Ok(SyncStatus::Exhausted);
        }
        if rx.bytes_available() == 0 {
            return Ok(SyncStatus::Idle);
        }
        if rx.read_byte().map_err(ProtocolError::Transport)? == PACKET_MARKER {
            if discarded > 0 {
                debug!("resync skipped {=usize} bytes", discarded);
            }
            return Ok(SyncStatus::Synced);
        }
        discarded += 1;
    }
}

/// Resynchronize, then read a frame
///
/// Returns `Ok(None)` if no marker turned up within `budget` read bytes
/// or before the line went idle. Once a marker is found this behaves
/// like [`read_command_after_marker`].
pub fn read_command_resync<T>(
    rx: &mut T,
    buffer: &mut CommandBuffer,
    budget: usize,
) -> Result<Option<FrameHeader>, T::Error>
where
    T: TransportRx + ?Sized,
{
    match resync(rx, budget)? {
        SyncStatus::Synced => read_command_after_marker(rx, buffer).map(Some),
        SyncStatus::Idle | SyncStatus::Exhausted => Ok(None),
    }
}

/// Skip an unread payload and its trailing checksum
///
/// For use after [`read_command`] rejected a frame with
/// `PayloadTooLarge`, so the next read starts at a frame boundary.
pub fn drain_payload<T>(rx: &mut T, payload_size: u8) -> Result<(), T::Error>
where
    T: TransportRx + ?Sized,
{
    for _ in 0..=payload_size {
        rx.read_byte().map_err(ProtocolError::Transport)?;
    }
    Ok(())
}

/// State machine for parsing incoming frames one byte at a time
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    command: RawCommand,
    payload_size: u8,
    sum: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the marker
    WaitingForMarker,
    /// Got the marker, waiting for the command id
    WaitingForCommand,
    /// Got the command id, waiting for the payload size
    WaitingForSize,
    /// Waiting for the header checksum
    WaitingForHeaderChecksum,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for the payload checksum
    WaitingForPayloadChecksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForMarker,
            command: RawCommand::new(0),
            payload_size: 0,
            sum: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForMarker;
        self.command.command_id = 0;
        self.command.payload.reset();
        self.payload_size = 0;
        self.sum = 0;
    }

    /// Returns true if the parser is between frames
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForMarker
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(command))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a checksum
    /// failure. Bytes before a marker are skipped silently, which is how
    /// the parser resynchronizes after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<RawCommand>> {
        match self.state {
            ParseState::WaitingForMarker => {
                if byte == PACKET_MARKER {
                    self.state = ParseState::WaitingForCommand;
                }
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                self.command.command_id = byte;
                self.state = ParseState::WaitingForSize;
                Ok(None)
            }
            ParseState::WaitingForSize => {
                self.payload_size = byte;
                self.state = ParseState::WaitingForHeaderChecksum;
                Ok(None)
            }
            ParseState::WaitingForHeaderChecksum => {
                let expected = header_checksum(self.command.command_id, self.payload_size);
                if byte != expected {
                    warn!(
                        "header checksum mismatch: expected {=u8:#x}, got {=u8:#x}",
                        expected,
                        byte
                    );
                    self.reset();
                    return Err(ProtocolError::HeaderChecksumMismatch {
                        expected,
                        found: byte,
                    });
                }
                self.command.payload.reset();
                self.sum = 0;
                self.state = if self.payload_size == 0 {
                    ParseState::WaitingForPayloadChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                // Capacity is MAX_PAYLOAD_SIZE, so a u8 size always fits
                self.command.payload.write_byte(byte)?;
                self.sum = self.sum.wrapping_add(byte);
                if self.command.payload.len() == self.payload_size as usize {
                    self.state = ParseState::WaitingForPayloadChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForPayloadChecksum => {
                if byte != self.sum {
                    let expected = self.sum;
                    warn!(
                        "payload checksum mismatch: expected {=u8:#x}, got {=u8:#x}",
                        expected,
                        byte
                    );
                    self.reset();
                    return Err(ProtocolError::PayloadChecksumMismatch {
                        expected,
                        found: byte,
                    });
                }

                let command = self.command.clone();
                self.reset();
                Ok(Some(command))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found along with the number of
    /// bytes consumed. Bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Result<Option<RawCommand>>) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                other => return (i + 1, other),
            }
        }
        (bytes.len(), Ok(None))
    }
}
