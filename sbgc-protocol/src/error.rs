//! Protocol error type
//!
//! One enum covers buffer bookkeeping, framing and transport failures.
//! The type parameter carries the transport's own error, which is passed
//! through untouched. In-memory work (building or parsing a payload)
//! uses the default `Infallible`, since no channel is involved.

use core::convert::Infallible;
use core::fmt;

/// Errors that can occur while building, framing or parsing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError<E = Infallible> {
    /// Write past the buffer capacity
    CapacityExceeded,
    /// Incoming payload larger than the destination buffer
    ///
    /// The payload and its checksum are still waiting on the transport;
    /// skip them with [`crate::codec::drain_payload`] using `payload_size`.
    PayloadTooLarge { command_id: u8, payload_size: u8 },
    /// Read past the written data
    Underrun,
    /// String longer than the one-byte length prefix can describe
    StringTooLong { len: usize },
    /// String bytes are not valid UTF-8
    InvalidString,
    /// First byte of a frame was not the packet marker
    Framing { found: u8 },
    /// Header checksum did not cover command id and payload size
    HeaderChecksumMismatch { expected: u8, found: u8 },
    /// Payload checksum did not match the received payload
    PayloadChecksumMismatch { expected: u8, found: u8 },
    /// Frame carried a different command than the one being decoded
    UnexpectedCommand { expected: u8, found: u8 },
    /// The underlying channel failed
    Transport(E),
}

impl<E> ProtocolError<E> {
    /// Convert the transport error with `f`, leaving other variants alone
    pub fn map_transport<F>(self, f: impl FnOnce(E) -> F) -> ProtocolError<F> {
        match self {
            ProtocolError::CapacityExceeded => ProtocolError::CapacityExceeded,
            ProtocolError::PayloadTooLarge {
                command_id,
                payload_size,
            } => ProtocolError::PayloadTooLarge {
                command_id,
                payload_size,
            },
            ProtocolError::Underrun => ProtocolError::Underrun,
            ProtocolError::StringTooLong { len } => ProtocolError::StringTooLong { len },
            ProtocolError::InvalidString => ProtocolError::InvalidString,
            ProtocolError::Framing { found } => ProtocolError::Framing { found },
            ProtocolError::HeaderChecksumMismatch { expected, found } => {
                ProtocolError::HeaderChecksumMismatch { expected, found }
            }
            ProtocolError::PayloadChecksumMismatch { expected, found } => {
                ProtocolError::PayloadChecksumMismatch { expected, found }
            }
            ProtocolError::UnexpectedCommand { expected, found } => {
                ProtocolError::UnexpectedCommand { expected, found }
            }
            ProtocolError::Transport(e) => ProtocolError::Transport(f(e)),
        }
    }

    /// Returns true for failures that leave the link out of sync
    ///
    /// After one of these the caller should resynchronize before reading
    /// the next frame.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            ProtocolError::Framing { .. }
                | ProtocolError::HeaderChecksumMismatch { .. }
                | ProtocolError::PayloadChecksumMismatch { .. }
        )
    }
}

impl ProtocolError<Infallible> {
    /// Lift an in-memory error into any transport's error type
    pub fn widen<E>(self) -> ProtocolError<E> {
        self.map_transport(|never| match never {})
    }
}

impl<E: fmt::Display> fmt::Display for ProtocolError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::CapacityExceeded => f.write_str("payload capacity exceeded"),
            ProtocolError::PayloadTooLarge {
                command_id,
                payload_size,
            } => write!(
                f,
                "payload of {} bytes for command {} exceeds buffer capacity",
                payload_size, command_id
            ),
            ProtocolError::Underrun => f.write_str("read past end of payload"),
            ProtocolError::StringTooLong { len } => {
                write!(f, "string of {} bytes exceeds 255", len)
            }
            ProtocolError::InvalidString => f.write_str("string is not valid UTF-8"),
            ProtocolError::Framing { found } => {
                write!(f, "expected packet marker, found {:#04x}", found)
            }
            ProtocolError::HeaderChecksumMismatch { expected, found } => write!(
                f,
                "header checksum mismatch (expected {:#04x}, found {:#04x})",
                expected, found
            ),
            ProtocolError::PayloadChecksumMismatch { expected, found } => write!(
                f,
                "payload checksum mismatch (expected {:#04x}, found {:#04x})",
                expected, found
            ),
            ProtocolError::UnexpectedCommand { expected, found } => write!(
                f,
                "expected command {}, received {}",
                expected, found
            ),
            ProtocolError::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Result type for in-memory payload work
pub type Result<T, E = Infallible> = core::result::Result<T, ProtocolError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_keeps_variant() {
        let err: ProtocolError = ProtocolError::PayloadChecksumMismatch {
            expected: 5,
            found: 6,
        };
        let widened: ProtocolError<u16> = err.widen();
        assert_eq!(
            widened,
            ProtocolError::PayloadChecksumMismatch {
                expected: 5,
                found: 6
            }
        );
    }

    #[test]
    fn test_widen_keeps_payload_size() {
        let err: ProtocolError = ProtocolError::PayloadTooLarge {
            command_id: b'V',
            payload_size: 18,
        };
        assert_eq!(
            err.widen::<u16>(),
            ProtocolError::PayloadTooLarge {
                command_id: b'V',
                payload_size: 18
            }
        );
    }

    #[test]
    fn test_map_transport() {
        let err: ProtocolError<u8> = ProtocolError::Transport(7);
        assert_eq!(err.map_transport(u16::from), ProtocolError::Transport(7u16));
    }

    #[test]
    fn test_desync_classification() {
        assert!(ProtocolError::<()>::Framing { found: 0 }.is_desync());
        assert!(ProtocolError::<()>::HeaderChecksumMismatch {
            expected: 1,
            found: 2
        }
        .is_desync());
        assert!(!ProtocolError::<()>::CapacityExceeded.is_desync());
        assert!(!ProtocolError::<()>::PayloadTooLarge {
            command_id: 1,
            payload_size: 9
        }
        .is_desync());
        assert!(!ProtocolError::Transport(()).is_desync());
    }
}
