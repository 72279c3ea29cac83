//! SimpleBGC Serial API (version 1)
//!
//! This crate implements the host side of the binary protocol spoken by
//! SimpleBGC gimbal controllers over a UART-like link: payload field
//! encoding, packet framing with checksums, and decoding of replies from a
//! byte stream that may drop or corrupt bytes.
//!
//! # Protocol Overview
//!
//! Every command travels in one frame:
//! ```text
//! ┌────────┬─────────┬──────┬───────────┬─────────────┬──────────┐
//! │ MARKER │ COMMAND │ SIZE │ HDR CKSUM │ PAYLOAD     │ CHECKSUM │
//! │ 1B '>' │ 1B      │ 1B   │ 1B        │ 0–255B      │ 1B       │
//! └────────┴─────────┴──────┴───────────┴─────────────┴──────────┘
//! ```
//!
//! The header checksum is `(COMMAND + SIZE) mod 256`; the payload checksum
//! is the byte sum of the payload mod 256. Payload fields are
//! little-endian.
//!
//! The exchange is one request, one reply: build a payload in a
//! [`CommandBuffer`], frame it onto a transport with
//! [`codec::write_command`], then pull the reply back with
//! [`codec::read_command`] and decode its fields.
//!
//! Transports come from `sbgc-hal`; the codec only borrows them.

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod buffer;
pub mod codec;
pub mod codes;
pub mod command;
pub mod error;
pub mod messages;
pub mod stream;

pub use buffer::CommandBuffer;
pub use codec::{
    read_command, write_command, FrameHeader, FrameParser, SyncStatus, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE, PACKET_MARKER, PROTOCOL_VERSION,
};
pub use command::{Command, Message, RawCommand};
pub use error::ProtocolError;
pub use stream::{ByteSink, ByteSource, TransportStream, MAX_STRING_LENGTH};
