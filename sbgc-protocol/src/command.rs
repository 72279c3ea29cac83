//! Command abstraction
//!
//! The codec frames anything that implements [`Command`]; it never looks
//! inside the payload. Typed catalog entries implement [`Message`] and
//! convert to and from the opaque [`RawCommand`] the codec produces.

use sbgc_hal::TransportRx;

use crate::buffer::CommandBuffer;
use crate::codec;
use crate::error::{ProtocolError, Result};
use crate::stream::{ByteSink, ByteSource};
use crate::PROTOCOL_VERSION;

/// Anything the codec can put on the wire
pub trait Command {
    /// Command identifier byte
    fn command_id(&self) -> u8;

    /// Protocol version the command is framed with
    fn version(&self) -> u8;

    /// Payload buffer; its written span is what gets framed
    fn payload(&self) -> &CommandBuffer;
}

/// An opaque `(command_id, version, payload)` command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawCommand {
    /// Command identifier byte
    pub command_id: u8,
    /// Protocol version
    pub version: u8,
    /// Payload data
    pub payload: CommandBuffer,
}

impl RawCommand {
    /// Create a command with an empty full-capacity payload
    pub fn new(command_id: u8) -> Self {
        Self {
            command_id,
            version: PROTOCOL_VERSION,
            payload: CommandBuffer::new(),
        }
    }

    /// Create a command carrying a copy of `payload`
    pub fn with_payload(command_id: u8, payload: &[u8]) -> Result<Self> {
        Ok(Self {
            command_id,
            version: PROTOCOL_VERSION,
            payload: CommandBuffer::from_slice(payload)?,
        })
    }

    /// Read one frame from `rx` into a fresh command
    ///
    /// See [`codec::read_command`] for the failure modes.
    pub fn read_from<T: TransportRx>(rx: &mut T) -> Result<Self, T::Error> {
        let mut command = Self::new(0);
        let header = codec::read_command(rx, &mut command.payload)?;
        command.command_id = header.command_id;
        Ok(command)
    }
}

impl Command for RawCommand {
    fn command_id(&self) -> u8 {
        self.command_id
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn payload(&self) -> &CommandBuffer {
        &self.payload
    }
}

/// A typed command from the controller's catalog
///
/// Implementors describe their field layout once with the stream helpers;
/// conversion to and from [`RawCommand`] comes for free. The catalog is
/// open: new commands only need this trait.
pub trait Message: Sized {
    /// Command identifier byte
    const COMMAND_ID: u8;

    /// Write this command's fields
    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError>;

    /// Read this command's fields
    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError>;

    /// Build a framable command
    fn to_command(&self) -> Result<RawCommand> {
        let mut command = RawCommand::new(Self::COMMAND_ID);
        self.write_payload(&mut command.payload)?;
        Ok(command)
    }

    /// Decode a received command, checking its id first
    ///
    /// Reads from the payload's current read position.
    fn from_command(command: &mut RawCommand) -> Result<Self> {
        if command.command_id != Self::COMMAND_ID {
            return Err(ProtocolError::UnexpectedCommand {
                expected: Self::COMMAND_ID,
                found: command.command_id,
            });
        }
        Self::read_payload(&mut command.payload)
    }
}
