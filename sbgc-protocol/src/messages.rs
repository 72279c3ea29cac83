//! Representative commands from the controller's catalog
//!
//! Command IDs are single ASCII characters for most commands:
//! - Host → Controller: board info request, motors on/off, execute menu
//! - Controller → Host: board info, confirm, error
//!
//! Each type only describes its field layout; framing is the codec's job.
//! More commands are added the same way, by implementing [`Message`].

use heapless::Vec;

use crate::codes::{ErrorCode, MotorsOffMode};
use crate::command::Message;
use crate::error::{ProtocolError, Result};
use crate::stream::{ByteSink, ByteSource};

// Command IDs
pub const CMD_BOARD_INFO: u8 = b'V';
pub const CMD_MOTORS_ON: u8 = b'M';
pub const CMD_MOTORS_OFF: u8 = b'm';
pub const CMD_EXECUTE_MENU: u8 = b'E';
pub const CMD_CONFIRM: u8 = b'C';
pub const CMD_ERROR: u8 = 255;

/// Reserved tail of the board info reply
const BOARD_INFO_RESERVED: usize = 7;

/// Read one more byte if the payload has it
///
/// Trailing optional fields are detected by running out of payload, so
/// this is only meaningful on a [`crate::CommandBuffer`].
fn read_optional_byte<S: ByteSource>(input: &mut S) -> Result<Option<u8>, S::TransportError> {
    match input.read_byte() {
        Ok(byte) => Ok(Some(byte)),
        Err(ProtocolError::Underrun) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Ask the controller for its board and firmware versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardInfoRequest {
    /// Configuration word, 0 for the plain reply
    pub cfg: u16,
}

impl Message for BoardInfoRequest {
    const COMMAND_ID: u8 = CMD_BOARD_INFO;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        out.write_word(self.cfg)
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        Ok(Self {
            cfg: input.read_word()?,
        })
    }
}

/// Board and firmware description sent in reply to [`BoardInfoRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardInfo {
    /// Hardware revision times ten
    pub board_version: u8,
    /// Firmware version, e.g. 2687 for 2.68b7
    pub firmware_version: u16,
    /// State flags (bit 0: debug mode)
    pub state_flags: u8,
    /// Feature bitmask
    pub board_features: u16,
    /// Connection type (0: normal, 1: USB HID)
    pub connection_flag: u8,
    /// Firmware build identifier
    pub firmware_extra_id: u32,
}

impl BoardInfo {
    /// Firmware version split into `(major, minor, beta)`
    pub fn firmware_parts(&self) -> (u8, u8, u8) {
        let v = self.firmware_version;
        ((v / 1000) as u8, ((v % 1000) / 10) as u8, (v % 10) as u8)
    }
}

impl Message for BoardInfo {
    const COMMAND_ID: u8 = CMD_BOARD_INFO;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        out.write_byte(self.board_version)?;
        out.write_word(self.firmware_version)?;
        out.write_byte(self.state_flags)?;
        out.write_word(self.board_features)?;
        out.write_byte(self.connection_flag)?;
        out.write_long(self.firmware_extra_id)?;
        out.write_empty_buffer(BOARD_INFO_RESERVED)
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        let info = Self {
            board_version: input.read_byte()?,
            firmware_version: input.read_word()?,
            state_flags: input.read_byte()?,
            board_features: input.read_word()?,
            connection_flag: input.read_byte()?,
            firmware_extra_id: input.read_long()?,
        };
        input.skip_bytes(BOARD_INFO_RESERVED)?;
        Ok(info)
    }
}

/// Switch the motors on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorsOn;

impl Message for MotorsOn {
    const COMMAND_ID: u8 = CMD_MOTORS_ON;

    fn write_payload<S: ByteSink>(&self, _out: &mut S) -> Result<(), S::TransportError> {
        Ok(())
    }

    fn read_payload<S: ByteSource>(_input: &mut S) -> Result<Self, S::TransportError> {
        Ok(MotorsOn)
    }
}

/// Switch the motors off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorsOff {
    /// Mode byte; older firmware sends the command without one
    pub mode: Option<u8>,
}

impl MotorsOff {
    /// Switch off using a specific mode
    pub fn with_mode(mode: MotorsOffMode) -> Self {
        Self {
            mode: Some(mode.to_byte()),
        }
    }

    /// The requested mode, `Normal` when none was given
    pub fn off_mode(&self) -> Option<MotorsOffMode> {
        match self.mode {
            Some(byte) => MotorsOffMode::from_byte(byte),
            None => Some(MotorsOffMode::Normal),
        }
    }
}

impl Message for MotorsOff {
    const COMMAND_ID: u8 = CMD_MOTORS_OFF;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        match self.mode {
            Some(mode) => out.write_byte(mode),
            None => Ok(()),
        }
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        Ok(Self {
            mode: read_optional_byte(input)?,
        })
    }
}

/// Run a menu action as if it had been picked on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExecuteMenu {
    /// Action id, see [`crate::codes::menu`]
    pub action: u8,
}

impl Message for ExecuteMenu {
    const COMMAND_ID: u8 = CMD_EXECUTE_MENU;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        out.write_byte(self.action)
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        Ok(Self {
            action: input.read_byte()?,
        })
    }
}

/// Positive acknowledgement of a host command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Confirm {
    /// Id of the command being confirmed
    pub command_id: u8,
    /// Command-specific data, zero to two bytes
    pub data: Vec<u8, 2>,
}

impl Confirm {
    /// Confirmation without data
    pub fn of(command_id: u8) -> Self {
        Self {
            command_id,
            data: Vec::new(),
        }
    }

    /// Returns true if this confirms the command with id `command_id`
    pub fn confirms(&self, command_id: u8) -> bool {
        self.command_id == command_id
    }
}

impl Message for Confirm {
    const COMMAND_ID: u8 = CMD_CONFIRM;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        out.write_byte(self.command_id)?;
        out.write_buffer(&self.data)
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        let mut confirm = Self::of(input.read_byte()?);
        while !confirm.data.is_full() {
            match read_optional_byte(input)? {
                // Never fails, the loop stops when full
                Some(byte) => {
                    let _ = confirm.data.push(byte);
                }
                None => break,
            }
        }
        Ok(confirm)
    }
}

/// Negative acknowledgement of a host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorReply {
    /// Raw error code, see [`ErrorCode`]
    pub code: u8,
    /// Error-specific data
    pub data: [u8; 4],
}

impl ErrorReply {
    /// Create a reply for a known error code
    pub fn new(code: ErrorCode, data: [u8; 4]) -> Self {
        Self {
            code: code.to_byte(),
            data,
        }
    }

    /// The error code, if it is one this crate knows
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_byte(self.code)
    }
}

impl Message for ErrorReply {
    const COMMAND_ID: u8 = CMD_ERROR;

    fn write_payload<S: ByteSink>(&self, out: &mut S) -> Result<(), S::TransportError> {
        out.write_byte(self.code)?;
        out.write_buffer(&self.data)
    }

    fn read_payload<S: ByteSource>(input: &mut S) -> Result<Self, S::TransportError> {
        Ok(Self {
            code: input.read_byte()?,
            data: input.read_byte_array()?,
        })
    }
}
