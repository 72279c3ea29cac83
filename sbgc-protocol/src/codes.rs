//! Single-byte enumerations carried inside command payloads

/// Error codes reported by the controller in an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// Payload size did not match the command
    CommandSize,
    /// Parameters out of range
    WrongParams,
    /// Device id could not be read
    GetDeviceId,
    /// Encryption failure
    Crypto,
    /// Battery voltage calibration failed
    CalibrateBattery,
    /// Command id not recognized
    UnknownCommand,
}

// Wire format values
const ERR_CMD_SIZE: u8 = 1;
const ERR_WRONG_PARAMS: u8 = 2;
const ERR_GET_DEVICE_ID: u8 = 3;
const ERR_CRYPTO: u8 = 4;
const ERR_CALIBRATE_BAT: u8 = 5;
const ERR_UNKNOWN_COMMAND: u8 = 6;

impl ErrorCode {
    /// Parse an error code from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ERR_CMD_SIZE => Some(ErrorCode::CommandSize),
            ERR_WRONG_PARAMS => Some(ErrorCode::WrongParams),
            ERR_GET_DEVICE_ID => Some(ErrorCode::GetDeviceId),
            ERR_CRYPTO => Some(ErrorCode::Crypto),
            ERR_CALIBRATE_BAT => Some(ErrorCode::CalibrateBattery),
            ERR_UNKNOWN_COMMAND => Some(ErrorCode::UnknownCommand),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            ErrorCode::CommandSize => ERR_CMD_SIZE,
            ErrorCode::WrongParams => ERR_WRONG_PARAMS,
            ErrorCode::GetDeviceId => ERR_GET_DEVICE_ID,
            ErrorCode::Crypto => ERR_CRYPTO,
            ErrorCode::CalibrateBattery => ERR_CALIBRATE_BAT,
            ErrorCode::UnknownCommand => ERR_UNKNOWN_COMMAND,
        }
    }
}

/// How the motors are switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorsOffMode {
    /// Cut power immediately
    #[default]
    Normal,
    /// Short the motor windings to brake
    Brake,
    /// Ramp power down before cutting it
    SafeStop,
}

impl MotorsOffMode {
    /// Parse a mode from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(MotorsOffMode::Normal),
            1 => Some(MotorsOffMode::Brake),
            2 => Some(MotorsOffMode::SafeStop),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MotorsOffMode::Normal => 0,
            MotorsOffMode::Brake => 1,
            MotorsOffMode::SafeStop => 2,
        }
    }
}

/// Menu actions, as triggered by buttons, RC channels or the execute
/// menu command. Only the commonly scripted subset is named here.
pub mod menu {
    pub const PROFILE1: u8 = 1;
    pub const PROFILE2: u8 = 2;
    pub const PROFILE3: u8 = 3;
    pub const SWAP_PITCH_ROLL: u8 = 4;
    pub const SWAP_YAW_ROLL: u8 = 5;
    pub const CALIB_ACC: u8 = 6;
    pub const RESET: u8 = 7;
    pub const SET_ANGLE: u8 = 8;
    pub const CALIB_GYRO: u8 = 9;
    pub const MOTOR_TOGGLE: u8 = 10;
    pub const MOTOR_ON: u8 = 11;
    pub const MOTOR_OFF: u8 = 12;
    pub const FRAME_UPSIDE_DOWN: u8 = 13;
    pub const AUTO_PID: u8 = 16;
    pub const LOOK_DOWN: u8 = 17;
    pub const HOME_POSITION: u8 = 18;
    pub const CALIB_MAG: u8 = 33;
    pub const LEVEL_ROLL_PITCH: u8 = 34;
    pub const CENTER_YAW: u8 = 35;
    pub const UNTWIST_CABLES: u8 = 36;
}
