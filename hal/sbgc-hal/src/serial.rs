//! Serial line configuration
//!
//! Describes how the host side should set up the port before handing it to
//! the protocol as a transport. Opening and configuring the port itself is
//! left to the platform.

/// Serial line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (the controller only speaks 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// How long a read may wait for the first byte, in milliseconds
    pub read_timeout_ms: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout_ms: 200,
        }
    }
}

impl SerialConfig {
    /// Controller factory setting (115200 8N1)
    pub const DEFAULT_BAUD: u32 = 115200;

    /// Same framing as the default, at a different baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }

    /// 9600 baud, used by some Bluetooth bridges
    pub fn baud_9600() -> Self {
        Self::with_baudrate(9600)
    }

    /// 57600 baud
    pub fn baud_57600() -> Self {
        Self::with_baudrate(57600)
    }

    /// 230400 baud
    pub fn baud_230400() -> Self {
        Self::with_baudrate(230400)
    }

    /// Time to put one byte on the wire, in microseconds
    ///
    /// Counts start bit, data bits, parity and stop bits.
    pub fn byte_time_us(&self) -> u32 {
        let bits = 1 + self.data_bits.count() + self.parity.bits() + self.stop_bits.count();
        (bits * 1_000_000).div_ceil(self.baudrate.max(1))
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
}

impl DataBits {
    fn count(self) -> u32 {
        match self {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    fn bits(self) -> u32 {
        match self {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    fn count(self) -> u32 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}
