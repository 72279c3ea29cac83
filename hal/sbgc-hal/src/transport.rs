//! Byte transport abstractions
//!
//! The protocol only ever moves one byte at a time, so a transport needs
//! just three capabilities: write a byte, read a byte, and report how many
//! bytes are waiting. Chip HALs, OS serial ports and test doubles implement
//! these traits; the codec borrows them for one frame exchange and never
//! opens or closes the underlying channel.

/// Transmit half of a byte transport
pub trait TransportTx {
    /// Error type for transmit operations
    type Error;

    /// Write a single byte to the channel
    ///
    /// May block until the byte has been accepted by the channel.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write every byte of `data`, stopping at the first failure
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Receive half of a byte transport
pub trait TransportRx {
    /// Error type for receive operations
    type Error;

    /// Read a single byte from the channel
    ///
    /// May block until a byte arrives. Timeouts are the transport's
    /// business and are reported through `Self::Error`.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Number of bytes that can be read right now without blocking
    ///
    /// Callers use this to build their own polling loop before reading a
    /// frame. Implementations that cannot count report 1 when at least one
    /// byte is ready.
    fn bytes_available(&mut self) -> u16;
}

/// Combined byte transport
///
/// For channels that provide both directions on a single handle.
pub trait Transport: TransportTx + TransportRx {}

// Blanket implementation
impl<T: TransportTx + TransportRx> Transport for T {}

impl<T: TransportTx + ?Sized> TransportTx for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

impl<T: TransportRx + ?Sized> TransportRx for &mut T {
    type Error = T::Error;

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }

    fn bytes_available(&mut self) -> u16 {
        (**self).bytes_available()
    }
}
