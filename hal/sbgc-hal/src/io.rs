//! Adapter for `embedded-io` streams
//!
//! Lets any blocking `embedded_io` stream (a chip HAL UART, a USB CDC
//! class, a host serial port wrapped by `embedded-io-adapters`) serve as
//! a protocol transport.

use embedded_io::{Read, ReadExactError, ReadReady, Write};

use crate::transport::{TransportRx, TransportTx};

/// Transport over an `embedded_io` stream
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
}

impl<T> IoTransport<T> {
    /// Wrap a stream
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped stream
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped stream
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> TransportTx for IoTransport<T> {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.inner.write_all(&[byte])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: Read + ReadReady> TransportRx for IoTransport<T> {
    type Error = ReadExactError<T::Error>;

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// `ReadReady` only says whether a read would block, so this reports
    /// at most one byte. A failed readiness query counts as nothing ready.
    fn bytes_available(&mut self) -> u16 {
        match self.inner.read_ready() {
            Ok(true) => 1,
            Ok(false) | Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{ErrorKind, ErrorType};

    /// Stream backed by a fixed input slice and a small output array
    struct SliceStream<'a> {
        input: &'a [u8],
        output: [u8; 8],
        written: usize,
        ready_fails: bool,
    }

    impl<'a> SliceStream<'a> {
        fn new(input: &'a [u8]) -> Self {
            Self {
                input,
                output: [0; 8],
                written: 0,
                ready_fails: false,
            }
        }
    }

    impl ErrorType for SliceStream<'_> {
        type Error = ErrorKind;
    }

    impl Read for SliceStream<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.input.len());
            buf[..n].copy_from_slice(&self.input[..n]);
            self.input = &self.input[n..];
            Ok(n)
        }
    }

    impl ReadReady for SliceStream<'_> {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            if self.ready_fails {
                return Err(ErrorKind::Other);
            }
            Ok(!self.input.is_empty())
        }
    }

    impl Write for SliceStream<'_> {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.written == self.output.len() {
                return Err(ErrorKind::OutOfMemory);
            }
            let n = buf.len().min(self.output.len() - self.written);
            self.output[self.written..self.written + n].copy_from_slice(&buf[..n]);
            self.written += n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_read_until_eof() {
        let mut transport = IoTransport::new(SliceStream::new(&[0x3E, 0x01]));

        assert_eq!(transport.bytes_available(), 1);
        assert_eq!(transport.read_byte(), Ok(0x3E));
        assert_eq!(transport.read_byte(), Ok(0x01));
        assert_eq!(transport.bytes_available(), 0);
        assert_eq!(transport.read_byte(), Err(ReadExactError::UnexpectedEof));
    }

    #[test]
    fn test_failed_readiness_reports_nothing() {
        let mut stream = SliceStream::new(&[0x3E]);
        stream.ready_fails = true;
        let mut transport = IoTransport::new(stream);

        assert_eq!(transport.bytes_available(), 0);
        // The byte is still there for a blocking read
        assert_eq!(transport.read_byte(), Ok(0x3E));

        transport.inner_mut().ready_fails = false;
        assert_eq!(transport.bytes_available(), 0);
    }

    #[test]
    fn test_write_passes_through() {
        let mut transport = IoTransport::new(SliceStream::new(&[]));
        transport.write_byte(0x3E).unwrap();
        transport.write_all(&[1, 2, 3]).unwrap();
        transport.flush().unwrap();

        let stream = transport.into_inner();
        assert_eq!(&stream.output[..stream.written], &[0x3E, 1, 2, 3]);
    }

    #[test]
    fn test_write_error_is_surfaced() {
        let mut transport = IoTransport::new(SliceStream::new(&[]));
        transport.write_all(&[0; 8]).unwrap();
        assert_eq!(transport.write_byte(0xFF), Err(ErrorKind::OutOfMemory));
    }
}
