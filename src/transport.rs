//! Transport layer abstraction for Hydrabus communication
//!
//! This module provides a unified interface for serial and TCP transports.

use crate::error::{HydraNfcError, Result};

/// Transport trait for reading and writing bytes
pub trait Transport {
    /// Write bytes to the transport
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read bytes from the transport
    ///
    /// Reads exactly `buf.len()` bytes into the buffer.
    /// Returns an error if not enough bytes arrive before the transport's
    /// deadline.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<()>;
}

impl Transport for Box<dyn Transport> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

pub mod serial {
    //! Serial port transport implementation

    use super::*;
    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::io::{Read, Write};
    use std::time::Duration;

    /// Serial port transport
    pub struct SerialTransport {
        port: Box<dyn SerialPort>,
    }

    impl SerialTransport {
        /// Open a serial port with the specified baud rate
        ///
        /// The board enumerates as a CDC-ACM device; `None` selects the
        /// usual 115200 baud.
        pub fn open(device: &str, baud: Option<u32>) -> Result<Self> {
            let baud_rate = baud.unwrap_or(115200);

            let port = serialport::new(device, baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(Duration::from_secs(5))
                .open()?;

            log::info!("Opened serial port {} at {} baud", device, baud_rate);

            Ok(Self { port })
        }

        /// Set the read timeout
        pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
            self.port.set_timeout(timeout)?;
            Ok(())
        }
    }

    impl Transport for SerialTransport {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.port.write_all(data)?;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<()> {
            self.port.read_exact(buf)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.port.flush()?;
            Ok(())
        }
    }
}

pub mod tcp {
    //! TCP socket transport implementation
    //!
    //! For boards exposed through a ser2net-style serial bridge.

    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::time::Duration;

    /// TCP socket transport
    pub struct TcpTransport {
        stream: TcpStream,
    }

    impl TcpTransport {
        /// Connect to a serial bridge at the specified host and port
        pub fn connect(host: &str, port: u16) -> Result<Self> {
            let addr = format!("{}:{}", host, port);
            log::info!("Connecting to serial bridge at {}", addr);

            let stream = TcpStream::connect(&addr)
                .map_err(|e| HydraNfcError::ConnectionFailed(e.to_string()))?;

            // Set TCP_NODELAY to reduce latency
            stream.set_nodelay(true).map_err(|e| {
                HydraNfcError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
            })?;

            // Set default timeouts
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .map_err(|e| {
                    HydraNfcError::ConnectionFailed(format!("Failed to set read timeout: {}", e))
                })?;
            stream
                .set_write_timeout(Some(Duration::from_secs(5)))
                .map_err(|e| {
                    HydraNfcError::ConnectionFailed(format!("Failed to set write timeout: {}", e))
                })?;

            Ok(Self { stream })
        }
    }

    impl Transport for TcpTransport {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.stream.write_all(data)?;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<()> {
            self.stream.read_exact(buf)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.stream.flush()?;
            Ok(())
        }
    }
}
