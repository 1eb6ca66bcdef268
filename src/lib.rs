//! hydranfc - HydraNFC ISO14443-A reader support
//!
//! This crate drives the NFC reader personality of a Hydrabus board fitted
//! with the HydraNFC shield, over the board's binary serial interface.
//!
//! # Protocol Overview
//!
//! The board multiplexes several protocol personalities over one serial
//! link; the reader personality is selected with a single mode byte and
//! acknowledged with a four-byte identifier. Once active, every operation
//! is a fixed one-byte opcode optionally followed by a payload, and the
//! two transmit commands answer with a single length byte followed by that
//! many payload bytes.
//!
//! # Supported Transports
//!
//! - Serial port: `/dev/ttyACM0`, `COM3`, etc.
//! - TCP socket: `host:port` (serial-over-TCP bridge)
//!
//! # Example
//!
//! ```no_run
//! use hydranfc::open_serial;
//!
//! // Power a card and read its answer to REQA
//! let mut reader = open_serial("/dev/ttyACM0", None)?;
//! reader.set_mode_iso14443a()?;
//! reader.rf_on()?;
//! let atqa = reader.send_bits(0x26, 7)?;
//! println!("ATQA: {:02X?}", atqa);
//! let ats = reader.send_bytes("00A404000E325041592E5359532E4444463031")?;
//! println!("Answer: {:02X?}", ats);
//! reader.rf_off()?;
//! # Ok::<(), hydranfc::HydraNfcError>(())
//! ```

pub mod device;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports
pub use device::NfcReader;
pub use error::{HydraNfcError, Result};
pub use transport::serial::SerialTransport;
pub use transport::tcp::TcpTransport;
pub use transport::Transport;

/// Connection options for reaching the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// Serial port connection
    Serial {
        /// Device path (e.g., "/dev/ttyACM0" or "COM3")
        device: String,
        /// Baud rate (None for the CDC-ACM default)
        baud: Option<u32>,
    },
    /// TCP socket connection
    Tcp {
        /// Hostname or IP address
        host: String,
        /// Port number
        port: u16,
    },
}

impl Connection {
    /// Parse a connection string
    ///
    /// Formats:
    /// - `dev=/dev/ttyACM0` - Serial with default baud
    /// - `dev=/dev/ttyACM0:115200` - Serial with specified baud
    /// - `ip=host:port` - TCP connection
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        if let Some(dev) = s.strip_prefix("dev=") {
            // Serial connection
            if let Some((device, baud_str)) = dev.rsplit_once(':') {
                let baud = baud_str
                    .parse()
                    .map_err(|_| format!("Invalid baud rate: {}", baud_str))?;
                Ok(Connection::Serial {
                    device: device.to_string(),
                    baud: Some(baud),
                })
            } else {
                Ok(Connection::Serial {
                    device: dev.to_string(),
                    baud: None,
                })
            }
        } else if let Some(ip) = s.strip_prefix("ip=") {
            // TCP connection
            let (host, port_str) = ip
                .rsplit_once(':')
                .ok_or_else(|| "Missing port in ip= parameter".to_string())?;
            let port = port_str
                .parse()
                .map_err(|_| format!("Invalid port: {}", port_str))?;
            Ok(Connection::Tcp {
                host: host.to_string(),
                port,
            })
        } else {
            Err(format!(
                "Invalid connection string: {}. Use dev=... or ip=...",
                s
            ))
        }
    }
}

/// Open a reader from a connection string
///
/// Handles both serial and TCP connections and returns a session over a
/// type-erased transport.
pub fn open(options: &str) -> Result<NfcReader<Box<dyn Transport>>> {
    let conn = Connection::parse(options).map_err(HydraNfcError::InvalidParameter)?;

    let transport: Box<dyn Transport> = match conn {
        Connection::Serial { device, baud } => Box::new(SerialTransport::open(&device, baud)?),
        Connection::Tcp { host, port } => Box::new(TcpTransport::connect(&host, port)?),
    };

    NfcReader::new(transport)
}

/// Open a reader attached via serial port
pub fn open_serial(device: &str, baud: Option<u32>) -> Result<NfcReader<SerialTransport>> {
    let transport = SerialTransport::open(device, baud)?;
    NfcReader::new(transport)
}

/// Open a reader reachable via a TCP serial bridge
pub fn open_tcp(host: &str, port: u16) -> Result<NfcReader<TcpTransport>> {
    let transport = TcpTransport::connect(host, port)?;
    NfcReader::new(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serial_connection_strings() {
        assert_eq!(
            Connection::parse("dev=/dev/ttyACM0").unwrap(),
            Connection::Serial {
                device: "/dev/ttyACM0".to_string(),
                baud: None,
            }
        );
        assert_eq!(
            Connection::parse("dev=/dev/ttyACM0:57600").unwrap(),
            Connection::Serial {
                device: "/dev/ttyACM0".to_string(),
                baud: Some(57600),
            }
        );
    }

    #[test]
    fn parse_tcp_connection_strings() {
        assert_eq!(
            Connection::parse("ip=bridge.local:4000").unwrap(),
            Connection::Tcp {
                host: "bridge.local".to_string(),
                port: 4000,
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_forms() {
        assert!(Connection::parse("/dev/ttyACM0").is_err());
        assert!(Connection::parse("ip=no-port").is_err());
        assert!(Connection::parse("dev=/dev/ttyACM0:fast").is_err());
    }
}
