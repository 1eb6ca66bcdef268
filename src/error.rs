//! Error types for HydraNFC operations

use thiserror::Error;

/// Errors produced by the reader session and its transports
#[derive(Debug, Error)]
pub enum HydraNfcError {
    /// Failed to connect to the board
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The device did not acknowledge the reader personality
    #[error("Mode selection failed, device answered {0:02X?}")]
    ModeSelectFailed([u8; 4]),

    /// Caller-supplied argument outside the contracted range
    ///
    /// Raised before any byte is written, so the device never sees a
    /// malformed frame.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error during communication
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serial port error
    #[error("Serial port error: {0}")]
    SerialError(#[from] serialport::Error),
}

/// Result type for HydraNFC operations
pub type Result<T> = core::result::Result<T, HydraNfcError>;

impl From<std::io::Error> for HydraNfcError {
    fn from(e: std::io::Error) -> Self {
        HydraNfcError::IoError(e.to_string())
    }
}
