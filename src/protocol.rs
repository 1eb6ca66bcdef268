//! HydraNFC reader protocol constants
//!
//! The board multiplexes several personalities over one binary serial
//! interface; these are the opcodes understood once the reader personality
//! is active.

/// Personality identifier sent during the mode-selection handshake
pub const MODE_BYTE: u8 = 0x0C;
/// Four-byte name the device echoes when the personality is entered
pub const MODE_IDENT: &[u8; 4] = b"NFC1";

// Command opcodes
/// Switch the RF field off
pub const CMD_RF_OFF: u8 = 0x01;
/// Switch the RF field on
pub const CMD_RF_ON: u8 = 0x02;
/// Transmit 1-7 bits of a single byte
pub const CMD_SEND_BITS: u8 = 0x03;
/// Transmit a length-prefixed byte frame
pub const CMD_SEND_BYTES: u8 = 0x04;
/// Select ISO 14443 Type A timing and modulation
pub const CMD_SET_MODE_ISO14443A: u8 = 0x05;

/// Largest frame a single length byte can describe
pub const MAX_FRAME_LEN: usize = 255;
/// Most bits a bit-level transmit can carry
pub const MAX_SEND_BITS: u8 = 7;
/// Largest data value for a bit-level transmit (7 payload bits)
pub const MAX_BITS_DATA: u8 = 0x7F;
