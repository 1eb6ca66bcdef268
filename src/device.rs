//! HydraNFC reader session
//!
//! This module provides the `NfcReader` struct that drives the reader
//! personality's command set on top of a [`Transport`].

use crate::error::{HydraNfcError, Result};
use crate::protocol::*;
use crate::transport::Transport;

/// HydraNFC reader session
///
/// Owns its transport exclusively. Every operation is a blocking write
/// followed, for the two transmit commands, by one length-prefixed read;
/// replies are matched to commands purely by issue order, so `&mut self`
/// keeps a single exchange in flight per session.
#[derive(Debug)]
pub struct NfcReader<T: Transport> {
    transport: T,
}

impl<T: Transport> NfcReader<T> {
    /// Activate the reader personality on an already-open transport
    ///
    /// Writes the personality's mode byte and verifies the four-byte
    /// identifier the device echoes back.
    pub fn new(mut transport: T) -> Result<Self> {
        transport.write(&[MODE_BYTE])?;

        let mut ident = [0u8; 4];
        transport.read(&mut ident)?;
        if &ident != MODE_IDENT {
            return Err(HydraNfcError::ModeSelectFailed(ident));
        }
        log::debug!("hydranfc: Reader personality active");

        Ok(Self { transport })
    }

    /// Configure the reader to communicate with ISO 14443 Type A cards
    pub fn set_mode_iso14443a(&mut self) -> Result<()> {
        self.transport.write(&[CMD_SET_MODE_ISO14443A])
    }

    /// Switch the RF field off (the card loses power)
    pub fn rf_off(&mut self) -> Result<()> {
        self.transport.write(&[CMD_RF_OFF])
    }

    /// Switch the RF field on
    pub fn rf_on(&mut self) -> Result<()> {
        self.transport.write(&[CMD_RF_ON])
    }

    /// Transmit the `nb_bits` low-order bits of `data` to the card
    ///
    /// Bit-level framing is what the short ISO 14443-A preambles (REQA,
    /// WUPA) use. `data` must fit in 7 bits and `nb_bits` must be between
    /// 1 and 7. Returns the card's answer.
    pub fn send_bits(&mut self, data: u8, nb_bits: u8) -> Result<Vec<u8>> {
        if data > MAX_BITS_DATA {
            return Err(HydraNfcError::InvalidParameter(format!(
                "data value 0x{:02X} does not fit in 7 bits",
                data
            )));
        }
        if !(1..=MAX_SEND_BITS).contains(&nb_bits) {
            return Err(HydraNfcError::InvalidParameter(format!(
                "bit count {} must be between 1 and 7",
                nb_bits
            )));
        }

        self.transport.write(&[CMD_SEND_BITS])?;
        self.transport.write(&[data, nb_bits])?;

        self.read_reply()
    }

    /// Transmit a frame given as a hexadecimal string
    ///
    /// Convenience wrapper over [`NfcReader::send_raw`] for APDU-style
    /// input. Returns the card's answer.
    pub fn send_bytes(&mut self, data: &str) -> Result<Vec<u8>> {
        let raw = hex::decode(data).map_err(|_| {
            HydraNfcError::InvalidParameter("data must be a hexadecimal string".to_string())
        })?;
        self.send_raw(&raw)
    }

    /// Transmit a raw byte frame to the card
    ///
    /// The frame is length-prefixed on the wire, so it cannot exceed
    /// [`MAX_FRAME_LEN`] bytes.
    pub fn send_raw(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() > MAX_FRAME_LEN {
            return Err(HydraNfcError::InvalidParameter(format!(
                "frame of {} bytes exceeds the {}-byte limit",
                data.len(),
                MAX_FRAME_LEN
            )));
        }

        self.transport.write(&[CMD_SEND_BYTES])?;
        self.transport.write(&[data.len() as u8])?;
        self.transport.write(data)?;

        self.read_reply()
    }

    /// Read one length-prefixed reply
    ///
    /// Both transmit commands answer with a single length byte followed by
    /// exactly that many payload bytes. A zero length is a complete, empty
    /// answer.
    fn read_reply(&mut self) -> Result<Vec<u8>> {
        let mut len = [0u8];
        self.transport.read(&mut len)?;

        let len = len[0] as usize;
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut payload = vec![0u8; len];
        self.transport.read(&mut payload)?;
        Ok(payload)
    }
}

impl<T: Transport> Drop for NfcReader<T> {
    fn drop(&mut self) {
        // RF off, best effort
        if self.transport.write(&[CMD_RF_OFF]).is_ok() {
            log::debug!("hydranfc: RF field disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted transport: records every write, serves canned reply bytes.
    #[derive(Debug)]
    struct MockTransport {
        written: Rc<RefCell<Vec<u8>>>,
        replies: VecDeque<u8>,
    }

    impl Transport for MockTransport {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.written.borrow_mut().extend_from_slice(data);
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<()> {
            for slot in buf.iter_mut() {
                *slot = self
                    .replies
                    .pop_front()
                    .ok_or_else(|| HydraNfcError::IoError("reply queue exhausted".to_string()))?;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Activated reader whose device will answer with `replies` after the
    /// activation echo. The returned write log starts empty.
    fn reader(replies: &[u8]) -> (NfcReader<MockTransport>, Rc<RefCell<Vec<u8>>>) {
        let written = Rc::new(RefCell::new(Vec::new()));
        let mut queue: VecDeque<u8> = MODE_IDENT.iter().copied().collect();
        queue.extend(replies);
        let transport = MockTransport {
            written: Rc::clone(&written),
            replies: queue,
        };
        let reader = NfcReader::new(transport).unwrap();
        written.borrow_mut().clear();
        (reader, written)
    }

    #[test]
    fn activation_writes_mode_byte_and_checks_echo() {
        let written = Rc::new(RefCell::new(Vec::new()));
        let transport = MockTransport {
            written: Rc::clone(&written),
            replies: MODE_IDENT.iter().copied().collect(),
        };
        NfcReader::new(transport).unwrap();
        assert_eq!(written.borrow()[0], MODE_BYTE);
    }

    #[test]
    fn activation_rejects_unknown_echo() {
        let transport = MockTransport {
            written: Rc::new(RefCell::new(Vec::new())),
            replies: b"SPI1".iter().copied().collect(),
        };
        let err = NfcReader::new(transport).unwrap_err();
        assert!(matches!(err, HydraNfcError::ModeSelectFailed(_)));
    }

    #[test]
    fn send_bits_frames_opcode_data_and_bit_count() {
        let (mut reader, written) = reader(&[0x00]);
        reader.send_bits(0x26, 7).unwrap();
        assert_eq!(*written.borrow(), vec![CMD_SEND_BITS, 0x26, 0x07]);
    }

    #[test]
    fn send_bits_rejects_out_of_range_input_without_io() {
        let (mut reader, written) = reader(&[]);
        for (data, nb_bits) in [(0x80u8, 7u8), (0x26, 0), (0x26, 8)] {
            let err = reader.send_bits(data, nb_bits).unwrap_err();
            assert!(matches!(err, HydraNfcError::InvalidParameter(_)));
        }
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn send_bytes_emits_length_prefixed_frame() {
        let (mut reader, written) = reader(&[0x02, 0x90, 0x00]);
        let answer = reader.send_bytes("00A4").unwrap();
        assert_eq!(*written.borrow(), vec![CMD_SEND_BYTES, 0x02, 0x00, 0xA4]);
        assert_eq!(answer, vec![0x90, 0x00]);
    }

    #[test]
    fn send_bytes_rejects_malformed_hex_without_io() {
        let (mut reader, written) = reader(&[]);
        for input in ["ZZ", "0A4"] {
            let err = reader.send_bytes(input).unwrap_err();
            assert!(matches!(err, HydraNfcError::InvalidParameter(_)));
        }
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn send_raw_rejects_frames_over_the_length_byte_limit() {
        let (mut reader, written) = reader(&[]);
        let err = reader.send_raw(&[0u8; 256]).unwrap_err();
        assert!(matches!(err, HydraNfcError::InvalidParameter(_)));
        let err = reader.send_bytes(&"00".repeat(256)).unwrap_err();
        assert!(matches!(err, HydraNfcError::InvalidParameter(_)));
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn empty_reply_is_returned_without_further_reads() {
        // The queue holds only the length byte; any extra read would fail.
        let (mut reader, _written) = reader(&[0x00]);
        let answer = reader.send_bits(0x52, 7).unwrap();
        assert!(answer.is_empty());
    }

    #[test]
    fn reply_payload_is_read_exactly() {
        let (mut reader, _written) = reader(&[0x02, 0x04, 0x00]);
        let answer = reader.send_raw(&[0x26]).unwrap();
        assert_eq!(answer, vec![0x04, 0x00]);
    }

    #[test]
    fn field_and_mode_commands_are_single_byte_writes() {
        // No reply bytes are queued, so a read attempt would error out.
        let (mut reader, written) = reader(&[]);
        reader.rf_on().unwrap();
        reader.rf_off().unwrap();
        reader.set_mode_iso14443a().unwrap();
        assert_eq!(
            *written.borrow(),
            vec![CMD_RF_ON, CMD_RF_OFF, CMD_SET_MODE_ISO14443A]
        );
    }

    #[test]
    fn drop_switches_the_field_off() {
        let (reader, written) = reader(&[]);
        drop(reader);
        assert_eq!(*written.borrow(), vec![CMD_RF_OFF]);
    }
}
