//! Inventory and Access frame decoding
//!
//! # Frame Format
//! ```text
//! offset  0  type tag ('I' or 'A')
//!         5  relative sequence (<= 1: first frame of a burst)
//!         7  flags
//!        10  info length, 2 bytes LE, (n - 3) * 4 payload bytes
//!        22  RSSI, 2 bytes LE (first frame only)
//!        26  data start, first frame
//!        14  data start, continuation frame
//! ```
//!
//! Data starts with an optional 8-byte telemetry block, then a 2-byte
//! protocol-control word, the EPC and a 2-byte trailing CRC.

use log::{trace, warn};

use crate::error::FrameError;
use crate::frame;
use crate::status::{ByteOrder, StatusDecoder};
use crate::types::{HexStyle, TagRecord, bytes_to_hex};

const SEQUENCE_OFFSET: usize = 5;
const FLAGS_OFFSET: usize = 7;
const INFO_LENGTH_OFFSET: usize = 10;
const RSSI_OFFSET: usize = 22;
const FIRST_DATA_OFFSET: usize = 26;
const CONTINUATION_DATA_OFFSET: usize = 14;

const INFO_LENGTH_BIAS: i32 = 3;
const INFO_LENGTH_UNIT: i32 = 4;
/// Protocol-control word ahead of the EPC plus the EPC's trailing CRC
const PC_AND_CRC_LEN: i32 = 4;
const PC_LEN: usize = 2;
const TELEMETRY_LEN: usize = 8;

/// Flags byte of Inventory and Access frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryFlags(u8);

impl InventoryFlags {
    const CRC_INVALID: u8 = 0x01;
    const R2000: u8 = 0x02;
    const EXTENDED_TELEMETRY: u8 = 0x08;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn read(frame: &[u8]) -> Result<Self, FrameError> {
        StatusDecoder::new(frame).read_byte_at(FLAGS_OFFSET).map(Self)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Bit 0 is inverted: clear means the tag's CRC checked out
    pub fn crc_valid(self) -> bool {
        self.0 & Self::CRC_INVALID == 0
    }

    pub fn is_r2000(self) -> bool {
        self.0 & Self::R2000 != 0
    }

    /// Only meaningful on R2000 layouts
    pub fn has_extended_telemetry(self) -> bool {
        self.is_r2000() && self.0 & Self::EXTENDED_TELEMETRY != 0
    }
}

/// What a decode call did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Record repopulated from the frame
    Updated,
    /// Firmware flagged the tag response CRC as bad; record untouched
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Telemetry {
    antenna_port: u8,
    phase: u8,
    temperature: i8,
    frequency_khz: i32,
}

impl Telemetry {
    fn read(decoder: &StatusDecoder<'_>, offset: usize) -> Result<Self, FrameError> {
        Ok(Self {
            antenna_port: decoder.read_byte_at(offset)?,
            // top bits are a status indicator, not part of the value
            phase: decoder.read_byte_at(offset + 1)? & 0x3F,
            temperature: decoder.read_byte_at(offset + 2)? as i8,
            frequency_khz: decoder.read_int_at(offset + 4, ByteOrder::Little)? as i32,
        })
    }
}

/// Decodes tag results out of Inventory and Access frames
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDecoder {
    hex_style: HexStyle,
}

impl InventoryDecoder {
    pub fn new(hex_style: HexStyle) -> Self {
        Self { hex_style }
    }

    /// Decode one frame into `record`.
    ///
    /// On error or discard the record is left exactly as it was. RSSI is
    /// only refreshed by the first frame of a burst; continuation frames keep
    /// whatever the record already holds.
    pub fn decode(
        &self,
        frame: &[u8],
        record: &mut TagRecord,
    ) -> Result<DecodeOutcome, FrameError> {
        let frame_type = frame::classify(frame)?;
        if !frame_type.is_tag_report() {
            return Err(FrameError::UnexpectedFrameType {
                expected: "Inventory or Access",
                actual: frame_type,
            });
        }

        let decoder = StatusDecoder::new(frame);
        let flags = InventoryFlags::read(frame)?;
        if !flags.crc_valid() {
            warn!("Discarding {:?} frame: tag CRC flagged invalid", frame_type);
            return Ok(DecodeOutcome::Discarded);
        }

        let sequence = decoder.read_byte_at(SEQUENCE_OFFSET)?;
        let (rssi, mut offset) = if sequence <= 1 {
            let rssi = decoder.read_short_at(RSSI_OFFSET, ByteOrder::Little)? as i16;
            (Some(rssi), FIRST_DATA_OFFSET)
        } else {
            (None, CONTINUATION_DATA_OFFSET)
        };

        let info_length = decoder.read_short_at(INFO_LENGTH_OFFSET, ByteOrder::Little)?;
        let mut epc_len =
            (i32::from(info_length) - INFO_LENGTH_BIAS) * INFO_LENGTH_UNIT - PC_AND_CRC_LEN;

        let telemetry = if flags.has_extended_telemetry() {
            let telemetry = Telemetry::read(&decoder, offset)?;
            offset += TELEMETRY_LEN;
            epc_len -= TELEMETRY_LEN as i32;
            Some(telemetry)
        } else {
            None
        };

        let epc_start = offset + PC_LEN;
        let epc_len = usize::try_from(epc_len).map_err(|_| FrameError::TruncatedFrame {
            expected: epc_start,
            actual: frame.len(),
        })?;
        let epc_end = epc_start + epc_len;
        if epc_end > frame_type.len() {
            return Err(FrameError::TruncatedFrame {
                expected: epc_end,
                actual: frame_type.len(),
            });
        }
        let epc = bytes_to_hex(&frame[epc_start..epc_end], self.hex_style);

        trace!(
            "Decoded {:?} seq={} flags=0x{:02X} epc={}",
            frame_type,
            sequence,
            flags.bits(),
            epc
        );

        record.epc = epc;
        record.crc_valid = true;
        if rssi.is_some() {
            record.rssi = rssi;
        }
        record.antenna_port = telemetry.map(|t| t.antenna_port);
        record.phase = telemetry.map(|t| t.phase);
        record.temperature = telemetry.map(|t| t.temperature);
        record.frequency_khz = telemetry.map(|t| t.frequency_khz);

        Ok(DecodeOutcome::Updated)
    }
}
