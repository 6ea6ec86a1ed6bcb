//! Frame layout, classification and command composition
//!
//! # Frame Format
//! ```text
//! C I T M FF [opcode] [params: 8, zero padded] [checksum: 2 LE]
//! ```
//!
//! - `CITM`: command magic; the leading byte doubles as the type tag
//! - `FF`: reserved
//! - `opcode`: command identifier, unsigned
//! - `params`: little-endian parameter bytes, unused positions are zero
//! - `checksum`: complement of the CRC-16 over bytes 0..14
//!
//! Every frame family has a fixed length, selected by the leading ASCII tag:
//! `C`ommand and `R`esponse are 16 bytes, `B`egin, `E`nd and `W`ork are 24,
//! `I`nventory and `A`ccess are 64.

use crate::checksum::{Checksum, Crc16};
use crate::command::Command;
use crate::error::FrameError;

/// Length of command and response frames
pub const COMMAND_FRAME_LEN: usize = 16;
/// Maximum number of parameter bytes in a command frame
pub const MAX_PARAM_LEN: usize = 8;

pub const COMMAND_MAGIC: [u8; 4] = *b"CITM";
pub const RESPONSE_MAGIC: [u8; 4] = *b"RITM";

const RESERVED: u8 = 0xFF;
const RESERVED_OFFSET: usize = 4;
pub const OPCODE_OFFSET: usize = 5;
const PARAM_OFFSET: usize = 6;
const CHECKSUM_OFFSET: usize = PARAM_OFFSET + MAX_PARAM_LEN;

/// Frame families, tagged by the first byte of each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Command,
    Response,
    Begin,
    Inventory,
    Access,
    End,
    Work,
}

impl FrameType {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'C' => Some(Self::Command),
            b'R' => Some(Self::Response),
            b'B' => Some(Self::Begin),
            b'I' => Some(Self::Inventory),
            b'A' => Some(Self::Access),
            b'E' => Some(Self::End),
            b'W' => Some(Self::Work),
            _ => None,
        }
    }

    pub const fn tag(self) -> u8 {
        match self {
            Self::Command => b'C',
            Self::Response => b'R',
            Self::Begin => b'B',
            Self::Inventory => b'I',
            Self::Access => b'A',
            Self::End => b'E',
            Self::Work => b'W',
        }
    }

    /// Declared total length of frames of this family
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> usize {
        match self {
            Self::Command | Self::Response => COMMAND_FRAME_LEN,
            Self::Begin | Self::End | Self::Work => 24,
            Self::Inventory | Self::Access => 64,
        }
    }

    /// Inventory and Access frames carry per-tag results
    pub const fn is_tag_report(self) -> bool {
        matches!(self, Self::Inventory | Self::Access)
    }
}

/// Classify a received buffer by its leading tag.
///
/// The buffer must be exactly as long as its family declares, so callers
/// can extract fields at fixed offsets without reading past the frame.
pub fn classify(buf: &[u8]) -> Result<FrameType, FrameError> {
    let tag = *buf.first().ok_or(FrameError::EmptyFrame)?;
    let frame_type = FrameType::from_tag(tag).ok_or(FrameError::UnknownFrameType(tag))?;

    if buf.len() != frame_type.len() {
        return Err(FrameError::TruncatedFrame {
            expected: frame_type.len(),
            actual: buf.len(),
        });
    }

    Ok(frame_type)
}

/// Raw opcode byte of a command, response or begin frame
pub fn raw_opcode(buf: &[u8]) -> Result<u8, FrameError> {
    buf.get(OPCODE_OFFSET)
        .copied()
        .ok_or(FrameError::TruncatedFrame {
            expected: OPCODE_OFFSET + 1,
            actual: buf.len(),
        })
}

/// Resolve the opcode byte at offset 5 to a catalogue command
pub fn opcode_of(buf: &[u8]) -> Result<Command, FrameError> {
    let opcode = raw_opcode(buf)?;
    Command::from_opcode(opcode).ok_or(FrameError::UnknownOpcode(opcode))
}

/// Composes and verifies checksummed frames
#[derive(Debug, Clone, Default)]
pub struct FrameCodec<C = Crc16> {
    checksum: C,
}

impl FrameCodec<Crc16> {
    pub fn new() -> Self {
        Self { checksum: Crc16 }
    }
}

impl<C: Checksum> FrameCodec<C> {
    pub fn with_checksum(checksum: C) -> Self {
        Self { checksum }
    }

    /// Trailer value for a checksummed span: the complemented CRC
    pub fn trailer(&self, span: &[u8]) -> u16 {
        !self.checksum.crc16(span)
    }

    /// Build a 16-byte command frame.
    ///
    /// The checksum always covers the full 14-byte span including zero
    /// padding, regardless of how many parameter bytes the command uses.
    pub fn compose(
        &self,
        opcode: u8,
        params: &[u8],
    ) -> Result<[u8; COMMAND_FRAME_LEN], FrameError> {
        if params.len() > MAX_PARAM_LEN {
            return Err(FrameError::ParameterOverflow { len: params.len() });
        }

        let mut frame = [0u8; COMMAND_FRAME_LEN];
        frame[..RESERVED_OFFSET].copy_from_slice(&COMMAND_MAGIC);
        frame[RESERVED_OFFSET] = RESERVED;
        frame[OPCODE_OFFSET] = opcode;
        frame[PARAM_OFFSET..PARAM_OFFSET + params.len()].copy_from_slice(params);

        let trailer = self.trailer(&frame[..CHECKSUM_OFFSET]);
        frame[CHECKSUM_OFFSET..].copy_from_slice(&trailer.to_le_bytes());
        Ok(frame)
    }

    /// Check the little-endian trailer in the last two bytes of `frame`
    pub fn verify(&self, frame: &[u8]) -> Result<(), FrameError> {
        if frame.len() < 3 {
            return Err(FrameError::TruncatedFrame {
                expected: 3,
                actual: frame.len(),
            });
        }

        let (span, trailer) = frame.split_at(frame.len() - 2);
        let expected = self.trailer(span);
        let actual = u16::from_le_bytes([trailer[0], trailer[1]]);

        if expected == actual {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Sums bytes; lets tests predict trailers by hand
    struct SumChecksum;

    impl Checksum for SumChecksum {
        fn crc16(&self, bytes: &[u8]) -> u16 {
            bytes.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
        }
    }

    // ===================
    // compose tests
    // ===================

    #[test]
    fn test_compose_layout() {
        let codec = FrameCodec::with_checksum(SumChecksum);
        let frame = codec.compose(0x11, &[0x01, 0x02]).unwrap();

        assert_eq!(&frame[..6], &[b'C', b'I', b'T', b'M', 0xFF, 0x11]);
        assert_eq!(&frame[6..8], &[0x01, 0x02]);
        assert!(frame[8..14].iter().all(|&b| b == 0));

        let sum: u16 = b"CITM".iter().map(|&b| b as u16).sum::<u16>() + 0xFF + 0x11 + 0x01 + 0x02;
        assert_eq!(&frame[14..], &(!sum).to_le_bytes());
    }

    #[test]
    fn test_compose_no_params() {
        let codec = FrameCodec::new();
        let frame = codec.compose(0x60, &[]).unwrap();
        assert_eq!(frame.len(), COMMAND_FRAME_LEN);
        assert!(frame[6..14].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_compose_full_params() {
        let codec = FrameCodec::new();
        let params = [1, 2, 3, 4, 5, 6, 7, 8];
        let frame = codec.compose(0x42, &params).unwrap();
        assert_eq!(&frame[6..14], &params);
    }

    #[test]
    fn test_compose_parameter_overflow() {
        let codec = FrameCodec::new();
        assert_eq!(
            codec.compose(0x42, &[0; 9]),
            Err(FrameError::ParameterOverflow { len: 9 })
        );
    }

    // ===================
    // verify tests
    // ===================

    #[test]
    fn test_verify_composed_frame() {
        let codec = FrameCodec::new();
        let frame = codec.compose(0x06, &[0x00, 0x07, 0x78, 0x56, 0x34, 0x12]).unwrap();
        assert!(codec.verify(&frame).is_ok());
    }

    #[test]
    fn test_verify_detects_corruption() {
        let codec = FrameCodec::new();
        let mut frame = codec.compose(0x06, &[0x01]).unwrap();
        frame[6] ^= 0x80;
        assert!(matches!(codec.verify(&frame), Err(FrameError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_verify_too_short() {
        let codec = FrameCodec::new();
        assert!(matches!(codec.verify(&[0x52, 0x00]), Err(FrameError::TruncatedFrame { .. })));
    }

    // ===================
    // classify tests
    // ===================

    #[test]
    fn test_classify_families() {
        let cases = [
            (b'C', FrameType::Command, 16),
            (b'R', FrameType::Response, 16),
            (b'B', FrameType::Begin, 24),
            (b'E', FrameType::End, 24),
            (b'W', FrameType::Work, 24),
            (b'I', FrameType::Inventory, 64),
            (b'A', FrameType::Access, 64),
        ];

        for (tag, frame_type, len) in cases {
            let mut buf = vec![0u8; len];
            buf[0] = tag;
            assert_eq!(classify(&buf), Ok(frame_type));
            assert_eq!(frame_type.len(), len);
            assert_eq!(frame_type.tag(), tag);
        }
    }

    #[test]
    fn test_classify_unknown_tag() {
        assert_eq!(classify(&[0x5A; 16]), Err(FrameError::UnknownFrameType(0x5A)));
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(&[]), Err(FrameError::EmptyFrame));
    }

    #[test]
    fn test_classify_length_mismatch() {
        let mut buf = vec![0u8; 24];
        buf[0] = b'I';
        assert_eq!(
            classify(&buf),
            Err(FrameError::TruncatedFrame { expected: 64, actual: 24 })
        );

        let mut buf = vec![0u8; 20];
        buf[0] = b'R';
        assert_eq!(
            classify(&buf),
            Err(FrameError::TruncatedFrame { expected: 16, actual: 20 })
        );
    }

    // ===================
    // opcode tests
    // ===================

    #[test]
    fn test_opcode_high_bit_is_unsigned() {
        let codec = FrameCodec::new();
        let signed: i8 = -118;
        let frame = codec.compose(signed as u8, &[]).unwrap();

        assert_eq!(raw_opcode(&frame), Ok(0x8A));
        assert_eq!(
            opcode_of(&frame),
            Command::from_opcode(138).ok_or(FrameError::UnknownOpcode(138))
        );
        assert!(opcode_of(&frame).is_ok());
    }

    #[test]
    fn test_opcode_reserved_entry() {
        let codec = FrameCodec::new();
        let frame = codec.compose(0xFE, &[]).unwrap();
        assert_eq!(opcode_of(&frame), Err(FrameError::UnknownOpcode(0xFE)));
    }

    #[test]
    fn test_opcode_truncated() {
        assert!(matches!(raw_opcode(&[b'C', b'I']), Err(FrameError::TruncatedFrame { .. })));
    }

    proptest! {
        #[test]
        fn compose_round_trip(
            opcode in any::<u8>(),
            params in prop::collection::vec(any::<u8>(), 0..=MAX_PARAM_LEN),
        ) {
            let codec = FrameCodec::new();
            let frame = codec.compose(opcode, &params).unwrap();

            prop_assert_eq!(classify(&frame), Ok(FrameType::Command));
            prop_assert_eq!(FrameType::Command.len(), frame.len());
            prop_assert_eq!(raw_opcode(&frame), Ok(opcode));
            if let Some(command) = Command::from_opcode(opcode) {
                prop_assert_eq!(opcode_of(&frame), Ok(command));
            }
        }

        #[test]
        fn compose_zero_pads(
            opcode in any::<u8>(),
            params in prop::collection::vec(any::<u8>(), 0..MAX_PARAM_LEN),
        ) {
            let frame = FrameCodec::new().compose(opcode, &params).unwrap();
            let padding = &frame[PARAM_OFFSET + params.len()..CHECKSUM_OFFSET];
            prop_assert!(padding.iter().all(|&b| b == 0));
        }

        #[test]
        fn compose_trailer_is_complemented_crc(
            opcode in any::<u8>(),
            params in prop::collection::vec(any::<u8>(), 0..=MAX_PARAM_LEN),
        ) {
            let frame = FrameCodec::new().compose(opcode, &params).unwrap();
            let crc = Crc16.crc16(&frame[..14]);
            prop_assert_eq!(&frame[14..], &(!crc).to_le_bytes());
        }

        #[test]
        fn compose_rejects_oversized(params in prop::collection::vec(any::<u8>(), 9..32)) {
            let len = params.len();
            prop_assert_eq!(
                FrameCodec::new().compose(0x40, &params),
                Err(FrameError::ParameterOverflow { len })
            );
        }
    }
}
