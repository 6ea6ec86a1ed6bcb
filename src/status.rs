//! Scalar field extraction from response frames
//!
//! Offsets are chosen by the caller per response kind; the decoder only
//! performs bounds-checked reads and never validates field semantics.

use crate::checksum::Checksum;
use crate::command::Command;
use crate::error::FrameError;
use crate::frame::{self, COMMAND_FRAME_LEN, FrameCodec, FrameType};
use crate::types::{HexStyle, bytes_to_hex};

/// Response frames: `[R I T M][FF][opcode][status: 2 LE][payload: 6][checksum: 2 LE]`
pub const RESPONSE_STATUS_OFFSET: usize = 6;
pub const RESPONSE_PAYLOAD_OFFSET: usize = 8;

/// End frames report the burst completion status here, 4 bytes LE
pub const END_STATUS_OFFSET: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Bounds-checked primitive reads over one frame
#[derive(Debug, Clone, Copy)]
pub struct StatusDecoder<'a> {
    frame: &'a [u8],
}

impl<'a> StatusDecoder<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], FrameError> {
        let end = offset.checked_add(len).ok_or(FrameError::TruncatedFrame {
            expected: usize::MAX,
            actual: self.frame.len(),
        })?;
        self.frame.get(offset..end).ok_or(FrameError::TruncatedFrame {
            expected: end,
            actual: self.frame.len(),
        })
    }

    pub fn read_byte_at(&self, offset: usize) -> Result<u8, FrameError> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn read_short_at(&self, offset: usize, order: ByteOrder) -> Result<u16, FrameError> {
        let b = self.slice(offset, 2)?;
        let bytes = [b[0], b[1]];
        Ok(match order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_int_at(&self, offset: usize, order: ByteOrder) -> Result<u32, FrameError> {
        let b = self.slice(offset, 4)?;
        let bytes = [b[0], b[1], b[2], b[3]];
        Ok(match order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Three version bytes rendered as `major.minor.patch`
    pub fn read_ascii_dotted_version(&self, offset: usize) -> Result<String, FrameError> {
        let b = self.slice(offset, 3)?;
        Ok(format!("{}.{}.{}", b[0], b[1], b[2]))
    }

    /// Printable ASCII run, stopping at the first NUL
    pub fn read_ascii_at(&self, offset: usize, len: usize) -> Result<String, FrameError> {
        let b = self.slice(offset, len)?;
        let end = b.iter().position(|&c| c == 0).unwrap_or(b.len());
        Ok(String::from_utf8_lossy(&b[..end]).into_owned())
    }

    /// Uppercase hex, no separators
    pub fn read_hex_at(&self, offset: usize, len: usize) -> Result<String, FrameError> {
        Ok(bytes_to_hex(self.slice(offset, len)?, HexStyle::Compact))
    }
}

/// A checksum-verified response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    frame: [u8; COMMAND_FRAME_LEN],
}

impl Response {
    pub fn parse<C: Checksum>(frame: &[u8], codec: &FrameCodec<C>) -> Result<Self, FrameError> {
        match frame::classify(frame)? {
            FrameType::Response => {}
            other => {
                return Err(FrameError::UnexpectedFrameType {
                    expected: "Response",
                    actual: other,
                });
            }
        }
        codec.verify(frame)?;
        let frame = frame.try_into().map_err(|_| FrameError::TruncatedFrame {
            expected: COMMAND_FRAME_LEN,
            actual: frame.len(),
        })?;
        Ok(Self { frame })
    }

    pub fn opcode(&self) -> u8 {
        self.frame[frame::OPCODE_OFFSET]
    }

    pub fn command(&self) -> Result<Command, FrameError> {
        frame::opcode_of(&self.frame)
    }

    /// Zero means success
    pub fn status(&self) -> u16 {
        u16::from_le_bytes([
            self.frame[RESPONSE_STATUS_OFFSET],
            self.frame[RESPONSE_STATUS_OFFSET + 1],
        ])
    }

    pub fn decoder(&self) -> StatusDecoder<'_> {
        StatusDecoder::new(&self.frame)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }
}

/// Completion status carried by an End frame
pub fn end_status(frame: &[u8]) -> Result<u32, FrameError> {
    match frame::classify(frame)? {
        FrameType::End => {
            StatusDecoder::new(frame).read_int_at(END_STATUS_OFFSET, ByteOrder::Little)
        }
        other => Err(FrameError::UnexpectedFrameType {
            expected: "End",
            actual: other,
        }),
    }
}
