//! Error types for frame encoding, decoding and reader operations

use thiserror::Error;

use crate::command::Command;
use crate::frame::FrameType;

/// Errors raised by the frame codec and decoders
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// More parameter bytes than the command frame can carry
    #[error("parameter overflow: {len} bytes supplied, at most 8 fit in a command frame")]
    ParameterOverflow { len: usize },

    /// Value count does not match the command's parameter schema
    #[error("{command:?} takes {expected} parameters, got {actual}")]
    ParameterCount {
        command: Command,
        expected: usize,
        actual: usize,
    },

    /// Value does not fit the width its schema slot declares
    #[error("{command:?} parameter {index} out of range: {value}")]
    ValueOutOfRange {
        command: Command,
        index: usize,
        value: u32,
    },

    /// Buffer has no bytes at all
    #[error("empty frame")]
    EmptyFrame,

    /// Leading type tag is not one of the known frame families
    #[error("unknown frame type tag: 0x{0:02X}")]
    UnknownFrameType(u8),

    /// Opcode byte maps to a reserved table entry
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    /// Buffer length disagrees with the declared length, or a computed
    /// offset falls outside the frame
    #[error("truncated frame: need {expected} bytes, have {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// Recomputed checksum disagrees with the trailer
    #[error("checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// Frame belongs to a different family than the decoder handles
    #[error("unexpected frame type: expected {expected}, got {actual:?}")]
    UnexpectedFrameType {
        expected: &'static str,
        actual: FrameType,
    },
}

/// Errors that can occur while driving a reader over a transport
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Transport layer error (serial, UART, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected frame
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Reader answered with a non-zero status code
    #[error("{command:?} failed with status 0x{status:04X}")]
    Device { command: Command, status: u16 },

    /// Response frame answers a different command
    #[error("response for opcode 0x{actual:02X}, expected 0x{expected:02X}")]
    UnexpectedResponse { expected: u8, actual: u8 },

    /// No complete frame arrived in time
    #[error("timed out waiting for reader")]
    Timeout,
}
