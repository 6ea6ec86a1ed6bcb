//! Little-endian parameter packing for command frames

use crate::checksum::Checksum;
use crate::error::FrameError;
use crate::frame::{COMMAND_FRAME_LEN, FrameCodec};

/// Accumulates command parameters in call order.
///
/// Values are appended little-endian. No range checks happen here and the
/// packer does not know the command's schema; ordering is up to the caller.
/// Sealing consumes the packer, so one instance builds exactly one frame.
#[derive(Debug, Default)]
pub struct ParameterPacker {
    buf: Vec<u8>,
}

impl ParameterPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pack_byte(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn pack_short(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn pack_int(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Packed bytes so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Compose the command frame for `opcode` from the packed parameters
    pub fn seal<C: Checksum>(
        self,
        codec: &FrameCodec<C>,
        opcode: u8,
    ) -> Result<[u8; COMMAND_FRAME_LEN], FrameError> {
        codec.compose(opcode, &self.buf)
    }
}
