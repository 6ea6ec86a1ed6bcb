//! Checksum engines for frame trailers

use crc::{CRC_16_IBM_3740, Crc};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// 16-bit integrity code over a byte range.
///
/// The codec only consumes this; it never inspects the polynomial. Trailers
/// store the complement of the returned value.
pub trait Checksum {
    fn crc16(&self, bytes: &[u8]) -> u16;
}

/// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF), as used by the reader firmware
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc16;

impl Checksum for Crc16 {
    fn crc16(&self, bytes: &[u8]) -> u16 {
        CRC16.checksum(bytes)
    }
}
