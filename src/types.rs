//! Types for tag inventory results

/// One tag's inventory result.
///
/// Starts empty per inventory cycle and is filled in by
/// [`InventoryDecoder::decode`](crate::InventoryDecoder::decode), one frame
/// at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRecord {
    pub epc: String,
    pub crc_valid: bool,
    /// Only carried by the first frame of a burst
    pub rssi: Option<i16>,
    pub antenna_port: Option<u8>,
    /// 6-bit phase
    pub phase: Option<u8>,
    pub temperature: Option<i8>,
    pub frequency_khz: Option<i32>,
}

impl TagRecord {
    pub fn new() -> Self {
        Self::default()
    }
}

/// How EPC bytes are rendered as text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HexStyle {
    /// `DEADBEEF`
    #[default]
    Compact,
    /// `DE AD BE EF`
    Spaced,
}

/// Convert bytes to an uppercase hex string
pub(crate) fn bytes_to_hex(bytes: &[u8], style: HexStyle) -> String {
    let parts = bytes.iter().map(|b| format!("{:02X}", b));
    match style {
        HexStyle::Compact => parts.collect(),
        HexStyle::Spaced => parts.collect::<Vec<_>>().join(" "),
    }
}
