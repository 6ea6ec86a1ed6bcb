//! Splits an inbound byte stream into fixed-length frames

use log::{trace, warn};

use crate::frame::{COMMAND_MAGIC, FrameType, RESPONSE_MAGIC};

/// Tail of the `CITM` / `RITM` magic; its `I` is not an Inventory tag
const MAGIC_TAIL: &[u8] = b"ITM";

/// One complete frame pulled off the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub bytes: Vec<u8>,
}

/// Accumulates transport reads and yields whole frames.
///
/// The leading byte of the buffer selects the frame length. Command and
/// Response frames must also carry their full magic. Bytes that cannot start
/// a frame are dropped one at a time until the stream lines up again.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Start(FrameType),
    /// Could start a frame once more bytes arrive
    Incomplete,
    Misaligned,
}

fn alignment(window: &[u8]) -> Alignment {
    let Some(frame_type) = window.first().and_then(|&b| FrameType::from_tag(b)) else {
        return Alignment::Misaligned;
    };

    let (pattern, must_match): (&[u8], bool) = match frame_type {
        FrameType::Command => (&COMMAND_MAGIC, true),
        FrameType::Response => (&RESPONSE_MAGIC, true),
        _ => (MAGIC_TAIL, false),
    };

    let n = window.len().min(pattern.len());
    if window[..n] != pattern[..n] {
        return if must_match {
            Alignment::Misaligned
        } else {
            Alignment::Start(frame_type)
        };
    }
    if n < pattern.len() {
        return Alignment::Incomplete;
    }
    if must_match {
        Alignment::Start(frame_type)
    } else {
        Alignment::Misaligned
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet part of a complete frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn next_frame(&mut self) -> Option<Frame> {
        let mut skip = 0;
        let mut start = None;
        while skip < self.buffer.len() {
            match alignment(&self.buffer[skip..]) {
                Alignment::Start(frame_type) => {
                    start = Some(frame_type);
                    break;
                }
                Alignment::Incomplete => break,
                Alignment::Misaligned => skip += 1,
            }
        }
        if skip > 0 {
            warn!("Skipping {} unframed bytes: {:02X?}", skip, &self.buffer[..skip]);
            self.buffer.drain(..skip);
        }

        let frame_type = start?;
        if self.buffer.len() < frame_type.len() {
            return None;
        }

        let bytes: Vec<u8> = self.buffer.drain(..frame_type.len()).collect();
        trace!("Assembled {:?} frame: {:02X?}", frame_type, bytes);
        Some(Frame { frame_type, bytes })
    }
}
