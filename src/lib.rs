//! Frame codec and driver for R2000-class UHF RFID reader modules.
//!
//! Commands go out as fixed 16-byte frames; answers come back as a stream of
//! fixed-length frames tagged by their first byte, including multi-frame
//! inventory bursts carrying EPCs and optional per-tag telemetry.
//!
//! # Features
//!
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use uhf_reader_codec::{Reader, SerialTransport};
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0", 115200)?;
//! let mut reader = Reader::new(transport);
//!
//! println!("Firmware {}", reader.firmware_version()?);
//! for tag in reader.inventory(false)? {
//!     println!("Found tag: {} rssi={:?}", tag.epc, tag.rssi);
//! }
//! ```
//!
//! The codec can also be used on its own:
//!
//! ```
//! use uhf_reader_codec::{Command, FrameCodec, FrameType, classify, opcode_of};
//!
//! let codec = FrameCodec::new();
//! let frame = Command::AntennaPortSetState.encode(&codec, &[0, 1]).unwrap();
//! assert_eq!(classify(&frame), Ok(FrameType::Command));
//! assert_eq!(opcode_of(&frame), Ok(Command::AntennaPortSetState));
//! ```

mod checksum;
mod command;
mod error;
mod frame;
mod inventory;
mod packer;
mod reader;
mod status;
mod stream;
mod transport;
mod types;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use checksum::{Checksum, Crc16};
pub use command::{Command, Param};
pub use error::{FrameError, ReaderError};
pub use frame::{
    COMMAND_FRAME_LEN, COMMAND_MAGIC, FrameCodec, FrameType, MAX_PARAM_LEN, RESPONSE_MAGIC,
    classify, opcode_of, raw_opcode,
};
pub use inventory::{DecodeOutcome, InventoryDecoder, InventoryFlags};
pub use packer::ParameterPacker;
pub use reader::{Reader, ReaderConfig};
pub use status::{ByteOrder, Response, StatusDecoder, end_status};
pub use stream::{Frame, FrameAssembler};
pub use transport::RfidTransport;
pub use types::{HexStyle, TagRecord};

#[cfg(feature = "serial")]
pub use serial::{DEFAULT_BAUD_RATE, SerialTransport};
