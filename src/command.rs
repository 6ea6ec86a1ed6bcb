//! Command catalogue: opcodes and parameter schemas
//!
//! Each command is one opcode plus an ordered list of little-endian
//! parameter slots. Encoding walks the schema and packs values through a
//! [`ParameterPacker`], so adding a command is a table entry, not a type.

use crate::checksum::Checksum;
use crate::error::FrameError;
use crate::frame::{COMMAND_FRAME_LEN, FrameCodec};
use crate::packer::ParameterPacker;

/// Width of one parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Byte,
    Short,
    Int,
}

impl Param {
    pub const fn width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Short => 2,
            Self::Int => 4,
        }
    }

    const fn max(self) -> u32 {
        match self {
            Self::Byte => u8::MAX as u32,
            Self::Short => u16::MAX as u32,
            Self::Int => u32::MAX,
        }
    }
}

use Param::{Byte, Int, Short};

/// Reader commands, discriminant = opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Radio
    RadioSetDeviceId = 0x00,
    RadioGetDeviceId = 0x01,
    RadioSetOperationMode = 0x02,
    RadioGetOperationMode = 0x03,
    RadioSetLinkProfile = 0x04,
    RadioGetLinkProfile = 0x05,
    RadioWriteRegister = 0x06,
    RadioReadRegister = 0x07,
    RadioWriteBankedRegister = 0x08,
    RadioReadBankedRegister = 0x09,
    RadioReadRegisterInfo = 0x0A,

    // Antenna ports
    AntennaPortSetState = 0x10,
    AntennaPortGetState = 0x11,
    AntennaPortSetConfiguration = 0x12,
    AntennaPortGetConfiguration = 0x13,
    AntennaPortSetSenseThreshold = 0x14,
    AntennaPortGetSenseThreshold = 0x15,

    // Select / post-match criteria
    SetActiveSelectCriteria = 0x20,
    GetActiveSelectCriteria = 0x21,
    SetSelectCriteria = 0x22,
    GetSelectCriteria = 0x23,
    SetSelectMaskData = 0x24,
    GetSelectMaskData = 0x25,
    SetPostMatchCriteria = 0x26,
    GetPostMatchCriteria = 0x27,
    SetPostMatchMaskData = 0x28,
    GetPostMatchMaskData = 0x29,

    // Query / singulation
    SetQueryTagGroup = 0x30,
    GetQueryTagGroup = 0x31,
    SetSingulationAlgorithm = 0x32,
    GetSingulationAlgorithm = 0x33,
    SetSingulationParameters = 0x34,
    GetSingulationParameters = 0x35,
    SetQueryParameters = 0x36,
    GetQueryParameters = 0x37,

    // Tag access
    TagInventory = 0x40,
    TagRead = 0x41,
    TagWrite = 0x42,
    TagKill = 0x43,
    TagLock = 0x44,
    TagMultipleWrite = 0x45,
    TagBlockWrite = 0x46,
    TagBlockErase = 0x47,
    SetAccessPassword = 0x48,
    SetKillPassword = 0x49,

    // Control
    ControlCancel = 0x50,
    ControlPause = 0x51,
    ControlResume = 0x52,
    ControlSoftReset = 0x53,
    ControlResetToBootloader = 0x54,
    ControlSetPowerState = 0x55,
    ControlGetPowerState = 0x56,

    // MAC
    MacGetFirmwareVersion = 0x60,
    MacGetDebug = 0x61,
    MacClearError = 0x62,
    MacGetError = 0x63,
    MacGetBootloaderVersion = 0x64,
    MacWriteOemData = 0x66,
    MacReadOemData = 0x67,
    MacBypassWriteRegister = 0x68,
    MacBypassReadRegister = 0x69,
    MacSetRegion = 0x6A,
    MacGetRegion = 0x6B,

    // GPIO
    SetGpioPinsConfiguration = 0x70,
    GetGpioPinsConfiguration = 0x71,
    WriteGpioPins = 0x72,
    ReadGpioPins = 0x73,

    // Test / diagnostics
    TestSetAntennaPortConfiguration = 0x80,
    TestSetFrequencyConfiguration = 0x81,
    TestTurnOnCarrierWave = 0x82,
    TestTurnOffCarrierWave = 0x83,
    TestInjectRandomData = 0x84,
    TestTransmitRandomData = 0x85,
    TestSetInventoryConfiguration = 0x86,
    TestGetInventoryConfiguration = 0x87,
    EngGetTemperature = 0x8A,
    EngGetRfPower = 0x8B,
    EngSetExternalPa = 0x8C,
    EngGetReturnLoss = 0x8D,
}

/// Opcode -> command, reserved entries are `None`
const OPCODE_TABLE: [Option<Command>; 256] = build_opcode_table();

const fn build_opcode_table() -> [Option<Command>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Command::ALL.len() {
        let command = Command::ALL[i];
        table[command as usize] = Some(command);
        i += 1;
    }
    table
}

impl Command {
    pub const ALL: &'static [Command] = &[
        Self::RadioSetDeviceId,
        Self::RadioGetDeviceId,
        Self::RadioSetOperationMode,
        Self::RadioGetOperationMode,
        Self::RadioSetLinkProfile,
        Self::RadioGetLinkProfile,
        Self::RadioWriteRegister,
        Self::RadioReadRegister,
        Self::RadioWriteBankedRegister,
        Self::RadioReadBankedRegister,
        Self::RadioReadRegisterInfo,
        Self::AntennaPortSetState,
        Self::AntennaPortGetState,
        Self::AntennaPortSetConfiguration,
        Self::AntennaPortGetConfiguration,
        Self::AntennaPortSetSenseThreshold,
        Self::AntennaPortGetSenseThreshold,
        Self::SetActiveSelectCriteria,
        Self::GetActiveSelectCriteria,
        Self::SetSelectCriteria,
        Self::GetSelectCriteria,
        Self::SetSelectMaskData,
        Self::GetSelectMaskData,
        Self::SetPostMatchCriteria,
        Self::GetPostMatchCriteria,
        Self::SetPostMatchMaskData,
        Self::GetPostMatchMaskData,
        Self::SetQueryTagGroup,
        Self::GetQueryTagGroup,
        Self::SetSingulationAlgorithm,
        Self::GetSingulationAlgorithm,
        Self::SetSingulationParameters,
        Self::GetSingulationParameters,
        Self::SetQueryParameters,
        Self::GetQueryParameters,
        Self::TagInventory,
        Self::TagRead,
        Self::TagWrite,
        Self::TagKill,
        Self::TagLock,
        Self::TagMultipleWrite,
        Self::TagBlockWrite,
        Self::TagBlockErase,
        Self::SetAccessPassword,
        Self::SetKillPassword,
        Self::ControlCancel,
        Self::ControlPause,
        Self::ControlResume,
        Self::ControlSoftReset,
        Self::ControlResetToBootloader,
        Self::ControlSetPowerState,
        Self::ControlGetPowerState,
        Self::MacGetFirmwareVersion,
        Self::MacGetDebug,
        Self::MacClearError,
        Self::MacGetError,
        Self::MacGetBootloaderVersion,
        Self::MacWriteOemData,
        Self::MacReadOemData,
        Self::MacBypassWriteRegister,
        Self::MacBypassReadRegister,
        Self::MacSetRegion,
        Self::MacGetRegion,
        Self::SetGpioPinsConfiguration,
        Self::GetGpioPinsConfiguration,
        Self::WriteGpioPins,
        Self::ReadGpioPins,
        Self::TestSetAntennaPortConfiguration,
        Self::TestSetFrequencyConfiguration,
        Self::TestTurnOnCarrierWave,
        Self::TestTurnOffCarrierWave,
        Self::TestInjectRandomData,
        Self::TestTransmitRandomData,
        Self::TestSetInventoryConfiguration,
        Self::TestGetInventoryConfiguration,
        Self::EngGetTemperature,
        Self::EngGetRfPower,
        Self::EngSetExternalPa,
        Self::EngGetReturnLoss,
    ];

    /// Look up an opcode byte; reserved opcodes yield `None`
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        OPCODE_TABLE[opcode as usize]
    }

    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Parameter slots in wire order
    pub const fn schema(self) -> &'static [Param] {
        match self {
            Self::RadioSetDeviceId => &[Byte],
            Self::RadioSetOperationMode => &[Byte],
            Self::RadioSetLinkProfile => &[Byte],
            // address, value
            Self::RadioWriteRegister => &[Short, Int],
            Self::RadioReadRegister => &[Short],
            // address, bank, value
            Self::RadioWriteBankedRegister => &[Short, Short, Int],
            Self::RadioReadBankedRegister => &[Short, Short],
            Self::RadioReadRegisterInfo => &[Short],

            // port, enabled
            Self::AntennaPortSetState => &[Byte, Byte],
            Self::AntennaPortGetState => &[Byte],
            // port, power (0.1 dBm), dwell time (ms)
            Self::AntennaPortSetConfiguration => &[Byte, Short, Int],
            Self::AntennaPortGetConfiguration => &[Byte],
            Self::AntennaPortSetSenseThreshold => &[Int],

            // count, enabled
            Self::SetActiveSelectCriteria => &[Byte, Byte],
            Self::GetActiveSelectCriteria => &[Byte],
            // index, bank, bit offset, bit count, action
            Self::SetSelectCriteria => &[Byte, Byte, Short, Byte, Byte],
            Self::GetSelectCriteria => &[Byte],
            // index, chunk, four mask bytes
            Self::SetSelectMaskData => &[Byte, Byte, Int],
            Self::GetSelectMaskData => &[Byte, Byte],
            // match, bit offset, bit count
            Self::SetPostMatchCriteria => &[Byte, Short, Byte],
            Self::SetPostMatchMaskData => &[Byte, Int],
            Self::GetPostMatchMaskData => &[Byte],

            // selected, session, target
            Self::SetQueryTagGroup => &[Byte, Byte, Byte],
            Self::SetSingulationAlgorithm => &[Byte],
            // algorithm, start Q, min Q, max Q
            Self::SetSingulationParameters => &[Byte, Byte, Byte, Byte],
            Self::GetSingulationParameters => &[Byte],
            Self::SetQueryParameters => &[Byte, Byte],

            // perform select
            Self::TagInventory => &[Byte],
            // bank, word offset, word count, access password
            Self::TagRead => &[Byte, Short, Byte, Int],
            // bank, word offset, word
            Self::TagWrite => &[Byte, Short, Short],
            Self::TagKill => &[Int],
            // mask, action
            Self::TagLock => &[Short, Short],
            Self::TagMultipleWrite => &[Byte, Short, Byte],
            Self::TagBlockWrite => &[Byte, Short, Byte],
            Self::TagBlockErase => &[Byte, Short, Byte],
            Self::SetAccessPassword => &[Int],
            Self::SetKillPassword => &[Int],

            Self::ControlSetPowerState => &[Byte],

            // address, value
            Self::MacWriteOemData => &[Short, Int],
            Self::MacReadOemData => &[Short],
            Self::MacBypassWriteRegister => &[Short, Short],
            Self::MacBypassReadRegister => &[Short],
            Self::MacSetRegion => &[Byte],

            // mask, configuration
            Self::SetGpioPinsConfiguration => &[Byte, Byte],
            // mask, value
            Self::WriteGpioPins => &[Byte, Byte],
            Self::ReadGpioPins => &[Byte],

            // port, power (0.1 dBm)
            Self::TestSetAntennaPortConfiguration => &[Byte, Short],
            // channel flag, frequency (kHz)
            Self::TestSetFrequencyConfiguration => &[Byte, Int],
            Self::TestInjectRandomData => &[Int],
            // control, duration (ms), pattern
            Self::TestTransmitRandomData => &[Byte, Int, Byte],
            Self::TestSetInventoryConfiguration => &[Byte],
            Self::EngGetRfPower => &[Byte],
            Self::EngSetExternalPa => &[Byte],

            Self::RadioGetDeviceId
            | Self::RadioGetOperationMode
            | Self::RadioGetLinkProfile
            | Self::AntennaPortGetSenseThreshold
            | Self::GetPostMatchCriteria
            | Self::GetQueryTagGroup
            | Self::GetSingulationAlgorithm
            | Self::GetQueryParameters
            | Self::ControlCancel
            | Self::ControlPause
            | Self::ControlResume
            | Self::ControlSoftReset
            | Self::ControlResetToBootloader
            | Self::ControlGetPowerState
            | Self::MacGetFirmwareVersion
            | Self::MacGetDebug
            | Self::MacClearError
            | Self::MacGetError
            | Self::MacGetBootloaderVersion
            | Self::MacGetRegion
            | Self::GetGpioPinsConfiguration
            | Self::TestTurnOnCarrierWave
            | Self::TestTurnOffCarrierWave
            | Self::TestGetInventoryConfiguration
            | Self::EngGetTemperature
            | Self::EngGetReturnLoss => &[],
        }
    }

    /// Pack `values` per this command's schema and compose the frame.
    ///
    /// Each value must fit its slot width; nothing is truncated.
    pub fn encode<C: Checksum>(
        self,
        codec: &FrameCodec<C>,
        values: &[u32],
    ) -> Result<[u8; COMMAND_FRAME_LEN], FrameError> {
        let schema = self.schema();
        if values.len() != schema.len() {
            return Err(FrameError::ParameterCount {
                command: self,
                expected: schema.len(),
                actual: values.len(),
            });
        }

        let mut packer = ParameterPacker::new();
        for (index, (&slot, &value)) in schema.iter().zip(values).enumerate() {
            if value > slot.max() {
                return Err(FrameError::ValueOutOfRange {
                    command: self,
                    index,
                    value,
                });
            }
            match slot {
                Byte => packer.pack_byte(value as u8),
                Short => packer.pack_short(value as u16),
                Int => packer.pack_int(value),
            };
        }

        packer.seal(codec, self.opcode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameType, MAX_PARAM_LEN, classify, opcode_of};

    #[test]
    fn test_table_is_consistent() {
        for &command in Command::ALL {
            assert_eq!(Command::from_opcode(command.opcode()), Some(command));
        }

        let mapped = (0..=255u8).filter(|&op| Command::from_opcode(op).is_some()).count();
        assert_eq!(mapped, Command::ALL.len());
    }

    #[test]
    fn test_schemas_fit_frame() {
        for &command in Command::ALL {
            let width: usize = command.schema().iter().map(|p| p.width()).sum();
            assert!(width <= MAX_PARAM_LEN, "{command:?} packs {width} bytes");
        }
    }

    #[test]
    fn test_reserved_opcodes() {
        assert_eq!(Command::from_opcode(0x0F), None);
        assert_eq!(Command::from_opcode(0xFF), None);
    }

    #[test]
    fn test_high_opcode_resolves() {
        let signed: i8 = -118;
        assert_eq!(Command::from_opcode(signed as u8), Some(Command::EngGetTemperature));
        assert_eq!(Command::from_opcode(138), Some(Command::EngGetTemperature));
    }

    #[test]
    fn test_encode_write_register() {
        let codec = FrameCodec::new();
        let frame = Command::RadioWriteRegister
            .encode(&codec, &[0x0700, 0x1234_5678])
            .unwrap();

        assert_eq!(frame[5], 0x06);
        assert_eq!(&frame[6..12], &[0x00, 0x07, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(&frame[12..14], &[0x00, 0x00]);
        assert_eq!(classify(&frame), Ok(FrameType::Command));
        assert_eq!(opcode_of(&frame), Ok(Command::RadioWriteRegister));
        assert!(codec.verify(&frame).is_ok());
    }

    #[test]
    fn test_encode_full_width() {
        let codec = FrameCodec::new();
        let frame = Command::TagRead
            .encode(&codec, &[0x01, 0x0002, 0x06, 0xDEAD_BEEF])
            .unwrap();
        assert_eq!(&frame[6..14], &[0x01, 0x02, 0x00, 0x06, 0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_encode_wrong_arity() {
        let codec = FrameCodec::new();
        assert_eq!(
            Command::AntennaPortSetState.encode(&codec, &[0]),
            Err(FrameError::ParameterCount {
                command: Command::AntennaPortSetState,
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_encode_value_out_of_range() {
        let codec = FrameCodec::new();
        assert_eq!(
            Command::WriteGpioPins.encode(&codec, &[0x0F, 0x100]),
            Err(FrameError::ValueOutOfRange {
                command: Command::WriteGpioPins,
                index: 1,
                value: 0x100,
            })
        );
    }
}
