use log::{debug, error, trace, warn};
use std::time::{Duration, Instant};

use crate::command::Command;
use crate::error::ReaderError;
use crate::frame::{self, FrameCodec, FrameType};
use crate::inventory::{DecodeOutcome, InventoryDecoder};
use crate::status::{self, ByteOrder, RESPONSE_PAYLOAD_OFFSET, Response};
use crate::stream::{Frame, FrameAssembler};
use crate::transport::RfidTransport;
use crate::types::{HexStyle, TagRecord};

/// Timing and formatting knobs for a [`Reader`]
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Pause after writing a command before reading the answer
    pub settle_delay: Duration,
    /// How long to wait for a command's response frame
    pub response_timeout: Duration,
    /// Deadline for a whole inventory burst
    pub burst_timeout: Duration,
    pub hex_style: HexStyle,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            response_timeout: Duration::from_millis(500),
            burst_timeout: Duration::from_secs(3),
            hex_style: HexStyle::Compact,
        }
    }
}

pub struct Reader<T: RfidTransport> {
    transport: T,
    codec: FrameCodec,
    config: ReaderConfig,
    assembler: FrameAssembler,
}

impl<T: RfidTransport> Reader<T> {
    // Per-read transport timeout while polling for frames
    const READ_SLICE_MS: u32 = 50;

    // Response payload layouts
    const REGISTER_VALUE_OFFSET: usize = RESPONSE_PAYLOAD_OFFSET + 2;

    /// Create a reader with default timing
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ReaderConfig::default())
    }

    pub fn with_config(transport: T, config: ReaderConfig) -> Self {
        Self {
            transport,
            codec: FrameCodec::new(),
            config,
            assembler: FrameAssembler::new(),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Give back the underlying transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send a catalogue command and return its verified response frame.
    ///
    /// Fails with [`ReaderError::Device`] when the reader reports a
    /// non-zero status.
    pub fn execute(&mut self, command: Command, values: &[u32]) -> Result<Response, ReaderError> {
        let frame = command.encode(&self.codec, values)?;
        self.send(&frame)?;

        let deadline = Instant::now() + self.config.response_timeout;
        loop {
            let Some(frame) = self.next_frame(deadline)? else {
                return Err(ReaderError::Timeout);
            };
            if frame.frame_type != FrameType::Response {
                debug!("Ignoring {:?} frame while waiting for response", frame.frame_type);
                continue;
            }

            let response = Response::parse(&frame.bytes, &self.codec)?;
            if response.opcode() != command.opcode() {
                return Err(ReaderError::UnexpectedResponse {
                    expected: command.opcode(),
                    actual: response.opcode(),
                });
            }
            if response.status() != 0 {
                return Err(ReaderError::Device {
                    command,
                    status: response.status(),
                });
            }
            return Ok(response);
        }
    }

    /// MAC firmware version as `major.minor.patch`
    pub fn firmware_version(&mut self) -> Result<String, ReaderError> {
        let response = self.execute(Command::MacGetFirmwareVersion, &[])?;
        Ok(response.decoder().read_ascii_dotted_version(RESPONSE_PAYLOAD_OFFSET)?)
    }

    pub fn bootloader_version(&mut self) -> Result<String, ReaderError> {
        let response = self.execute(Command::MacGetBootloaderVersion, &[])?;
        Ok(response.decoder().read_ascii_dotted_version(RESPONSE_PAYLOAD_OFFSET)?)
    }

    /// Last MAC error code
    pub fn mac_error(&mut self) -> Result<u32, ReaderError> {
        let response = self.execute(Command::MacGetError, &[])?;
        Ok(response
            .decoder()
            .read_int_at(RESPONSE_PAYLOAD_OFFSET, ByteOrder::Little)?)
    }

    pub fn read_register(&mut self, address: u16) -> Result<u32, ReaderError> {
        let response = self.execute(Command::RadioReadRegister, &[address.into()])?;
        Ok(response
            .decoder()
            .read_int_at(Self::REGISTER_VALUE_OFFSET, ByteOrder::Little)?)
    }

    pub fn write_register(&mut self, address: u16, value: u32) -> Result<(), ReaderError> {
        self.execute(Command::RadioWriteRegister, &[address.into(), value])
            .map(|_| ())
    }

    pub fn antenna_port_state(&mut self, port: u8) -> Result<bool, ReaderError> {
        let response = self.execute(Command::AntennaPortGetState, &[port.into()])?;
        Ok(response.decoder().read_byte_at(RESPONSE_PAYLOAD_OFFSET)? != 0)
    }

    pub fn set_antenna_port_state(&mut self, port: u8, enabled: bool) -> Result<(), ReaderError> {
        self.execute(Command::AntennaPortSetState, &[port.into(), enabled.into()])
            .map(|_| ())
    }

    /// Regulatory region index
    pub fn region(&mut self) -> Result<u8, ReaderError> {
        let response = self.execute(Command::MacGetRegion, &[])?;
        Ok(response.decoder().read_byte_at(RESPONSE_PAYLOAD_OFFSET)?)
    }

    pub fn set_region(&mut self, region: u8) -> Result<(), ReaderError> {
        self.execute(Command::MacSetRegion, &[region.into()]).map(|_| ())
    }

    /// Levels of the GPIO pins selected by `mask`
    pub fn read_gpio_pins(&mut self, mask: u8) -> Result<u8, ReaderError> {
        let response = self.execute(Command::ReadGpioPins, &[mask.into()])?;
        Ok(response.decoder().read_byte_at(RESPONSE_PAYLOAD_OFFSET)? & mask)
    }

    pub fn write_gpio_pins(&mut self, mask: u8, value: u8) -> Result<(), ReaderError> {
        self.execute(Command::WriteGpioPins, &[mask.into(), value.into()])
            .map(|_| ())
    }

    /// Module temperature in degrees Celsius
    pub fn temperature(&mut self) -> Result<i16, ReaderError> {
        let response = self.execute(Command::EngGetTemperature, &[])?;
        let raw = response
            .decoder()
            .read_short_at(RESPONSE_PAYLOAD_OFFSET, ByteOrder::Little)?;
        Ok(raw as i16)
    }

    /// Abort the running operation
    pub fn cancel(&mut self) -> Result<(), ReaderError> {
        self.execute(Command::ControlCancel, &[]).map(|_| ())
    }

    pub fn soft_reset(&mut self) -> Result<(), ReaderError> {
        self.execute(Command::ControlSoftReset, &[]).map(|_| ())
    }

    /// Run one inventory burst, calling `callback` for every decoded tag frame
    ///
    /// # Arguments
    /// * `perform_select` - apply the active select criteria before singulating
    /// * `callback` - Called with a snapshot of the burst record after each update
    ///
    /// # Returns
    /// Number of tag frames decoded before the End frame or the burst deadline
    pub fn inventory_with_callback<F>(
        &mut self,
        perform_select: bool,
        mut callback: F,
    ) -> Result<usize, ReaderError>
    where
        F: FnMut(TagRecord),
    {
        let frame = Command::TagInventory.encode(&self.codec, &[perform_select.into()])?;
        self.send(&frame)?;

        let decoder = InventoryDecoder::new(self.config.hex_style);
        let deadline = Instant::now() + self.config.burst_timeout;
        let mut record = TagRecord::new();
        let mut tag_count = 0;

        while let Some(frame) = self.next_frame(deadline)? {
            match frame.frame_type {
                FrameType::Response => {
                    let response = Response::parse(&frame.bytes, &self.codec)?;
                    if response.status() != 0 {
                        return Err(ReaderError::Device {
                            command: Command::TagInventory,
                            status: response.status(),
                        });
                    }
                }
                FrameType::Begin => {
                    let opcode = frame::raw_opcode(&frame.bytes)?;
                    if opcode != Command::TagInventory.opcode() {
                        return Err(ReaderError::UnexpectedResponse {
                            expected: Command::TagInventory.opcode(),
                            actual: opcode,
                        });
                    }
                    debug!("Inventory burst started");
                    record = TagRecord::new();
                }
                FrameType::Inventory | FrameType::Access => {
                    match decoder.decode(&frame.bytes, &mut record) {
                        Ok(DecodeOutcome::Updated) => {
                            callback(record.clone());
                            tag_count += 1;
                        }
                        Ok(DecodeOutcome::Discarded) => {}
                        Err(e) => {
                            warn!("Failed to parse frame: {}", e);
                        }
                    }
                }
                FrameType::Work => trace!("Reader busy"),
                FrameType::End => {
                    let status = status::end_status(&frame.bytes)?;
                    if status != 0 {
                        warn!("Inventory burst ended with status 0x{:08X}", status);
                    }
                    debug!("Inventory burst finished: {} tags", tag_count);
                    return Ok(tag_count);
                }
                FrameType::Command => debug!("Ignoring echoed command frame"),
            }
        }

        warn!("Inventory burst timed out after {} tags", tag_count);
        Ok(tag_count)
    }

    /// Run one inventory burst and collect every decoded tag frame
    pub fn inventory(&mut self, perform_select: bool) -> Result<Vec<TagRecord>, ReaderError> {
        let mut tags = Vec::new();
        self.inventory_with_callback(perform_select, |tag| tags.push(tag))?;
        Ok(tags)
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), ReaderError> {
        self.transport
            .clear_input()
            .map_err(|e| ReaderError::Transport(format!("{:?}", e)))?;
        self.assembler.clear();

        debug!("Sending command: {:02X?}", frame);
        let written = self
            .transport
            .write(frame)
            .map_err(|e| ReaderError::Transport(format!("{:?}", e)))?;
        debug!("Wrote {} bytes", written);

        if !self.config.settle_delay.is_zero() {
            std::thread::sleep(self.config.settle_delay);
        }
        Ok(())
    }

    /// Next complete frame, or `None` once `deadline` passes
    fn next_frame(&mut self, deadline: Instant) -> Result<Option<Frame>, ReaderError> {
        loop {
            if let Some(frame) = self.assembler.next_frame() {
                return Ok(Some(frame));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }

            let mut temp_buf = [0u8; 256];
            match self.transport.read(&mut temp_buf, Self::READ_SLICE_MS) {
                Ok(bytes_read) if bytes_read > 0 => {
                    trace!("Received {} bytes: {:02X?}", bytes_read, &temp_buf[..bytes_read]);
                    self.assembler.push(&temp_buf[..bytes_read]);
                }
                Ok(_) => std::thread::sleep(Duration::from_millis(5)),
                Err(e) => {
                    error!("Read error: {:?}", e);
                    return Err(ReaderError::Transport(format!("{:?}", e)));
                }
            }
        }
    }
}
