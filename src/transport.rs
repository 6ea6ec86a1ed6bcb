//! Byte transport between the host and the reader module

/// Trait for reader communication backends.
/// Implement this for each physical link (serial port, UART, ...).
pub trait RfidTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Write a complete frame to the link
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read whatever is available, waiting at most `timeout_ms` milliseconds.
    /// Returning `Ok(0)` means nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Drop any unread input
    fn clear_input(&mut self) -> Result<(), Self::Error>;
}
