//! Transport abstraction: the half-duplex serial radio link.
//!
//! Concrete implementations:
//! - HC-12 on UART2 (ESP32), see [`crate::adapters::hc12`]
//! - In-memory simulation on the host (same module)
//!
//! The coordinator is generic over `Transport`, so swapping the radio
//! module touches nothing above this trait.

/// Byte-oriented duplex channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` already-received bytes into `buf`.
    /// Returns 0 if nothing is waiting (never blocks).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the link.
    /// Returns the number of bytes actually accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// A null transport that discards all writes and never reads.
/// Stands in while the radio is not yet configured.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}
