//! HC-12 serial radio adapter.
//!
//! Implements [`Transport`] over the UART wired to the HC-12 module.
//!
//! - **`target_os = "espidf"`**: wraps an `esp-idf-hal` [`UartDriver`]
//!   with non-blocking reads.
//! - **`not(target_os = "espidf")`**: an in-memory link for host tests:
//!   inject bytes "from the air", collect what was written.
//!
//! [`UartDriver`]: esp_idf_hal::uart::UartDriver

use crate::rf::transport::Transport;

// ───────────────────────────────────────────────────────────────
// ESP-IDF UART
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
    use esp_idf_sys::EspError;
    use esp_idf_hal::uart::UartDriver;

    use super::Transport;

    /// HC-12 on a hardware UART.
    pub struct Hc12Transport<'d> {
        uart: UartDriver<'d>,
    }

    impl<'d> Hc12Transport<'d> {
        pub fn new(uart: UartDriver<'d>) -> Self {
            Self { uart }
        }
    }

    impl Transport for Hc12Transport<'_> {
        type Error = EspError;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
            self.uart.read(buf, NON_BLOCK)
        }

        fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
            self.uart.write(data)
        }

        fn flush(&mut self) -> Result<(), EspError> {
            self.uart.wait_tx_done(BLOCK)
        }

        fn available(&self) -> bool {
            self.uart.remaining_read().is_ok_and(|n| n > 0)
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::Hc12Transport;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::collections::VecDeque;
    use std::vec::Vec;

    use super::Transport;

    /// Failure injected into the simulated UART.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SimUartError;

    /// Loopback-free in-memory HC-12.
    #[derive(Debug, Default)]
    pub struct Hc12Transport {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        /// Largest chunk returned by one `read`, to exercise split frames.
        read_chunk: Option<usize>,
        /// Accept at most this many bytes per `write`.
        write_limit: Option<usize>,
        fail_reads: bool,
    }

    impl Hc12Transport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue bytes as if they had arrived over the air.
        pub fn inject_rx(&mut self, bytes: &[u8]) {
            self.rx.extend(bytes.iter().copied());
        }

        /// Everything written since the last call.
        pub fn take_tx(&mut self) -> Vec<u8> {
            core::mem::take(&mut self.tx)
        }

        pub fn pending_rx(&self) -> usize {
            self.rx.len()
        }

        pub fn set_read_chunk(&mut self, chunk: usize) {
            self.read_chunk = Some(chunk.max(1));
        }

        pub fn set_write_limit(&mut self, limit: Option<usize>) {
            self.write_limit = limit;
        }

        pub fn set_fail_reads(&mut self, fail: bool) {
            self.fail_reads = fail;
        }
    }

    impl Transport for Hc12Transport {
        type Error = SimUartError;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, SimUartError> {
            if self.fail_reads {
                return Err(SimUartError);
            }
            let limit = self.read_chunk.unwrap_or(buf.len()).min(buf.len());
            let n = limit.min(self.rx.len());
            for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }

        fn write(&mut self, data: &[u8]) -> Result<usize, SimUartError> {
            let n = self.write_limit.map_or(data.len(), |l| l.min(data.len()));
            self.tx.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), SimUartError> {
            Ok(())
        }

        fn available(&self) -> bool {
            !self.rx.is_empty()
        }
    }

}

#[cfg(not(target_os = "espidf"))]
pub use sim::{Hc12Transport, SimUartError};
