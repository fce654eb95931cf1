//! Link configuration parameters
//!
//! Tunables for the HC-12 link and the confirmation waiter.  Registry
//! capacity is fixed at compile time ([`crate::outlet::MAX_OUTLETS`]).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Must match the outlets' factory DEFAULT_ID_MASTER.
pub const DEFAULT_SENDER_ID: u8 = 0x01;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    // --- Addressing ---
    /// Protocol address this control unit claims at boot
    pub sender_id: u8,

    // --- Radio ---
    /// HC-12 UART baud rate
    pub baud_rate: u32,
    /// Drop a partial frame after this long without a new byte (ms)
    pub frame_timeout_ms: u32,

    // --- Confirmation ---
    /// How long to wait for a confirming ACK (ms)
    pub confirm_timeout_ms: u32,
    /// Sleep between link polls while waiting (ms)
    pub confirm_poll_interval_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            sender_id: DEFAULT_SENDER_ID,

            // Radio
            baud_rate: 9600,       // HC-12 factory default
            frame_timeout_ms: 250, // ~30x one frame's airtime at 9600 baud

            // Confirmation
            confirm_timeout_ms: 3000,
            confirm_poll_interval_ms: 50,
        }
    }
}

impl LinkConfig {
    /// Reject settings the link cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be > 0"));
        }
        if self.frame_timeout_ms == 0 {
            return Err(Error::Config("frame_timeout_ms must be > 0"));
        }
        if self.confirm_timeout_ms == 0 {
            return Err(Error::Config("confirm_timeout_ms must be > 0"));
        }
        if self.confirm_poll_interval_ms == 0 {
            return Err(Error::Config("confirm_poll_interval_ms must be > 0"));
        }
        if self.confirm_poll_interval_ms >= self.confirm_timeout_ms {
            return Err(Error::Config(
                "confirm_poll_interval_ms must be shorter than confirm_timeout_ms",
            ));
        }
        Ok(())
    }
}
