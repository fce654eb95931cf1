//! Port traits: the hexagonal boundary between the link core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LinkCoordinator (domain)
//! ```
//!
//! The serial link itself is the [`Transport`](crate::rf::transport::Transport)
//! port.  The traits here cover the remaining collaborators: where
//! diagnostics go and where time comes from.

use super::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / dashboard)
// ───────────────────────────────────────────────────────────────

/// The core emits every diagnostic through this port, including the
/// passthrough text that arrives between frames.
pub trait EventSink {
    fn emit(&mut self, event: &LinkEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ← monotonic timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds.  Used for the frame stall timeout and for
/// confirmation deadlines.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
