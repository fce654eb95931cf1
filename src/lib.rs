//! Control-unit firmware library: HC-12 link driver for smart outlets.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! inside the adapters, which carry host simulations otherwise.
//!
//! ```text
//!  rf       packet codec · framer · hex · Transport port
//!  outlet   per-outlet state · registry
//!  app      coordinator · confirm waiter · ports · channels
//!  console  serial debug command parser
//!  adapters HC-12 UART · log sink · time
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod outlet;
pub mod pins;
pub mod rf;

pub use error::{Error, Result};
