//! Application core: link logic, zero direct I/O.
//!
//! The [`coordinator`] turns the HC-12 byte stream into outlet state and
//! the outward command API into packets.  [`confirm`] layers bounded
//! acknowledgment waits on top.  All interaction with the radio, the clock
//! and the console happens through **port traits** ([`ports`] and
//! [`Transport`](crate::rf::transport::Transport)), keeping this layer
//! fully testable without real peripherals.

pub mod channels;
pub mod commands;
pub mod confirm;
pub mod coordinator;
pub mod events;
pub mod ports;
