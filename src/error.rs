//! Unified error types for the control-unit link driver.
//!
//! A single `Error` enum that every subsystem converts into, so the owning
//! task handles link, registry and confirmation failures uniformly.  All
//! variants are `Copy`; nothing here is fatal.
//!
//! Framing noise, integrity failures and reports from unknown senders are
//! deliberately absent: those are routed to the event sink, not returned.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The device registry refused the operation.
    Registry(RegistryError),
    /// The serial link failed or the request could not be encoded.
    Link(LinkError),
    /// A bounded wait for an acknowledgment expired.
    Confirm(ConfirmError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Confirm(e) => write!(f, "confirm: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// All slots are populated; the new id was not added.
    CapacityExceeded,
    /// The registry is empty so there is no device to address.
    NoActiveDevice,
    /// Index does not refer to a populated slot.
    IndexOutOfRange,
    /// Another record already uses this id.
    DuplicateId(u8),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "max outlets reached"),
            Self::NoActiveDevice => write!(f, "no active device"),
            Self::IndexOutOfRange => write!(f, "device index out of range"),
            Self::DuplicateId(id) => write!(f, "device id 0x{id:02X} already registered"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport reported a read failure.
    ReadFailed,
    /// The transport reported a write failure.
    WriteFailed,
    /// The transport accepted fewer bytes than requested.
    ShortWrite,
    /// A raw hex string had an odd length or a non-hex digit.
    InvalidHex,
    /// A passthrough payload exceeds the staging buffer.
    PayloadTooLong,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "serial read failed"),
            Self::WriteFailed => write!(f, "serial write failed"),
            Self::ShortWrite => write!(f, "short serial write"),
            Self::InvalidHex => write!(f, "hex string must have an even number of hex digits"),
            Self::PayloadTooLong => write!(f, "payload too long"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Confirmation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmError {
    /// No matching acknowledgment before the deadline.
    Timeout { waited_ms: u64 },
}

impl fmt::Display for ConfirmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { waited_ms } => write!(f, "no ACK after {waited_ms} ms"),
        }
    }
}

impl From<ConfirmError> for Error {
    fn from(e: ConfirmError) -> Self {
        Self::Confirm(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
