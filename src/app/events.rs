//! Outbound link events.
//!
//! The [`LinkCoordinator`](super::coordinator::LinkCoordinator) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to the console, forward to
//! the dashboard, count them for telemetry.

use heapless::Vec;

use crate::outlet::AckEffect;
use crate::rf::packet::{PACKET_SIZE, Packet};

/// Largest run of passthrough text delivered in one event.
pub const TEXT_CHUNK: usize = 64;

/// A run of printable debug text from the outlet side.
pub type TextChunk = Vec<u8, TEXT_CHUNK>;

/// Structured events emitted by the link core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Out-of-band ASCII seen between frames.
    DebugText(TextChunk),

    /// A partial frame stalled and was thrown away.
    FrameTimeout { discarded: usize },

    /// An 8-byte frame failed SOF / EOF / CRC validation.
    PacketDropped { raw: [u8; PACKET_SIZE] },

    /// A frame passed validation (emitted before dispatch).
    PacketReceived(Packet),

    /// ACK from `sender`.  `effect` is `None` when the sender is not in
    /// the registry.
    Ack {
        sender: u8,
        scope: u8,
        original: u8,
        effect: Option<AckEffect>,
    },

    /// Current reading; `device` is the id it was attributed to, if any.
    CurrentReport {
        sender: u8,
        milliamps: u16,
        device: Option<u8>,
    },

    /// REPORT_DATA carrying the overload sentinel.
    OverloadTrip { sender: u8 },

    /// Valid frame whose command the control unit does not handle.
    UnhandledCommand { sender: u8, command: u8 },

    /// A protocol packet was written to the link.
    PacketSent(Packet),

    /// Bytes written by a passthrough, bypassing framing.
    RawSent { len: usize },

    DeviceSelected { id: u8, index: usize, created: bool },

    DeviceRemoved { id: u8 },

    /// This unit's own protocol address changed.
    SenderChanged(u8),
}
