//! Inbound commands to the link coordinator.
//!
//! These are the operations the dashboard, the cloud client and the
//! serial console may request.  Other tasks hand them to the owning task
//! through [`channels`](super::channels); the console produces them
//! directly.

use heapless::String;

use crate::outlet::DeviceName;
use crate::rf::packet::Socket;

/// Longest AT / raw-hex line carried in a command.
pub const PASSTHROUGH_MAX: usize = 160;

pub type PassthroughLine = String<PASSTHROUGH_MAX>;

/// Commands that external adapters can send into the link core.
///
/// None of these wait for an acknowledgment; see
/// [`confirm`](super::confirm) for the operations that do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutletCommand {
    /// Make `id` the addressed outlet, registering it if new.
    Select(u8),

    /// Drop the outlet at this registry index.
    Remove(usize),

    Rename { index: usize, name: DeviceName },

    RelayOn(Socket),

    RelayOff(Socket),

    /// Ask the outlet for fresh current readings.
    ReadSensors,

    /// Overload threshold in mA (staged until ACKed).
    SetThreshold(u16),

    /// Re-address the active outlet (outlet must be in config mode).
    SetDeviceId(u8),

    /// Tell the active outlet who its master is (staged until ACKed).
    SetMasterId(u8),

    Ping,

    /// Change this unit's own protocol address.
    SetSenderId(u8),

    /// Hex bytes written straight to the radio.
    RawHex(PassthroughLine),

    /// HC-12 configuration string written straight to the radio.
    AtCommand(PassthroughLine),
}
