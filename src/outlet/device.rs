//! Per-outlet state, trustworthy only once acknowledged.
//!
//! Every field is ternary: unknown until the outlet confirms it.  Writes
//! that must be confirmed (threshold, master id) are staged in a pending
//! slot when the command goes out and committed when the matching ACK
//! arrives.  Relay states are never staged; only the ACK sets them.
//!
//! ```text
//!  stage_threshold(v)          ACK(SET_THRESHOLD)
//!  pending = Some(v)  ───────▶ threshold = Some(v), pending = None
//! ```

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::rf::packet::{Command, Socket};

/// Longest name an outlet can carry.
pub const NAME_MAX: usize = 19;

/// Fixed-capacity operator label.
pub type DeviceName = String<NAME_MAX>;

/// Confirmed relay position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelayState {
    #[default]
    Unknown,
    Off,
    On,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Unknown => "---",
            Self::Off => "OFF",
            Self::On => "ON",
        })
    }
}

/// What an acknowledgment did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckEffect {
    /// A relay moved to a confirmed state.
    Relay { socket: Socket, state: RelayState },
    /// The staged threshold became authoritative.
    ThresholdCommitted(u16),
    /// The staged master id became authoritative.
    MasterCommitted(u8),
    /// A commit-type ACK arrived with nothing staged; absorbed.
    NothingStaged(Command),
    /// PING / SET_DEVICE_ID: no field changes.
    Informational(Command),
    /// Unknown command echo, or a relay ACK with an unknown scope byte.
    Ignored,
}

/// Snapshot handed to the dashboard / cloud layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub id: u8,
    pub name: DeviceName,
    pub relay_a: RelayState,
    pub relay_b: RelayState,
    pub current_a_ma: Option<u16>,
    pub current_b_ma: Option<u16>,
    pub threshold_ma: Option<u16>,
    pub pending_threshold_ma: Option<u16>,
    pub master_id: Option<u8>,
    pub pending_master_id: Option<u8>,
}

impl fmt::Display for DeviceStatus {
    /// Console rendering; `---` marks anything not yet confirmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Opt<T>(Option<T>, &'static str);

        impl<T: fmt::Display> fmt::Display for Opt<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match &self.0 {
                    Some(v) => write!(f, "{}{}", v, self.1),
                    None => f.write_str("---"),
                }
            }
        }

        let name = if self.name.is_empty() { "(unnamed)" } else { self.name.as_str() };
        writeln!(f, "Outlet 0x{:02X} {}", self.id, name)?;
        writeln!(
            f,
            "  Relay A: {:<4} I: {}",
            self.relay_a,
            Opt(self.current_a_ma, " mA")
        )?;
        writeln!(
            f,
            "  Relay B: {:<4} I: {}",
            self.relay_b,
            Opt(self.current_b_ma, " mA")
        )?;
        write!(f, "  Threshold: {}", Opt(self.threshold_ma, " mA"))?;
        if let Some(p) = self.pending_threshold_ma {
            write!(f, " (pending {} mA)", p)?;
        }
        match self.master_id {
            Some(m) => write!(f, "\n  Master: 0x{:02X}", m)?,
            None => f.write_str("\n  Master: ---")?,
        }
        if let Some(p) = self.pending_master_id {
            write!(f, " (pending 0x{:02X})", p)?;
        }
        Ok(())
    }
}

/// One remote outlet as seen from the control unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletDevice {
    id: u8,
    name: DeviceName,
    active: bool,

    relay_a: RelayState,
    relay_b: RelayState,

    // Observations from REPORT_DATA, not staged.
    current_a_ma: Option<u16>,
    current_b_ma: Option<u16>,

    threshold_ma: Option<u16>,
    pending_threshold_ma: Option<u16>,
    master_id: Option<u8>,
    pending_master_id: Option<u8>,
}

impl OutletDevice {
    /// A freshly registered outlet: everything unknown.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            name: DeviceName::new(),
            active: true,
            relay_a: RelayState::Unknown,
            relay_b: RelayState::Unknown,
            current_a_ma: None,
            current_b_ma: None,
            threshold_ma: None,
            pending_threshold_ma: None,
            master_id: None,
            pending_master_id: None,
        }
    }

    // ── Identity ──────────────────────────────────────────────

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Set the label, truncated to [`NAME_MAX`] bytes on a char boundary.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars() {
            if self.name.push(c).is_err() {
                break;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Take on a new protocol address.  Confirmation state is cleared
    /// since it described the outlet under its old address.
    pub(crate) fn readdress(&mut self, new_id: u8) {
        self.id = new_id;
        self.reset_state();
    }

    // ── Confirmed state ───────────────────────────────────────

    pub fn relay(&self, socket: Socket) -> RelayState {
        match socket {
            Socket::A => self.relay_a,
            Socket::B => self.relay_b,
        }
    }

    pub fn current_ma(&self, socket: Socket) -> Option<u16> {
        match socket {
            Socket::A => self.current_a_ma,
            Socket::B => self.current_b_ma,
        }
    }

    pub fn threshold_ma(&self) -> Option<u16> {
        self.threshold_ma
    }

    pub fn master_id(&self) -> Option<u8> {
        self.master_id
    }

    pub fn pending_threshold_ma(&self) -> Option<u16> {
        self.pending_threshold_ma
    }

    pub fn pending_master_id(&self) -> Option<u8> {
        self.pending_master_id
    }

    // ── Writes ────────────────────────────────────────────────

    /// Record a sensor observation for one socket.
    pub fn set_current_ma(&mut self, socket: Socket, milliamps: u16) {
        match socket {
            Socket::A => self.current_a_ma = Some(milliamps),
            Socket::B => self.current_b_ma = Some(milliamps),
        }
    }

    pub fn stage_threshold(&mut self, milliamps: u16) {
        self.pending_threshold_ma = Some(milliamps);
    }

    pub fn stage_master_id(&mut self, id: u8) {
        self.pending_master_id = Some(id);
    }

    /// Apply an acknowledgment.
    ///
    /// `scope` is the ACK's data-high byte (socket for relay commands,
    /// 0x00 otherwise); `original` is the echoed command code in data-low.
    /// Handlers only overwrite, so a repeated ACK is idempotent.
    pub fn on_ack(&mut self, scope: u8, original: u8) -> AckEffect {
        let Some(cmd) = Command::from_code(original) else {
            return AckEffect::Ignored;
        };

        match cmd {
            Command::RelayOn | Command::RelayOff => {
                let Some(socket) = Socket::from_byte(scope) else {
                    return AckEffect::Ignored;
                };
                let state = if cmd == Command::RelayOn {
                    RelayState::On
                } else {
                    RelayState::Off
                };
                match socket {
                    Socket::A => self.relay_a = state,
                    Socket::B => self.relay_b = state,
                }
                AckEffect::Relay { socket, state }
            }

            Command::SetThreshold => match self.pending_threshold_ma.take() {
                Some(v) => {
                    self.threshold_ma = Some(v);
                    AckEffect::ThresholdCommitted(v)
                }
                None => AckEffect::NothingStaged(cmd),
            },

            Command::SetIdMaster => match self.pending_master_id.take() {
                Some(v) => {
                    self.master_id = Some(v);
                    AckEffect::MasterCommitted(v)
                }
                None => AckEffect::NothingStaged(cmd),
            },

            Command::SetDeviceId | Command::Ping => AckEffect::Informational(cmd),

            Command::ReadCurrent | Command::ReportData | Command::Ack => AckEffect::Ignored,
        }
    }

    /// Forget confirmation state.
    ///
    /// Leaves id, name, the active flag and current readings alone: those
    /// are identity and observations, not command confirmations.
    pub fn reset_state(&mut self) {
        self.relay_a = RelayState::Unknown;
        self.relay_b = RelayState::Unknown;
        self.threshold_ma = None;
        self.pending_threshold_ma = None;
        self.master_id = None;
        self.pending_master_id = None;
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            id: self.id,
            name: self.name.clone(),
            relay_a: self.relay_a,
            relay_b: self.relay_b,
            current_a_ma: self.current_a_ma,
            current_b_ma: self.current_b_ma,
            threshold_ma: self.threshold_ma,
            pending_threshold_ma: self.pending_threshold_ma,
            master_id: self.master_id,
            pending_master_id: self.pending_master_id,
        }
    }
}
