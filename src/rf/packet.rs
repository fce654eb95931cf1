//! Fixed 8-byte RF packet codec.
//!
//! Wire format:
//! ```text
//! ┌──────┬────────┬────────┬─────────┬────────┬────────┬─────┬──────┐
//! │ 0xAA │ TARGET │ SENDER │ COMMAND │ DATA_H │ DATA_L │ CRC │ 0xBB │
//! └──────┴────────┴────────┴─────────┴────────┴────────┴─────┴──────┘
//!   CRC = TARGET ^ SENDER ^ COMMAND ^ DATA_H ^ DATA_L
//! ```
//!
//! The XOR checksum catches every single-bit error but not flips that
//! cancel each other out.  The remote outlet firmware computes exactly this
//! value, so it must stay as is.

use core::fmt;

/// Start-of-frame marker.
pub const SOF: u8 = 0xAA;

/// End-of-frame marker.
pub const EOF: u8 = 0xBB;

/// Every packet on the link is exactly this long.
pub const PACKET_SIZE: usize = 8;

/// REPORT_DATA value meaning "overload trip", carrying no reading.
pub const OVERLOAD_SENTINEL: u16 = 0xFFFF;

// ---------------------------------------------------------------------------
// Command codes
// ---------------------------------------------------------------------------

/// Protocol command codes shared with the outlet firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Ping = 0x01,
    RelayOn = 0x02,
    RelayOff = 0x03,
    ReadCurrent = 0x04,
    /// Outlet → control unit.
    ReportData = 0x05,
    /// Outlet → control unit.
    Ack = 0x06,
    SetThreshold = 0x07,
    /// Only honoured while the outlet is in config mode.
    SetDeviceId = 0x08,
    /// Only honoured while the outlet is in config mode.
    SetIdMaster = 0x09,
}

impl Command {
    /// Decode a raw command byte.  Unrecognised codes yield `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Ping),
            0x02 => Some(Self::RelayOn),
            0x03 => Some(Self::RelayOff),
            0x04 => Some(Self::ReadCurrent),
            0x05 => Some(Self::ReportData),
            0x06 => Some(Self::Ack),
            0x07 => Some(Self::SetThreshold),
            0x08 => Some(Self::SetDeviceId),
            0x09 => Some(Self::SetIdMaster),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::RelayOn => "RELAY_ON",
            Self::RelayOff => "RELAY_OFF",
            Self::ReadCurrent => "READ_CURRENT",
            Self::ReportData => "REPORT_DATA",
            Self::Ack => "ACK",
            Self::SetThreshold => "SET_THRESHOLD",
            Self::SetDeviceId => "SET_DEVICE_ID",
            Self::SetIdMaster => "SET_ID_MASTER",
        }
    }
}

/// Diagnostic name for any command byte; `"UNKNOWN"` if unrecognised.
pub const fn command_name(code: u8) -> &'static str {
    match Command::from_code(code) {
        Some(cmd) => cmd.name(),
        None => "UNKNOWN",
    }
}

// ---------------------------------------------------------------------------
// Socket identifiers
// ---------------------------------------------------------------------------

/// The two switched sockets on an outlet.
///
/// The same byte values appear as the scope byte of relay commands and
/// ACKs, and as the sender address of per-socket current reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Socket {
    A = 0x01,
    B = 0x02,
}

impl Socket {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::A),
            0x02 => Some(Self::B),
            _ => None,
        }
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// XOR checksum over the five payload bytes.
pub const fn checksum(target: u8, sender: u8, command: u8, data_high: u8, data_low: u8) -> u8 {
    target ^ sender ^ command ^ data_high ^ data_low
}

/// One 8-byte protocol unit.
///
/// Immutable once built.  Bytes are unchecked: a `Packet` read off the
/// wire may be invalid until [`Packet::verify`] says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    sof: u8,
    target: u8,
    sender: u8,
    command: u8,
    data_high: u8,
    data_low: u8,
    crc: u8,
    eof: u8,
}

impl Packet {
    /// Build a well-formed packet.  All byte values are legal.
    pub const fn build(target: u8, sender: u8, command: u8, data_high: u8, data_low: u8) -> Self {
        Self {
            sof: SOF,
            target,
            sender,
            command,
            data_high,
            data_low,
            crc: checksum(target, sender, command, data_high, data_low),
            eof: EOF,
        }
    }

    /// Checksum the payload bytes as they currently stand.
    pub const fn compute_crc(&self) -> u8 {
        checksum(
            self.target,
            self.sender,
            self.command,
            self.data_high,
            self.data_low,
        )
    }

    /// `true` only if SOF, EOF and CRC all match.
    pub const fn verify(&self) -> bool {
        self.sof == SOF && self.eof == EOF && self.crc == self.compute_crc()
    }

    /// Structural reinterpretation; never validates.
    pub const fn from_bytes(b: [u8; PACKET_SIZE]) -> Self {
        Self {
            sof: b[0],
            target: b[1],
            sender: b[2],
            command: b[3],
            data_high: b[4],
            data_low: b[5],
            crc: b[6],
            eof: b[7],
        }
    }

    pub const fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        [
            self.sof,
            self.target,
            self.sender,
            self.command,
            self.data_high,
            self.data_low,
            self.crc,
            self.eof,
        ]
    }

    pub const fn sof(&self) -> u8 {
        self.sof
    }

    pub const fn target(&self) -> u8 {
        self.target
    }

    pub const fn sender(&self) -> u8 {
        self.sender
    }

    pub const fn command(&self) -> u8 {
        self.command
    }

    pub const fn data_high(&self) -> u8 {
        self.data_high
    }

    pub const fn data_low(&self) -> u8 {
        self.data_low
    }

    pub const fn crc(&self) -> u8 {
        self.crc
    }

    pub const fn eof(&self) -> u8 {
        self.eof
    }

    /// `data_high:data_low` as a big-endian 16-bit value.
    pub const fn value(&self) -> u16 {
        u16::from_be_bytes([self.data_high, self.data_low])
    }

    pub const fn kind(&self) -> Option<Command> {
        Command::from_code(self.command)
    }
}

/// Space-separated uppercase hex, e.g. `AA FE 01 06 01 02 FA BB`.
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.to_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}
