//! Serial debug console.
//!
//! Parses one trimmed line at a time into a [`ConsoleAction`].  The
//! console only parses: running the resulting command and printing
//! anything is left to the link owner.
//!
//! | Input          | Action                                   |
//! |----------------|------------------------------------------|
//! | `1`..`5`       | relay A on/off, relay B on/off, read     |
//! | `6` `7` `8`    | prompt, then threshold / device / master |
//! | `d FE`         | select outlet 0xFE                       |
//! | `d status`     | show the active outlet                   |
//! | `AT...`        | HC-12 configuration passthrough          |
//! | `AA ...`       | raw hex passthrough                      |
//! | `help` / `?`   | menu                                     |

use crate::app::commands::{OutletCommand, PassthroughLine};
use crate::rf::packet::Socket;

/// Menu body shown for `help`; the owner prints the active target above it.
pub const HELP_LINES: &[&str] = &[
    "  COMMANDS:",
    "  1 = Relay A ON     5 = Read Sensors",
    "  2 = Relay A OFF    6 = Set Threshold",
    "  3 = Relay B ON     7 = Set Device ID",
    "  4 = Relay B OFF    8 = Set Master ID",
    "  DEVICE:",
    "  d FE       -> switch target to 0xFE",
    "  d status   -> show current state",
    "  RAW HEX:",
    "  AA FE 00 02 00 01 FD BB",
    "  AT         -> HC-12 AT commands",
    "  help       -> show this menu",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Execute(OutletCommand),
    /// A value is needed; the next line answers this prompt.
    Prompt(&'static str),
    ShowStatus,
    ShowHelp,
    Rejected(&'static str),
    /// Blank line.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Threshold,
    DeviceId,
    MasterId,
}

#[derive(Debug, Default)]
pub struct SerialConsole {
    awaiting: Option<Awaiting>,
}

impl SerialConsole {
    pub fn new() -> Self {
        Self { awaiting: None }
    }

    /// True between a `6`/`7`/`8` key and the value line that follows.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn handle_line(&mut self, line: &str) -> ConsoleAction {
        let input = line.trim();
        if input.is_empty() {
            return ConsoleAction::Ignored;
        }

        // Any non-blank line answers a pending prompt, valid or not.
        if let Some(field) = self.awaiting.take() {
            return parse_value(field, input);
        }

        if let [key @ b'1'..=b'8'] = input.as_bytes() {
            return self.handle_key(*key);
        }

        if let Some(arg) = strip_prefix_ci(input, "d ") {
            let arg = arg.trim();
            if arg.eq_ignore_ascii_case("status") {
                return ConsoleAction::ShowStatus;
            }
            return match parse_hex_u8(arg) {
                Some(id) => ConsoleAction::Execute(OutletCommand::Select(id)),
                None => ConsoleAction::Rejected("Invalid device ID"),
            };
        }

        if strip_prefix_ci(input, "AT").is_some() {
            return passthrough(input).map_or(TOO_LONG, |l| {
                ConsoleAction::Execute(OutletCommand::AtCommand(l))
            });
        }

        if strip_prefix_ci(input, "AA").is_some() {
            return passthrough(input).map_or(TOO_LONG, |l| {
                ConsoleAction::Execute(OutletCommand::RawHex(l))
            });
        }

        if input.eq_ignore_ascii_case("help") || input == "?" {
            return ConsoleAction::ShowHelp;
        }

        ConsoleAction::Rejected("Unknown command. Type 'help' for options.")
    }

    fn handle_key(&mut self, key: u8) -> ConsoleAction {
        let command = match key {
            b'1' => OutletCommand::RelayOn(Socket::A),
            b'2' => OutletCommand::RelayOff(Socket::A),
            b'3' => OutletCommand::RelayOn(Socket::B),
            b'4' => OutletCommand::RelayOff(Socket::B),
            b'5' => OutletCommand::ReadSensors,
            b'6' => {
                self.awaiting = Some(Awaiting::Threshold);
                return ConsoleAction::Prompt("Threshold (mA): ");
            }
            b'7' => {
                self.awaiting = Some(Awaiting::DeviceId);
                return ConsoleAction::Prompt("New Device ID (hex): ");
            }
            _ => {
                self.awaiting = Some(Awaiting::MasterId);
                return ConsoleAction::Prompt("New Master ID (hex): ");
            }
        };
        ConsoleAction::Execute(command)
    }
}

const TOO_LONG: ConsoleAction = ConsoleAction::Rejected("Line too long");

fn parse_value(field: Awaiting, input: &str) -> ConsoleAction {
    match field {
        Awaiting::Threshold => match input.parse::<u16>() {
            Ok(ma) => ConsoleAction::Execute(OutletCommand::SetThreshold(ma)),
            Err(_) => ConsoleAction::Rejected("Invalid threshold value"),
        },
        Awaiting::DeviceId => match parse_hex_u8(input) {
            Some(id) => ConsoleAction::Execute(OutletCommand::SetDeviceId(id)),
            None => ConsoleAction::Rejected("Invalid device ID"),
        },
        Awaiting::MasterId => match parse_hex_u8(input) {
            Some(id) => ConsoleAction::Execute(OutletCommand::SetMasterId(id)),
            None => ConsoleAction::Rejected("Invalid master ID"),
        },
    }
}

/// `FE`, `fe` or `0xFE`.
fn parse_hex_u8(s: &str) -> Option<u8> {
    let digits = strip_prefix_ci(s, "0x").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn passthrough(input: &str) -> Option<PassthroughLine> {
    PassthroughLine::try_from(input).ok()
}
