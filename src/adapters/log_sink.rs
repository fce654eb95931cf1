//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing link events to the `log` facade
//! (the ESP-IDF logger on target, which goes to the USB serial console).
//! A dashboard or cloud adapter would implement the same trait.
//!
//! Passthrough text arrives in arbitrary chunks; it is reassembled into
//! lines before logging so outlet debug prints stay readable.

use heapless::String;
use log::{debug, info, warn};

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;
use crate::outlet::AckEffect;
use crate::rf::packet::command_name;

/// Longest outlet debug line kept; the rest is logged on overflow.
const LINE_MAX: usize = 128;

/// Adapter that logs every [`LinkEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    line: String<LINE_MAX>,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { line: String::new() }
    }

    fn push_text(&mut self, chunk: &[u8]) {
        for &b in chunk {
            match b {
                b'\r' => {}
                b'\n' => self.flush_line(),
                _ => {
                    if self.line.push(char::from(b)).is_err() {
                        self.flush_line();
                        self.line.push(char::from(b)).ok();
                    }
                }
            }
        }
    }

    fn flush_line(&mut self) {
        if !self.line.is_empty() {
            info!("[TEXT] {}", self.line);
            self.line.clear();
        }
    }

    /// Text of a line not yet terminated by `\n`.
    pub fn partial_line(&self) -> &str {
        &self.line
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::DebugText(chunk) => self.push_text(chunk),
            LinkEvent::FrameTimeout { discarded } => {
                warn!("[DROP] stalled frame, {} byte(s)", discarded);
            }
            LinkEvent::PacketDropped { raw } => {
                warn!("[DROP] invalid frame {:02X?}", raw);
            }
            LinkEvent::PacketReceived(p) => {
                debug!("[RX] {} ({})", p, command_name(p.command()));
            }
            LinkEvent::Ack {
                sender,
                scope,
                original,
                effect,
            } => match effect {
                Some(AckEffect::Relay { socket, state }) => info!(
                    "[ACK] 0x{:02X} relay {} {}",
                    sender,
                    socket.label(),
                    state
                ),
                Some(AckEffect::ThresholdCommitted(ma)) => {
                    info!("[ACK] 0x{:02X} threshold {} mA", sender, ma);
                }
                Some(AckEffect::MasterCommitted(id)) => {
                    info!("[ACK] 0x{:02X} master 0x{:02X}", sender, id);
                }
                Some(AckEffect::NothingStaged(cmd)) => {
                    warn!("[ACK] 0x{:02X} {} with nothing pending", sender, cmd.name());
                }
                Some(AckEffect::Informational(cmd)) => {
                    info!("[ACK] 0x{:02X} {}", sender, cmd.name());
                }
                Some(AckEffect::Ignored) | None => info!(
                    "[ACK] 0x{:02X} scope 0x{:02X} cmd {}",
                    sender,
                    scope,
                    command_name(*original)
                ),
            },
            LinkEvent::CurrentReport {
                sender,
                milliamps,
                device,
            } => match device {
                Some(id) => info!(
                    "[DATA] 0x{:02X} socket 0x{:02X}: {} mA",
                    id, sender, milliamps
                ),
                None => info!("[DATA] 0x{:02X} (unattributed): {} mA", sender, milliamps),
            },
            LinkEvent::OverloadTrip { sender } => {
                warn!("[DATA] 0x{:02X} OVERLOAD TRIP", sender);
            }
            LinkEvent::UnhandledCommand { sender, command } => {
                debug!("[RX] 0x{:02X} sent {}, not handled", sender, command_name(*command));
            }
            LinkEvent::PacketSent(p) => {
                info!("[TX] {} ({})", p, command_name(p.command()));
            }
            LinkEvent::RawSent { len } => debug!("[TX] passthrough {} byte(s)", len),
            LinkEvent::DeviceSelected { id, index, created } => {
                if *created {
                    info!("[DEV] new outlet 0x{:02X} in slot {}", id, index);
                } else {
                    info!("[DEV] target 0x{:02X}", id);
                }
            }
            LinkEvent::DeviceRemoved { id } => info!("[DEV] removed 0x{:02X}", id),
            LinkEvent::SenderChanged(id) => info!("[LINK] sender id 0x{:02X}", id),
        }
    }
}
