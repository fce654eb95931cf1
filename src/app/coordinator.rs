//! Link coordinator: the hexagonal core.
//!
//! [`LinkCoordinator`] owns the radio transport, the frame assembler and
//! the outlet registry.  It turns the raw byte stream into validated
//! packets, applies them to device state, and exposes the outward command
//! API.  All diagnostics leave through the [`EventSink`] port, so the
//! whole coordinator runs on the host against mock adapters.
//!
//! ```text
//!  Transport ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │       LinkCoordinator        │
//!  Transport ◀── │  Framer · Codec · Registry   │
//!                └─────────────────────────────┘
//! ```
//!
//! Single-threaded by construction: every mutation happens inside a call
//! on the one task that owns the coordinator.  Other tasks reach it only
//! through [`channels`](super::channels).

use log::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, RegistryError, Result};
use crate::outlet::{DeviceStatus, OutletDevice, Registry, Selection};
use crate::rf::framer::{FrameAssembler, RxItem};
use crate::rf::hex::decode_hex;
use crate::rf::packet::{Command, OVERLOAD_SENTINEL, PACKET_SIZE, Packet, Socket};
use crate::rf::transport::Transport;

use super::commands::OutletCommand;
use super::events::{LinkEvent, TextChunk};
use super::ports::EventSink;

/// Bytes pulled from the transport per read call.
const READ_CHUNK: usize = 64;

/// Scope byte for commands that do not address a socket.
const SYSTEM_SCOPE: u8 = 0x00;

/// Running link counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames that passed validation.
    pub rx_packets: u32,
    /// Frames dropped on SOF / EOF / CRC mismatch.
    pub dropped_packets: u32,
    /// Partial frames discarded by the stall timeout.
    pub stalled_frames: u32,
    /// Protocol packets written.
    pub tx_packets: u32,
}

// ───────────────────────────────────────────────────────────────
// LinkCoordinator
// ───────────────────────────────────────────────────────────────

pub struct LinkCoordinator<T: Transport> {
    transport: T,
    assembler: FrameAssembler,
    registry: Registry,
    /// This unit's own protocol address.
    sender_id: u8,
    /// Sender of the most recent valid ACK, known device or not.
    last_ack_sender: Option<u8>,
    stats: LinkStats,
}

impl<T: Transport> LinkCoordinator<T> {
    pub fn new(transport: T, config: &LinkConfig) -> Self {
        Self {
            transport,
            assembler: FrameAssembler::new(u64::from(config.frame_timeout_ms)),
            registry: Registry::new(),
            sender_id: config.sender_id,
            last_ack_sender: None,
            stats: LinkStats::default(),
        }
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Process every byte currently waiting on the link, then return.
    ///
    /// `now_ms` timestamps this batch for the framing stall timeout.
    /// Returns the number of frames handed to the codec (valid or not).
    pub fn poll(&mut self, now_ms: u64, sink: &mut impl EventSink) -> Result<usize> {
        if let Some(discarded) = self.assembler.expire(now_ms) {
            self.stats.stalled_frames += 1;
            warn!("[RX] partial frame stalled, {} byte(s) discarded", discarded);
            sink.emit(&LinkEvent::FrameTimeout { discarded });
        }

        let mut buf = [0u8; READ_CHUNK];
        let mut text = TextChunk::new();
        let mut frames = 0;

        loop {
            let n = match self.transport.read(&mut buf) {
                Ok(n) => n,
                Err(e) => {
                    flush_text(&mut text, sink);
                    warn!("[RX] HC-12 read failed: {:?}", e);
                    return Err(LinkError::ReadFailed.into());
                }
            };
            if n == 0 {
                break;
            }

            for &byte in &buf[..n] {
                match self.assembler.push(byte, now_ms) {
                    Some(RxItem::Text(c)) => {
                        if text.push(c).is_err() {
                            flush_text(&mut text, sink);
                            text.push(c).ok();
                        }
                        if c == b'\n' {
                            flush_text(&mut text, sink);
                        }
                    }
                    Some(RxItem::Frame(raw)) => {
                        flush_text(&mut text, sink);
                        self.handle_frame(raw, sink);
                        frames += 1;
                    }
                    None => {}
                }
            }
        }

        flush_text(&mut text, sink);
        Ok(frames)
    }

    fn handle_frame(&mut self, raw: [u8; PACKET_SIZE], sink: &mut impl EventSink) {
        let packet = Packet::from_bytes(raw);
        if !packet.verify() {
            self.stats.dropped_packets += 1;
            warn!("[RX] CRC error, packet dropped: {}", packet);
            sink.emit(&LinkEvent::PacketDropped { raw });
            return;
        }

        self.stats.rx_packets += 1;
        sink.emit(&LinkEvent::PacketReceived(packet));
        self.dispatch(packet, sink);
    }

    fn dispatch(&mut self, packet: Packet, sink: &mut impl EventSink) {
        let sender = packet.sender();

        match packet.kind() {
            Some(Command::Ack) => {
                self.last_ack_sender = Some(sender);
                let effect = self
                    .registry
                    .find_mut(sender)
                    .map(|d| d.on_ack(packet.data_high(), packet.data_low()));
                if effect.is_none() {
                    debug!("[RX] ACK from unregistered 0x{:02X}", sender);
                }
                sink.emit(&LinkEvent::Ack {
                    sender,
                    scope: packet.data_high(),
                    original: packet.data_low(),
                    effect,
                });
            }

            Some(Command::ReportData) => {
                let value = packet.value();
                if value == OVERLOAD_SENTINEL {
                    sink.emit(&LinkEvent::OverloadTrip { sender });
                    return;
                }

                // Socket sub-sensors report under the fixed socket ids; the
                // reading belongs to whichever outlet is currently addressed.
                let device = match (Socket::from_byte(sender), self.registry.active_mut()) {
                    (Some(socket), Some(d)) => {
                        d.set_current_ma(socket, value);
                        Some(d.id())
                    }
                    _ => None,
                };
                sink.emit(&LinkEvent::CurrentReport {
                    sender,
                    milliamps: value,
                    device,
                });
            }

            _ => sink.emit(&LinkEvent::UnhandledCommand {
                sender,
                command: packet.command(),
            }),
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Address the active outlet with one protocol packet.
    ///
    /// Fails with [`RegistryError::NoActiveDevice`] when the registry is
    /// empty; nothing is transmitted then.
    pub fn send_command(
        &mut self,
        command: Command,
        data_high: u8,
        data_low: u8,
        sink: &mut impl EventSink,
    ) -> Result<Packet> {
        let target = self.active_id()?;
        let packet = Packet::build(target, self.sender_id, command.code(), data_high, data_low);
        self.write_all(&packet.to_bytes())?;
        self.stats.tx_packets += 1;
        sink.emit(&LinkEvent::PacketSent(packet));
        Ok(packet)
    }

    pub fn relay_on(&mut self, socket: Socket, sink: &mut impl EventSink) -> Result<Packet> {
        self.send_command(Command::RelayOn, SYSTEM_SCOPE, socket.byte(), sink)
    }

    pub fn relay_off(&mut self, socket: Socket, sink: &mut impl EventSink) -> Result<Packet> {
        self.send_command(Command::RelayOff, SYSTEM_SCOPE, socket.byte(), sink)
    }

    pub fn read_sensors(&mut self, sink: &mut impl EventSink) -> Result<Packet> {
        self.send_command(Command::ReadCurrent, SYSTEM_SCOPE, SYSTEM_SCOPE, sink)
    }

    /// Stage `milliamps` on the active outlet and send SET_THRESHOLD.
    pub fn set_threshold(&mut self, milliamps: u16, sink: &mut impl EventSink) -> Result<Packet> {
        self.active_mut()?.stage_threshold(milliamps);
        let [high, low] = milliamps.to_be_bytes();
        self.send_command(Command::SetThreshold, high, low, sink)
    }

    /// Ask the active outlet to take a new address.  Nothing is staged:
    /// the outlet answers from its new id, see
    /// [`ConfirmWaiter::change_device_id`](super::confirm::ConfirmWaiter::change_device_id).
    pub fn set_device_id(&mut self, new_id: u8, sink: &mut impl EventSink) -> Result<Packet> {
        self.send_command(Command::SetDeviceId, SYSTEM_SCOPE, new_id, sink)
    }

    /// Stage `master` on the active outlet and send SET_ID_MASTER.
    pub fn set_master_id(&mut self, master: u8, sink: &mut impl EventSink) -> Result<Packet> {
        self.active_mut()?.stage_master_id(master);
        self.send_command(Command::SetIdMaster, SYSTEM_SCOPE, master, sink)
    }

    pub fn ping(&mut self, sink: &mut impl EventSink) -> Result<Packet> {
        self.send_command(Command::Ping, SYSTEM_SCOPE, SYSTEM_SCOPE, sink)
    }

    // ── Passthrough (bypasses framing and validation) ─────────

    /// Decode a hex string and write the bytes as-is.
    pub fn send_raw_hex(&mut self, hex: &str, sink: &mut impl EventSink) -> Result<usize> {
        let bytes = decode_hex(hex)?;
        self.write_all(&bytes)?;
        info!("[TX] RAW {} byte(s)", bytes.len());
        sink.emit(&LinkEvent::RawSent { len: bytes.len() });
        Ok(bytes.len())
    }

    /// Write an HC-12 configuration string unmodified.
    ///
    /// Any partial inbound frame is dropped: the module's reply and any
    /// radio reconfiguration make it meaningless.
    pub fn send_at(&mut self, line: &str, sink: &mut impl EventSink) -> Result<usize> {
        self.write_all(line.as_bytes())?;
        self.assembler.reset();
        info!("[AT] {}", line);
        sink.emit(&LinkEvent::RawSent { len: line.len() });
        Ok(line.len())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let written = self.transport.write(bytes).map_err(|e| {
            warn!("[TX] HC-12 write failed: {:?}", e);
            LinkError::WriteFailed
        })?;
        if written < bytes.len() {
            warn!("[TX] short write: {}/{} byte(s)", written, bytes.len());
            return Err(LinkError::ShortWrite.into());
        }
        self.transport.flush().map_err(|e| {
            warn!("[TX] HC-12 flush failed: {:?}", e);
            LinkError::WriteFailed
        })?;
        Ok(())
    }

    // ── Registry ──────────────────────────────────────────────

    /// Address `id` from now on, registering it if it is new.
    pub fn select_device(&mut self, id: u8, sink: &mut impl EventSink) -> Result<Selection> {
        let selection = self.registry.select(id).inspect_err(|_| {
            warn!("[DEV] max outlets reached, 0x{:02X} not added", id);
        })?;
        sink.emit(&LinkEvent::DeviceSelected {
            id,
            index: selection.index,
            created: selection.created,
        });
        Ok(selection)
    }

    pub fn remove_device(&mut self, index: usize, sink: &mut impl EventSink) -> Result<OutletDevice> {
        let removed = self.registry.remove(index)?;
        sink.emit(&LinkEvent::DeviceRemoved { id: removed.id() });
        Ok(removed)
    }

    pub fn rename_device(&mut self, index: usize, name: &str) -> Result<()> {
        self.registry
            .get_mut(index)
            .ok_or(RegistryError::IndexOutOfRange)?
            .set_name(name);
        Ok(())
    }

    /// Point the registry record at `index` to a new id.
    pub(crate) fn readdress_device(&mut self, index: usize, new_id: u8) -> Result<()> {
        self.registry.readdress(index, new_id)?;
        Ok(())
    }

    /// Change this unit's own protocol address.  Used after the fleet has
    /// been told about a new master id.
    pub fn set_sender_id(&mut self, id: u8, sink: &mut impl EventSink) {
        self.sender_id = id;
        info!("[LINK] sender id now 0x{:02X}", id);
        sink.emit(&LinkEvent::SenderChanged(id));
    }

    /// Run one upward command.
    pub fn execute(&mut self, command: OutletCommand, sink: &mut impl EventSink) -> Result<()> {
        match command {
            OutletCommand::Select(id) => {
                self.select_device(id, sink)?;
            }
            OutletCommand::Remove(index) => {
                self.remove_device(index, sink)?;
            }
            OutletCommand::Rename { index, name } => self.rename_device(index, &name)?,
            OutletCommand::RelayOn(socket) => {
                self.relay_on(socket, sink)?;
            }
            OutletCommand::RelayOff(socket) => {
                self.relay_off(socket, sink)?;
            }
            OutletCommand::ReadSensors => {
                self.read_sensors(sink)?;
            }
            OutletCommand::SetThreshold(milliamps) => {
                self.set_threshold(milliamps, sink)?;
            }
            OutletCommand::SetDeviceId(id) => {
                self.set_device_id(id, sink)?;
            }
            OutletCommand::SetMasterId(id) => {
                self.set_master_id(id, sink)?;
            }
            OutletCommand::Ping => {
                self.ping(sink)?;
            }
            OutletCommand::SetSenderId(id) => self.set_sender_id(id, sink),
            OutletCommand::RawHex(line) => {
                self.send_raw_hex(&line, sink)?;
            }
            OutletCommand::AtCommand(line) => {
                self.send_at(&line, sink)?;
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    pub fn device(&self, index: usize) -> Option<&OutletDevice> {
        self.registry.get(index)
    }

    pub fn devices(&self) -> impl Iterator<Item = &OutletDevice> {
        self.registry.iter()
    }

    /// Confirmed + pending state of the outlet at `index`.
    pub fn status(&self, index: usize) -> Option<DeviceStatus> {
        self.registry.get(index).map(OutletDevice::status)
    }

    pub fn active_device(&self) -> Option<&OutletDevice> {
        self.registry.active()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.registry.active_index()
    }

    pub fn sender_id(&self) -> u8 {
        self.sender_id
    }

    pub fn last_ack_sender(&self) -> Option<u8> {
        self.last_ack_sender
    }

    /// Forget the last ACK source before waiting for a fresh one.
    pub fn clear_last_ack_sender(&mut self) {
        self.last_ack_sender = None;
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Internal ──────────────────────────────────────────────

    fn active_id(&self) -> Result<u8> {
        Ok(self
            .registry
            .active()
            .ok_or(RegistryError::NoActiveDevice)?
            .id())
    }

    fn active_mut(&mut self) -> Result<&mut OutletDevice> {
        Ok(self
            .registry
            .active_mut()
            .ok_or(RegistryError::NoActiveDevice)?)
    }
}

fn flush_text(text: &mut TextChunk, sink: &mut impl EventSink) {
    if !text.is_empty() {
        sink.emit(&LinkEvent::DebugText(text.clone()));
        text.clear();
    }
}
