//! Simulated outlet fleet on the far side of the radio.
//!
//! `OutletBench` is a `Transport` that decodes every packet written to it
//! and answers the way outlet firmware does: ACKs from the outlet's own
//! address, current reports under the fixed socket ids, optional debug
//! chatter between frames.

use std::collections::VecDeque;

use ccu::app::events::LinkEvent;
use ccu::app::ports::{Clock, EventSink};
use ccu::rf::packet::{Command, PACKET_SIZE, Packet, Socket};
use ccu::rf::transport::Transport;
use embedded_hal::delay::DelayNs;
use std::cell::Cell;

// ── Simulated outlet ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimOutlet {
    pub id: u8,
    pub master: u8,
    /// SET_DEVICE_ID / SET_ID_MASTER are only honoured in config mode.
    pub config_mode: bool,
    /// Never answers.
    pub silent: bool,
    pub relays: [bool; 2],
    pub threshold_ma: u16,
    pub currents_ma: [u16; 2],
}

#[allow(dead_code)]
impl SimOutlet {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            master: 0x01,
            config_mode: true,
            silent: false,
            relays: [false; 2],
            threshold_ma: 0,
            currents_ma: [0; 2],
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.config_mode = false;
        self
    }

    pub fn with_currents(mut self, a: u16, b: u16) -> Self {
        self.currents_ma = [a, b];
        self
    }
}

// ── OutletBench transport ─────────────────────────────────────

#[derive(Debug, Default)]
pub struct OutletBench {
    pub outlets: Vec<SimOutlet>,
    rx: VecDeque<u8>,
    /// Every well-formed packet the control unit sent.
    pub sent: Vec<Packet>,
    /// Every byte the control unit wrote, framed or not.
    pub raw: Vec<u8>,
    /// Debug line each outlet prints before answering.
    pub chatter: Option<&'static str>,
    /// Writes addressed to this outlet fail at the UART.
    pub unreachable: Option<u8>,
}

#[allow(dead_code)]
impl OutletBench {
    pub fn new(outlets: Vec<SimOutlet>) -> Self {
        Self {
            outlets,
            ..Self::default()
        }
    }

    pub fn outlet(&self, id: u8) -> Option<&SimOutlet> {
        self.outlets.iter().find(|o| o.id == id)
    }

    /// Put bytes on the air as if an outlet had sent them unprompted.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    fn reply(&mut self, to: u8, from: u8, command: Command, high: u8, low: u8) {
        if let Some(text) = self.chatter {
            self.rx.extend(text.bytes());
        }
        let p = Packet::build(to, from, command.code(), high, low);
        self.rx.extend(p.to_bytes());
    }

    fn ack(&mut self, to: u8, from: u8, scope: u8, original: Command) {
        self.reply(to, from, Command::Ack, scope, original.code());
    }

    fn respond(&mut self, p: Packet) {
        let Some(idx) = self.outlets.iter().position(|o| o.id == p.target()) else {
            return;
        };
        if self.outlets[idx].silent {
            return;
        }
        let Some(cmd) = p.kind() else {
            return;
        };
        let me = self.outlets[idx].id;
        let master = p.sender();

        match cmd {
            Command::RelayOn | Command::RelayOff => {
                let Some(socket) = Socket::from_byte(p.data_low()) else {
                    return;
                };
                self.outlets[idx].relays[usize::from(socket.byte() - 1)] = cmd == Command::RelayOn;
                self.ack(master, me, socket.byte(), cmd);
            }
            Command::ReadCurrent => {
                let [a, b] = self.outlets[idx].currents_ma;
                let [ah, al] = a.to_be_bytes();
                let [bh, bl] = b.to_be_bytes();
                self.reply(master, Socket::A.byte(), Command::ReportData, ah, al);
                self.reply(master, Socket::B.byte(), Command::ReportData, bh, bl);
            }
            Command::SetThreshold => {
                self.outlets[idx].threshold_ma = p.value();
                self.ack(master, me, 0x00, cmd);
            }
            Command::SetDeviceId => {
                if self.outlets[idx].config_mode {
                    self.outlets[idx].id = p.data_low();
                    self.ack(master, p.data_low(), 0x00, cmd);
                }
            }
            Command::SetIdMaster => {
                if self.outlets[idx].config_mode {
                    self.outlets[idx].master = p.data_low();
                    self.ack(master, me, 0x00, cmd);
                }
            }
            Command::Ping => self.ack(master, me, 0x00, cmd),
            Command::ReportData | Command::Ack => {}
        }
    }
}

impl Transport for OutletBench {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.rx.len());
        for (slot, b) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = b;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        if self.unreachable.is_some() && data.get(1).copied() == self.unreachable {
            return Err(());
        }
        self.raw.extend_from_slice(data);
        if let Ok(frame) = <[u8; PACKET_SIZE]>::try_from(data) {
            let p = Packet::from_bytes(frame);
            if p.verify() {
                self.sent.push(p);
                self.respond(p);
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<LinkEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All passthrough text, concatenated.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                LinkEvent::DebugText(chunk) => Some(String::from_utf8_lossy(chunk).into_owned()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&LinkEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LinkEvent) {
        self.events.push(event.clone());
    }
}

// ── Manual time ───────────────────────────────────────────────

/// Clock and delay sharing one counter; only sleeping moves time.
#[derive(Clone, Copy)]
pub struct ManualTime<'a>(pub &'a Cell<u64>);

impl Clock for ManualTime<'_> {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

impl DelayNs for ManualTime<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + u64::from(ms));
    }
}
