//! LinkCoordinator against a simulated outlet fleet.

use ccu::app::commands::{OutletCommand, PassthroughLine};
use ccu::app::coordinator::LinkCoordinator;
use ccu::app::events::LinkEvent;
use ccu::config::LinkConfig;
use ccu::error::{Error, LinkError, RegistryError};
use ccu::outlet::{AckEffect, MAX_OUTLETS, RelayState};
use ccu::rf::packet::{Command, Packet, Socket};

use crate::mock_link::{OutletBench, RecordingSink, SimOutlet};

fn bench(outlets: Vec<SimOutlet>) -> (LinkCoordinator<OutletBench>, RecordingSink) {
    (
        LinkCoordinator::new(OutletBench::new(outlets), &LinkConfig::default()),
        RecordingSink::new(),
    )
}

// ── Relays ────────────────────────────────────────────────────

#[test]
fn relay_state_follows_ack_not_command() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0xFE)]);
    link.select_device(0xFE, &mut sink).unwrap();

    link.relay_on(Socket::A, &mut sink).unwrap();
    // Sent but not yet acknowledged.
    assert_eq!(link.active_device().unwrap().relay(Socket::A), RelayState::Unknown);

    assert_eq!(link.poll(10, &mut sink), Ok(1));
    let d = link.active_device().unwrap();
    assert_eq!(d.relay(Socket::A), RelayState::On);
    assert_eq!(d.relay(Socket::B), RelayState::Unknown);

    link.relay_off(Socket::A, &mut sink).unwrap();
    link.poll(20, &mut sink).unwrap();
    assert_eq!(link.active_device().unwrap().relay(Socket::A), RelayState::Off);
    assert!(link.transport().outlet(0xFE).unwrap().relays == [false, false]);
}

#[test]
fn silent_outlet_leaves_state_unknown() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0x10).silent()]);
    link.select_device(0x10, &mut sink).unwrap();
    link.relay_on(Socket::B, &mut sink).unwrap();
    assert_eq!(link.poll(10, &mut sink), Ok(0));
    assert_eq!(link.active_device().unwrap().relay(Socket::B), RelayState::Unknown);
}

// ── Threshold / master staging ────────────────────────────────

#[test]
fn threshold_is_pending_until_ack() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0xFE)]);
    link.select_device(0xFE, &mut sink).unwrap();

    let p = link.set_threshold(1500, &mut sink).unwrap();
    assert_eq!((p.data_high(), p.data_low()), (0x05, 0xDC));

    let d = link.active_device().unwrap();
    assert_eq!(d.pending_threshold_ma(), Some(1500));
    assert_eq!(d.threshold_ma(), None);

    link.poll(5, &mut sink).unwrap();
    let d = link.active_device().unwrap();
    assert_eq!(d.threshold_ma(), Some(1500));
    assert_eq!(d.pending_threshold_ma(), None);
    assert_eq!(link.transport().outlet(0xFE).unwrap().threshold_ma, 1500);
}

#[test]
fn locked_outlet_never_commits_master() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0x20).locked()]);
    link.select_device(0x20, &mut sink).unwrap();
    link.set_master_id(0x42, &mut sink).unwrap();
    link.poll(5, &mut sink).unwrap();

    let d = link.active_device().unwrap();
    assert_eq!(d.pending_master_id(), Some(0x42));
    assert_eq!(d.master_id(), None);
}

#[test]
fn master_id_commits_on_ack() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0x20)]);
    link.select_device(0x20, &mut sink).unwrap();
    link.set_master_id(0x42, &mut sink).unwrap();
    link.poll(5, &mut sink).unwrap();

    assert_eq!(link.active_device().unwrap().master_id(), Some(0x42));
    assert!(sink.events.contains(&LinkEvent::Ack {
        sender: 0x20,
        scope: 0x00,
        original: Command::SetIdMaster.code(),
        effect: Some(AckEffect::MasterCommitted(0x42)),
    }));
}

// ── Sensor reports ────────────────────────────────────────────

#[test]
fn current_reports_bind_to_active_device() {
    let (mut link, mut sink) = bench(vec![
        SimOutlet::new(0x10).with_currents(120, 3400),
        SimOutlet::new(0x11).with_currents(7, 8),
    ]);
    link.select_device(0x11, &mut sink).unwrap();
    link.select_device(0x10, &mut sink).unwrap();

    link.read_sensors(&mut sink).unwrap();
    assert_eq!(link.poll(5, &mut sink), Ok(2));

    let d = link.active_device().unwrap();
    assert_eq!(d.id(), 0x10);
    assert_eq!(d.current_ma(Socket::A), Some(120));
    assert_eq!(d.current_ma(Socket::B), Some(3400));
    assert_eq!(link.device(0).unwrap().current_ma(Socket::A), None);
}

#[test]
fn overload_sentinel_is_not_a_reading() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();

    let trip = Packet::build(0x01, Socket::A.byte(), Command::ReportData.code(), 0xFF, 0xFF);
    link.transport_mut().inject(&trip.to_bytes());
    link.poll(5, &mut sink).unwrap();

    assert_eq!(link.active_device().unwrap().current_ma(Socket::A), None);
    assert!(sink.events.contains(&LinkEvent::OverloadTrip { sender: 0x01 }));
}

#[test]
fn report_with_empty_registry_is_unattributed() {
    let (mut link, mut sink) = bench(vec![]);
    let report = Packet::build(0x01, Socket::B.byte(), Command::ReportData.code(), 0x01, 0x00);
    link.transport_mut().inject(&report.to_bytes());
    link.poll(5, &mut sink).unwrap();

    assert!(sink.events.contains(&LinkEvent::CurrentReport {
        sender: 0x02,
        milliamps: 256,
        device: None,
    }));
    assert_eq!(link.device_count(), 0);
}

// ── Unknown senders / commands ────────────────────────────────

#[test]
fn ack_from_unknown_sender_is_logged_not_registered() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();

    let ack = Packet::build(0x01, 0x77, Command::Ack.code(), 0x01, Command::RelayOn.code());
    link.transport_mut().inject(&ack.to_bytes());
    link.poll(5, &mut sink).unwrap();

    assert_eq!(link.device_count(), 1);
    assert_eq!(link.last_ack_sender(), Some(0x77));
    assert!(sink.events.contains(&LinkEvent::Ack {
        sender: 0x77,
        scope: 0x01,
        original: 0x02,
        effect: None,
    }));
}

#[test]
fn unhandled_command_is_reported() {
    let (mut link, mut sink) = bench(vec![]);
    let odd = Packet::build(0x01, 0x30, 0x42, 0, 0);
    link.transport_mut().inject(&odd.to_bytes());
    link.poll(5, &mut sink).unwrap();
    assert!(sink.events.contains(&LinkEvent::UnhandledCommand { sender: 0x30, command: 0x42 }));
}

// ── Framing through the coordinator ───────────────────────────

#[test]
fn chatter_between_frames_is_forwarded_as_text() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0xFE)]);
    link.transport_mut().chatter = Some("Relay cmd\r\n");
    link.select_device(0xFE, &mut sink).unwrap();

    link.ping(&mut sink).unwrap();
    link.poll(5, &mut sink).unwrap();

    assert_eq!(sink.text(), "Relay cmd\r\n");
    assert_eq!(link.last_ack_sender(), Some(0xFE));
}

#[test]
fn corrupted_frame_is_dropped_and_counted() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();

    let mut bytes = Packet::build(0x01, 0x10, Command::Ack.code(), 0x01, 0x02).to_bytes();
    bytes[5] ^= 0x04;
    link.transport_mut().inject(&bytes);
    assert_eq!(link.poll(5, &mut sink), Ok(1));

    assert_eq!(link.stats().dropped_packets, 1);
    assert_eq!(link.stats().rx_packets, 0);
    assert_eq!(link.active_device().unwrap().relay(Socket::A), RelayState::Unknown);
    assert!(sink.events.contains(&LinkEvent::PacketDropped { raw: bytes }));
}

#[test]
fn stalled_partial_frame_is_discarded() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();
    let good = Packet::build(0x01, 0x10, Command::Ack.code(), 0x01, 0x02).to_bytes();

    // Truncated frame, then silence longer than the stall timeout.
    link.transport_mut().inject(&good[..5]);
    link.poll(0, &mut sink).unwrap();
    link.transport_mut().inject(&good);
    assert_eq!(link.poll(1_000, &mut sink), Ok(1));

    assert!(sink.events.contains(&LinkEvent::FrameTimeout { discarded: 5 }));
    assert_eq!(link.stats().stalled_frames, 1);
    assert_eq!(link.active_device().unwrap().relay(Socket::A), RelayState::On);
}

#[test]
fn slow_frame_inside_timeout_still_completes() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();
    let good = Packet::build(0x01, 0x10, Command::Ack.code(), 0x02, 0x02).to_bytes();

    for (i, b) in good.iter().enumerate() {
        link.transport_mut().inject(&[*b]);
        link.poll(i as u64 * 100, &mut sink).unwrap();
    }
    assert_eq!(link.active_device().unwrap().relay(Socket::B), RelayState::On);
    assert_eq!(link.stats().stalled_frames, 0);
}

// ── Registry through the coordinator ──────────────────────────

#[test]
fn capacity_error_keeps_active_device() {
    let (mut link, mut sink) = bench(vec![]);
    for id in 0..MAX_OUTLETS as u8 {
        link.select_device(id, &mut sink).unwrap();
    }
    assert_eq!(
        link.select_device(0x99, &mut sink),
        Err(Error::Registry(RegistryError::CapacityExceeded))
    );
    assert_eq!(link.active_device().unwrap().id(), MAX_OUTLETS as u8 - 1);
}

#[test]
fn remove_then_command_targets_clamped_device() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();
    link.select_device(0x11, &mut sink).unwrap();
    link.remove_device(1, &mut sink).unwrap();

    let p = link.ping(&mut sink).unwrap();
    assert_eq!(p.target(), 0x10);

    link.remove_device(0, &mut sink).unwrap();
    assert_eq!(
        link.ping(&mut sink),
        Err(Error::Registry(RegistryError::NoActiveDevice))
    );
}

#[test]
fn rename_truncates_long_names() {
    let (mut link, mut sink) = bench(vec![]);
    link.select_device(0x10, &mut sink).unwrap();
    link.rename_device(0, "A very long outlet name indeed").unwrap();
    assert_eq!(link.device(0).unwrap().name().len(), 19);
    assert_eq!(
        link.rename_device(3, "x"),
        Err(Error::Registry(RegistryError::IndexOutOfRange))
    );
}

// ── Passthrough ───────────────────────────────────────────────

#[test]
fn raw_hex_bypasses_framing() {
    let (mut link, mut sink) = bench(vec![]);
    // No device needed.
    assert_eq!(link.send_raw_hex("AA FE 00 02 00 01 FD BB", &mut sink), Ok(8));
    assert_eq!(
        link.transport().raw,
        vec![0xAAu8, 0xFE, 0x00, 0x02, 0x00, 0x01, 0xFD, 0xBB]
    );
    assert_eq!(link.stats().tx_packets, 0);

    assert_eq!(
        link.send_raw_hex("AA F", &mut sink),
        Err(Error::Link(LinkError::InvalidHex))
    );
}

#[test]
fn at_command_written_verbatim() {
    let (mut link, mut sink) = bench(vec![]);
    link.execute(
        OutletCommand::AtCommand(PassthroughLine::try_from("AT+C001").unwrap()),
        &mut sink,
    )
    .unwrap();
    assert_eq!(link.transport().raw, b"AT+C001".to_vec());
    assert!(sink.events.contains(&LinkEvent::RawSent { len: 7 }));
}

#[test]
fn execute_routes_every_outlet_command() {
    let (mut link, mut sink) = bench(vec![SimOutlet::new(0x10)]);
    let script = [
        OutletCommand::Select(0x10),
        OutletCommand::RelayOn(Socket::B),
        OutletCommand::ReadSensors,
        OutletCommand::SetThreshold(900),
        OutletCommand::Ping,
        OutletCommand::SetSenderId(0x05),
        OutletCommand::RelayOff(Socket::B),
    ];
    for cmd in script {
        link.execute(cmd, &mut sink).unwrap();
    }

    let commands: Vec<u8> = link.transport().sent.iter().map(|p| p.command()).collect();
    assert_eq!(commands, vec![0x02, 0x04, 0x07, 0x01, 0x03]);
    assert_eq!(link.transport().sent.last().unwrap().sender(), 0x05);
}
