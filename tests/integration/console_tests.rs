//! Serial console lines driven all the way to the radio.

use ccu::app::coordinator::LinkCoordinator;
use ccu::config::LinkConfig;
use ccu::console::{ConsoleAction, SerialConsole};
use ccu::outlet::RelayState;
use ccu::rf::packet::Socket;

use crate::mock_link::{OutletBench, RecordingSink, SimOutlet};

/// Feed lines through the console, executing whatever it yields.
fn type_lines(
    console: &mut SerialConsole,
    link: &mut LinkCoordinator<OutletBench>,
    sink: &mut RecordingSink,
    lines: &[&str],
) -> Vec<ConsoleAction> {
    let mut other = Vec::new();
    for line in lines {
        match console.handle_line(line) {
            ConsoleAction::Execute(cmd) => {
                let _ = link.execute(cmd, sink);
                link.poll(0, sink).unwrap();
            }
            action => other.push(action),
        }
    }
    other
}

#[test]
fn operator_session() {
    let mut console = SerialConsole::new();
    let mut link = LinkCoordinator::new(
        OutletBench::new(vec![SimOutlet::new(0xFE).with_currents(250, 0)]),
        &LinkConfig::default(),
    );
    let mut sink = RecordingSink::new();

    let other = type_lines(
        &mut console,
        &mut link,
        &mut sink,
        &["d FE", "1", "4", "5", "6", "1200", "d status"],
    );
    assert_eq!(
        other,
        vec![ConsoleAction::Prompt("Threshold (mA): "), ConsoleAction::ShowStatus]
    );

    let d = link.active_device().unwrap();
    assert_eq!(d.id(), 0xFE);
    assert_eq!(d.relay(Socket::A), RelayState::On);
    assert_eq!(d.relay(Socket::B), RelayState::Off);
    assert_eq!(d.current_ma(Socket::A), Some(250));
    assert_eq!(d.threshold_ma(), Some(1200));
}

#[test]
fn raw_hex_line_reaches_the_air_unchanged() {
    let mut console = SerialConsole::new();
    let mut link = LinkCoordinator::new(OutletBench::new(vec![SimOutlet::new(0xFE)]), &LinkConfig::default());
    let mut sink = RecordingSink::new();

    // A hand-built RELAY_ON for socket A; the bench answers it like any frame.
    type_lines(&mut console, &mut link, &mut sink, &["d FE", "AA FE 01 02 00 01 FC BB"]);

    assert_eq!(
        link.transport().raw,
        vec![0xAAu8, 0xFE, 0x01, 0x02, 0x00, 0x01, 0xFC, 0xBB]
    );
    assert_eq!(link.active_device().unwrap().relay(Socket::A), RelayState::On);
}

#[test]
fn keys_without_a_target_fail_quietly() {
    let mut console = SerialConsole::new();
    let mut link = LinkCoordinator::new(OutletBench::new(vec![]), &LinkConfig::default());
    let mut sink = RecordingSink::new();

    type_lines(&mut console, &mut link, &mut sink, &["1", "7", "20"]);
    assert!(link.transport().raw.is_empty());
    assert!(!console.is_awaiting());
}
