//! Control Unit Firmware: Main Entry Point
//!
//! One task owns the HC-12 link; everything else talks to it through
//! channels.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Hc12Transport     LogEventSink    Esp32TimeAdapter            │
//! │  (Transport)       (EventSink)     (Clock)                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            LinkCoordinator (pure logic)                │    │
//! │  │  Framer · Packet codec · Outlet registry               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Console reader thread ──▶ CONSOLE_CHANNEL ──▶ poll loop       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::gpio::{AnyIOPin, Pin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;

use ccu::adapters::hc12::Hc12Transport;
use ccu::adapters::log_sink::LogEventSink;
use ccu::adapters::time::{Esp32TimeAdapter, TaskDelay};
use ccu::app::channels::{self, COMMAND_CHANNEL, CONSOLE_CHANNEL, ConsoleLine};
use ccu::app::coordinator::LinkCoordinator;
use ccu::app::ports::{Clock, EventSink};
use ccu::config::LinkConfig;
use ccu::console::{ConsoleAction, HELP_LINES, SerialConsole};
use ccu::pins;
use ccu::rf::transport::Transport;

use embedded_hal::delay::DelayNs;

/// Idle time between link polls.
const LOOP_INTERVAL_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CCU v{}  HC-12 master               ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = LinkConfig::default();
    config.validate()?;

    // ── 3. HC-12 UART ─────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let tx = peripherals.pins.gpio17;
    let rx = peripherals.pins.gpio16;
    debug_assert_eq!(tx.pin(), pins::HC12_TX_GPIO);
    debug_assert_eq!(rx.pin(), pins::HC12_RX_GPIO);

    let uart_config = UartConfig::default().baudrate(Hertz(config.baud_rate));
    let uart = UartDriver::new(
        peripherals.uart2,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    info!(
        "HC-12 on UART{} (RX={}, TX={}) @ {} baud",
        pins::HC12_UART_PORT,
        pins::HC12_RX_GPIO,
        pins::HC12_TX_GPIO,
        config.baud_rate
    );

    // ── 4. Console reader ─────────────────────────────────────
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(read_console)?;

    // ── 5. Core ───────────────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut delay = TaskDelay;
    let mut link = LinkCoordinator::new(Hc12Transport::new(uart), &config);
    let mut sink = LogEventSink::new();
    let mut console = SerialConsole::new();

    print_help(&link);
    info!("Listening for outlet responses...");

    // ── 6. Poll loop ──────────────────────────────────────────
    loop {
        if let Err(e) = link.poll(clock.now_ms(), &mut sink) {
            warn!("{}", e);
        }

        channels::drain_commands(&COMMAND_CHANNEL, &mut link, &mut sink);

        while let Ok(line) = CONSOLE_CHANNEL.try_receive() {
            handle_console(&mut console, &line, &mut link, &mut sink);
        }

        delay.delay_ms(LOOP_INTERVAL_MS);
    }
}

/// Blocking stdin reader; forwards lines to the link owner.
fn read_console() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { continue };
        match ConsoleLine::try_from(line.trim()) {
            Ok(l) => {
                if CONSOLE_CHANNEL.try_send(l).is_err() {
                    warn!("Console busy, line dropped");
                }
            }
            Err(()) => warn!("Console line too long, dropped"),
        }
    }
}

fn handle_console<T: Transport, S: EventSink>(
    console: &mut SerialConsole,
    line: &str,
    link: &mut LinkCoordinator<T>,
    sink: &mut S,
) {
    match console.handle_line(line) {
        ConsoleAction::Execute(command) => {
            if let Err(e) = link.execute(command, sink) {
                warn!("Error: {}", e);
            }
        }
        ConsoleAction::Prompt(prompt) => info!("{}", prompt),
        ConsoleAction::ShowStatus => match link.active_device() {
            Some(d) => info!("\n{}", d.status()),
            None => info!("No outlet selected"),
        },
        ConsoleAction::ShowHelp => print_help(link),
        ConsoleAction::Rejected(msg) => warn!("{}", msg),
        ConsoleAction::Ignored => {}
    }
}

fn print_help<T: Transport>(link: &LinkCoordinator<T>) {
    match link.active_device() {
        Some(d) => info!("  Target: 0x{:02X}", d.id()),
        None => info!("  Target: (none)"),
    }
    for line in HELP_LINES {
        info!("{}", line);
    }
}
