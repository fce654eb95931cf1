//! Fuzz target: `LinkCoordinator::poll`
//!
//! Feeds arbitrary air bytes through the framer, codec and registry in
//! uneven read sizes.  The link must never panic, every frame handed to
//! the codec must be counted exactly once, and the registry must stay
//! within capacity.
//!
//! cargo fuzz run fuzz_link_rx

#![no_main]

use ccu::adapters::hc12::Hc12Transport;
use ccu::app::coordinator::LinkCoordinator;
use ccu::app::events::LinkEvent;
use ccu::app::ports::EventSink;
use ccu::config::LinkConfig;
use ccu::outlet::MAX_OUTLETS;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &LinkEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&knobs, air)) = data.split_first() else {
        return;
    };

    let mut transport = Hc12Transport::new();
    transport.set_read_chunk(usize::from(knobs & 0x0F) + 1);

    let mut link = LinkCoordinator::new(transport, &LinkConfig::default());
    for id in 0..(knobs >> 4) {
        let _ = link.select_device(id, &mut Discard);
    }

    // Spread the input over several polls, some past the stall timeout.
    let mut now = 0u64;
    let mut frames = 0;
    let step = usize::from(knobs & 0x0F) * 3 + 1;
    for piece in air.chunks(step) {
        link.transport_mut().inject_rx(piece);
        frames += link.poll(now, &mut Discard).unwrap_or(0);
        now += u64::from(knobs) * 4;
    }

    let stats = link.stats();
    assert_eq!(frames as u32, stats.rx_packets + stats.dropped_packets);
    assert!(link.device_count() <= MAX_OUTLETS);
});
