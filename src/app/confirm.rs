//! Bounded waits for outlet acknowledgments.
//!
//! A [`Confirmation`] is a request-with-deadline: it names what must be
//! observed on the link ([`Expectation`]) and is polled against the
//! coordinator without ever blocking.  [`ConfirmWaiter`] is the blocking
//! form used by the calling layer: it interleaves link polls with short
//! sleeps until the expectation holds or the deadline passes.
//!
//! Two composite operations build on the waiter:
//!
//! - [`ConfirmWaiter::change_device_id`] re-addresses one outlet and
//!   rewrites its registry record once the outlet answers from the new id.
//! - [`ConfirmWaiter::set_fleet_master`] walks every registered outlet,
//!   pushes a new master id, and finally adopts it as this unit's address.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::LinkConfig;
use crate::error::{ConfirmError, Error, RegistryError, Result};
use crate::rf::transport::Transport;

use super::coordinator::LinkCoordinator;
use super::ports::{Clock, EventSink};

// ───────────────────────────────────────────────────────────────
// Expectation / Confirmation
// ───────────────────────────────────────────────────────────────

/// What a pending confirmation is waiting to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The most recent ACK came from this sender id.
    AckFrom(u8),
    /// The outlet registered as `device` has acknowledged the staged
    /// master id and committed `master`.
    MasterCommitted { device: u8, master: u8 },
    /// The outlet registered as `device` has acknowledged the staged
    /// threshold and committed `milliamps`.
    ThresholdCommitted { device: u8, milliamps: u16 },
}

impl Expectation {
    /// Evaluate against the coordinator's current state.
    ///
    /// A committed value only counts once the staged value is cleared;
    /// an outlet already holding the value has not answered yet.
    pub fn is_met<T: Transport>(&self, link: &LinkCoordinator<T>) -> bool {
        match *self {
            Self::AckFrom(id) => link.last_ack_sender() == Some(id),
            Self::MasterCommitted { device, master } => link
                .registry()
                .find(device)
                .and_then(|i| link.device(i))
                .is_some_and(|d| {
                    d.pending_master_id().is_none() && d.master_id() == Some(master)
                }),
            Self::ThresholdCommitted { device, milliamps } => link
                .registry()
                .find(device)
                .and_then(|i| link.device(i))
                .is_some_and(|d| {
                    d.pending_threshold_ma().is_none() && d.threshold_ma() == Some(milliamps)
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStatus {
    Pending,
    Confirmed,
    TimedOut,
}

/// Result of a wait that is allowed to time out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    TimedOut,
}

/// A pending expectation with a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    expect: Expectation,
    started_ms: u64,
    deadline_ms: u64,
}

impl Confirmation {
    pub fn new(expect: Expectation, now_ms: u64, timeout_ms: u32) -> Self {
        Self {
            expect,
            started_ms: now_ms,
            deadline_ms: now_ms.saturating_add(u64::from(timeout_ms)),
        }
    }

    pub fn expectation(&self) -> Expectation {
        self.expect
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    /// A met expectation wins even when checked after the deadline.
    pub fn check<T: Transport>(&self, link: &LinkCoordinator<T>, now_ms: u64) -> ConfirmStatus {
        if self.expect.is_met(link) {
            ConfirmStatus::Confirmed
        } else if now_ms >= self.deadline_ms {
            ConfirmStatus::TimedOut
        } else {
            ConfirmStatus::Pending
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Blocking waiter
// ───────────────────────────────────────────────────────────────

/// Outcome of a fleet-wide master change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FleetReport {
    /// Outlets that acknowledged the new master id in time.
    pub confirmed: usize,
    /// Outlets that were asked.
    pub total: usize,
}

impl FleetReport {
    pub fn all_confirmed(&self) -> bool {
        self.confirmed == self.total
    }
}

pub struct ConfirmWaiter<C: Clock, D: DelayNs> {
    clock: C,
    delay: D,
    timeout_ms: u32,
    poll_interval_ms: u32,
}

impl<C: Clock, D: DelayNs> ConfirmWaiter<C, D> {
    pub fn new(clock: C, delay: D, config: &LinkConfig) -> Self {
        Self {
            clock,
            delay,
            timeout_ms: config.confirm_timeout_ms,
            poll_interval_ms: config.confirm_poll_interval_ms,
        }
    }

    /// Poll the link until `expect` holds or the timeout passes.
    ///
    /// Link read failures do not end the wait; they are logged and the
    /// next poll retries.
    pub fn wait<T, S>(
        &mut self,
        link: &mut LinkCoordinator<T>,
        sink: &mut S,
        expect: Expectation,
    ) -> Result<()>
    where
        T: Transport,
        S: EventSink,
    {
        let pending = Confirmation::new(expect, self.clock.now_ms(), self.timeout_ms);

        loop {
            let now = self.clock.now_ms();
            if let Err(e) = link.poll(now, sink) {
                warn!("[LINK] poll during confirm: {}", e);
            }
            match pending.check(link, now) {
                ConfirmStatus::Confirmed => return Ok(()),
                ConfirmStatus::TimedOut => {
                    return Err(ConfirmError::Timeout {
                        waited_ms: pending.elapsed_ms(now),
                    }
                    .into());
                }
                ConfirmStatus::Pending => self.delay.delay_ms(self.poll_interval_ms),
            }
        }
    }

    /// Re-address the outlet at `index` to `new_id`.
    ///
    /// The outlet replies from its new address, so the wait watches the
    /// ACK sender rather than the registry record.  The record is moved to
    /// `new_id` whether or not the reply arrives in time: a silent outlet
    /// may still have switched, and the old id is no longer trusted.  Its
    /// name survives; everything else is reset.
    pub fn change_device_id<T, S>(
        &mut self,
        link: &mut LinkCoordinator<T>,
        sink: &mut S,
        index: usize,
        new_id: u8,
    ) -> Result<ConfirmOutcome>
    where
        T: Transport,
        S: EventSink,
    {
        let old_id = link.device(index).ok_or(RegistryError::IndexOutOfRange)?.id();
        if link.registry().find(new_id).is_some_and(|other| other != index) {
            return Err(RegistryError::DuplicateId(new_id).into());
        }

        link.select_device(old_id, sink)?;
        link.clear_last_ack_sender();
        link.set_device_id(new_id, sink)?;

        let outcome = match self.wait(link, sink, Expectation::AckFrom(new_id)) {
            Ok(()) => {
                info!("[DEV] 0x{:02X} -> 0x{:02X} confirmed", old_id, new_id);
                ConfirmOutcome::Confirmed
            }
            Err(Error::Confirm(e)) => {
                warn!("[DEV] 0x{:02X} -> 0x{:02X}: {}", old_id, new_id, e);
                ConfirmOutcome::TimedOut
            }
            Err(e) => return Err(e),
        };

        link.readdress_device(index, new_id)?;
        Ok(outcome)
    }

    /// Tell every registered outlet that `new_master` is its master, then
    /// take `new_master` as this unit's own sender id.
    ///
    /// Outlets that stay silent, or that could not be sent to, are counted
    /// as unconfirmed and not retried.  The sender id changes regardless.
    pub fn set_fleet_master<T, S>(
        &mut self,
        link: &mut LinkCoordinator<T>,
        sink: &mut S,
        new_master: u8,
    ) -> Result<FleetReport>
    where
        T: Transport,
        S: EventSink,
    {
        let ids: heapless::Vec<u8, { crate::outlet::MAX_OUTLETS }> =
            link.devices().map(|d| d.id()).collect();
        let mut report = FleetReport {
            confirmed: 0,
            total: ids.len(),
        };

        for &device in &ids {
            let sent = link
                .select_device(device, sink)
                .and_then(|_| link.set_master_id(new_master, sink));
            if let Err(e) = sent {
                warn!("[DEV] master -> 0x{:02X} on 0x{:02X}: {}", new_master, device, e);
                continue;
            }

            let expect = Expectation::MasterCommitted {
                device,
                master: new_master,
            };
            match self.wait(link, sink, expect) {
                Ok(()) => report.confirmed += 1,
                Err(e) => warn!("[DEV] master -> 0x{:02X} on 0x{:02X}: {}", new_master, device, e),
            }
        }

        link.set_sender_id(new_master, sink);
        info!(
            "[LINK] master 0x{:02X} confirmed by {}/{} outlet(s)",
            new_master, report.confirmed, report.total
        );
        Ok(report)
    }

    /// Send SET_THRESHOLD to the active outlet and wait for it to commit.
    pub fn set_threshold<T, S>(
        &mut self,
        link: &mut LinkCoordinator<T>,
        sink: &mut S,
        milliamps: u16,
    ) -> Result<()>
    where
        T: Transport,
        S: EventSink,
    {
        let device = link.set_threshold(milliamps, sink)?.target();
        self.wait(link, sink, Expectation::ThresholdCommitted { device, milliamps })
    }
}
