//! Inter-task channels into the link owner.
//!
//! The coordinator is owned by one task.  The console reader and any
//! network-facing task hand work to it through these bounded
//! `embassy-sync` channels; no other task touches link or registry state.
//!
//! ```text
//! ┌──────────────┐  ConsoleLine   ┌──────────────┐
//! │ Console task │──────────────▶│              │
//! └──────────────┘                │  Link owner  │
//! ┌──────────────┐  OutletCommand │  (poll loop) │
//! │ Dashboard /  │──────────────▶│              │
//! │ cloud tasks  │                └──────────────┘
//! └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use crate::rf::transport::Transport;

use super::commands::{OutletCommand, PassthroughLine};
use super::coordinator::LinkCoordinator;
use super::ports::EventSink;

/// Channel depth for queued outlet commands.
const CMD_DEPTH: usize = 8;

/// Channel depth for raw console lines.
const CONSOLE_DEPTH: usize = 4;

/// One line typed on the serial console.
pub type ConsoleLine = PassthroughLine;

pub type CommandChannel = Channel<CriticalSectionRawMutex, OutletCommand, CMD_DEPTH>;

pub type ConsoleChannel = Channel<CriticalSectionRawMutex, ConsoleLine, CONSOLE_DEPTH>;

/// Outlet commands: any task → link owner.
pub static COMMAND_CHANNEL: CommandChannel = Channel::new();

/// Console lines: console reader → link owner.
pub static CONSOLE_CHANNEL: ConsoleChannel = Channel::new();

/// Queue `command` without blocking.  Hands it back when the queue is full.
pub fn submit(channel: &CommandChannel, command: OutletCommand) -> Result<(), OutletCommand> {
    channel.try_send(command).map_err(|TrySendError::Full(c)| c)
}

/// Run every queued command against `link`.  Returns how many ran.
///
/// A failing command is logged and does not stop the drain.
pub fn drain_commands<T, S>(
    channel: &CommandChannel,
    link: &mut LinkCoordinator<T>,
    sink: &mut S,
) -> usize
where
    T: Transport,
    S: EventSink,
{
    let mut ran = 0;
    while let Ok(command) = channel.try_receive() {
        if let Err(e) = link.execute(command.clone(), sink) {
            warn!("[LINK] {:?} failed: {}", command, e);
        }
        ran += 1;
    }
    ran
}
