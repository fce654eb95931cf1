//! Byte-stream frame assembler.
//!
//! The HC-12 link carries two things on one unbuffered stream: 8-byte
//! protocol frames and free-form debug text printed by the outlet
//! firmware.  The assembler separates them:
//!
//! ```text
//!            byte != SOF                      8 bytes collected
//!   ┌──────┐ ───────────▶ Text / discard   ┌──────────┐ ──────────▶ Frame
//!   │ Idle │                               │ Framing  │
//!   └──────┘ ── byte == SOF ─────────────▶ └──────────┘
//!       ▲                                       │
//!       └────────── stalled > timeout ──────────┘
//! ```
//!
//! Idle mode never buffers.  Framing mode appends every byte, SOF included,
//! until the frame is complete; it does not look for a new SOF mid-frame.
//! A partial frame that sees no progress within the stall timeout is
//! discarded so one dropped byte cannot desynchronise the link forever.

use super::packet::{PACKET_SIZE, SOF};

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxItem {
    /// Printable ASCII, CR or LF received outside a frame.
    Text(u8),
    /// A complete 8-byte frame, not yet validated.
    Frame([u8; PACKET_SIZE]),
}

/// Assembler state machine.
enum AssemblerState {
    /// No partial frame in progress.
    Idle,
    /// Collecting a frame; `last_byte_ms` is when the newest byte arrived.
    Framing { collected: usize, last_byte_ms: u64 },
}

/// Streaming frame assembler.
pub struct FrameAssembler {
    state: AssemblerState,
    buf: [u8; PACKET_SIZE],
    stall_timeout_ms: u64,
}

/// Bytes forwarded to the diagnostic sink while idle.
pub const fn is_passthrough_text(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | b'\r' | b'\n')
}

impl FrameAssembler {
    pub fn new(stall_timeout_ms: u64) -> Self {
        Self {
            state: AssemblerState::Idle,
            buf: [0; PACKET_SIZE],
            stall_timeout_ms,
        }
    }

    /// Drop a stalled partial frame.
    ///
    /// Call before feeding bytes that arrived at `now_ms`.  Returns the
    /// number of bytes discarded, if any.
    pub fn expire(&mut self, now_ms: u64) -> Option<usize> {
        if let AssemblerState::Framing {
            collected,
            last_byte_ms,
        } = self.state
        {
            if now_ms.saturating_sub(last_byte_ms) > self.stall_timeout_ms {
                self.state = AssemblerState::Idle;
                return Some(collected);
            }
        }
        None
    }

    /// Feed a single byte received at `now_ms`.
    ///
    /// Returns `None` while a frame is incomplete or when an idle byte is
    /// neither SOF nor passthrough text.
    pub fn push(&mut self, byte: u8, now_ms: u64) -> Option<RxItem> {
        match &mut self.state {
            AssemblerState::Idle => {
                if byte == SOF {
                    self.buf[0] = byte;
                    self.state = AssemblerState::Framing {
                        collected: 1,
                        last_byte_ms: now_ms,
                    };
                    None
                } else if is_passthrough_text(byte) {
                    Some(RxItem::Text(byte))
                } else {
                    None
                }
            }

            AssemblerState::Framing {
                collected,
                last_byte_ms,
            } => {
                self.buf[*collected] = byte;
                *collected += 1;
                *last_byte_ms = now_ms;

                if *collected == PACKET_SIZE {
                    self.state = AssemblerState::Idle;
                    Some(RxItem::Frame(self.buf))
                } else {
                    None
                }
            }
        }
    }

    /// Bytes held in the current partial frame (0 when idle).
    pub fn pending(&self) -> usize {
        match self.state {
            AssemblerState::Idle => 0,
            AssemblerState::Framing { collected, .. } => collected,
        }
    }

    /// Forget any partial frame (e.g. after reconfiguring the radio).
    pub fn reset(&mut self) {
        self.state = AssemblerState::Idle;
    }
}
