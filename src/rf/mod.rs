//! HC-12 radio wire layer.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        RF Stack                            │
//! │                                                            │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────────┐  │
//! │  │ Transport │──▶│  Framer   │──▶│ Packet (verify) ──▶  │  │
//! │  │ (trait)   │   │ text/frame│   │ LinkCoordinator      │  │
//! │  └───────────┘   └───────────┘   └──────────────────────┘  │
//! │       ▲                                    │               │
//! │       └──────────── Packet::build ◀────────┘               │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod framer;
pub mod hex;
pub mod packet;
pub mod transport;
