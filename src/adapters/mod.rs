//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                    |
//! |------------|----------------|--------------------------------|
//! | `hc12`     | Transport      | HC-12 radio on UART2 / host sim|
//! | `log_sink` | EventSink      | Serial log output              |
//! | `time`     | Clock, DelayNs | ESP32 system timer / FreeRTOS  |

pub mod hc12;
pub mod log_sink;
pub mod time;
