//! GPIO / peripheral assignments for the control unit board.
//!
//! Single source of truth for pin numbers.  `main` takes the typed pins
//! from `Peripherals` and checks them against these at boot.

// ---------------------------------------------------------------------------
// HC-12 radio (UART2)
// ---------------------------------------------------------------------------

/// ESP32 RX, wired to HC-12 TXD.
pub const HC12_RX_GPIO: i32 = 16;
/// ESP32 TX, wired to HC-12 RXD.
pub const HC12_TX_GPIO: i32 = 17;
/// Hardware UART driving the radio.
pub const HC12_UART_PORT: u8 = 2;
