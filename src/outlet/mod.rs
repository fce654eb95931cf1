//! Remote outlet model: per-device confirmation state and the registry
//! that holds up to [`registry::MAX_OUTLETS`] of them.

pub mod device;
pub mod registry;

pub use device::{AckEffect, DeviceName, DeviceStatus, OutletDevice, RelayState};
pub use registry::{MAX_OUTLETS, Registry, Selection};
