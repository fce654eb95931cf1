//! Fixed-capacity outlet registry with an active-device cursor.
//!
//! Records live in a `heapless::Vec` in insertion order with no holes.
//! The active index names the outlet that single-target commands address;
//! whenever the registry is non-empty it refers to a populated slot.

use heapless::Vec;

use crate::error::RegistryError;

use super::device::OutletDevice;

/// Maximum number of outlets tracked at once.
pub const MAX_OUTLETS: usize = 8;

/// Result of [`Registry::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// `true` if the id was not known and a record was created.
    pub created: bool,
}

pub struct Registry {
    devices: Vec<OutletDevice, MAX_OUTLETS>,
    active: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.devices.is_full()
    }

    /// Linear scan for `id`.
    pub fn find(&self, id: u8) -> Option<usize> {
        self.devices.iter().position(|d| d.id() == id)
    }

    pub fn get(&self, index: usize) -> Option<&OutletDevice> {
        self.devices.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut OutletDevice> {
        self.devices.get_mut(index)
    }

    pub fn find_mut(&mut self, id: u8) -> Option<&mut OutletDevice> {
        self.devices.iter_mut().find(|d| d.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutletDevice> {
        self.devices.iter()
    }

    /// Make `id` the active device, registering it if unknown.
    ///
    /// Fails with [`RegistryError::CapacityExceeded`] when `id` is new and
    /// every slot is taken; the active device is left unchanged.
    pub fn select(&mut self, id: u8) -> Result<Selection, RegistryError> {
        if let Some(index) = self.find(id) {
            self.active = index;
            return Ok(Selection {
                index,
                created: false,
            });
        }

        self.devices
            .push(OutletDevice::new(id))
            .map_err(|_| RegistryError::CapacityExceeded)?;
        let index = self.devices.len() - 1;
        self.active = index;
        Ok(Selection {
            index,
            created: true,
        })
    }

    /// Remove the record at `index`, shifting later records down.
    ///
    /// The active index is clamped into `[0, len)`; it is 0 once empty.
    pub fn remove(&mut self, index: usize) -> Result<OutletDevice, RegistryError> {
        if index >= self.devices.len() {
            return Err(RegistryError::IndexOutOfRange);
        }

        self.devices[index..].rotate_left(1);
        let removed = self.devices.pop().ok_or(RegistryError::IndexOutOfRange)?;

        if self.devices.is_empty() {
            self.active = 0;
        } else if self.active >= self.devices.len() {
            self.active = self.devices.len() - 1;
        }
        Ok(removed)
    }

    /// Change the id of the record at `index`.
    pub fn readdress(&mut self, index: usize, new_id: u8) -> Result<(), RegistryError> {
        match self.find(new_id) {
            Some(other) if other != index => return Err(RegistryError::DuplicateId(new_id)),
            _ => {}
        }
        let device = self
            .devices
            .get_mut(index)
            .ok_or(RegistryError::IndexOutOfRange)?;
        device.readdress(new_id);
        Ok(())
    }

    /// Index of the active device, `None` when empty.
    pub fn active_index(&self) -> Option<usize> {
        if self.devices.is_empty() {
            None
        } else {
            Some(self.active)
        }
    }

    pub fn active(&self) -> Option<&OutletDevice> {
        self.devices.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut OutletDevice> {
        self.devices.get_mut(self.active)
    }
}
