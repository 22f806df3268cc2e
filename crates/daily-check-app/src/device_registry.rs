//! User-managed list of device labels.

use tracing::{debug, info};

use crate::error::ChecklistError;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Storage key of the device list document.
pub const DEVICES_KEY: &str = "devices";

/// Exclusive owner of the device list.
///
/// Labels are unique (case-sensitive) and never blank. Removing a label does
/// not touch tasks that still mention it.
pub struct DeviceRegistry<S> {
    storage: S,
    devices: Vec<String>,
}

impl<S> DeviceRegistry<S> {
    /// Labels in registry order.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Returns true when `label` is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.devices.iter().any(|existing| existing == label)
    }
}

impl<S: KeyValueStore> DeviceRegistry<S> {
    /// Load the persisted registry, falling back to `defaults` when none was stored.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the document cannot be read or decoded.
    pub fn load(storage: S, defaults: &[String]) -> Result<Self, ChecklistError> {
        let devices = if let Some(stored) = load_json::<Vec<String>, _>(&storage, DEVICES_KEY)? {
            stored
        } else {
            debug!(count = defaults.len(), "no stored devices, using defaults");
            defaults.to_vec()
        };
        Ok(Self { storage, devices })
    }

    /// Register a new label.
    ///
    /// # Errors
    /// Returns [`ChecklistError::EmptyDeviceLabel`] or
    /// [`ChecklistError::DuplicateDevice`] on invalid input, and
    /// [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn add(&mut self, label: &str) -> Result<String, ChecklistError> {
        let label = self.validate_new(label, None)?;
        let mut next = self.devices.clone();
        next.push(label.clone());
        self.commit(next)?;
        info!(device = %label, "added device");
        Ok(label)
    }

    /// Rename the label at `index`.
    ///
    /// Renaming a label to its current value succeeds without writing.
    /// Returns `false` when `index` is out of range.
    ///
    /// # Errors
    /// Same validation and storage errors as [`add`](Self::add).
    pub fn rename(&mut self, index: usize, new_label: &str) -> Result<bool, ChecklistError> {
        let Some(current) = self.devices.get(index) else {
            debug!(index, "rename ignored: device not found");
            return Ok(false);
        };
        if current == new_label.trim() {
            return Ok(true);
        }
        let label = self.validate_new(new_label, Some(index))?;
        let mut next = self.devices.clone();
        let previous = std::mem::replace(&mut next[index], label.clone());
        self.commit(next)?;
        info!(from = %previous, to = %label, "renamed device");
        Ok(true)
    }

    /// Remove the label at `index`, returning it when it existed.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn remove(&mut self, index: usize) -> Result<Option<String>, ChecklistError> {
        if index >= self.devices.len() {
            debug!(index, "remove ignored: device not found");
            return Ok(None);
        }
        let mut next = self.devices.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        info!(device = %removed, "removed device");
        Ok(Some(removed))
    }

    /// Substitute the whole registry, as done by an import.
    ///
    /// Labels are trimmed; blanks and repeats are dropped, keeping the first
    /// occurrence.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn replace_all(&mut self, devices: Vec<String>) -> Result<(), ChecklistError> {
        let mut next: Vec<String> = Vec::with_capacity(devices.len());
        for label in devices {
            let label = label.trim();
            if !label.is_empty() && !next.iter().any(|existing| existing == label) {
                next.push(label.to_owned());
            }
        }
        let count = next.len();
        self.commit(next)?;
        info!(count, "replaced device list");
        Ok(())
    }

    fn validate_new(&self, label: &str, skip: Option<usize>) -> Result<String, ChecklistError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ChecklistError::EmptyDeviceLabel);
        }
        let taken = self
            .devices
            .iter()
            .enumerate()
            .any(|(idx, existing)| Some(idx) != skip && existing == label);
        if taken {
            return Err(ChecklistError::DuplicateDevice(label.to_owned()));
        }
        Ok(label.to_owned())
    }

    fn commit(&mut self, next: Vec<String>) -> Result<(), ChecklistError> {
        save_json(&self.storage, DEVICES_KEY, &next)?;
        self.devices = next;
        Ok(())
    }
}
