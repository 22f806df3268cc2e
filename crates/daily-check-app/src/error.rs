//! Error type surfaced by checklist operations.

use daily_check_core::ImportError;
use thiserror::Error;

/// Errors raised by the task store, device registry and service facade.
///
/// Operations on ids or indices that do not exist are not errors; they report
/// "nothing changed" instead.
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// Device label is empty after trimming.
    #[error("device name must not be empty")]
    EmptyDeviceLabel,

    /// Device label is already registered.
    #[error("device '{0}' already exists")]
    DuplicateDevice(String),

    /// Reordering was requested outside the unfiltered task list.
    #[error("tasks can only be reordered in the all-tasks view")]
    ReorderUnavailable,

    /// Backup text failed validation.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Backing storage failed to read or write.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}
