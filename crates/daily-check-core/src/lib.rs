//! Domain types, reordering and backup codec for daily-check.

/// Backup document import/export.
pub mod backup;
/// Check-in time validation.
pub mod check_in;
/// Identifier types.
pub mod id;
/// Manual reorder gesture.
pub mod reorder;
/// Task status values.
pub mod status;

pub use backup::{BackupDocument, BackupFormat, BackupShape, ImportError, ImportedBackup};
pub use check_in::{CheckInTimeError, normalize_check_in_time};
pub use id::TaskId;
pub use reorder::{ReorderGesture, ReorderMove, move_before};
pub use status::{TaskStatus, UnknownStatus};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier of the task.
    pub id: TaskId,
    /// Short name shown in the list.
    pub name: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Device label the task is performed on.
    #[serde(default)]
    pub device: String,
    /// App name or URL used for the task.
    #[serde(default)]
    pub app_or_url: String,
    /// Zero-padded `HH:mm` check-in time.
    pub check_in_time: String,
    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

impl Task {
    /// Build a new pending task from user-supplied fields.
    #[must_use]
    pub fn create(fields: TaskFields) -> Self {
        Self::create_at(fields, now_millis())
    }

    /// Build a new pending task with an explicit creation timestamp.
    #[must_use]
    pub fn create_at(fields: TaskFields, created_at: i64) -> Self {
        let TaskFields {
            name,
            description,
            device,
            app_or_url,
            check_in_time,
        } = fields;
        Self {
            id: TaskId::new(),
            name,
            description,
            device,
            app_or_url,
            check_in_time,
            status: TaskStatus::Pending,
            created_at,
        }
    }

    /// Overwrite every editable field, keeping identity, status and provenance.
    pub fn apply_fields(&mut self, fields: TaskFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.device = fields.device;
        self.app_or_url = fields.app_or_url;
        self.check_in_time = fields.check_in_time;
    }

    /// Snapshot of the editable fields.
    #[must_use]
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            description: self.description.clone(),
            device: self.device.clone(),
            app_or_url: self.app_or_url.clone(),
            check_in_time: self.check_in_time.clone(),
        }
    }
}

/// Editable task fields, as entered in the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    /// Short name.
    pub name: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Device label.
    #[serde(default)]
    pub device: String,
    /// App name or URL.
    #[serde(default)]
    pub app_or_url: String,
    /// Zero-padded `HH:mm` check-in time.
    pub check_in_time: String,
}

/// Candidate field values produced by the suggestion service.
///
/// Never persisted; it only pre-fills the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestion {
    /// Suggested name.
    #[serde(default)]
    pub name: String,
    /// Suggested description.
    #[serde(default)]
    pub description: String,
    /// Suggested check-in time.
    #[serde(default)]
    pub check_in_time: String,
    /// Suggested device label.
    #[serde(default)]
    pub device: String,
    /// Suggested app or URL.
    #[serde(default)]
    pub app_or_url: String,
}

impl TaskSuggestion {
    /// Merge the suggestion under explicit form values.
    ///
    /// Non-empty values in `form` win; empty ones are filled from the
    /// suggestion. The check-in time is normalized when possible.
    #[must_use]
    pub fn fill(self, form: TaskFields) -> TaskFields {
        let check_in_time = pick(form.check_in_time, self.check_in_time);
        TaskFields {
            name: pick(form.name, self.name),
            description: pick(form.description, self.description),
            device: pick(form.device, self.device),
            app_or_url: pick(form.app_or_url, self.app_or_url),
            check_in_time: normalize_check_in_time(&check_in_time).unwrap_or(check_in_time),
        }
    }
}

fn pick(explicit: String, suggested: String) -> String {
    if explicit.trim().is_empty() {
        suggested
    } else {
        explicit
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}
