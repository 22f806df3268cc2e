//! Versioned JSON backup document.
//!
//! Exported documents always carry `version`, `tasks` and `devices`. On import
//! the raw JSON is first classified into a [`BackupShape`], then every task is
//! validated before anything is handed back to the caller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::warn;

use crate::id::TaskId;
use crate::status::TaskStatus;
use crate::{Task, now_millis};

/// Version written by [`BackupDocument::new`].
pub const BACKUP_VERSION: u32 = 1;

/// Envelope written on export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Schema version.
    pub version: u32,
    /// Tasks in list order.
    pub tasks: Vec<Task>,
    /// Device labels in registry order.
    pub devices: Vec<String>,
}

impl BackupDocument {
    /// Wrap the current task and device lists.
    #[must_use]
    pub fn new(tasks: Vec<Task>, devices: Vec<String>) -> Self {
        Self {
            version: BACKUP_VERSION,
            tasks,
            devices,
        }
    }

    /// Render the document as indented JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// File name for a backup taken on `date`.
    #[must_use]
    pub fn file_name(date: Date) -> String {
        format!(
            "daily-check-backup-{:04}-{:02}-{:02}.json",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }
}

/// Errors raised while importing a backup.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not JSON.
    #[error("backup is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The JSON is neither a task array nor an object with a `tasks` array.
    #[error("unrecognized backup format (expected a task array or an object with a \"tasks\" array)")]
    UnrecognizedFormat,
    /// A task entry is missing required data.
    #[error("invalid task data at index {index}: {reason}")]
    InvalidTaskData {
        /// Position of the offending entry.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// A device entry is not a string.
    #[error("invalid device entry at index {index}: expected a string")]
    InvalidDeviceData {
        /// Position of the offending entry.
        index: usize,
    },
}

/// Shape of a raw backup, decided before any field is validated.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupShape {
    /// A bare task array.
    LegacyArray(Vec<Value>),
    /// An object carrying a `tasks` array.
    VersionedDocument {
        /// Declared version, if any.
        version: Option<u64>,
        /// Raw task entries.
        tasks: Vec<Value>,
        /// Raw device entries when a `devices` array is present.
        devices: Option<Vec<Value>>,
    },
    /// Anything else.
    Unrecognized,
}

impl BackupShape {
    /// Classify a parsed JSON value.
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(tasks) => Self::LegacyArray(tasks),
            Value::Object(mut map) => match map.remove("tasks") {
                Some(Value::Array(tasks)) => Self::VersionedDocument {
                    version: map.get("version").and_then(Value::as_u64),
                    tasks,
                    devices: match map.remove("devices") {
                        Some(Value::Array(devices)) => Some(devices),
                        _ => None,
                    },
                },
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }
}

/// Which format an imported backup was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFormat {
    /// Bare task array without devices.
    Legacy,
    /// Versioned envelope.
    Versioned,
}

/// Validated content of an imported backup, ready to replace store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBackup {
    /// Format the backup was recognized as.
    pub format: BackupFormat,
    /// Tasks in list order.
    pub tasks: Vec<Task>,
    /// Device labels, when the backup carried them.
    pub devices: Option<Vec<String>>,
}

impl ImportedBackup {
    /// Parse and validate backup text without touching any state.
    ///
    /// # Errors
    /// Returns [`ImportError`] when the text is not JSON, has an unknown
    /// shape, or contains an invalid task or device entry.
    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        match BackupShape::classify(value) {
            BackupShape::LegacyArray(tasks) => Ok(Self {
                format: BackupFormat::Legacy,
                tasks: validate_tasks(tasks)?,
                devices: None,
            }),
            BackupShape::VersionedDocument {
                version,
                tasks,
                devices,
            } => {
                if version.is_some_and(|v| v > u64::from(BACKUP_VERSION)) {
                    warn!(?version, supported = BACKUP_VERSION, "importing backup from a newer version");
                }
                Ok(Self {
                    format: BackupFormat::Versioned,
                    tasks: validate_tasks(tasks)?,
                    devices: devices.map(validate_devices).transpose()?,
                })
            }
            BackupShape::Unrecognized => Err(ImportError::UnrecognizedFormat),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: Option<Value>,
    name: Option<String>,
    description: Option<String>,
    device: Option<String>,
    app_or_url: Option<String>,
    check_in_time: Option<String>,
    status: Option<TaskStatus>,
    created_at: Option<i64>,
}

fn validate_tasks(entries: Vec<Value>) -> Result<Vec<Task>, ImportError> {
    let imported_at = now_millis();
    let mut seen = HashSet::with_capacity(entries.len());
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let task = validate_task(index, entry, imported_at)?;
        if !seen.insert(task.id.clone()) {
            return Err(ImportError::InvalidTaskData {
                index,
                reason: format!("duplicate id {}", task.id),
            });
        }
        tasks.push(task);
    }
    Ok(tasks)
}

fn validate_task(index: usize, entry: Value, imported_at: i64) -> Result<Task, ImportError> {
    let invalid = |reason: String| ImportError::InvalidTaskData { index, reason };
    if !entry.is_object() {
        return Err(invalid("expected an object".into()));
    }
    let raw: RawTask = serde_json::from_value(entry).map_err(|err| invalid(err.to_string()))?;

    let id = match raw.id {
        Some(Value::String(id)) => TaskId::from(id),
        // Older exports used numeric ids.
        Some(Value::Number(id)) => TaskId::from(id.to_string()),
        _ => return Err(invalid("missing id".into())),
    };
    if id.is_blank() {
        return Err(invalid("missing id".into()));
    }
    let name = required(raw.name).ok_or_else(|| invalid("missing name".into()))?;
    let check_in_time =
        required(raw.check_in_time).ok_or_else(|| invalid("missing checkInTime".into()))?;

    Ok(Task {
        id,
        name,
        description: raw.description.unwrap_or_default(),
        device: raw.device.unwrap_or_default(),
        app_or_url: raw.app_or_url.unwrap_or_default(),
        check_in_time,
        status: raw.status.unwrap_or_default(),
        created_at: raw.created_at.unwrap_or(imported_at),
    })
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn validate_devices(entries: Vec<Value>) -> Result<Vec<String>, ImportError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::String(label) => Ok(label),
            _ => Err(ImportError::InvalidDeviceData { index }),
        })
        .collect()
}
