//! Application layer logic for daily-check.
//!
//! This crate owns the task list and device registry state, their write-through
//! persistence, configuration, and the service facade used by the CLI.

pub mod config;
pub mod device_registry;
pub mod error;
pub mod persistence;
pub mod service;
pub mod task_store;
pub mod view;

// Re-exports for convenience
pub use config::{AppConfig, DevicesConfig, StorageConfig};
pub use device_registry::{DEVICES_KEY, DeviceRegistry};
pub use error::ChecklistError;
pub use persistence::{KeyValueStore, MemoryStore};
pub use service::{Checklist, ImportPlan, autofill};
pub use task_store::{TASKS_KEY, TaskStore};
pub use view::{Progress, TaskView};
