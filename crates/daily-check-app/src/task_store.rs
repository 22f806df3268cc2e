//! Ordered task list with synchronous write-through persistence.

use daily_check_core::{Task, TaskFields, TaskId, TaskStatus, move_before};
use tracing::{debug, info};

use crate::error::ChecklistError;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Storage key of the task list document.
pub const TASKS_KEY: &str = "tasks";

/// Exclusive owner of the task list.
///
/// Every effective mutation is computed on a copy, written to storage, and only
/// then becomes visible. A failed write leaves the in-memory list untouched.
/// Operations on unknown ids return `false` and write nothing.
pub struct TaskStore<S> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S> TaskStore<S> {
    /// Tasks in list order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Position of a task in list order.
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load the persisted task list, starting empty when none was stored.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the document cannot be read or decoded.
    pub fn load(storage: S) -> Result<Self, ChecklistError> {
        let tasks: Vec<Task> = load_json(&storage, TASKS_KEY)?.unwrap_or_default();
        debug!(count = tasks.len(), "loaded task list");
        Ok(Self { storage, tasks })
    }

    /// Append a new pending task built from `fields`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn create(&mut self, fields: TaskFields) -> Result<Task, ChecklistError> {
        let mut task = Task::create(fields);
        while self.get(&task.id).is_some() {
            task.id = TaskId::new();
        }
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        info!(id = %task.id, name = %task.name, "created task");
        Ok(task)
    }

    /// Replace the editable fields of the task matching `id`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn update(&mut self, id: &TaskId, fields: TaskFields) -> Result<bool, ChecklistError> {
        self.modify(id, |task| task.apply_fields(fields))
    }

    /// Overwrite the status of the task matching `id`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<bool, ChecklistError> {
        self.modify(id, |task| task.status = status)
    }

    /// Remove the task matching `id`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn delete(&mut self, id: &TaskId) -> Result<bool, ChecklistError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "delete ignored: task not found");
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        next.remove(index);
        self.commit(next)?;
        info!(%id, "deleted task");
        Ok(true)
    }

    /// Substitute the whole list, as done by an import.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<(), ChecklistError> {
        let count = tasks.len();
        self.commit(tasks)?;
        info!(count, "replaced task list");
        Ok(())
    }

    /// Move `from` so it sits immediately before `to`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn reorder(&mut self, from: &TaskId, to: &TaskId) -> Result<bool, ChecklistError> {
        let mut next = self.tasks.clone();
        if !move_before(&mut next, from, to) {
            debug!(%from, %to, "reorder ignored");
            return Ok(false);
        }
        self.commit(next)?;
        info!(%from, %to, "reordered task");
        Ok(true)
    }

    fn modify(&mut self, id: &TaskId, edit: impl FnOnce(&mut Task)) -> Result<bool, ChecklistError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "update ignored: task not found");
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        edit(&mut next[index]);
        if next[index] == self.tasks[index] {
            debug!(%id, "update left task unchanged");
            return Ok(true);
        }
        self.commit(next)?;
        debug!(%id, "updated task");
        Ok(true)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), ChecklistError> {
        save_json(&self.storage, TASKS_KEY, &next)?;
        self.tasks = next;
        Ok(())
    }
}
