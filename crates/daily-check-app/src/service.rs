//! Facade combining the task store, device registry and reorder gesture.

use std::rc::Rc;

use daily_check_core::{
    BackupDocument, BackupFormat, ImportedBackup, ReorderGesture, Task, TaskFields, TaskId, TaskStatus,
};
use daily_check_suggest::{SuggestError, SuggestionClient};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::device_registry::DeviceRegistry;
use crate::error::ChecklistError;
use crate::persistence::KeyValueStore;
use crate::task_store::TaskStore;
use crate::view::{Progress, TaskView};

/// Validated backup awaiting the user's confirmation.
///
/// Building a plan never touches state; pass it to
/// [`Checklist::apply_import`] once the user agreed to overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    backup: ImportedBackup,
}

impl ImportPlan {
    /// Format the backup was recognized as.
    pub const fn format(&self) -> BackupFormat {
        self.backup.format
    }

    /// Tasks that will replace the current list.
    pub fn tasks(&self) -> &[Task] {
        &self.backup.tasks
    }

    /// Number of tasks that will replace the current list.
    pub fn task_count(&self) -> usize {
        self.backup.tasks.len()
    }

    /// Number of device labels to install, `None` when the registry stays as is.
    pub fn device_count(&self) -> Option<usize> {
        self.backup.devices.as_ref().map(Vec::len)
    }
}

/// Daily checklist: tasks, devices and the in-flight reorder gesture.
pub struct Checklist<S> {
    tasks: TaskStore<Rc<S>>,
    devices: DeviceRegistry<Rc<S>>,
    gesture: ReorderGesture,
}

impl<S> Checklist<S> {
    /// Tasks in list order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    /// Tasks visible in `view`, in list order.
    pub fn tasks_in(&self, view: TaskView) -> Vec<&Task> {
        view.apply(self.tasks.tasks())
    }

    /// Look up a task by id.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Registered device labels.
    pub fn devices(&self) -> &[String] {
        self.devices.devices()
    }

    /// Per-status counts.
    pub fn progress(&self) -> Progress {
        Progress::of(self.tasks.tasks())
    }

    /// Current reorder gesture state.
    pub const fn gesture(&self) -> &ReorderGesture {
        &self.gesture
    }

    /// Snapshot of the current state as a backup document.
    pub fn export(&self) -> BackupDocument {
        BackupDocument::new(self.tasks.tasks().to_vec(), self.devices.devices().to_vec())
    }
}

impl<S: KeyValueStore> Checklist<S> {
    /// Load tasks and devices from `storage`.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if a stored document cannot be read or decoded.
    pub fn open(storage: S, config: &AppConfig) -> Result<Self, ChecklistError> {
        let storage = Rc::new(storage);
        let tasks = TaskStore::load(Rc::clone(&storage))?;
        let devices = DeviceRegistry::load(storage, config.devices.defaults())?;
        debug!(
            tasks = tasks.len(),
            devices = devices.devices().len(),
            "opened checklist"
        );
        Ok(Self {
            tasks,
            devices,
            gesture: ReorderGesture::Idle,
        })
    }

    /// Add a pending task at the end of the list.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn create_task(&mut self, fields: TaskFields) -> Result<Task, ChecklistError> {
        self.tasks.create(fields)
    }

    /// Replace the editable fields of a task. `false` when the id is unknown.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn update_task(&mut self, id: &TaskId, fields: TaskFields) -> Result<bool, ChecklistError> {
        self.tasks.update(id, fields)
    }

    /// Overwrite a task's status. `false` when the id is unknown.
    ///
    /// Moves outside the usual status cycle are written anyway and logged.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<bool, ChecklistError> {
        if let Some(current) = self.tasks.get(id).map(|task| task.status)
            && !current.can_transition_to(status)
        {
            debug!(%id, from = %current, to = %status, "status change outside the usual cycle");
        }
        self.tasks.set_status(id, status)
    }

    /// Remove a task. `false` when the id is unknown.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn delete_task(&mut self, id: &TaskId) -> Result<bool, ChecklistError> {
        if self.gesture.source() == Some(id) || self.gesture.target() == Some(id) {
            self.gesture.cancel();
        }
        self.tasks.delete(id)
    }

    /// Register a device label, returning it trimmed.
    ///
    /// # Errors
    /// Validation or storage errors from [`DeviceRegistry::add`].
    pub fn add_device(&mut self, label: &str) -> Result<String, ChecklistError> {
        self.devices.add(label)
    }

    /// Rename the device at `index`. `false` when the index is out of range.
    ///
    /// # Errors
    /// Validation or storage errors from [`DeviceRegistry::rename`].
    pub fn rename_device(&mut self, index: usize, label: &str) -> Result<bool, ChecklistError> {
        self.devices.rename(index, label)
    }

    /// Remove the device at `index`. Tasks keep the label they store.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn remove_device(&mut self, index: usize) -> Result<Option<String>, ChecklistError> {
        self.devices.remove(index)
    }

    /// Pick up `id` for reordering.
    ///
    /// Returns `false` (leaving the gesture idle) when the task is unknown or
    /// not pending.
    ///
    /// # Errors
    /// Returns [`ChecklistError::ReorderUnavailable`] outside the all-tasks view.
    pub fn begin_reorder(&mut self, view: TaskView, id: &TaskId) -> Result<bool, ChecklistError> {
        if !view.allows_reorder() {
            return Err(ChecklistError::ReorderUnavailable);
        }
        if !self.is_reorderable(id) {
            debug!(%id, "reorder not started: task missing or not pending");
            self.gesture.cancel();
            return Ok(false);
        }
        self.gesture.start(id.clone());
        Ok(true)
    }

    /// Report the task under the pointer while a gesture is active.
    ///
    /// Returns `true` when `id` became the drop target.
    pub fn hover_reorder(&mut self, id: &TaskId) -> bool {
        if !self.gesture.is_active() {
            return false;
        }
        if self.is_reorderable(id) {
            self.gesture.hover(id.clone());
        } else {
            self.gesture.leave();
        }
        self.gesture.target() == Some(id)
    }

    /// The pointer left every drop target.
    pub fn leave_reorder(&mut self) {
        self.gesture.leave();
    }

    /// Abandon the gesture without changing the order.
    pub fn cancel_reorder(&mut self) {
        self.gesture.cancel();
    }

    /// Drop the held task in front of the current target.
    ///
    /// The gesture is cleared whatever the outcome. Returns `false` when there
    /// was no target or either task disappeared in the meantime.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if the list cannot be persisted.
    pub fn commit_reorder(&mut self) -> Result<bool, ChecklistError> {
        let Some(reorder) = self.gesture.commit() else {
            return Ok(false);
        };
        self.tasks.reorder(&reorder.source, &reorder.target)
    }

    /// Run a whole gesture: move `from` in front of `to`.
    ///
    /// # Errors
    /// Same as [`begin_reorder`](Self::begin_reorder) and
    /// [`commit_reorder`](Self::commit_reorder).
    pub fn move_task(&mut self, view: TaskView, from: &TaskId, to: &TaskId) -> Result<bool, ChecklistError> {
        if !self.begin_reorder(view, from)? {
            return Ok(false);
        }
        if !self.hover_reorder(to) {
            self.cancel_reorder();
            return Ok(false);
        }
        self.commit_reorder()
    }

    /// Validate backup text without changing anything.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Import`] when the text is rejected.
    pub fn prepare_import(&self, raw: &str) -> Result<ImportPlan, ChecklistError> {
        let backup = ImportedBackup::parse(raw)?;
        debug!(
            format = ?backup.format,
            tasks = backup.tasks.len(),
            devices = ?backup.devices.as_ref().map(Vec::len),
            "validated backup"
        );
        Ok(ImportPlan { backup })
    }

    /// Replace tasks, and devices when the backup carried them.
    ///
    /// # Errors
    /// Returns [`ChecklistError::Storage`] if either list cannot be persisted.
    /// Tasks are written first; a failure on the device list leaves the new
    /// tasks in place.
    pub fn apply_import(&mut self, plan: ImportPlan) -> Result<(), ChecklistError> {
        let ImportedBackup { format, tasks, devices } = plan.backup;
        let task_count = tasks.len();
        self.gesture.cancel();
        self.tasks.replace_all(tasks)?;
        let device_count = match devices {
            Some(devices) => {
                let count = devices.len();
                self.devices.replace_all(devices)?;
                Some(count)
            }
            None => None,
        };
        info!(?format, tasks = task_count, devices = ?device_count, "imported backup");
        Ok(())
    }

    fn is_reorderable(&self, id: &TaskId) -> bool {
        self.tasks
            .get(id)
            .is_some_and(|task| task.status == TaskStatus::Pending)
    }
}

/// Fill blank fields of `form` from a suggestion for its current name.
///
/// Values already typed into the form are kept. On failure the form is left
/// exactly as it was. A blank name skips the request.
///
/// # Errors
/// Returns the client's [`SuggestError`] unchanged.
pub fn autofill<C>(client: &C, form: &mut TaskFields) -> Result<bool, SuggestError>
where
    C: SuggestionClient + ?Sized,
{
    let input = form.name.trim();
    if input.is_empty() {
        debug!("autofill skipped: empty task name");
        return Ok(false);
    }
    let suggestion = client.suggest(input).inspect_err(|err| {
        warn!(error = %err, "task suggestion failed");
    })?;
    *form = suggestion.fill(std::mem::take(form));
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::persistence::MemoryStore;
    use crate::{DEVICES_KEY, TASKS_KEY};
    use daily_check_core::{BackupFormat, ImportError, TaskSuggestion};
    use std::cell::Cell;

    fn fields(name: &str) -> TaskFields {
        TaskFields {
            name: name.into(),
            device: "Phone".into(),
            check_in_time: "08:30".into(),
            ..TaskFields::default()
        }
    }

    fn checklist<'a>(storage: &'a MemoryStore, names: &[&str]) -> Checklist<&'a MemoryStore> {
        let mut checklist = Checklist::open(storage, &AppConfig::default()).expect("open checklist");
        for name in names {
            checklist.create_task(fields(name)).expect("create task");
        }
        checklist
    }

    fn names<S>(checklist: &Checklist<S>) -> Vec<&str> {
        checklist.tasks().iter().map(|t| t.name.as_str()).collect()
    }

    fn id_of<S>(checklist: &Checklist<S>, name: &str) -> TaskId {
        let Some(task) = checklist.tasks().iter().find(|t| t.name == name) else {
            panic!("task {name} missing");
        };
        task.id.clone()
    }

    #[test]
    fn open_uses_configured_default_devices() {
        let storage = MemoryStore::new();
        let checklist = checklist(&storage, &[]);
        assert_eq!(checklist.devices(), ["Phone", "Laptop", "Desktop", "Tablet"]);
        assert!(checklist.tasks().is_empty());
    }

    #[test]
    fn status_cycle_round_trips_to_pending() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["Stretch"]);
        let id = id_of(&checklist, "Stretch");

        assert!(checklist.set_status(&id, TaskStatus::Completed)?);
        assert!(checklist.set_status(&id, TaskStatus::Skipped)?);
        assert!(checklist.set_status(&id, TaskStatus::Pending)?);
        assert_eq!(checklist.task(&id).map(|t| t.status), Some(TaskStatus::Pending));
        assert!(!checklist.set_status(&TaskId::from("nope"), TaskStatus::Completed)?);
        Ok(())
    }

    #[test]
    fn gesture_moves_source_before_target() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B", "C", "D"]);
        let (a, c) = (id_of(&checklist, "A"), id_of(&checklist, "C"));

        assert!(checklist.begin_reorder(TaskView::All, &a)?);
        assert!(!checklist.hover_reorder(&a), "hovering the source is ignored");
        assert!(checklist.hover_reorder(&c));
        assert!(checklist.commit_reorder()?);
        assert_eq!(names(&checklist), ["B", "A", "C", "D"]);
        assert!(!checklist.gesture().is_active());
        Ok(())
    }

    #[test]
    fn reorder_requires_all_view() {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B"]);
        let a = id_of(&checklist, "A");

        let Err(err) = checklist.begin_reorder(TaskView::Pending, &a) else {
            panic!("filtered view must refuse reordering");
        };
        assert!(matches!(err, ChecklistError::ReorderUnavailable));
    }

    #[test]
    fn handled_tasks_cannot_be_dragged_or_targeted() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B", "C"]);
        let (a, b, c) = (id_of(&checklist, "A"), id_of(&checklist, "B"), id_of(&checklist, "C"));
        checklist.set_status(&b, TaskStatus::Completed)?;

        assert!(!checklist.begin_reorder(TaskView::All, &b)?);
        assert!(!checklist.move_task(TaskView::All, &c, &b)?);
        assert!(checklist.move_task(TaskView::All, &c, &a)?);
        assert_eq!(names(&checklist), ["C", "A", "B"]);
        Ok(())
    }

    #[test]
    fn cancel_and_vanished_tasks_leave_order_unchanged() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B", "C"]);
        let (a, c) = (id_of(&checklist, "A"), id_of(&checklist, "C"));

        checklist.begin_reorder(TaskView::All, &c)?;
        checklist.hover_reorder(&a);
        checklist.cancel_reorder();
        assert!(!checklist.commit_reorder()?);

        checklist.begin_reorder(TaskView::All, &c)?;
        checklist.hover_reorder(&a);
        checklist.delete_task(&a)?;
        assert!(!checklist.commit_reorder()?);
        assert_eq!(names(&checklist), ["B", "C"]);
        Ok(())
    }

    #[test]
    fn export_then_import_restores_tasks_and_devices() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B", "C"]);
        checklist.add_device("Watch")?;
        let b = id_of(&checklist, "B");
        checklist.set_status(&b, TaskStatus::Skipped)?;
        let exported = checklist.export().to_json_pretty().map_err(anyhow::Error::from)?;
        let snapshot = (checklist.tasks().to_vec(), checklist.devices().to_vec());

        let other = MemoryStore::new();
        let mut restored = Checklist::open(&other, &AppConfig::default())?;
        let plan = restored.prepare_import(&exported)?;
        assert_eq!(plan.format(), BackupFormat::Versioned);
        assert_eq!(plan.task_count(), 3);
        assert_eq!(plan.device_count(), Some(5));
        assert!(restored.tasks().is_empty(), "preparing does not mutate");

        restored.apply_import(plan)?;
        assert_eq!((restored.tasks().to_vec(), restored.devices().to_vec()), snapshot);
        assert!(other.document(TASKS_KEY).is_some());
        assert!(other.document(DEVICES_KEY).is_some());
        Ok(())
    }

    #[test]
    fn legacy_import_keeps_device_registry() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["Old"]);
        checklist.add_device("Watch")?;
        let devices = checklist.devices().to_vec();

        let plan = checklist.prepare_import(r#"[{"id":"1","name":"Read","checkInTime":"07:00"}]"#)?;
        assert_eq!(plan.format(), BackupFormat::Legacy);
        assert_eq!(plan.device_count(), None);
        checklist.apply_import(plan)?;

        assert_eq!(names(&checklist), ["Read"]);
        assert_eq!(checklist.tasks()[0].id.as_str(), "1");
        assert_eq!(checklist.devices(), devices.as_slice());
        Ok(())
    }

    #[test]
    fn rejected_import_changes_nothing() {
        let storage = MemoryStore::new();
        let checklist = checklist(&storage, &["A"]);
        let before = storage.document(TASKS_KEY);

        let Err(err) = checklist.prepare_import(r#"{"foo": 1}"#) else {
            panic!("unknown shape must be rejected");
        };
        assert!(matches!(err, ChecklistError::Import(ImportError::UnrecognizedFormat)));
        assert!(checklist.prepare_import("{not json").is_err());
        assert_eq!(storage.document(TASKS_KEY), before);
    }

    #[test]
    fn backup_with_repeated_ids_is_refused_before_any_write() {
        let storage = MemoryStore::new();
        let checklist = checklist(&storage, &["Keep"]);
        let before = storage.document(TASKS_KEY);

        let raw = r#"[{"id":"1","name":"A","checkInTime":"08:00"},{"id":"1","name":"B","checkInTime":"09:00"}]"#;
        let Err(err) = checklist.prepare_import(raw) else {
            panic!("repeated ids must be refused");
        };
        assert!(matches!(
            err,
            ChecklistError::Import(ImportError::InvalidTaskData { index: 1, .. })
        ));
        assert_eq!(names(&checklist), ["Keep"]);
        assert_eq!(storage.document(TASKS_KEY), before);
    }

    #[test]
    fn empty_backup_clears_the_list() -> Result<(), ChecklistError> {
        let storage = MemoryStore::new();
        let mut checklist = checklist(&storage, &["A", "B"]);
        let plan = checklist.prepare_import("[]")?;
        checklist.apply_import(plan)?;
        assert!(checklist.tasks().is_empty());
        assert_eq!(checklist.progress(), Progress::default());
        Ok(())
    }

    struct FixedClient {
        calls: Cell<usize>,
        fail: bool,
    }

    impl SuggestionClient for FixedClient {
        fn suggest(&self, input: &str) -> daily_check_suggest::Result<TaskSuggestion> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(SuggestError::new("service unavailable"));
            }
            Ok(TaskSuggestion {
                name: format!("{input} (suggested)"),
                description: "Ten minutes of stretching".into(),
                device: "Phone".into(),
                app_or_url: "Yoga app".into(),
                check_in_time: "7:05".into(),
            })
        }
    }

    #[test]
    fn autofill_keeps_typed_values_and_fills_the_rest() -> Result<(), SuggestError> {
        let client = FixedClient { calls: Cell::new(0), fail: false };
        let mut form = TaskFields {
            name: "stretch".into(),
            device: "Laptop".into(),
            ..TaskFields::default()
        };

        assert!(autofill(&client, &mut form)?);
        assert_eq!(form.name, "stretch");
        assert_eq!(form.device, "Laptop");
        assert_eq!(form.description, "Ten minutes of stretching");
        assert_eq!(form.check_in_time, "07:05");
        Ok(())
    }

    #[test]
    fn autofill_failure_leaves_form_untouched() {
        let client = FixedClient { calls: Cell::new(0), fail: true };
        let mut form = fields("stretch");
        let before = form.clone();

        assert!(autofill(&client, &mut form).is_err());
        assert_eq!(form, before);

        let mut blank = TaskFields::default();
        assert!(matches!(autofill(&client, &mut blank), Ok(false)));
        assert_eq!(client.calls.get(), 1, "blank names are not sent");
    }
}
