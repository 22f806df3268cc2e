//! Manual reordering of the task list.
//!
//! A gesture has three phases: start on a source task, hover over candidate
//! targets, then commit (drop) or cancel. The gesture itself never touches the
//! list; a committed gesture yields a [`ReorderMove`] that is applied with
//! [`move_before`].

use crate::Task;
use crate::id::TaskId;
use tracing::debug;

/// Source and target of a committed reorder gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderMove {
    /// Task being moved.
    pub source: TaskId,
    /// Task the source lands in front of.
    pub target: TaskId,
}

/// State of the single in-flight reorder gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReorderGesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A source is held but no distinct target is under the pointer.
    Dragging {
        /// Task being moved.
        source: TaskId,
    },
    /// A source is held over a distinct target.
    DraggingOver {
        /// Task being moved.
        source: TaskId,
        /// Current drop target.
        target: TaskId,
    },
}

impl ReorderGesture {
    /// Begin a gesture on `source`, replacing any gesture already in progress.
    pub fn start(&mut self, source: TaskId) {
        *self = Self::Dragging { source };
    }

    /// Report the task currently under the pointer.
    ///
    /// Hovering the source itself clears the target. Ignored while idle.
    pub fn hover(&mut self, candidate: TaskId) {
        let Some(source) = self.source().cloned() else {
            return;
        };
        *self = if candidate == source {
            Self::Dragging { source }
        } else {
            Self::DraggingOver {
                source,
                target: candidate,
            }
        };
    }

    /// Drop the current target while keeping the source held.
    pub fn leave(&mut self) {
        if let Self::DraggingOver { source, .. } = std::mem::take(self) {
            *self = Self::Dragging { source };
        }
    }

    /// Finish the gesture, returning the move to apply if a target was set.
    pub fn commit(&mut self) -> Option<ReorderMove> {
        match std::mem::take(self) {
            Self::DraggingOver { source, target } => Some(ReorderMove { source, target }),
            Self::Dragging { source } => {
                debug!(%source, "reorder dropped without a target");
                None
            }
            Self::Idle => None,
        }
    }

    /// Abandon the gesture without reordering.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Task currently held, if any.
    #[must_use]
    pub const fn source(&self) -> Option<&TaskId> {
        match self {
            Self::Idle => None,
            Self::Dragging { source } | Self::DraggingOver { source, .. } => Some(source),
        }
    }

    /// Current drop target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&TaskId> {
        match self {
            Self::DraggingOver { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Returns true while a gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Move `source` so it sits immediately before `target`.
///
/// The source is removed first and the target's index is looked up in the
/// shortened list. Returns false (leaving `tasks` untouched) when the ids are
/// equal or either one is missing.
pub fn move_before(tasks: &mut Vec<Task>, source: &TaskId, target: &TaskId) -> bool {
    if source == target {
        return false;
    }
    let Some(from) = tasks.iter().position(|task| &task.id == source) else {
        return false;
    };
    if !tasks.iter().any(|task| &task.id == target) {
        return false;
    }

    let moved = tasks.remove(from);
    let Some(to) = tasks.iter().position(|task| &task.id == target) else {
        tasks.insert(from, moved);
        return false;
    };
    tasks.insert(to, moved);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskFields;

    fn list(names: &[&str]) -> Vec<Task> {
        names
            .iter()
            .map(|name| {
                let mut task = Task::create_at(
                    TaskFields {
                        name: (*name).to_owned(),
                        check_in_time: "09:00".into(),
                        ..TaskFields::default()
                    },
                    0,
                );
                task.id = TaskId::from(*name);
                task
            })
            .collect()
    }

    fn names(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.name.as_str()).collect()
    }

    #[test]
    fn moves_source_in_front_of_earlier_target() {
        let mut tasks = list(&["A", "B", "C", "D"]);
        assert!(move_before(&mut tasks, &"C".into(), &"B".into()));
        assert_eq!(names(&tasks), ["A", "C", "B", "D"]);
    }

    #[test]
    fn target_index_is_taken_after_removal() {
        let mut tasks = list(&["A", "B", "C", "D"]);
        assert!(move_before(&mut tasks, &"A".into(), &"C".into()));
        assert_eq!(names(&tasks), ["B", "A", "C", "D"]);
    }

    #[test]
    fn self_drop_and_missing_ids_leave_order_unchanged() {
        let mut tasks = list(&["A", "B", "C", "D"]);
        assert!(!move_before(&mut tasks, &"A".into(), &"A".into()));
        assert!(!move_before(&mut tasks, &"Z".into(), &"B".into()));
        assert!(!move_before(&mut tasks, &"B".into(), &"Z".into()));
        assert_eq!(names(&tasks), ["A", "B", "C", "D"]);
    }

    #[test]
    fn gesture_commits_distinct_target() {
        let mut gesture = ReorderGesture::default();
        gesture.start("C".into());
        gesture.hover("B".into());

        assert_eq!(
            gesture.commit(),
            Some(ReorderMove {
                source: "C".into(),
                target: "B".into(),
            })
        );
        assert_eq!(gesture, ReorderGesture::Idle);
    }

    #[test]
    fn hovering_source_clears_target() {
        let mut gesture = ReorderGesture::default();
        gesture.start("A".into());
        gesture.hover("B".into());
        gesture.hover("A".into());

        assert!(gesture.target().is_none());
        assert_eq!(gesture.source().map(TaskId::as_str), Some("A"));
        assert_eq!(gesture.commit(), None);
        assert!(!gesture.is_active());
    }

    #[test]
    fn cancel_and_idle_hover_do_nothing() {
        let mut gesture = ReorderGesture::default();
        gesture.hover("B".into());
        assert_eq!(gesture, ReorderGesture::Idle);

        gesture.start("A".into());
        gesture.hover("B".into());
        gesture.cancel();
        assert_eq!(gesture.commit(), None);
    }

    #[test]
    fn leave_keeps_source_held() {
        let mut gesture = ReorderGesture::default();
        gesture.start("A".into());
        gesture.hover("C".into());
        gesture.leave();

        assert_eq!(
            gesture,
            ReorderGesture::Dragging {
                source: "A".into()
            }
        );
    }
}
