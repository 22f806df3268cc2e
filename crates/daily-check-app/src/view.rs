//! Filtered views over the task list and daily progress.

use std::{fmt, str::FromStr};

use daily_check_core::{Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// Which tasks a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    /// Every task, in list order. The only view that allows reordering.
    #[default]
    All,
    /// Pending tasks only.
    Pending,
    /// Completed tasks only.
    Completed,
    /// Skipped tasks only.
    Skipped,
}

impl TaskView {
    /// Returns true when `task` is visible in this view.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => task.status == TaskStatus::Pending,
            Self::Completed => task.status == TaskStatus::Completed,
            Self::Skipped => task.status == TaskStatus::Skipped,
        }
    }

    /// Visible tasks, keeping list order.
    pub fn apply(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    /// Manual reordering is only offered on the unfiltered list.
    #[must_use]
    pub const fn allows_reorder(self) -> bool {
        matches!(self, Self::All)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            other => other
                .parse::<TaskStatus>()
                .map(|status| match status {
                    TaskStatus::Pending => Self::Pending,
                    TaskStatus::Completed => Self::Completed,
                    TaskStatus::Skipped => Self::Skipped,
                })
                .map_err(|_| format!("unknown view '{s}' (expected all, pending, completed or skipped)")),
        }
    }
}

/// Per-status counts for the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// All tasks.
    pub total: usize,
    /// Still pending.
    pub pending: usize,
    /// Completed.
    pub completed: usize,
    /// Skipped.
    pub skipped: usize,
}

impl Progress {
    /// Count statuses over `tasks`.
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, task| {
            acc.total += 1;
            match task.status {
                TaskStatus::Pending => acc.pending += 1,
                TaskStatus::Completed => acc.completed += 1,
                TaskStatus::Skipped => acc.skipped += 1,
            }
            acc
        })
    }

    /// Share of tasks handled (completed or skipped), rounded down, 0-100.
    #[must_use]
    pub fn percent_handled(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.completed + self.skipped) * 100 / self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} done ({} completed, {} skipped, {} pending) {}%",
            self.completed + self.skipped,
            self.total,
            self.completed,
            self.skipped,
            self.pending,
            self.percent_handled()
        )
    }
}
