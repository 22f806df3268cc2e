use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Completion state of a checklist task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not yet handled today.
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    /// Done.
    #[serde(alias = "Completed")]
    Completed,
    /// Deliberately skipped.
    #[serde(alias = "Skipped")]
    Skipped,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Skipped];

    /// String representation used in documents and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether moving from `self` to `next` follows the checklist workflow.
    ///
    /// Pending tasks can be completed or skipped, and both of those can be
    /// undone back to pending. Writing the current status again is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _)
                | (_, Self::Pending)
                | (Self::Completed, Self::Completed)
                | (Self::Skipped, Self::Skipped)
        )
    }

    /// Returns true for statuses that count as handled for the day.
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status '{0}' (expected pending, completed or skipped)")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            "skipped" | "skip" => Ok(Self::Skipped),
            _ => Err(UnknownStatus(s.to_owned())),
        }
    }
}
