//! Enum codes stored as small integers in the task table.
//!
//! Each code type maps the known integers to a fixed label and keeps
//! anything else in an explicit `Unknown` variant. Unknown codes have no
//! label, so they project to an absent payload field instead of a default.

/// Task priority (`task.priority`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    Unknown(i64),
}

impl Priority {
    /// Map a stored code to a priority.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Priority::Low,
            2 => Priority::Medium,
            3 => Priority::High,
            4 => Priority::Urgent,
            other => Priority::Unknown(other),
        }
    }

    /// Human-readable label, `None` for unknown codes.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Priority::Low => Some("low"),
            Priority::Medium => Some("medium"),
            Priority::High => Some("high"),
            Priority::Urgent => Some("urgent"),
            Priority::Unknown(_) => None,
        }
    }
}

/// Task status (`task.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Deleted,
    Active,
    Pending,
    Declined,
    Rejected,
    Draft,
    ScheduleLater,
    Unknown(i64),
}

impl TaskStatus {
    /// Map a stored code to a status.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => TaskStatus::Deleted,
            1 => TaskStatus::Active,
            2 => TaskStatus::Pending,
            3 => TaskStatus::Declined,
            4 => TaskStatus::Rejected,
            5 => TaskStatus::Draft,
            6 => TaskStatus::ScheduleLater,
            other => TaskStatus::Unknown(other),
        }
    }

    /// Human-readable label, `None` for unknown codes.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            TaskStatus::Deleted => Some("deleted"),
            TaskStatus::Active => Some("active"),
            TaskStatus::Pending => Some("pending"),
            TaskStatus::Declined => Some("declined"),
            TaskStatus::Rejected => Some("rejected"),
            TaskStatus::Draft => Some("draft"),
            TaskStatus::ScheduleLater => Some("schedule_later"),
            TaskStatus::Unknown(_) => None,
        }
    }
}

/// Task progress (`task.progress`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Todo,
    Doing,
    Done,
    Unknown(i64),
}

impl Progress {
    /// Map a stored code to a progress value.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Progress::Todo,
            1 => Progress::Doing,
            2 => Progress::Done,
            other => Progress::Unknown(other),
        }
    }

    /// Human-readable label, `None` for unknown codes.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Progress::Todo => Some("todo"),
            Progress::Doing => Some("doing"),
            Progress::Done => Some("done"),
            Progress::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::from_code(1).label(), Some("low"));
        assert_eq!(Priority::from_code(4).label(), Some("urgent"));
        assert_eq!(Priority::from_code(0), Priority::Unknown(0));
        assert_eq!(Priority::from_code(0).label(), None);
        assert_eq!(Priority::from_code(99).label(), None);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::from_code(0).label(), Some("deleted"));
        assert_eq!(TaskStatus::from_code(1).label(), Some("active"));
        assert_eq!(TaskStatus::from_code(6).label(), Some("schedule_later"));
        assert_eq!(TaskStatus::from_code(7), TaskStatus::Unknown(7));
        assert_eq!(TaskStatus::from_code(-1).label(), None);
    }

    #[test]
    fn test_progress_labels() {
        assert_eq!(Progress::from_code(0).label(), Some("todo"));
        assert_eq!(Progress::from_code(2).label(), Some("done"));
        assert_eq!(Progress::from_code(3).label(), None);
    }
}
