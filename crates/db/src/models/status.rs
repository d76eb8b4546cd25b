//! Status helper enum mapping to the `queue_statuses` SMALLINT lookup table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! migration that creates the table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Generation queue entry lifecycle status.
///
/// Valid transitions: `Pending -> InProgress -> {Completed, Failed}`,
/// plus `Pending -> Completed` directly for instant jobs. `Completed`
/// and `Failed` are terminal.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Pending = 1,
    InProgress = 2,
    Completed = 3,
    Failed = 4,
}

impl QueueStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// The wire name used in status responses, matching the seed data.
    pub fn name(self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    /// Whether this status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed)
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(QueueStatus::Pending),
            2 => Some(QueueStatus::InProgress),
            3 => Some(QueueStatus::Completed),
            4 => Some(QueueStatus::Failed),
            _ => None,
        }
    }
}

impl From<QueueStatus> for StatusId {
    fn from(value: QueueStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_status_ids_match_seed_data() {
        assert_eq!(QueueStatus::Pending.id(), 1);
        assert_eq!(QueueStatus::InProgress.id(), 2);
        assert_eq!(QueueStatus::Completed.id(), 3);
        assert_eq!(QueueStatus::Failed.id(), 4);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!QueueStatus::Pending.is_terminal());
        assert!(!QueueStatus::InProgress.is_terminal());
        assert!(QueueStatus::Completed.is_terminal());
        assert!(QueueStatus::Failed.is_terminal());
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            QueueStatus::Pending,
            QueueStatus::InProgress,
            QueueStatus::Completed,
            QueueStatus::Failed,
        ] {
            assert_eq!(QueueStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(QueueStatus::from_id(99), None);
    }
}
