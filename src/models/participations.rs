use std::fmt;

use crate::models::activities::ActivityStatus;
use crate::models::users::UserRole;

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ParticipationRow {
    pub participation_id: String,
    pub activity_id: String,
    pub student_user_id: String,
    pub status: String,
    pub training_point: i64,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ParticipationRow {
    pub fn status_parsed(&self) -> Option<ParticipationStatus> {
        ParticipationStatus::parse(&self.status)
    }
}

/// Organizer-facing registration row, joined with the student's name.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct RegistrationRow {
    pub participation_id: String,
    pub student_user_id: String,
    pub student_name: Option<String>,
    pub status: String,
    pub training_point: i64,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Present,
    Absent,
    Cancelled,
}

impl ParticipationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationStatus::Draft => "draft",
            ParticipationStatus::Pending => "pending",
            ParticipationStatus::Approved => "approved",
            ParticipationStatus::Rejected => "rejected",
            ParticipationStatus::Present => "present",
            ParticipationStatus::Absent => "absent",
            ParticipationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ParticipationStatus::Draft),
            "pending" => Some(ParticipationStatus::Pending),
            "approved" => Some(ParticipationStatus::Approved),
            "rejected" => Some(ParticipationStatus::Rejected),
            "present" => Some(ParticipationStatus::Present),
            "absent" => Some(ParticipationStatus::Absent),
            "cancelled" => Some(ParticipationStatus::Cancelled),
            _ => None,
        }
    }

    /// A row in one of these states holds a seat against the activity's
    /// capacity and blocks re-registration by the same student.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            ParticipationStatus::Rejected | ParticipationStatus::Cancelled
        )
    }

    /// Guarded transition. Every status mutation in the system goes through
    /// here (single-row calls directly, bulk calls via
    /// [`ParticipationAction::source_states`]), so the legality rules live
    /// in exactly one place.
    pub fn apply(
        self,
        action: ParticipationAction,
        role: UserRole,
        activity_status: ActivityStatus,
    ) -> Result<ParticipationStatus, TransitionError> {
        if role != action.required_role() {
            return Err(TransitionError::WrongActor { action, role });
        }
        if !action.source_states().contains(&self) {
            return Err(TransitionError::Illegal { from: self, action });
        }
        if action.requires_completed_activity() && activity_status != ActivityStatus::Completed {
            return Err(TransitionError::ActivityNotCompleted { activity_status });
        }
        Ok(action.target_state())
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationAction {
    Submit,
    Approve,
    Reject,
    MarkPresent,
    MarkAbsent,
    Cancel,
}

impl ParticipationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationAction::Submit => "submit",
            ParticipationAction::Approve => "approve",
            ParticipationAction::Reject => "reject",
            ParticipationAction::MarkPresent => "mark_present",
            ParticipationAction::MarkAbsent => "mark_absent",
            ParticipationAction::Cancel => "cancel",
        }
    }

    pub fn required_role(self) -> UserRole {
        match self {
            ParticipationAction::Submit | ParticipationAction::Cancel => UserRole::Student,
            ParticipationAction::Approve
            | ParticipationAction::Reject
            | ParticipationAction::MarkPresent
            | ParticipationAction::MarkAbsent => UserRole::Organizer,
        }
    }

    /// States the action may legally start from. Bulk operations use this
    /// set as their SQL filter, which is how already-processed rows drop
    /// out of a batch instead of failing it.
    pub fn source_states(self) -> &'static [ParticipationStatus] {
        match self {
            ParticipationAction::Submit => &[ParticipationStatus::Draft],
            ParticipationAction::Approve | ParticipationAction::Reject => {
                &[ParticipationStatus::Pending]
            }
            ParticipationAction::MarkPresent | ParticipationAction::MarkAbsent => {
                &[ParticipationStatus::Approved]
            }
            ParticipationAction::Cancel => {
                &[ParticipationStatus::Draft, ParticipationStatus::Pending]
            }
        }
    }

    pub fn target_state(self) -> ParticipationStatus {
        match self {
            ParticipationAction::Submit => ParticipationStatus::Pending,
            ParticipationAction::Approve => ParticipationStatus::Approved,
            ParticipationAction::Reject => ParticipationStatus::Rejected,
            ParticipationAction::MarkPresent => ParticipationStatus::Present,
            ParticipationAction::MarkAbsent => ParticipationStatus::Absent,
            ParticipationAction::Cancel => ParticipationStatus::Cancelled,
        }
    }

    /// Attendance can only be taken once the activity itself has closed.
    pub fn requires_completed_activity(self) -> bool {
        matches!(
            self,
            ParticipationAction::MarkPresent | ParticipationAction::MarkAbsent
        )
    }
}

impl fmt::Display for ParticipationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    WrongActor {
        action: ParticipationAction,
        role: UserRole,
    },
    Illegal {
        from: ParticipationStatus,
        action: ParticipationAction,
    },
    ActivityNotCompleted {
        activity_status: ActivityStatus,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::WrongActor { action, role } => {
                write!(f, "a {} may not {}", role, action)
            }
            TransitionError::Illegal { from, action } => {
                write!(f, "cannot {} a {} participation", action, from)
            }
            TransitionError::ActivityNotCompleted { activity_status } => {
                write!(
                    f,
                    "attendance can only be confirmed for a completed activity (currently {})",
                    activity_status
                )
            }
        }
    }
}

impl std::error::Error for TransitionError {}
