use std::fmt;

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ComplaintRow {
    pub complaint_id: String,
    pub participation_id: String,
    pub description: String,
    pub status: String,
    pub response: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl ComplaintRow {
    pub fn status_parsed(&self) -> Option<ComplaintStatus> {
        ComplaintStatus::parse(&self.status)
    }
}

/// Complaints are a one-shot dispute: once resolved either way they are
/// immutable and a fresh complaint is needed for any further revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintStatus {
    Pending,
    Approved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Approved => "approved",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ComplaintStatus::Pending),
            "approved" => Some(ComplaintStatus::Approved),
            "rejected" => Some(ComplaintStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ComplaintStatus::Approved | ComplaintStatus::Rejected)
    }

    /// The only legal move is Pending -> {Approved, Rejected}.
    pub fn resolve(self, verdict: ComplaintStatus) -> Result<ComplaintStatus, ComplaintStateError> {
        if self != ComplaintStatus::Pending {
            return Err(ComplaintStateError::AlreadyResolved { current: self });
        }
        if !verdict.is_terminal() {
            return Err(ComplaintStateError::NotAVerdict { verdict });
        }
        Ok(verdict)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintStateError {
    AlreadyResolved { current: ComplaintStatus },
    NotAVerdict { verdict: ComplaintStatus },
}

impl fmt::Display for ComplaintStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplaintStateError::AlreadyResolved { current } => {
                write!(f, "complaint is already {}", current)
            }
            ComplaintStateError::NotAVerdict { verdict } => {
                write!(f, "{} is not a valid resolution", verdict)
            }
        }
    }
}

impl std::error::Error for ComplaintStateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_resolves_either_way() {
        assert_eq!(
            ComplaintStatus::Pending.resolve(ComplaintStatus::Approved),
            Ok(ComplaintStatus::Approved)
        );
        assert_eq!(
            ComplaintStatus::Pending.resolve(ComplaintStatus::Rejected),
            Ok(ComplaintStatus::Rejected)
        );
    }

    #[test]
    fn resolved_complaints_are_immutable() {
        for current in [ComplaintStatus::Approved, ComplaintStatus::Rejected] {
            for verdict in [ComplaintStatus::Approved, ComplaintStatus::Rejected] {
                assert_eq!(
                    current.resolve(verdict),
                    Err(ComplaintStateError::AlreadyResolved { current })
                );
            }
        }
    }

    #[test]
    fn pending_is_not_a_verdict() {
        assert_eq!(
            ComplaintStatus::Pending.resolve(ComplaintStatus::Pending),
            Err(ComplaintStateError::NotAVerdict {
                verdict: ComplaintStatus::Pending
            })
        );
    }
}
