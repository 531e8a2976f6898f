use chrono::{SecondsFormat, Utc};

pub mod access;
pub mod activity_service;
pub mod complaint_service;
pub mod eligibility_service;
pub mod error;
pub mod notify_service;
pub mod participation_service;
pub mod points;

/// Timestamps are stored as RFC 3339 TEXT and compared in SQL with
/// datetime(), so they stay second-resolution and UTC.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
