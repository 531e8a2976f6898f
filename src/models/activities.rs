use std::fmt;

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub activity_id: String,
    pub organizer_user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    /// NULL means unlimited.
    pub capacity: Option<i64>,
    pub registration_starts_at: String,
    pub registration_ends_at: String,
    pub starts_at: String,
    pub ends_at: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ActivityRow {
    pub fn status_parsed(&self) -> Option<ActivityStatus> {
        ActivityStatus::parse(&self.status)
    }

    pub fn category_parsed(&self) -> ActivityCategory {
        ActivityCategory::parse(&self.category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Draft,
    Published,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Draft => "draft",
            ActivityStatus::Published => "published",
            ActivityStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ActivityStatus::Draft),
            "published" => Some(ActivityStatus::Published),
            "completed" => Some(ActivityStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed category domains. Unknown strings fall back to `Other` so an old
/// row never breaks point calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Volunteer,
    Academic,
    Career,
    Sports,
    Culture,
    Other,
}

impl ActivityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityCategory::Volunteer => "volunteer",
            ActivityCategory::Academic => "academic",
            ActivityCategory::Career => "career",
            ActivityCategory::Sports => "sports",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "volunteer" => ActivityCategory::Volunteer,
            "academic" => ActivityCategory::Academic,
            "career" => ActivityCategory::Career,
            "sports" => ActivityCategory::Sports,
            "culture" => ActivityCategory::Culture,
            _ => ActivityCategory::Other,
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
