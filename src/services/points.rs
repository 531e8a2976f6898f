use crate::models::ActivityCategory;

/// Bounds for an organizer-chosen override when a complaint is approved.
pub const MIN_TRAINING_POINT: i64 = 0;
pub const MAX_TRAINING_POINT: i64 = 100;

/// Default training points per activity category. The value stored on a
/// present participation always comes from this table unless a complaint
/// resolution later overrides it.
pub fn default_points(category: ActivityCategory) -> i64 {
    match category {
        ActivityCategory::Volunteer => 10,
        ActivityCategory::Academic => 8,
        ActivityCategory::Career => 7,
        ActivityCategory::Sports => 5,
        ActivityCategory::Culture => 5,
        ActivityCategory::Other => 3,
    }
}
