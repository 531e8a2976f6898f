pub mod activities;
pub mod complaints;
pub mod participations;
pub mod users;

pub use activities::{ActivityCategory, ActivityRow, ActivityStatus};
pub use complaints::{ComplaintRow, ComplaintStatus};
pub use participations::{
    ParticipationAction, ParticipationRow, ParticipationStatus, RegistrationRow, TransitionError,
};
pub use users::UserRole;
