pub mod activities;
pub mod complaints;
pub mod participations;
