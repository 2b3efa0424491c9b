pub mod activities;
pub mod admins;
pub mod attendance;
pub mod health;
pub mod reports;
pub mod volunteers;
pub mod work;
