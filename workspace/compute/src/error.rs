use sea_orm::DbErr;
use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Attendance or reports were requested for an activity that does not exist
    #[error("Activity not found: {0}")]
    ActivityNotFound(i32),

    /// No volunteer carries the given public ID
    #[error("Volunteer not found: {0}")]
    VolunteerNotFound(String),

    /// Month/year pair that does not describe a calendar month
    #[error("Invalid report period: month {month}, year {year}")]
    InvalidPeriod { month: u32, year: i32 },
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
