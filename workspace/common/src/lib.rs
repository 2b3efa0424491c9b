//! Common transport-layer types shared between the compute crate and the
//! HTTP handlers. Report rows, attendance summaries and pagination metadata
//! are defined once here so both sides serialize the same shapes.

mod attendance;
mod pagination;
mod reports;

pub use attendance::{AttendanceFailure, AttendanceSummary};
pub use pagination::Pagination;
pub use reports::{ReportPeriod, VolunteerHours, VolunteerStatistics, WorkBreakdown};

