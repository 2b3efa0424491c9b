//! Domain computations for the volunteer tracker: volunteer ID generation,
//! attendance recording and hour aggregation for reports.

pub mod attendance;
pub mod error;
pub mod hours;
pub mod volunteer_id;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{NaiveDate, Utc};

pub use hours::HoursComputer;

/// Returns the date used as "today" by computations, or the current UTC date
/// when none is provided.
pub fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Utc::now().date_naive())
}
