use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hours credited to one volunteer within a report window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VolunteerHours {
    pub volunteer_id: String,
    pub name: String,
    pub year: i32,
    pub branch: String,
    /// Sum of durations of activities the volunteer attended
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub activity_hours: Decimal,
    /// Sum of individually assigned work hours
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub work_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_hours: Decimal,
}

impl VolunteerHours {
    pub fn new(
        volunteer_id: impl Into<String>,
        name: impl Into<String>,
        year: i32,
        branch: impl Into<String>,
        activity_hours: Decimal,
        work_hours: Decimal,
    ) -> Self {
        Self {
            volunteer_id: volunteer_id.into(),
            name: name.into(),
            year,
            branch: branch.into(),
            activity_hours,
            work_hours,
            total_hours: activity_hours + work_hours,
        }
    }
}

/// Hours and entry count for one work type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct WorkBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub hours: Decimal,
    pub count: u64,
}

/// Lifetime statistics for a single volunteer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VolunteerStatistics {
    pub volunteer_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub activity_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub work_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_hours: Decimal,
    /// Number of activities the volunteer was marked present for
    pub activities_attended: u64,
    /// Keyed by work type (`design`, `content`, ...)
    pub work_breakdown: BTreeMap<String, WorkBreakdown>,
}

/// A calendar month used to window the top performers report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReportPeriod {
    pub month: u32,
    pub year: i32,
}

impl ReportPeriod {
    /// Builds a period, falling back to the month and year of `today` for
    /// missing parts. Returns `None` when the month is out of range.
    pub fn resolve(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Option<Self> {
        let period = Self {
            month: month.unwrap_or_else(|| today.month()),
            year: year.unwrap_or_else(|| today.year()),
        };
        period.bounds().map(|_| period)
    }

    /// First day of the month and first day of the following month.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_parts() {
        let row = VolunteerHours::new("BE2025001", "Asha", 2, "CSE", Decimal::new(6, 0), Decimal::new(15, 1));
        assert_eq!(row.total_hours, Decimal::new(75, 1));
    }

    #[test]
    fn hours_serialize_as_numbers() {
        let row = VolunteerHours::new("BE2025001", "Asha", 2, "CSE", Decimal::new(25, 1), Decimal::ZERO);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["activity_hours"], serde_json::json!(2.5));
        assert_eq!(json["work_hours"], serde_json::json!(0.0));
        assert_eq!(json["total_hours"], serde_json::json!(2.5));
    }

    #[test]
    fn period_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let period = ReportPeriod::resolve(None, None, today).unwrap();
        assert_eq!(period, ReportPeriod { month: 3, year: 2025 });
    }

    #[test]
    fn december_bounds_roll_over() {
        let period = ReportPeriod { month: 12, year: 2024 };
        let (start, end) = period.bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn invalid_month_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert!(ReportPeriod::resolve(Some(13), None, today).is_none());
        assert!(ReportPeriod::resolve(Some(0), Some(2025), today).is_none());
    }
}
