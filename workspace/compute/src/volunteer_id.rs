//! Sequential volunteer ID generation.
//!
//! IDs look like `BE2025007`: a course prefix, the calendar year of
//! registration and a three digit counter scoped to that prefix and year.

use chrono::{Datelike, NaiveDate};
use model::entities::volunteer;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{debug, instrument};

use crate::error::Result;

/// Maps a course name to its ID prefix. Unknown courses use `TE`.
pub fn course_prefix(course: &str) -> &'static str {
    match course.trim().to_ascii_lowercase().as_str() {
        "btech" => "BE",
        "mtech" => "MT",
        _ => "TE",
    }
}

pub fn format_volunteer_id(base: &str, sequence: u64) -> String {
    format!("{}{:03}", base, sequence)
}

/// Generates the next volunteer ID for `course`.
///
/// The year component is taken from `today`, not from the volunteer's
/// enrollment year. Concurrent registrations may compute the same ID; the
/// unique index on `volunteers.volunteer_id` rejects the second insert.
#[instrument(skip(db))]
pub async fn generate_volunteer_id<C>(
    db: &C,
    course: &str,
    enrollment_year: i32,
    today: NaiveDate,
) -> Result<String>
where
    C: ConnectionTrait,
{
    let base = format!("{}{}", course_prefix(course), today.year());

    let existing = volunteer::Entity::find()
        .filter(volunteer::Column::VolunteerId.starts_with(&base))
        .count(db)
        .await?;

    let id = format_volunteer_id(&base, existing + 1);
    debug!(%id, existing, "Generated volunteer ID");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_volunteer, setup_db};

    #[test]
    fn test_course_prefix() {
        assert_eq!(course_prefix("btech"), "BE");
        assert_eq!(course_prefix("BTech"), "BE");
        assert_eq!(course_prefix(" MTECH "), "MT");
        assert_eq!(course_prefix("diploma"), "TE");
        assert_eq!(course_prefix(""), "TE");
    }

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_volunteer_id("BE2025", 1), "BE2025001");
        assert_eq!(format_volunteer_id("MT2025", 42), "MT2025042");
        assert_eq!(format_volunteer_id("TE2025", 1000), "TE20251000");
    }

    #[tokio::test]
    async fn test_sequence_is_scoped_by_prefix_and_year() {
        let db = setup_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let first = generate_volunteer_id(&db, "btech", 2, today).await.unwrap();
        assert_eq!(first, "BE2025001");
        seed_volunteer(&db, &first, "CSE", 2).await;

        let second = generate_volunteer_id(&db, "btech", 3, today).await.unwrap();
        assert_eq!(second, "BE2025002");
        seed_volunteer(&db, &second, "CSE", 3).await;

        // Other courses and other years keep their own counters
        let mtech = generate_volunteer_id(&db, "mtech", 1, today).await.unwrap();
        assert_eq!(mtech, "MT2025001");

        let next_year = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let later = generate_volunteer_id(&db, "btech", 1, next_year).await.unwrap();
        assert_eq!(later, "BE2026001");
    }

    #[tokio::test]
    async fn test_enrollment_year_does_not_affect_id() {
        let db = setup_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let id = generate_volunteer_id(&db, "btech", 4, today).await.unwrap();
        assert!(id.starts_with("BE2025"));
    }
}
