use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use common::AttendanceSummary;
use model::entities::activity_attendance::{self, AttendanceStatus};
use model::entities::{activity, volunteer};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set};
use tracing::{debug, info, instrument, warn};

use crate::error::{ComputeError, Result};

/// Writes one attendance row, replacing the status if a row for the same
/// activity, volunteer and date already exists.
pub async fn upsert_attendance<C>(
    db: &C,
    activity_id: i32,
    volunteer_id: &str,
    status: AttendanceStatus,
    date: NaiveDate,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = activity_attendance::ActiveModel {
        activity_id: Set(activity_id),
        volunteer_id: Set(volunteer_id.to_string()),
        status: Set(status),
        date: Set(date),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    activity_attendance::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                activity_attendance::Column::ActivityId,
                activity_attendance::Column::VolunteerId,
                activity_attendance::Column::Date,
            ])
            .update_column(activity_attendance::Column::Status)
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Records attendance for a roster of volunteers.
///
/// Entries are written one at a time without a surrounding transaction.
/// Volunteers that do not exist and rows that fail to write are reported in
/// the summary instead of aborting the whole roster.
#[instrument(skip(db, roster), fields(roster_len = roster.len()))]
pub async fn mark_attendance<C>(
    db: &C,
    activity_id: i32,
    roster: &[(String, AttendanceStatus)],
    date: NaiveDate,
) -> Result<AttendanceSummary>
where
    C: ConnectionTrait,
{
    let exists = activity::Entity::find_by_id(activity_id).one(db).await?;
    if exists.is_none() {
        warn!(activity_id, "Activity not found while marking attendance");
        return Err(ComputeError::ActivityNotFound(activity_id));
    }

    let requested: Vec<&str> = roster.iter().map(|(id, _)| id.as_str()).collect();
    let known: HashSet<String> = volunteer::Entity::find()
        .select_only()
        .column(volunteer::Column::VolunteerId)
        .filter(volunteer::Column::VolunteerId.is_in(requested))
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut summary = AttendanceSummary::default();
    for (volunteer_id, status) in roster {
        if !known.contains(volunteer_id) {
            debug!(%volunteer_id, "Skipping unknown volunteer");
            summary.record_failure(volunteer_id.as_str(), "volunteer not found");
            continue;
        }

        match upsert_attendance(db, activity_id, volunteer_id, *status, date).await {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                warn!(%volunteer_id, error = %e, "Failed to record attendance");
                summary.record_failure(volunteer_id.as_str(), e.to_string());
            }
        }
    }

    info!(
        activity_id,
        %date,
        processed = summary.processed,
        failed = summary.failed.len(),
        "Attendance marked"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, seed_activity, seed_volunteer, setup_db};
    use rust_decimal::Decimal;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_repeated_marking_keeps_one_row_with_latest_status() {
        let db = setup_db().await;
        let day = date(2025, 9, 10);
        let activity = seed_activity(&db, "BLOOD-01", day, Decimal::new(3, 0)).await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;

        let present = vec![("BE2025001".to_string(), AttendanceStatus::Present)];
        let absent = vec![("BE2025001".to_string(), AttendanceStatus::Absent)];

        mark_attendance(&db, activity.id, &present, day).await.unwrap();
        mark_attendance(&db, activity.id, &present, day).await.unwrap();
        let summary = mark_attendance(&db, activity.id, &absent, day).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(summary.is_complete());

        let rows = activity_attendance::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
        assert_eq!(rows[0].date, day);
    }

    #[tokio::test]
    async fn test_different_dates_are_separate_rows() {
        let db = setup_db().await;
        let activity = seed_activity(&db, "CAMP-01", date(2025, 9, 10), Decimal::new(8, 0)).await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;

        let roster = vec![("BE2025001".to_string(), AttendanceStatus::Present)];
        mark_attendance(&db, activity.id, &roster, date(2025, 9, 10)).await.unwrap();
        mark_attendance(&db, activity.id, &roster, date(2025, 9, 11)).await.unwrap();

        let count = activity_attendance::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_unknown_volunteers_are_reported() {
        let db = setup_db().await;
        let day = date(2025, 9, 10);
        let activity = seed_activity(&db, "RALLY-01", day, Decimal::new(2, 0)).await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;

        let roster = vec![
            ("BE2025001".to_string(), AttendanceStatus::Present),
            ("BE2025999".to_string(), AttendanceStatus::Present),
        ];
        let summary = mark_attendance(&db, activity.id, &roster, day).await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].volunteer_id, "BE2025999");
    }

    #[tokio::test]
    async fn test_unknown_activity_is_an_error() {
        let db = setup_db().await;
        let roster = vec![("BE2025001".to_string(), AttendanceStatus::Present)];

        let result = mark_attendance(&db, 404, &roster, date(2025, 9, 10)).await;
        assert!(matches!(result, Err(ComputeError::ActivityNotFound(404))));
    }
}
