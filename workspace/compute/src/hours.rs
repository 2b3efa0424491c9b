use std::collections::{BTreeMap, HashMap};

use common::{ReportPeriod, VolunteerHours, VolunteerStatistics, WorkBreakdown};
use chrono::NaiveDate;
use model::entities::activity_attendance::{self, AttendanceStatus};
use model::entities::{activity, individual_work, volunteer};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};

/// Maximum number of volunteers on the camp eligibility list.
pub const CAMP_ELIGIBILITY_LIMIT: usize = 50;

/// Default size of the top performers list.
pub const DEFAULT_TOP_PERFORMERS: u64 = 3;

/// Restricts which volunteers and which records contribute to a report.
#[derive(Debug, Clone, Default)]
pub struct HoursFilter {
    /// Half-open date range `[start, end)` applied to attendance and work dates
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub year: Option<i32>,
    pub branch: Option<String>,
}

/// Orders rows by total hours, highest first. Ties fall back to the
/// volunteer ID so the order is stable across runs.
pub fn rank(rows: &mut [VolunteerHours]) {
    rows.sort_by(|a, b| {
        b.total_hours
            .cmp(&a.total_hours)
            .then_with(|| a.volunteer_id.cmp(&b.volunteer_id))
    });
}

/// A computer that sums attendance and individual work hours per volunteer.
///
/// Every volunteer matching the filter appears in the output, including
/// those with no recorded hours. Activity hours and work hours are summed
/// independently so one kind of record never multiplies the other.
#[derive(Debug, Default)]
pub struct HoursComputer;

impl HoursComputer {
    pub fn new() -> Self {
        Self
    }

    /// Computes ranked hours for all volunteers matching `filter`.
    #[instrument(skip(self, db))]
    pub async fn volunteer_hours<C>(&self, db: &C, filter: &HoursFilter) -> Result<Vec<VolunteerHours>>
    where
        C: ConnectionTrait,
    {
        let mut volunteer_condition = Condition::all();
        if let Some(year) = filter.year {
            volunteer_condition = volunteer_condition.add(volunteer::Column::Year.eq(year));
        }
        if let Some(branch) = &filter.branch {
            volunteer_condition = volunteer_condition.add(volunteer::Column::Branch.eq(branch.as_str()));
        }

        let volunteers = volunteer::Entity::find()
            .filter(volunteer_condition)
            .order_by_asc(volunteer::Column::VolunteerId)
            .all(db)
            .await?;
        debug!("Aggregating hours for {} volunteers", volunteers.len());

        let mut activity_hours: HashMap<String, Decimal> = HashMap::new();
        let mut attendance_query = activity_attendance::Entity::find()
            .filter(activity_attendance::Column::Status.eq(AttendanceStatus::Present));
        if let Some((start, end)) = filter.window {
            attendance_query = attendance_query
                .filter(activity_attendance::Column::Date.gte(start))
                .filter(activity_attendance::Column::Date.lt(end));
        }
        for (attendance, activity) in attendance_query
            .find_also_related(activity::Entity)
            .all(db)
            .await?
        {
            if let Some(activity) = activity {
                *activity_hours.entry(attendance.volunteer_id).or_insert(Decimal::ZERO) +=
                    activity.duration_hours;
            }
        }

        let mut work_hours: HashMap<String, Decimal> = HashMap::new();
        let mut work_query = individual_work::Entity::find();
        if let Some((start, end)) = filter.window {
            work_query = work_query
                .filter(individual_work::Column::WorkDate.gte(start))
                .filter(individual_work::Column::WorkDate.lt(end));
        }
        for work in work_query.all(db).await? {
            *work_hours.entry(work.volunteer_id).or_insert(Decimal::ZERO) += work.hours_spent;
        }

        let mut rows: Vec<VolunteerHours> = volunteers
            .into_iter()
            .map(|v| {
                let attended = activity_hours.get(&v.volunteer_id).copied().unwrap_or(Decimal::ZERO);
                let worked = work_hours.get(&v.volunteer_id).copied().unwrap_or(Decimal::ZERO);
                VolunteerHours::new(v.volunteer_id, v.name, v.year, v.branch, attended, worked)
            })
            .collect();

        rank(&mut rows);
        Ok(rows)
    }

    /// Volunteers with the most hours within one calendar month.
    #[instrument(skip(self, db))]
    pub async fn top_performers<C>(&self, db: &C, period: ReportPeriod, limit: u64) -> Result<Vec<VolunteerHours>>
    where
        C: ConnectionTrait,
    {
        let window = period.bounds().ok_or(ComputeError::InvalidPeriod {
            month: period.month,
            year: period.year,
        })?;

        let filter = HoursFilter {
            window: Some(window),
            ..Default::default()
        };
        let mut rows = self.volunteer_hours(db, &filter).await?;
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        info!(month = period.month, year = period.year, count = rows.len(), "Computed top performers");
        Ok(rows)
    }

    /// All-time hours, optionally restricted to one year of study and branch.
    #[instrument(skip(self, db))]
    pub async fn department_wise<C>(
        &self,
        db: &C,
        year: Option<i32>,
        department: Option<&str>,
    ) -> Result<Vec<VolunteerHours>>
    where
        C: ConnectionTrait,
    {
        let filter = HoursFilter {
            window: None,
            year,
            branch: department.map(str::to_string),
        };
        self.volunteer_hours(db, &filter).await
    }

    /// The volunteers with the most all-time hours, capped at
    /// [`CAMP_ELIGIBILITY_LIMIT`].
    #[instrument(skip(self, db))]
    pub async fn camp_eligibility<C>(&self, db: &C) -> Result<Vec<VolunteerHours>>
    where
        C: ConnectionTrait,
    {
        let mut rows = self.volunteer_hours(db, &HoursFilter::default()).await?;
        rows.truncate(CAMP_ELIGIBILITY_LIMIT);
        Ok(rows)
    }

    /// Lifetime totals for one volunteer with a per work type breakdown.
    #[instrument(skip(self, db))]
    pub async fn volunteer_statistics<C>(&self, db: &C, volunteer_id: &str) -> Result<VolunteerStatistics>
    where
        C: ConnectionTrait,
    {
        let volunteer = volunteer::Entity::find()
            .filter(volunteer::Column::VolunteerId.eq(volunteer_id))
            .one(db)
            .await?
            .ok_or_else(|| ComputeError::VolunteerNotFound(volunteer_id.to_string()))?;

        let attended = activity_attendance::Entity::find()
            .filter(activity_attendance::Column::VolunteerId.eq(volunteer_id))
            .filter(activity_attendance::Column::Status.eq(AttendanceStatus::Present))
            .find_also_related(activity::Entity)
            .all(db)
            .await?;

        let mut activity_hours = Decimal::ZERO;
        let mut activities_attended = 0u64;
        for activity in attended.into_iter().filter_map(|(_, activity)| activity) {
            activity_hours += activity.duration_hours;
            activities_attended += 1;
        }

        let work = individual_work::Entity::find()
            .filter(individual_work::Column::VolunteerId.eq(volunteer_id))
            .all(db)
            .await?;

        let mut work_hours = Decimal::ZERO;
        let mut work_breakdown: BTreeMap<String, WorkBreakdown> = BTreeMap::new();
        for entry in work {
            work_hours += entry.hours_spent;
            let slot = work_breakdown.entry(entry.work_type.as_str().to_string()).or_default();
            slot.hours += entry.hours_spent;
            slot.count += 1;
        }

        debug!(%activity_hours, %work_hours, activities_attended, "Computed volunteer statistics");

        Ok(VolunteerStatistics {
            volunteer_id: volunteer.volunteer_id,
            name: volunteer.name,
            activity_hours,
            work_hours,
            total_hours: activity_hours + work_hours,
            activities_attended,
            work_breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, seed_activity, seed_attendance, seed_volunteer, seed_work, setup_db};
    use model::entities::individual_work::WorkType;

    fn row(id: &str, activity: i64, work: i64) -> VolunteerHours {
        VolunteerHours::new(id, id, 1, "CSE", Decimal::new(activity, 0), Decimal::new(work, 0))
    }

    #[test]
    fn test_rank_orders_by_total_then_id() {
        let mut rows = vec![row("C", 1, 1), row("B", 4, 0), row("A", 0, 2), row("D", 0, 0)];
        rank(&mut rows);

        let ids: Vec<&str> = rows.iter().map(|r| r.volunteer_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C", "D"]);
    }

    #[tokio::test]
    async fn test_statistics_example() {
        let db = setup_db().await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;

        for (i, day) in [1, 8, 15].into_iter().enumerate() {
            let activity = seed_activity(&db, &format!("ACT-{}", i), date(2025, 7, day), Decimal::new(2, 0)).await;
            seed_attendance(&db, activity.id, "BE2025001", AttendanceStatus::Present, date(2025, 7, day)).await;
        }
        let skipped = seed_activity(&db, "ACT-ABSENT", date(2025, 7, 20), Decimal::new(5, 0)).await;
        seed_attendance(&db, skipped.id, "BE2025001", AttendanceStatus::Absent, date(2025, 7, 20)).await;
        seed_work(&db, "BE2025001", WorkType::Design, date(2025, 7, 3), Decimal::new(15, 1)).await;

        let stats = HoursComputer::new()
            .volunteer_statistics(&db, "BE2025001")
            .await
            .unwrap();

        assert_eq!(stats.activity_hours, Decimal::new(6, 0));
        assert_eq!(stats.work_hours, Decimal::new(15, 1));
        assert_eq!(stats.total_hours, Decimal::new(75, 1));
        assert_eq!(stats.activities_attended, 3);
        assert_eq!(stats.work_breakdown["design"].count, 1);
        assert_eq!(stats.work_breakdown["design"].hours, Decimal::new(15, 1));
    }

    #[tokio::test]
    async fn test_statistics_for_unknown_volunteer() {
        let db = setup_db().await;
        let result = HoursComputer::new().volunteer_statistics(&db, "BE2025404").await;
        assert!(matches!(result, Err(ComputeError::VolunteerNotFound(_))));
    }

    #[tokio::test]
    async fn test_hours_are_not_multiplied_across_record_kinds() {
        let db = setup_db().await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;

        let a = seed_activity(&db, "A", date(2025, 7, 1), Decimal::new(2, 0)).await;
        let b = seed_activity(&db, "B", date(2025, 7, 2), Decimal::new(3, 0)).await;
        seed_attendance(&db, a.id, "BE2025001", AttendanceStatus::Present, date(2025, 7, 1)).await;
        seed_attendance(&db, b.id, "BE2025001", AttendanceStatus::Present, date(2025, 7, 2)).await;
        seed_work(&db, "BE2025001", WorkType::Video, date(2025, 7, 3), Decimal::new(1, 0)).await;
        seed_work(&db, "BE2025001", WorkType::Content, date(2025, 7, 4), Decimal::new(4, 0)).await;

        let rows = HoursComputer::new().camp_eligibility(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity_hours, Decimal::new(5, 0));
        assert_eq!(rows[0].work_hours, Decimal::new(5, 0));
        assert_eq!(rows[0].total_hours, Decimal::new(10, 0));
    }

    #[tokio::test]
    async fn test_top_performers_window_and_limit() {
        let db = setup_db().await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;
        seed_volunteer(&db, "BE2025002", "ECE", 3).await;
        seed_volunteer(&db, "BE2025003", "ME", 1).await;

        let july = seed_activity(&db, "JULY", date(2025, 7, 10), Decimal::new(4, 0)).await;
        let june = seed_activity(&db, "JUNE", date(2025, 6, 10), Decimal::new(9, 0)).await;
        seed_attendance(&db, july.id, "BE2025002", AttendanceStatus::Present, date(2025, 7, 10)).await;
        seed_attendance(&db, june.id, "BE2025003", AttendanceStatus::Present, date(2025, 6, 10)).await;
        seed_work(&db, "BE2025001", WorkType::Other, date(2025, 7, 31), Decimal::new(2, 0)).await;
        seed_work(&db, "BE2025003", WorkType::Other, date(2025, 8, 1), Decimal::new(7, 0)).await;

        let period = ReportPeriod { month: 7, year: 2025 };
        let rows = HoursComputer::new().top_performers(&db, period, 2).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].volunteer_id, "BE2025002");
        assert_eq!(rows[0].total_hours, Decimal::new(4, 0));
        assert_eq!(rows[1].volunteer_id, "BE2025001");
        assert_eq!(rows[1].total_hours, Decimal::new(2, 0));
    }

    #[tokio::test]
    async fn test_top_performers_rejects_invalid_month() {
        let db = setup_db().await;
        let period = ReportPeriod { month: 13, year: 2025 };
        let result = HoursComputer::new().top_performers(&db, period, 3).await;
        assert!(matches!(result, Err(ComputeError::InvalidPeriod { month: 13, .. })));
    }

    #[tokio::test]
    async fn test_department_filters_and_zero_hour_rows() {
        let db = setup_db().await;
        seed_volunteer(&db, "BE2025001", "CSE", 2).await;
        seed_volunteer(&db, "BE2025002", "CSE", 3).await;
        seed_volunteer(&db, "BE2025003", "ECE", 2).await;
        seed_work(&db, "BE2025002", WorkType::Documentation, date(2025, 5, 1), Decimal::new(3, 0)).await;

        let computer = HoursComputer::new();

        let cse = computer.department_wise(&db, None, Some("CSE")).await.unwrap();
        let ids: Vec<&str> = cse.iter().map(|r| r.volunteer_id.as_str()).collect();
        assert_eq!(ids, vec!["BE2025002", "BE2025001"]);
        assert_eq!(cse[1].total_hours, Decimal::ZERO);

        let second_years = computer.department_wise(&db, Some(2), None).await.unwrap();
        assert_eq!(second_years.len(), 2);

        let both = computer.department_wise(&db, Some(2), Some("ECE")).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].volunteer_id, "BE2025003");

        for r in cse.iter().chain(second_years.iter()) {
            assert_eq!(r.total_hours, r.activity_hours + r.work_hours);
            assert!(r.activity_hours >= Decimal::ZERO && r.work_hours >= Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_camp_eligibility_is_capped() {
        let db = setup_db().await;
        for i in 1..=(CAMP_ELIGIBILITY_LIMIT + 5) {
            seed_volunteer(&db, &format!("BE2025{:03}", i), "CSE", 1).await;
        }
        seed_work(&db, "BE2025055", WorkType::Coordination, date(2025, 1, 1), Decimal::new(1, 0)).await;

        let rows = HoursComputer::new().camp_eligibility(&db).await.unwrap();
        assert_eq!(rows.len(), CAMP_ELIGIBILITY_LIMIT);
        assert_eq!(rows[0].volunteer_id, "BE2025055");
    }
}
