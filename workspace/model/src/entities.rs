//! Root for all SeaORM entity modules of the NSS volunteer tracker.
//!
//! Attendance and individual work rows reference volunteers through the
//! public `volunteer_id` string rather than the surrogate key, so reports can
//! be joined without an extra lookup.

pub mod activity;
pub mod activity_attendance;
pub mod admin;
pub mod individual_work;
pub mod volunteer;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::activity::Entity as Activity;
    pub use super::activity_attendance::Entity as ActivityAttendance;
    pub use super::admin::Entity as Admin;
    pub use super::individual_work::Entity as IndividualWork;
    pub use super::volunteer::Entity as Volunteer;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
        ModelTrait, PaginatorTrait, QueryFilter, Set,
    };

    use super::activity_attendance::AttendanceStatus;
    use super::admin::AdminRole;
    use super::individual_work::WorkType;
    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_volunteer(db: &DatabaseConnection, volunteer_id: &str, roll: &str) -> Result<volunteer::Model, DbErr> {
        volunteer::ActiveModel {
            volunteer_id: Set(volunteer_id.to_string()),
            roll: Set(roll.to_string()),
            name: Set(format!("Volunteer {}", roll)),
            email: Set(format!("{}@example.com", roll)),
            contact: Set(None),
            course: Set("btech".to_string()),
            year: Set(2),
            branch: Set("CSE".to_string()),
            semester: Set(3),
            password: Set("hash".to_string()),
            password_reset_token: Set(None),
            password_reset_expires: Set(None),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let admin = admin::ActiveModel {
            name: Set("Coordinator".to_string()),
            email: Set("coord@example.com".to_string()),
            contact: Set(None),
            branch: Set("CSE".to_string()),
            password: Set("hash".to_string()),
            role: Set(AdminRole::SuperAdmin),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let volunteer = insert_volunteer(&db, "BE2025001", "R1").await?;

        let activity = activity::ActiveModel {
            activity_code: Set("TREE-01".to_string()),
            name: Set("Tree plantation".to_string()),
            description: Set(None),
            activity_date: Set(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            start_time: Set(None),
            end_time: Set(None),
            duration_hours: Set(Decimal::new(25, 1)),
            location: Set(Some("Campus".to_string())),
            category: Set(Some("environment".to_string())),
            created_by: Set(Some(admin.id)),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        activity_attendance::ActiveModel {
            activity_id: Set(activity.id),
            volunteer_id: Set(volunteer.volunteer_id.clone()),
            status: Set(AttendanceStatus::Present),
            date: Set(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        individual_work::ActiveModel {
            volunteer_id: Set(volunteer.volunteer_id.clone()),
            work_type: Set(WorkType::Design),
            work_date: Set(NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()),
            hours_spent: Set(Decimal::new(15, 1)),
            description: Set(Some("Poster".to_string())),
            assigned_by: Set(Some(admin.id)),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let attendance = volunteer.find_related(ActivityAttendance).all(&db).await?;
        assert_eq!(attendance.len(), 1);
        assert_eq!(attendance[0].status, AttendanceStatus::Present);

        let work = volunteer.find_related(IndividualWork).all(&db).await?;
        assert_eq!(work.len(), 1);
        assert_eq!(work[0].hours_spent, Decimal::new(15, 1));
        assert_eq!(work[0].work_type, WorkType::Design);

        let stored = Activity::find_by_id(activity.id).one(&db).await?.unwrap();
        assert_eq!(stored.duration_hours, Decimal::new(25, 1));

        // Removing the volunteer cascades to their attendance and work rows.
        Volunteer::delete_by_id(volunteer.id).exec(&db).await?;
        assert_eq!(ActivityAttendance::find().count(&db).await?, 0);
        assert_eq!(IndividualWork::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_volunteer_roll() -> Result<(), DbErr> {
        let db = setup_db().await?;

        insert_volunteer(&db, "BE2025001", "R1").await?;
        let duplicate = insert_volunteer(&db, "BE2025002", "R1").await;
        assert!(duplicate.is_err());

        let count = Volunteer::find()
            .filter(volunteer::Column::Roll.eq("R1"))
            .count(&db)
            .await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_attendance_key() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let volunteer = insert_volunteer(&db, "BE2025001", "R1").await?;

        let activity = activity::ActiveModel {
            activity_code: Set("CLEAN-01".to_string()),
            name: Set("Cleanliness drive".to_string()),
            description: Set(None),
            activity_date: Set(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
            start_time: Set(None),
            end_time: Set(None),
            duration_hours: Set(Decimal::new(2, 0)),
            location: Set(None),
            category: Set(None),
            created_by: Set(None),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let row = || activity_attendance::ActiveModel {
            activity_id: Set(activity.id),
            volunteer_id: Set(volunteer.volunteer_id.clone()),
            status: Set(AttendanceStatus::Absent),
            date: Set(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        row().insert(&db).await?;
        assert!(row().insert(&db).await.is_err());

        Ok(())
    }
}
