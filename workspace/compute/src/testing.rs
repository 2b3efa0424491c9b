//! Database fixtures shared by the compute tests.

use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use model::entities::activity_attendance::AttendanceStatus;
use model::entities::individual_work::WorkType;
use model::entities::{activity, activity_attendance, individual_work, volunteer};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

pub async fn seed_volunteer(db: &DatabaseConnection, volunteer_id: &str, branch: &str, year: i32) -> volunteer::Model {
    volunteer::ActiveModel {
        volunteer_id: Set(volunteer_id.to_string()),
        roll: Set(format!("ROLL-{}", volunteer_id)),
        name: Set(format!("Volunteer {}", volunteer_id)),
        email: Set(format!("{}@example.com", volunteer_id.to_lowercase())),
        contact: Set(None),
        course: Set("btech".to_string()),
        year: Set(year),
        branch: Set(branch.to_string()),
        semester: Set(year * 2 - 1),
        password: Set("hash".to_string()),
        password_reset_token: Set(None),
        password_reset_expires: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed volunteer")
}

pub async fn seed_activity(db: &DatabaseConnection, code: &str, date: NaiveDate, hours: Decimal) -> activity::Model {
    activity::ActiveModel {
        activity_code: Set(code.to_string()),
        name: Set(format!("Activity {}", code)),
        description: Set(None),
        activity_date: Set(date),
        start_time: Set(None),
        end_time: Set(None),
        duration_hours: Set(hours),
        location: Set(None),
        category: Set(None),
        created_by: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed activity")
}

pub async fn seed_attendance(
    db: &DatabaseConnection,
    activity_id: i32,
    volunteer_id: &str,
    status: AttendanceStatus,
    date: NaiveDate,
) {
    activity_attendance::ActiveModel {
        activity_id: Set(activity_id),
        volunteer_id: Set(volunteer_id.to_string()),
        status: Set(status),
        date: Set(date),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed attendance");
}

pub async fn seed_work(
    db: &DatabaseConnection,
    volunteer_id: &str,
    work_type: WorkType,
    date: NaiveDate,
    hours: Decimal,
) {
    individual_work::ActiveModel {
        volunteer_id: Set(volunteer_id.to_string()),
        work_type: Set(work_type),
        work_date: Set(date),
        hours_spent: Set(hours),
        description: Set(None),
        assigned_by: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed work");
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
