use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A registered NSS volunteer.
///
/// `volunteer_id` is the public identifier (e.g. `BE2025001`) that attendance
/// and individual work rows refer to; `id` is only a surrogate key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "volunteers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub volunteer_id: String,
    #[sea_orm(unique)]
    pub roll: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub contact: Option<String>,
    pub course: String,
    pub year: i32,
    pub branch: String,
    pub semester: i32,
    /// PBKDF2 hash in `pbkdf2-sha256$iterations$salt$hash` form.
    pub password: String,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_attendance::Entity")]
    ActivityAttendance,
    #[sea_orm(has_many = "super::individual_work::Entity")]
    IndividualWork,
}

impl Related<super::activity_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityAttendance.def()
    }
}

impl Related<super::individual_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndividualWork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
