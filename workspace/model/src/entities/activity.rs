use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A scheduled event volunteers attend for credited hours.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub activity_code: String,
    pub name: String,
    pub description: Option<String>,
    pub activity_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Hours credited to every volunteer marked present.
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub duration_hours: Decimal,
    pub location: Option<String>,
    pub category: Option<String>,
    /// Admin who created the activity. Cleared if that admin is removed.
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::CreatedBy",
        to = "super::admin::Column::Id",
        on_delete = "SetNull"
    )]
    Admin,
    #[sea_orm(has_many = "super::activity_attendance::Entity")]
    ActivityAttendance,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl Related<super::activity_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityAttendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
