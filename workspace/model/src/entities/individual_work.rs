use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ad-hoc task assigned outside scheduled activities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    #[sea_orm(string_value = "design")]
    Design,
    #[sea_orm(string_value = "content")]
    Content,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "coordination")]
    Coordination,
    #[sea_orm(string_value = "documentation")]
    Documentation,
    #[sea_orm(string_value = "other")]
    Other,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Design => "design",
            WorkType::Content => "content",
            WorkType::Video => "video",
            WorkType::Coordination => "coordination",
            WorkType::Documentation => "documentation",
            WorkType::Other => "other",
        }
    }
}

/// Hours a volunteer spent on an individually assigned task.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "individual_work")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub volunteer_id: String,
    pub work_type: WorkType,
    pub work_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub hours_spent: Decimal,
    pub description: Option<String>,
    pub assigned_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::volunteer::Entity",
        from = "Column::VolunteerId",
        to = "super::volunteer::Column::VolunteerId",
        on_delete = "Cascade"
    )]
    Volunteer,
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AssignedBy",
        to = "super::admin::Column::Id",
        on_delete = "Cascade"
    )]
    Admin,
}

impl Related<super::volunteer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Volunteer.def()
    }
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
