use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{activity, activity_attendance, individual_work, volunteer};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Department reports filter volunteers by course, branch and year
        manager
            .create_index(
                Index::create()
                    .name("idx_volunteers_course_branch_year")
                    .table(Volunteer::table())
                    .col(Volunteer::column(volunteer::Column::Course))
                    .col(Volunteer::column(volunteer::Column::Branch))
                    .col(Volunteer::column(volunteer::Column::Year))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_date")
                    .table(Activity::table())
                    .col(Activity::column(activity::Column::ActivityDate))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_volunteer_activity")
                    .table(ActivityAttendance::table())
                    .col(ActivityAttendance::column(activity_attendance::Column::VolunteerId))
                    .col(ActivityAttendance::column(activity_attendance::Column::ActivityId))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_volunteer_date")
                    .table(IndividualWork::table())
                    .col(IndividualWork::column(individual_work::Column::VolunteerId))
                    .col(IndividualWork::column(individual_work::Column::WorkDate))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_work_volunteer_date", IndividualWork::table()),
            ("idx_attendance_volunteer_activity", ActivityAttendance::table()),
            ("idx_activities_date", Activity::table()),
            ("idx_volunteers_course_branch_year", Volunteer::table()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}
