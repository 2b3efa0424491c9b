use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create volunteers table
        manager
            .create_table(
                Table::create()
                    .table(Volunteers::Table)
                    .if_not_exists()
                    .col(pk_auto(Volunteers::Id))
                    .col(string(Volunteers::VolunteerId).string_len(20).unique_key())
                    .col(string(Volunteers::Roll).string_len(50).unique_key())
                    .col(string(Volunteers::Name))
                    .col(string(Volunteers::Email).unique_key())
                    .col(string_null(Volunteers::Contact).string_len(20))
                    .col(string(Volunteers::Course).string_len(50))
                    .col(integer(Volunteers::Year))
                    .col(string(Volunteers::Branch).string_len(100))
                    .col(integer(Volunteers::Semester))
                    .col(string(Volunteers::Password))
                    .col(string_null(Volunteers::PasswordResetToken).string_len(512))
                    .col(date_time_null(Volunteers::PasswordResetExpires))
                    .col(date_time(Volunteers::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Create admins table
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(pk_auto(Admins::Id))
                    .col(string(Admins::Name))
                    .col(string(Admins::Email).unique_key())
                    .col(string_null(Admins::Contact).string_len(20))
                    .col(string(Admins::Branch).string_len(100))
                    .col(string(Admins::Password))
                    .col(string(Admins::Role).string_len(20).default("admin"))
                    .col(date_time(Admins::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Create activities table
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(pk_auto(Activities::Id))
                    .col(string(Activities::ActivityCode).string_len(50).unique_key())
                    .col(string(Activities::Name))
                    .col(text_null(Activities::Description))
                    .col(date(Activities::ActivityDate))
                    .col(time_null(Activities::StartTime))
                    .col(time_null(Activities::EndTime))
                    .col(decimal(Activities::DurationHours).decimal_len(6, 2).default(0))
                    .col(string_null(Activities::Location))
                    .col(string_null(Activities::Category).string_len(100))
                    .col(integer_null(Activities::CreatedBy))
                    .col(date_time(Activities::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_created_by")
                            .from(Activities::Table, Activities::CreatedBy)
                            .to(Admins::Table, Admins::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create activity_attendance table
        manager
            .create_table(
                Table::create()
                    .table(ActivityAttendance::Table)
                    .if_not_exists()
                    .col(pk_auto(ActivityAttendance::Id))
                    .col(integer(ActivityAttendance::ActivityId))
                    .col(string(ActivityAttendance::VolunteerId).string_len(20))
                    .col(string(ActivityAttendance::Status).string_len(10))
                    .col(date(ActivityAttendance::Date))
                    .col(date_time(ActivityAttendance::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_attendance_activity")
                            .from(ActivityAttendance::Table, ActivityAttendance::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_attendance_volunteer")
                            .from(ActivityAttendance::Table, ActivityAttendance::VolunteerId)
                            .to(Volunteers::Table, Volunteers::VolunteerId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Attendance upserts conflict on this key
        manager
            .create_index(
                Index::create()
                    .name("uq_activity_attendance_activity_volunteer_date")
                    .table(ActivityAttendance::Table)
                    .col(ActivityAttendance::ActivityId)
                    .col(ActivityAttendance::VolunteerId)
                    .col(ActivityAttendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create individual_work table
        manager
            .create_table(
                Table::create()
                    .table(IndividualWork::Table)
                    .if_not_exists()
                    .col(pk_auto(IndividualWork::Id))
                    .col(string(IndividualWork::VolunteerId).string_len(20))
                    .col(string(IndividualWork::WorkType).string_len(20))
                    .col(date(IndividualWork::WorkDate))
                    .col(decimal(IndividualWork::HoursSpent).decimal_len(6, 2))
                    .col(text_null(IndividualWork::Description))
                    .col(integer_null(IndividualWork::AssignedBy))
                    .col(date_time(IndividualWork::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_individual_work_volunteer")
                            .from(IndividualWork::Table, IndividualWork::VolunteerId)
                            .to(Volunteers::Table, Volunteers::VolunteerId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_individual_work_assigned_by")
                            .from(IndividualWork::Table, IndividualWork::AssignedBy)
                            .to(Admins::Table, Admins::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IndividualWork::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ActivityAttendance::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Admins::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Volunteers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Volunteers {
    Table,
    Id,
    VolunteerId,
    Roll,
    Name,
    Email,
    Contact,
    Course,
    Year,
    Branch,
    Semester,
    Password,
    PasswordResetToken,
    PasswordResetExpires,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Admins {
    Table,
    Id,
    Name,
    Email,
    Contact,
    Branch,
    Password,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    ActivityCode,
    Name,
    Description,
    ActivityDate,
    StartTime,
    EndTime,
    DurationHours,
    Location,
    Category,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ActivityAttendance {
    Table,
    Id,
    ActivityId,
    VolunteerId,
    Status,
    Date,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IndividualWork {
    Table,
    Id,
    VolunteerId,
    WorkType,
    WorkDate,
    HoursSpent,
    Description,
    AssignedBy,
    CreatedAt,
}
