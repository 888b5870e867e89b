use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One attendance row per user per calendar day.
const INDEX_NAME: &str = "idx_attendance_user_work_date";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(INDEX_NAME)
                    .table(Attendance::Table)
                    .col(Attendance::UserId)
                    .col(Attendance::WorkDate)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(INDEX_NAME)
                    .table(Attendance::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Attendance {
    Table,
    UserId,
    WorkDate,
}
