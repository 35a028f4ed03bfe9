//! Create challan table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Challan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Challan::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Challan::NumberPlate).string_len(32).not_null())
                    .col(ColumnDef::new(Challan::Description).text().not_null())
                    .col(ColumnDef::new(Challan::ImageUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(Challan::Location).json_binary().not_null().default("{}"))
                    .col(ColumnDef::new(Challan::ReportedBy).string_len(32))
                    .col(ColumnDef::new(Challan::ReporterName).string_len(256))
                    .col(ColumnDef::new(Challan::Tags).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Challan::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Challan::ReviewedBy).string_len(32))
                    .col(
                        ColumnDef::new(Challan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Challan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_challan_reported_by")
                            .from(Challan::Table, Challan::ReportedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_challan_reported_by")
                    .table(Challan::Table)
                    .col(Challan::ReportedBy)
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) for the filtered review queue
        manager
            .create_index(
                Index::create()
                    .name("idx_challan_status_created_at")
                    .table(Challan::Table)
                    .col(Challan::Status)
                    .col(Challan::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Challan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Challan {
    Table,
    Id,
    NumberPlate,
    Description,
    ImageUrl,
    Location,
    ReportedBy,
    ReporterName,
    Tags,
    Status,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
