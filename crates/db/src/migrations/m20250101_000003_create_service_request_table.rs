//! Create service request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceRequest::RequesterId).string_len(32).not_null())
                    .col(ColumnDef::new(ServiceRequest::VehicleNumber).string_len(32).not_null())
                    .col(ColumnDef::new(ServiceRequest::ServiceType).string_len(128).not_null())
                    .col(ColumnDef::new(ServiceRequest::Description).text().not_null())
                    .col(ColumnDef::new(ServiceRequest::PreferredDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ServiceRequest::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ServiceRequest::ProviderId).string_len(32))
                    .col(ColumnDef::new(ServiceRequest::ScheduledFor).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ServiceRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ServiceRequest::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_requester")
                            .from(ServiceRequest::Table, ServiceRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_provider")
                            .from(ServiceRequest::Table, ServiceRequest::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_requester")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::RequesterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_provider")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::ProviderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceRequest {
    Table,
    Id,
    RequesterId,
    VehicleNumber,
    ServiceType,
    Description,
    PreferredDate,
    Status,
    ProviderId,
    ScheduledFor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
