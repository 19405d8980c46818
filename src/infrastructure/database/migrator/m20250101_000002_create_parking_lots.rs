//! Create parking_lots table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingLots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingLots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingLots::Name).string().not_null())
                    .col(ColumnDef::new(ParkingLots::Address).string().not_null())
                    .col(ColumnDef::new(ParkingLots::City).string().not_null())
                    .col(ColumnDef::new(ParkingLots::Latitude).double().not_null())
                    .col(ColumnDef::new(ParkingLots::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(ParkingLots::TotalSpots)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ParkingLots::PricePerHour).double().not_null())
                    .col(ColumnDef::new(ParkingLots::OwnerId).string())
                    .col(
                        ColumnDef::new(ParkingLots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_lots_owner")
                            .from(ParkingLots::Table, ParkingLots::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_lots_city")
                    .table(ParkingLots::Table)
                    .col(ParkingLots::City)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingLots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingLots {
    Table,
    Id,
    Name,
    Address,
    City,
    Latitude,
    Longitude,
    TotalSpots,
    PricePerHour,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}
