//! Create parking_spots table
//!
//! `status` is the single source of truth for bookability; the booking
//! transaction flips it with a conditional update.

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_parking_lots::ParkingLots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSpots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::ParkingLotId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSpots::SpotNumber).string().not_null())
                    .col(
                        ColumnDef::new(ParkingSpots::VehicleType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::Status)
                            .string_len(20)
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_spots_lot")
                            .from(ParkingSpots::Table, ParkingSpots::ParkingLotId)
                            .to(ParkingLots::Table, ParkingLots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spots_lot_number")
                    .table(ParkingSpots::Table)
                    .col(ParkingSpots::ParkingLotId)
                    .col(ParkingSpots::SpotNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spots_lot_status")
                    .table(ParkingSpots::Table)
                    .col(ParkingSpots::ParkingLotId)
                    .col(ParkingSpots::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSpots {
    Table,
    Id,
    ParkingLotId,
    SpotNumber,
    VehicleType,
    Status,
    LastUpdated,
}
