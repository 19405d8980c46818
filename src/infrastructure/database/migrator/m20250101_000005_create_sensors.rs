//! Create sensors table

use sea_orm_migration::prelude::*;

use super::m20250101_000003_create_parking_spots::ParkingSpots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sensors::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Sensors::ParkingSpotId).string().not_null())
                    .col(ColumnDef::new(Sensors::SensorType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Sensors::LastPing)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sensors::BatteryLevel)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_spot")
                            .from(Sensors::Table, Sensors::ParkingSpotId)
                            .to(ParkingSpots::Table, ParkingSpots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensors_spot")
                    .table(Sensors::Table)
                    .col(Sensors::ParkingSpotId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Sensors {
    Table,
    Id,
    ParkingSpotId,
    SensorType,
    LastPing,
    BatteryLevel,
}
