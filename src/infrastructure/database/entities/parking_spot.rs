//! Parking spot entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_spots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub parking_lot_id: String,
    pub spot_number: String,
    /// TWO_WHEELER, FOUR_WHEELER, DISABLED, EV_CHARGING
    pub vehicle_type: String,
    /// AVAILABLE, OCCUPIED, RESERVED, MAINTENANCE
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_lot::Entity",
        from = "Column::ParkingLotId",
        to = "super::parking_lot::Column::Id"
    )]
    ParkingLot,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::sensor::Entity")]
    Sensors,
}

impl Related<super::parking_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingLot.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::ParkingSpot {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            parking_lot_id: m.parking_lot_id,
            spot_number: m.spot_number,
            vehicle_type: crate::domain::VehicleType::from_str(&m.vehicle_type),
            status: crate::domain::SpotStatus::from_str(&m.status),
            last_updated: m.last_updated,
        }
    }
}
