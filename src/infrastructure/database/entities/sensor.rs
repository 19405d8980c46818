//! Sensor entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sensors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub parking_spot_id: String,
    pub sensor_type: String,
    pub last_ping: DateTime<Utc>,
    pub battery_level: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_spot::Entity",
        from = "Column::ParkingSpotId",
        to = "super::parking_spot::Column::Id"
    )]
    ParkingSpot,
}

impl Related<super::parking_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Sensor {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            parking_spot_id: m.parking_spot_id,
            sensor_type: crate::domain::SensorType::from_str(&m.sensor_type),
            last_ping: m.last_ping,
            battery_level: m.battery_level,
        }
    }
}
