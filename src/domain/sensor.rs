//! IoT occupancy sensors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parking::SpotStatus;

/// Sensor hardware kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    Ultrasonic,
    Camera,
    Magnetic,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [Self::Ultrasonic, Self::Camera, Self::Magnetic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrasonic => "ULTRASONIC",
            Self::Camera => "CAMERA",
            Self::Magnetic => "MAGNETIC",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "CAMERA" => Self::Camera,
            "MAGNETIC" => Self::Magnetic,
            _ => Self::Ultrasonic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    pub parking_spot_id: String,
    pub sensor_type: SensorType,
    pub last_ping: DateTime<Utc>,
    /// Battery charge in percent
    pub battery_level: i32,
}

/// One state change reported by a sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorUpdate {
    pub spot_id: String,
    pub status: SpotStatus,
    pub sensor_id: String,
}
