//! Sensor DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{ParkingSpot, SensorUpdate, SpotStatus};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SensorReading {
    #[validate(length(min = 1, max = 64, message = "spot_id is required"))]
    pub spot_id: String,
    pub status: SpotStatus,
    #[validate(length(min = 1, max = 64, message = "sensor_id is required"))]
    pub sensor_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SensorBatchRequest {
    #[validate(
        length(min = 1, max = 500, message = "updates must hold 1–500 readings"),
        nested
    )]
    pub updates: Vec<SensorReading>,
}

impl SensorBatchRequest {
    pub fn into_updates(self) -> Vec<SensorUpdate> {
        self.updates
            .into_iter()
            .map(|r| SensorUpdate {
                spot_id: r.spot_id,
                status: r.status,
                sensor_id: r.sensor_id,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SensorBatchResponse {
    pub updated: usize,
    pub spots: Vec<ParkingSpot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_reading_inside_batch_fails_validation() {
        let batch: SensorBatchRequest = serde_json::from_value(json!({
            "updates": [
                { "spot_id": "s1", "status": "OCCUPIED", "sensor_id": "sensor-1" },
                { "spot_id": "", "status": "AVAILABLE", "sensor_id": "sensor-2" }
            ]
        }))
        .unwrap();

        let errors = batch.validate().unwrap_err();
        assert!(errors.errors().contains_key("updates"));
    }

    #[test]
    fn valid_batch_converts_to_updates() {
        let batch: SensorBatchRequest = serde_json::from_value(json!({
            "updates": [{ "spot_id": "s1", "status": "OCCUPIED", "sensor_id": "sensor-1" }]
        }))
        .unwrap();

        assert!(batch.validate().is_ok());
        let updates = batch.into_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, SpotStatus::Occupied);
    }
}
