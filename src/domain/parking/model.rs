//! Parking lot and parking spot domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatus {
    /// Free and bookable
    Available,
    /// A vehicle is parked (sensor or crowd report)
    Occupied,
    /// Held by a confirmed booking
    Reserved,
    /// Out of service
    Maintenance,
}

impl SpotStatus {
    pub const ALL: [SpotStatus; 4] = [
        Self::Available,
        Self::Occupied,
        Self::Reserved,
        Self::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::Reserved => "RESERVED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    /// Unknown values map to `Maintenance` so a corrupted row is never bookable.
    pub fn from_str(s: &str) -> Self {
        match s {
            "AVAILABLE" => Self::Available,
            "OCCUPIED" => Self::Occupied,
            "RESERVED" => Self::Reserved,
            _ => Self::Maintenance,
        }
    }

    pub fn is_bookable(&self) -> bool {
        *self == Self::Available
    }
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vehicle class a spot is sized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    TwoWheeler,
    FourWheeler,
    Disabled,
    EvCharging,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        Self::TwoWheeler,
        Self::FourWheeler,
        Self::Disabled,
        Self::EvCharging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "TWO_WHEELER",
            Self::FourWheeler => "FOUR_WHEELER",
            Self::Disabled => "DISABLED",
            Self::EvCharging => "EV_CHARGING",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "TWO_WHEELER" => Self::TwoWheeler,
            "DISABLED" => Self::Disabled,
            "EV_CHARGING" => Self::EvCharging,
            _ => Self::FourWheeler,
        }
    }

    /// Prefix used for human-readable spot labels (`2W-12`, `EV-3`).
    pub fn label_prefix(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "2W",
            Self::FourWheeler => "4W",
            Self::Disabled => "DIS",
            Self::EvCharging => "EV",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One physical parking space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: String,
    pub parking_lot_id: String,
    /// Human-readable label, e.g. `4W-17`
    pub spot_number: String,
    pub vehicle_type: VehicleType,
    pub status: SpotStatus,
    pub last_updated: DateTime<Utc>,
}

/// A parking facility owning many spots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spots: i32,
    /// Hourly rate in INR
    pub price_per_hour: f64,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-lot availability summary served from the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotAvailability {
    pub parking_lot_id: String,
    pub total: u64,
    pub available: u64,
    pub occupied: u64,
    pub reserved: u64,
    pub maintenance: u64,
    /// Available spots per vehicle type, keyed by `VehicleType::as_str()`
    pub available_by_type: std::collections::BTreeMap<String, u64>,
}

impl LotAvailability {
    pub fn empty(parking_lot_id: impl Into<String>) -> Self {
        Self {
            parking_lot_id: parking_lot_id.into(),
            ..Default::default()
        }
    }

    /// Fold one spot into the summary.
    pub fn record(&mut self, vehicle_type: VehicleType, status: SpotStatus) {
        self.total += 1;
        match status {
            SpotStatus::Available => {
                self.available += 1;
                *self
                    .available_by_type
                    .entry(vehicle_type.as_str().to_string())
                    .or_insert(0) += 1;
            }
            SpotStatus::Occupied => self.occupied += 1,
            SpotStatus::Reserved => self.reserved += 1,
            SpotStatus::Maintenance => self.maintenance += 1,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in SpotStatus::ALL {
            assert_eq!(SpotStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_is_not_bookable() {
        let s = SpotStatus::from_str("BROKEN");
        assert_eq!(s, SpotStatus::Maintenance);
        assert!(!s.is_bookable());
    }

    #[test]
    fn only_available_is_bookable() {
        assert!(SpotStatus::Available.is_bookable());
        assert!(!SpotStatus::Occupied.is_bookable());
        assert!(!SpotStatus::Reserved.is_bookable());
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_string(&SpotStatus::Reserved).unwrap();
        assert_eq!(json, "\"RESERVED\"");
        let vt: VehicleType = serde_json::from_str("\"EV_CHARGING\"").unwrap();
        assert_eq!(vt, VehicleType::EvCharging);
    }

    #[test]
    fn availability_counts_by_status_and_type() {
        let mut a = LotAvailability::empty("lot-1");
        a.record(VehicleType::TwoWheeler, SpotStatus::Available);
        a.record(VehicleType::TwoWheeler, SpotStatus::Available);
        a.record(VehicleType::FourWheeler, SpotStatus::Occupied);
        a.record(VehicleType::EvCharging, SpotStatus::Reserved);

        assert_eq!(a.total, 4);
        assert_eq!(a.available, 2);
        assert_eq!(a.occupied, 1);
        assert_eq!(a.reserved, 1);
        assert_eq!(a.available_by_type.get("TWO_WHEELER"), Some(&2));
        assert_eq!(a.available_by_type.get("FOUR_WHEELER"), None);
    }
}
