//! Cache key families and TTL tiers
//!
//! All keys are built here so invalidation and population always agree.

use std::time::Duration;

pub mod prefix {
    pub const PARKING_LOT: &str = "parking_lot";
    pub const PARKING_SPOTS: &str = "parking_spots";
    pub const USER: &str = "user";
    pub const BOOKING: &str = "booking";
    pub const AVAILABILITY: &str = "availability";
    pub const REPORTS: &str = "reports";
    pub const SENSORS: &str = "sensors";
}

pub mod ttl {
    use super::Duration;

    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(300);
    pub const LONG: Duration = Duration::from_secs(900);
    pub const HOUR: Duration = Duration::from_secs(3600);
    pub const DAY: Duration = Duration::from_secs(86_400);
}

pub fn parking_lot(id: &str) -> String {
    format!("{}:{id}", prefix::PARKING_LOT)
}

pub fn parking_lots_by_city(city: &str) -> String {
    format!("{}:city:{city}", prefix::PARKING_LOT)
}

pub fn parking_spots(lot_id: &str) -> String {
    format!("{}:lot:{lot_id}", prefix::PARKING_SPOTS)
}

pub fn availability(lot_id: &str) -> String {
    format!("{}:lot:{lot_id}", prefix::AVAILABILITY)
}

/// Derived availability views of one lot (per vehicle type and the like).
pub fn availability_pattern(lot_id: &str) -> String {
    format!("{}:lot:{lot_id}:*", prefix::AVAILABILITY)
}

pub fn user(id: &str) -> String {
    format!("{}:{id}", prefix::USER)
}

pub fn user_bookings(user_id: &str) -> String {
    format!("{}:user:{user_id}", prefix::BOOKING)
}

pub fn booking(id: &str) -> String {
    format!("{}:{id}", prefix::BOOKING)
}

pub fn reports(lot_id: &str) -> String {
    format!("{}:lot:{lot_id}", prefix::REPORTS)
}

pub fn sensor(id: &str) -> String {
    format!("{}:{id}", prefix::SENSORS)
}

/// Every key that describes the current occupancy of `lot_id`.
pub fn lot_occupancy_keys(lot_id: &str) -> Vec<String> {
    vec![availability(lot_id), parking_spots(lot_id)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::memory::glob_match;

    #[test]
    fn key_shapes() {
        assert_eq!(parking_lot("l1"), "parking_lot:l1");
        assert_eq!(parking_lots_by_city("Pune"), "parking_lot:city:Pune");
        assert_eq!(availability("l1"), "availability:lot:l1");
        assert_eq!(user_bookings("u1"), "booking:user:u1");
        assert_eq!(sensor("s1"), "sensors:s1");
    }

    #[test]
    fn availability_pattern_covers_derived_views_only() {
        let pattern = availability_pattern("l1");
        assert!(glob_match(&pattern, "availability:lot:l1:EV_CHARGING"));
        assert!(!glob_match(&pattern, &availability("l1")));
        assert!(!glob_match(&pattern, "availability:lot:l10:EV_CHARGING"));
    }
}
