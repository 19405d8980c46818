//! Demo data for local runs (`parkpulse --seed`)
//!
//! Users, parking lots across five cities, spots split by vehicle type with
//! randomized occupancy, one sensor per spot and a handful of crowd reports.
//! Skipped when any parking lot already exists.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::entities::{parking_lot, parking_spot, report, sensor, user};
use crate::domain::{ReportType, SensorType, SpotStatus, UserRole, VehicleType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: u64,
    pub parking_lots: u64,
    pub parking_spots: u64,
    pub sensors: u64,
    pub reports: u64,
}

struct LotSeed {
    name: &'static str,
    address: &'static str,
    city: &'static str,
    latitude: f64,
    longitude: f64,
    total_spots: i32,
    price_per_hour: f64,
}

const LOTS: &[LotSeed] = &[
    LotSeed { name: "Gateway of India Parking", address: "Apollo Bunder, Colaba", city: "Mumbai", latitude: 18.922, longitude: 72.8347, total_spots: 50, price_per_hour: 60.0 },
    LotSeed { name: "Bandra Kurla Complex Parking", address: "BKC, Bandra East", city: "Mumbai", latitude: 19.0596, longitude: 72.8656, total_spots: 120, price_per_hour: 80.0 },
    LotSeed { name: "Connaught Place Parking", address: "Inner Circle, Connaught Place", city: "Delhi", latitude: 28.6315, longitude: 77.2167, total_spots: 100, price_per_hour: 70.0 },
    LotSeed { name: "Saket Mall Parking", address: "Press Enclave Marg, Saket", city: "Delhi", latitude: 28.5288, longitude: 77.2190, total_spots: 80, price_per_hour: 60.0 },
    LotSeed { name: "MG Road Metro Parking", address: "Mahatma Gandhi Road", city: "Bengaluru", latitude: 12.9756, longitude: 77.6066, total_spots: 60, price_per_hour: 50.0 },
    LotSeed { name: "Koramangala Forum Parking", address: "Hosur Road, Koramangala", city: "Bengaluru", latitude: 12.9345, longitude: 77.6112, total_spots: 90, price_per_hour: 55.0 },
    LotSeed { name: "FC Road Parking", address: "Fergusson College Road, Shivajinagar", city: "Pune", latitude: 18.5236, longitude: 73.8414, total_spots: 40, price_per_hour: 30.0 },
    LotSeed { name: "Hinjewadi IT Park Parking", address: "Phase 1, Hinjewadi", city: "Pune", latitude: 18.5912, longitude: 73.7389, total_spots: 150, price_per_hour: 35.0 },
    LotSeed { name: "HITEC City Parking", address: "Madhapur, HITEC City", city: "Hyderabad", latitude: 17.4435, longitude: 78.3772, total_spots: 110, price_per_hour: 45.0 },
    LotSeed { name: "Charminar Parking", address: "Charminar Road, Ghansi Bazaar", city: "Hyderabad", latitude: 17.3616, longitude: 78.4747, total_spots: 45, price_per_hour: 25.0 },
];

/// Share of a lot per vehicle type, with the chance a seeded spot starts free.
/// EV charging takes whatever the other types leave over.
const SPOT_MIX: &[(VehicleType, f64, f64)] = &[
    (VehicleType::TwoWheeler, 0.40, 0.7),
    (VehicleType::FourWheeler, 0.50, 0.6),
    (VehicleType::Disabled, 0.05, 0.2),
];
const EV_FREE_CHANCE: f64 = 0.5;
const SAMPLE_REPORTS: usize = 20;

/// Insert demo data with a fresh entropy-seeded generator.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<Option<SeedSummary>, DbErr> {
    seed_with_rng(db, &mut StdRng::from_entropy()).await
}

/// Returns `None` when the database already holds parking lots.
pub async fn seed_with_rng(
    db: &DatabaseConnection,
    rng: &mut StdRng,
) -> Result<Option<SeedSummary>, DbErr> {
    if parking_lot::Entity::find().count(db).await? > 0 {
        info!("🌱 Parking lots already present, skipping seed");
        return Ok(None);
    }

    info!("🌱 Seeding demo data...");
    let now = Utc::now();
    let txn = db.begin().await?;

    let users = demo_users();
    let owner_ids: Vec<String> = users
        .iter()
        .filter(|u| u.role == UserRole::ParkingOwner)
        .map(|u| u.id.clone())
        .collect();
    let reporter_id = users
        .iter()
        .find(|u| u.role == UserRole::User)
        .map(|u| u.id.clone());
    let mut summary = SeedSummary {
        users: users.len() as u64,
        ..Default::default()
    };
    user::Entity::insert_many(users.into_iter().map(|u| user::ActiveModel {
        id: Set(u.id),
        email: Set(u.email.to_string()),
        name: Set(u.name.to_string()),
        phone: Set(Some(u.phone.to_string())),
        role: Set(u.role.as_str().to_string()),
        created_at: Set(now),
    }))
    .exec(&txn)
    .await?;

    let mut lot_ids = Vec::with_capacity(LOTS.len());
    for (i, seed) in LOTS.iter().enumerate() {
        let lot_id = Uuid::new_v4().to_string();
        parking_lot::Entity::insert(parking_lot::ActiveModel {
            id: Set(lot_id.clone()),
            name: Set(seed.name.to_string()),
            address: Set(seed.address.to_string()),
            city: Set(seed.city.to_string()),
            latitude: Set(seed.latitude),
            longitude: Set(seed.longitude),
            total_spots: Set(seed.total_spots),
            price_per_hour: Set(seed.price_per_hour),
            owner_id: Set(owner_ids.get(i % owner_ids.len().max(1)).cloned()),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .exec(&txn)
        .await?;

        let spots = lot_spots(seed.total_spots, rng);
        let sensors: Vec<sensor::ActiveModel> = spots
            .iter()
            .map(|spot| sensor::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                parking_spot_id: Set(spot.id.clone()),
                sensor_type: Set(SensorType::ALL[rng.gen_range(0..SensorType::ALL.len())]
                    .as_str()
                    .to_string()),
                last_ping: Set(now - Duration::seconds(rng.gen_range(0..3600))),
                battery_level: Set(rng.gen_range(60..=100)),
            })
            .collect();

        summary.parking_spots += spots.len() as u64;
        summary.sensors += sensors.len() as u64;
        if !spots.is_empty() {
            parking_spot::Entity::insert_many(spots.into_iter().map(|spot| {
                parking_spot::ActiveModel {
                    id: Set(spot.id),
                    parking_lot_id: Set(lot_id.clone()),
                    spot_number: Set(spot.spot_number),
                    vehicle_type: Set(spot.vehicle_type.as_str().to_string()),
                    status: Set(spot.status.as_str().to_string()),
                    last_updated: Set(now),
                }
            }))
            .exec(&txn)
            .await?;
            sensor::Entity::insert_many(sensors).exec(&txn).await?;
        }
        lot_ids.push((lot_id, seed.name));
        info!(lot = seed.name, city = seed.city, spots = seed.total_spots, "Lot seeded");
    }
    summary.parking_lots = lot_ids.len() as u64;

    if let Some(reporter_id) = reporter_id {
        let report_types = [
            ReportType::Availability,
            ReportType::Issue,
            ReportType::Pricing,
            ReportType::Amenity,
        ];
        let reports: Vec<report::ActiveModel> = (0..SAMPLE_REPORTS)
            .map(|_| {
                let (lot_id, lot_name) = &lot_ids[rng.gen_range(0..lot_ids.len())];
                let report_type = report_types[rng.gen_range(0..report_types.len())];
                report::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(reporter_id.clone()),
                    parking_lot_id: Set(lot_id.clone()),
                    report_type: Set(report_type.as_str().to_string()),
                    description: Set(format!(
                        "Sample {} report for {}",
                        report_type.as_str().to_lowercase(),
                        lot_name
                    )),
                    created_at: Set(now),
                }
            })
            .collect();
        summary.reports = reports.len() as u64;
        report::Entity::insert_many(reports).exec(&txn).await?;
    }

    txn.commit().await?;
    info!(
        users = summary.users,
        lots = summary.parking_lots,
        spots = summary.parking_spots,
        sensors = summary.sensors,
        reports = summary.reports,
        "🎉 Seeding complete"
    );
    Ok(Some(summary))
}

struct DemoUser {
    id: String,
    email: &'static str,
    name: &'static str,
    phone: &'static str,
    role: UserRole,
}

fn demo_users() -> Vec<DemoUser> {
    [
        ("admin@parkpulse.com", "Admin User", "+919876543210", UserRole::Admin),
        ("user@parkpulse.com", "Regular User", "+919876543211", UserRole::User),
        ("owner1@parkpulse.com", "Parking Owner 1", "+919876543212", UserRole::ParkingOwner),
        ("owner2@parkpulse.com", "Parking Owner 2", "+919876543213", UserRole::ParkingOwner),
    ]
    .into_iter()
    .map(|(email, name, phone, role)| DemoUser {
        id: Uuid::new_v4().to_string(),
        email,
        name,
        phone,
        role,
    })
    .collect()
}

struct SpotSeed {
    id: String,
    spot_number: String,
    vehicle_type: VehicleType,
    status: SpotStatus,
}

fn lot_spots(total: i32, rng: &mut StdRng) -> Vec<SpotSeed> {
    let total = total.max(0) as usize;
    let mut plan: Vec<(VehicleType, usize, f64)> = SPOT_MIX
        .iter()
        .map(|&(vt, share, free)| (vt, (total as f64 * share).floor() as usize, free))
        .collect();
    let assigned: usize = plan.iter().map(|(_, n, _)| n).sum();
    plan.push((VehicleType::EvCharging, total - assigned, EV_FREE_CHANCE));

    let mut spots = Vec::with_capacity(total);
    for (vehicle_type, count, free_chance) in plan {
        for n in 1..=count {
            let status = if rng.gen_bool(free_chance) {
                SpotStatus::Available
            } else {
                SpotStatus::Occupied
            };
            spots.push(SpotSeed {
                id: Uuid::new_v4().to_string(),
                spot_number: format!("{}-{}", vehicle_type.label_prefix(), n),
                vehicle_type,
                status,
            });
        }
    }
    spots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::test_support::setup_db;
    use sea_orm::{ColumnTrait, QueryFilter};

    #[tokio::test]
    async fn seeds_every_lot_with_its_spot_count() {
        let db = setup_db().await;

        let summary = seed_with_rng(&db, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap()
            .unwrap();

        let expected_spots: i32 = LOTS.iter().map(|l| l.total_spots).sum();
        assert_eq!(summary.parking_lots, LOTS.len() as u64);
        assert_eq!(summary.parking_spots, expected_spots as u64);
        assert_eq!(summary.sensors, summary.parking_spots);
        assert_eq!(summary.reports, SAMPLE_REPORTS as u64);
        assert_eq!(parking_spot::Entity::find().count(&db).await.unwrap(), expected_spots as u64);

        let low_battery = sensor::Entity::find()
            .filter(sensor::Column::BatteryLevel.lt(60))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(low_battery, 0);
    }

    #[tokio::test]
    async fn second_run_is_skipped() {
        let db = setup_db().await;
        seed_with_rng(&db, &mut StdRng::seed_from_u64(1)).await.unwrap();

        let again = seed_with_rng(&db, &mut StdRng::seed_from_u64(2)).await.unwrap();

        assert!(again.is_none());
        assert_eq!(parking_lot::Entity::find().count(&db).await.unwrap(), LOTS.len() as u64);
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 4);
    }

    #[test]
    fn spot_mix_fills_the_lot_with_ev_remainder() {
        let mut rng = StdRng::seed_from_u64(3);
        let spots = lot_spots(50, &mut rng);

        let count = |prefix: &str| {
            spots
                .iter()
                .filter(|s| s.spot_number.starts_with(prefix))
                .count()
        };
        assert_eq!(spots.len(), 50);
        assert_eq!(count("2W-"), 20);
        assert_eq!(count("4W-"), 25);
        assert_eq!(count("DIS-"), 2);
        assert_eq!(count("EV-"), 3);
    }
}
