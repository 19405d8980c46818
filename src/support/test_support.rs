//! Fixtures shared by the crate's tests

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use crate::domain::{SensorType, SpotStatus, UserRole, VehicleType};
use crate::infrastructure::database::entities::{parking_lot, parking_spot, sensor, user};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::{init_database, DatabaseConfig};
use crate::infrastructure::database::{TransactionExecutor, TransactionOptions};

/// Migrated private in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Executor over a fresh database with a short backoff.
pub async fn test_executor() -> TransactionExecutor {
    let options = TransactionOptions::default().with_retry_delay(Duration::from_millis(5));
    TransactionExecutor::new(setup_db().await, options)
}

/// Migrated SQLite file under the temp dir, pooled over `max_connections`
/// connections so transactions really run side by side. The caller removes the
/// file through [`remove_db_file`].
pub async fn file_executor(max_connections: u32) -> (TransactionExecutor, PathBuf) {
    let path = std::env::temp_dir().join(format!("parkpulse-{}.db", uuid::Uuid::new_v4()));
    let config = DatabaseConfig {
        max_connections,
        ..DatabaseConfig::sqlite(&path.to_string_lossy())
    };
    let db = init_database(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let options = TransactionOptions::default()
        .with_max_retries(5)
        .with_retry_delay(Duration::from_millis(5));
    (TransactionExecutor::new(db, options), path)
}

pub async fn remove_db_file(executor: TransactionExecutor, path: PathBuf) {
    let _ = executor.connection().clone().close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

pub async fn insert_user(db: &DatabaseConnection, id: &str) -> user::Model {
    user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(format!("{id}@parkpulse.test")),
        name: Set(format!("User {id}")),
        phone: Set(None),
        role: Set(UserRole::User.as_str().to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_lot(db: &DatabaseConnection, id: &str, price_per_hour: f64) -> parking_lot::Model {
    let now = Utc::now();
    parking_lot::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Lot {id}")),
        address: Set("1 MG Road".to_string()),
        city: Set("Pune".to_string()),
        latitude: Set(18.52),
        longitude: Set(73.85),
        total_spots: Set(0),
        price_per_hour: Set(price_per_hour),
        owner_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_spot(
    db: &DatabaseConnection,
    lot_id: &str,
    id: &str,
    status: SpotStatus,
) -> parking_spot::Model {
    insert_typed_spot(db, lot_id, id, VehicleType::FourWheeler, status).await
}

pub async fn insert_typed_spot(
    db: &DatabaseConnection,
    lot_id: &str,
    id: &str,
    vehicle_type: VehicleType,
    status: SpotStatus,
) -> parking_spot::Model {
    parking_spot::ActiveModel {
        id: Set(id.to_string()),
        parking_lot_id: Set(lot_id.to_string()),
        spot_number: Set(format!("{}-{id}", vehicle_type.label_prefix())),
        vehicle_type: Set(vehicle_type.as_str().to_string()),
        status: Set(status.as_str().to_string()),
        last_updated: Set(Utc::now() - chrono::Duration::hours(1)),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_sensor(db: &DatabaseConnection, spot_id: &str, id: &str) -> sensor::Model {
    sensor::ActiveModel {
        id: Set(id.to_string()),
        parking_spot_id: Set(spot_id.to_string()),
        sensor_type: Set(SensorType::Ultrasonic.as_str().to_string()),
        last_ping: Set(Utc::now() - chrono::Duration::hours(1)),
        battery_level: Set(90),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn spot_status(db: &DatabaseConnection, id: &str) -> SpotStatus {
    let spot = parking_spot::Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .unwrap()
        .unwrap();
    SpotStatus::from_str(&spot.status)
}
