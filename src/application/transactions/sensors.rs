//! Sensor-driven spot updates
//!
//! A sensor batch is all-or-nothing: each update writes the spot status and
//! the sensor heartbeat, and a missing spot or sensor anywhere in the batch
//! rolls back every write before it.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::domain::{ParkingSpot, SensorUpdate};
use crate::infrastructure::database::entities::{parking_spot, sensor};
use crate::infrastructure::database::{TransactionError, TransactionExecutor};
use crate::support::{AppResult, DomainError};

/// Updates applied per chunk inside the batch transaction.
pub const SENSOR_CHUNK_SIZE: usize = 50;

/// Apply `updates` in one transaction and return the updated spots in input order.
pub async fn update_spots_from_sensors(
    executor: &TransactionExecutor,
    updates: Vec<SensorUpdate>,
) -> Result<Vec<ParkingSpot>, TransactionError> {
    if updates.is_empty() {
        return Ok(Vec::new());
    }
    let count = updates.len();

    let chunks = executor
        .batch_operation(
            updates,
            SENSOR_CHUNK_SIZE,
            executor.defaults(),
            |chunk, txn| Box::pin(apply_updates(txn, chunk)),
        )
        .await?;

    debug!(count, "Sensor updates applied");
    Ok(chunks.into_iter().flatten().collect())
}

async fn apply_updates(
    txn: &DatabaseTransaction,
    updates: &[SensorUpdate],
) -> AppResult<Vec<ParkingSpot>> {
    let now = Utc::now();
    let mut spots = Vec::with_capacity(updates.len());

    for update in updates {
        let spot = parking_spot::Entity::find_by_id(update.spot_id.clone())
            .one(txn)
            .await?
            .ok_or_else(|| DomainError::not_found("ParkingSpot", "id", &update.spot_id))?;

        let mut active: parking_spot::ActiveModel = spot.into();
        active.status = Set(update.status.as_str().to_string());
        active.last_updated = Set(now);
        let spot = active.update(txn).await?;

        let pinged = sensor::Entity::update_many()
            .col_expr(sensor::Column::LastPing, Expr::value(now))
            .filter(sensor::Column::Id.eq(update.sensor_id.as_str()))
            .exec(txn)
            .await?;
        if pinged.rows_affected == 0 {
            return Err(DomainError::not_found("Sensor", "id", &update.sensor_id).into());
        }

        spots.push(spot.into());
    }
    Ok(spots)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpotStatus;
    use crate::infrastructure::database::TransactionFailure;
    use crate::support::test_support::{
        insert_lot, insert_sensor, insert_spot, spot_status, test_executor,
    };

    fn update(spot_id: &str, status: SpotStatus, sensor_id: &str) -> SensorUpdate {
        SensorUpdate {
            spot_id: spot_id.to_string(),
            status,
            sensor_id: sensor_id.to_string(),
        }
    }

    async fn fixture(spots: usize) -> TransactionExecutor {
        let executor = test_executor().await;
        let db = executor.connection();
        insert_lot(db, "lot-1", 40.0).await;
        for i in 1..=spots {
            insert_spot(db, "lot-1", &format!("s{i}"), SpotStatus::Available).await;
            insert_sensor(db, &format!("s{i}"), &format!("sensor-{i}")).await;
        }
        executor
    }

    #[tokio::test]
    async fn batch_updates_every_spot_and_sensor() {
        let executor = fixture(3).await;
        let before = Utc::now();

        let spots = update_spots_from_sensors(
            &executor,
            vec![
                update("s1", SpotStatus::Occupied, "sensor-1"),
                update("s2", SpotStatus::Maintenance, "sensor-2"),
                update("s3", SpotStatus::Occupied, "sensor-3"),
            ],
        )
        .await
        .unwrap();

        let ids: Vec<_> = spots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
        let db = executor.connection();
        assert_eq!(spot_status(db, "s1").await, SpotStatus::Occupied);
        assert_eq!(spot_status(db, "s2").await, SpotStatus::Maintenance);

        let sensor = sensor::Entity::find_by_id("sensor-3".to_string())
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert!(sensor.last_ping >= before);
    }

    #[tokio::test]
    async fn missing_sensor_on_last_item_rolls_back_whole_batch() {
        let executor = fixture(3).await;

        let err = update_spots_from_sensors(
            &executor,
            vec![
                update("s1", SpotStatus::Occupied, "sensor-1"),
                update("s2", SpotStatus::Occupied, "sensor-2"),
                update("s3", SpotStatus::Occupied, "sensor-missing"),
            ],
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), TransactionFailure::Rejected);
        assert!(matches!(err.domain_error(), Some(DomainError::NotFound { entity: "Sensor", .. })));

        let db = executor.connection();
        for spot in ["s1", "s2", "s3"] {
            assert_eq!(spot_status(db, spot).await, SpotStatus::Available, "{spot}");
        }
        let sensor = sensor::Entity::find_by_id("sensor-1".to_string())
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert!(sensor.last_ping < Utc::now() - chrono::Duration::minutes(30));
    }

    #[tokio::test]
    async fn batches_larger_than_one_chunk_commit_together() {
        let executor = fixture(SENSOR_CHUNK_SIZE + 5).await;
        let updates: Vec<_> = (1..=SENSOR_CHUNK_SIZE + 5)
            .map(|i| update(&format!("s{i}"), SpotStatus::Occupied, &format!("sensor-{i}")))
            .collect();

        let spots = update_spots_from_sensors(&executor, updates).await.unwrap();

        assert_eq!(spots.len(), SENSOR_CHUNK_SIZE + 5);
        assert!(spots.iter().all(|s| s.status == SpotStatus::Occupied));
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let executor = fixture(0).await;
        assert!(update_spots_from_sensors(&executor, Vec::new())
            .await
            .unwrap()
            .is_empty());
    }
}
