//! Parking service
//!
//! Entry point of the route layer: runs the booking core transactions and
//! keeps the cache consistent with what they changed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use thiserror::Error;
use tracing::debug;

use crate::application::transactions::{
    create_booking_transaction, create_report_transaction, update_spots_from_sensors,
};
use crate::domain::booking::{quote_price, validate_window};
use crate::domain::{
    BookingDetails, LotAvailability, NewBooking, NewReport, ParkingLot, ParkingSpot,
    ReportOutcome, ReportPolicy, SensorUpdate, SpotStatus, VehicleType,
};
use crate::infrastructure::cache::{keys, Cache};
use crate::infrastructure::database::entities::{parking_lot, parking_spot};
use crate::infrastructure::database::{TransactionError, TransactionExecutor};
use crate::support::{AppError, DomainError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        Self::App(e.into())
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::App(e.into())
    }
}

/// Booking request as received from a client; the price is quoted here.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: String,
    pub spot_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ParkingService {
    executor: TransactionExecutor,
    cache: Cache,
    report_policy: ReportPolicy,
}

impl ParkingService {
    pub fn new(executor: TransactionExecutor, cache: Cache, report_policy: ReportPolicy) -> Self {
        Self {
            executor,
            cache,
            report_policy,
        }
    }

    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Quote and book a spot, then drop the lot's occupancy views.
    pub async fn book_spot(&self, request: BookingRequest) -> Result<BookingDetails, ServiceError> {
        validate_window(request.start_time, request.end_time)?;

        let spot = parking_spot::Entity::find_by_id(request.spot_id.clone())
            .one(self.executor.connection())
            .await?
            .ok_or_else(|| DomainError::not_found("ParkingSpot", "id", &request.spot_id))?;
        let lot = self.parking_lot(&spot.parking_lot_id).await?;
        let total_price = quote_price(lot.price_per_hour, request.start_time, request.end_time);

        let details = create_booking_transaction(
            &self.executor,
            NewBooking {
                spot_id: request.spot_id,
                user_id: request.user_id,
                start_time: request.start_time,
                end_time: request.end_time,
                total_price,
            },
        )
        .await?;

        self.invalidate_lot(&lot.id).await;
        self.cache
            .invalidate(&[keys::user_bookings(&details.user.id)])
            .await;
        Ok(details)
    }

    pub async fn apply_sensor_updates(
        &self,
        updates: Vec<SensorUpdate>,
    ) -> Result<Vec<ParkingSpot>, ServiceError> {
        let spots = update_spots_from_sensors(&self.executor, updates).await?;

        let lots: BTreeSet<&str> = spots.iter().map(|s| s.parking_lot_id.as_str()).collect();
        for lot_id in lots {
            self.invalidate_lot(lot_id).await;
        }
        Ok(spots)
    }

    pub async fn submit_report(&self, input: NewReport) -> Result<ReportOutcome, ServiceError> {
        let outcome = create_report_transaction(&self.executor, input, self.report_policy).await?;

        let lot_id = outcome.report.parking_lot_id.as_str();
        self.cache.invalidate(&[keys::reports(lot_id)]).await;
        if !outcome.occupied_spot_ids.is_empty() {
            self.invalidate_lot(lot_id).await;
        }
        Ok(outcome)
    }

    /// Spot counts of a lot, served from the cache for up to a minute.
    pub async fn lot_availability(&self, lot_id: &str) -> Result<LotAvailability, ServiceError> {
        self.cache
            .get_or_set(
                &keys::availability(lot_id),
                || self.compute_availability(lot_id),
                keys::ttl::SHORT,
            )
            .await
    }

    async fn compute_availability(&self, lot_id: &str) -> Result<LotAvailability, ServiceError> {
        // Not-found check goes through the lot cache.
        self.parking_lot(lot_id).await?;

        let spots = parking_spot::Entity::find()
            .filter(parking_spot::Column::ParkingLotId.eq(lot_id))
            .all(self.executor.connection())
            .await?;

        let mut summary = LotAvailability::empty(lot_id);
        for spot in &spots {
            summary.record(
                VehicleType::from_str(&spot.vehicle_type),
                SpotStatus::from_str(&spot.status),
            );
        }
        debug!(lot_id, total = summary.total, available = summary.available, "Availability computed");
        Ok(summary)
    }

    /// Lot metadata rarely changes; cached for the long tier.
    pub async fn parking_lot(&self, lot_id: &str) -> Result<ParkingLot, ServiceError> {
        self.cache
            .get_or_set(
                &keys::parking_lot(lot_id),
                || async {
                    let lot = parking_lot::Entity::find_by_id(lot_id.to_string())
                        .one(self.executor.connection())
                        .await?
                        .ok_or_else(|| DomainError::not_found("ParkingLot", "id", lot_id))?;
                    Ok::<_, ServiceError>(ParkingLot::from(lot))
                },
                keys::ttl::LONG,
            )
            .await
    }

    async fn invalidate_lot(&self, lot_id: &str) {
        self.cache.invalidate(&keys::lot_occupancy_keys(lot_id)).await;
        self.cache.delete_pattern(&keys::availability_pattern(lot_id)).await;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, ReportType};
    use crate::infrastructure::cache::MemoryBackend;
    use crate::infrastructure::database::TransactionFailure;
    use crate::support::test_support::{
        insert_lot, insert_sensor, insert_spot, insert_typed_spot, insert_user, test_executor,
    };
    use crate::support::ShutdownSignal;
    use chrono::Duration;
    use std::sync::Arc;

    async fn service() -> ParkingService {
        let executor = test_executor().await;
        let db = executor.connection();
        insert_user(db, "u1").await;
        insert_lot(db, "lot-1", 50.0).await;
        insert_spot(db, "lot-1", "s1", SpotStatus::Available).await;
        insert_typed_spot(db, "lot-1", "ev1", VehicleType::EvCharging, SpotStatus::Available).await;
        insert_sensor(db, "s1", "sensor-1").await;

        let cache = Cache::new(Arc::new(MemoryBackend::new()), ShutdownSignal::new());
        ParkingService::new(executor, cache, ReportPolicy::default())
    }

    async fn wait_until_cached(service: &ParkingService, key: &str) {
        for _ in 0..100 {
            if service.cache().exists(key).await {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("{key} was never cached");
    }

    fn request(hours: i64) -> BookingRequest {
        let start_time = Utc::now() + Duration::hours(2);
        BookingRequest {
            user_id: "u1".into(),
            spot_id: "s1".into(),
            start_time,
            end_time: start_time + Duration::hours(hours),
        }
    }

    #[tokio::test]
    async fn booking_is_priced_from_lot_rate() {
        let service = service().await;

        let details = service.book_spot(request(4)).await.unwrap();

        assert_eq!(details.booking.total_price, 200.0);
        assert_eq!(details.booking.status, BookingStatus::Confirmed);
        assert_eq!(details.parking_spot.status, SpotStatus::Reserved);
    }

    #[tokio::test]
    async fn overlong_window_is_rejected_up_front() {
        let service = service().await;

        let err = service.book_spot(request(73)).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::App(AppError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn booking_invalidates_cached_availability() {
        let service = service().await;
        let key = keys::availability("lot-1");

        let before = service.lot_availability("lot-1").await.unwrap();
        assert_eq!(before.available, 2);
        assert_eq!(before.available_by_type.get("EV_CHARGING"), Some(&1));
        wait_until_cached(&service, &key).await;

        service.book_spot(request(1)).await.unwrap();
        assert!(!service.cache().exists(&key).await);

        let after = service.lot_availability("lot-1").await.unwrap();
        assert_eq!(after.available, 1);
        assert_eq!(after.reserved, 1);
    }

    #[tokio::test]
    async fn second_booking_maps_to_rejection() {
        let service = service().await;
        service.book_spot(request(1)).await.unwrap();

        let err = service.book_spot(request(1)).await.unwrap_err();
        match err {
            ServiceError::Transaction(e) => assert_eq!(e.kind(), TransactionFailure::Rejected),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn sensor_updates_invalidate_the_lot() {
        let service = service().await;
        let key = keys::availability("lot-1");
        service.lot_availability("lot-1").await.unwrap();
        wait_until_cached(&service, &key).await;

        let spots = service
            .apply_sensor_updates(vec![SensorUpdate {
                spot_id: "s1".into(),
                status: SpotStatus::Occupied,
                sensor_id: "sensor-1".into(),
            }])
            .await
            .unwrap();

        assert_eq!(spots[0].status, SpotStatus::Occupied);
        assert!(!service.cache().exists(&key).await);
        assert_eq!(service.lot_availability("lot-1").await.unwrap().occupied, 1);
    }

    #[tokio::test]
    async fn availability_report_updates_counts() {
        let service = service().await;

        let outcome = service
            .submit_report(NewReport {
                user_id: "u1".into(),
                parking_lot_id: "lot-1".into(),
                report_type: ReportType::Availability,
                description: "Every spot on level two is taken".into(),
                update_spot_status: true,
            })
            .await
            .unwrap();

        assert_eq!(outcome.occupied_spot_ids.len(), 2);
        let summary = service.lot_availability("lot-1").await.unwrap();
        assert_eq!(summary.available, 0);
        assert_eq!(summary.occupied, 2);
    }

    #[tokio::test]
    async fn availability_of_unknown_lot_is_not_found_and_not_cached() {
        let service = service().await;

        let err = service.lot_availability("nope").await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::App(AppError::Domain(DomainError::NotFound { .. }))
        ));
        assert!(!service.cache().exists(&keys::availability("nope")).await);
    }
}
