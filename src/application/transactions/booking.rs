//! Booking transaction
//!
//! Reserves one spot and records the booking in the same store transaction.
//! Two guards keep concurrent bookings of one spot apart:
//!
//! 1. the spot row is read with `SELECT ... FOR UPDATE` where the backend
//!    supports row locks, so a second transaction waits for the first;
//! 2. the status flip is a conditional `UPDATE ... WHERE status = 'AVAILABLE'`,
//!    and zero affected rows means someone else got there first.
//!
//! A taken spot is a business rejection, never retried.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::domain::{BookingDetails, BookingStatus, NewBooking, ParkingSpot, SpotStatus};
use crate::infrastructure::database::entities::{booking, parking_lot, parking_spot, user};
use crate::infrastructure::database::{TransactionError, TransactionExecutor};
use crate::support::{AppResult, DomainError};

/// Reserve `input.spot_id` for `input.user_id`, with the executor's default options.
pub async fn create_booking_transaction(
    executor: &TransactionExecutor,
    input: NewBooking,
) -> Result<BookingDetails, TransactionError> {
    let input = Arc::new(input);

    let details = executor
        .execute(move |txn| {
            let input = Arc::clone(&input);
            Box::pin(async move { reserve_spot(txn, &input).await })
        })
        .await?;

    info!(
        booking_id = %details.booking.id,
        spot_id = %details.parking_spot.id,
        user_id = %details.user.id,
        "📅 Booking confirmed"
    );
    Ok(details)
}

async fn reserve_spot(txn: &DatabaseTransaction, input: &NewBooking) -> AppResult<BookingDetails> {
    input.validate()?;

    let user = user::Entity::find_by_id(input.user_id.clone())
        .one(txn)
        .await?
        .ok_or_else(|| DomainError::not_found("User", "id", &input.user_id))?;

    let spot = parking_spot::Entity::find_by_id(input.spot_id.clone())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| DomainError::not_found("ParkingSpot", "id", &input.spot_id))?;

    let status = SpotStatus::from_str(&spot.status);
    if !status.is_bookable() {
        return Err(spot_unavailable(&spot.id, status).into());
    }

    let now = Utc::now();
    let flipped = parking_spot::Entity::update_many()
        .col_expr(
            parking_spot::Column::Status,
            Expr::value(SpotStatus::Reserved.as_str()),
        )
        .col_expr(parking_spot::Column::LastUpdated, Expr::value(now))
        .filter(parking_spot::Column::Id.eq(spot.id.as_str()))
        .filter(parking_spot::Column::Status.eq(SpotStatus::Available.as_str()))
        .exec(txn)
        .await?;
    if flipped.rows_affected == 0 {
        return Err(spot_unavailable(&spot.id, SpotStatus::Reserved).into());
    }

    let lot = parking_lot::Entity::find_by_id(spot.parking_lot_id.clone())
        .one(txn)
        .await?
        .ok_or_else(|| DomainError::not_found("ParkingLot", "id", &spot.parking_lot_id))?;

    let booking = booking::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user.id.clone()),
        parking_spot_id: Set(spot.id.clone()),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        status: Set(BookingStatus::Confirmed.as_str().to_string()),
        total_price: Set(input.total_price),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    let mut parking_spot = ParkingSpot::from(spot);
    parking_spot.status = SpotStatus::Reserved;
    parking_spot.last_updated = now;

    Ok(BookingDetails {
        booking: booking.into(),
        parking_spot,
        parking_lot: lot.into(),
        user: user.into(),
    })
}

fn spot_unavailable(spot_id: &str, status: SpotStatus) -> DomainError {
    DomainError::Conflict(format!(
        "Parking spot {spot_id} is not available (status {status})"
    ))
}

// ── Tests ──────────────────────────────────────────────────────
