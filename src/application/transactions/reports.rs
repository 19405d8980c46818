//! Crowd report transaction
//!
//! Every report is stored. A flagged availability report also flips up to
//! `bulk_update_limit` available spots of the lot to occupied. Which spots
//! get flipped is an arbitrary bounded sample: the report says "fuller than
//! shown", not which spots are taken, so this is a rough correction only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::domain::{NewReport, ReportOutcome, ReportPolicy, SpotStatus};
use crate::infrastructure::database::entities::{parking_lot, parking_spot, report, user};
use crate::infrastructure::database::{TransactionError, TransactionExecutor};
use crate::support::{AppResult, DomainError};

pub async fn create_report_transaction(
    executor: &TransactionExecutor,
    input: NewReport,
    policy: ReportPolicy,
) -> Result<ReportOutcome, TransactionError> {
    let input = Arc::new(input);

    let outcome = executor
        .execute(move |txn| {
            let input = Arc::clone(&input);
            Box::pin(async move { record_report(txn, &input, policy).await })
        })
        .await?;

    info!(
        report_id = %outcome.report.id,
        lot_id = %outcome.report.parking_lot_id,
        report_type = outcome.report.report_type.as_str(),
        occupied = outcome.occupied_spot_ids.len(),
        "📝 Report recorded"
    );
    Ok(outcome)
}

async fn record_report(
    txn: &DatabaseTransaction,
    input: &NewReport,
    policy: ReportPolicy,
) -> AppResult<ReportOutcome> {
    if user::Entity::find_by_id(input.user_id.clone()).one(txn).await?.is_none() {
        return Err(DomainError::not_found("User", "id", &input.user_id).into());
    }
    if parking_lot::Entity::find_by_id(input.parking_lot_id.clone())
        .one(txn)
        .await?
        .is_none()
    {
        return Err(DomainError::not_found("ParkingLot", "id", &input.parking_lot_id).into());
    }

    let now = Utc::now();
    let report = report::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(input.user_id.clone()),
        parking_lot_id: Set(input.parking_lot_id.clone()),
        report_type: Set(input.report_type.as_str().to_string()),
        description: Set(input.description.clone()),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    let mut occupied_spot_ids = Vec::new();
    if input.triggers_spot_update() && policy.bulk_update_limit > 0 {
        let candidates = parking_spot::Entity::find()
            .select_only()
            .column(parking_spot::Column::Id)
            .filter(parking_spot::Column::ParkingLotId.eq(input.parking_lot_id.as_str()))
            .filter(parking_spot::Column::Status.eq(SpotStatus::Available.as_str()))
            .limit(policy.bulk_update_limit)
            .into_tuple::<String>()
            .all(txn)
            .await?;

        occupied_spot_ids = occupy_if_available(txn, candidates, now).await?;
    }

    Ok(ReportOutcome {
        report: report.into(),
        occupied_spot_ids,
    })
}

/// Flip each candidate to occupied only while it is still available. A spot
/// booked between the sample read and this write keeps its status and is left
/// out of the returned ids.
async fn occupy_if_available(
    txn: &DatabaseTransaction,
    candidates: Vec<String>,
    now: DateTime<Utc>,
) -> Result<Vec<String>, DbErr> {
    let mut occupied = Vec::with_capacity(candidates.len());
    for spot_id in candidates {
        let result = parking_spot::Entity::update_many()
            .col_expr(
                parking_spot::Column::Status,
                Expr::value(SpotStatus::Occupied.as_str()),
            )
            .col_expr(parking_spot::Column::LastUpdated, Expr::value(now))
            .filter(parking_spot::Column::Id.eq(spot_id.as_str()))
            .filter(parking_spot::Column::Status.eq(SpotStatus::Available.as_str()))
            .exec(txn)
            .await?;
        if result.rows_affected == 1 {
            occupied.push(spot_id);
        }
    }
    Ok(occupied)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportType;
    use crate::support::test_support::{
        insert_lot, insert_spot, insert_user, spot_status, test_executor,
    };
    use sea_orm::{PaginatorTrait, TransactionTrait};

    fn new_report(report_type: ReportType, update_spot_status: bool) -> NewReport {
        NewReport {
            user_id: "u1".into(),
            parking_lot_id: "lot-1".into(),
            report_type,
            description: "Lot is much fuller than the app shows".into(),
            update_spot_status,
        }
    }

    async fn fixture(available: usize) -> TransactionExecutor {
        let executor = test_executor().await;
        let db = executor.connection();
        insert_user(db, "u1").await;
        insert_lot(db, "lot-1", 30.0).await;
        insert_lot(db, "lot-2", 30.0).await;
        for i in 1..=available {
            insert_spot(db, "lot-1", &format!("a{i}"), SpotStatus::Available).await;
        }
        insert_spot(db, "lot-1", "reserved", SpotStatus::Reserved).await;
        insert_spot(db, "lot-2", "other", SpotStatus::Available).await;
        executor
    }

    async fn count_status(executor: &TransactionExecutor, lot: &str, status: SpotStatus) -> u64 {
        parking_spot::Entity::find()
            .filter(parking_spot::Column::ParkingLotId.eq(lot))
            .filter(parking_spot::Column::Status.eq(status.as_str()))
            .count(executor.connection())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn availability_report_occupies_every_available_spot_below_limit() {
        let executor = fixture(3).await;

        let outcome = create_report_transaction(
            &executor,
            new_report(ReportType::Availability, true),
            ReportPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.occupied_spot_ids.len(), 3);
        assert_eq!(count_status(&executor, "lot-1", SpotStatus::Occupied).await, 3);
        assert_eq!(count_status(&executor, "lot-1", SpotStatus::Available).await, 0);
        let db = executor.connection();
        assert_eq!(spot_status(db, "reserved").await, SpotStatus::Reserved);
        assert_eq!(spot_status(db, "other").await, SpotStatus::Available);
        assert_eq!(report::Entity::find().count(db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sample_is_bounded_by_policy_limit() {
        let executor = fixture(8).await;

        let outcome = create_report_transaction(
            &executor,
            new_report(ReportType::Availability, true),
            ReportPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.occupied_spot_ids.len(), 5);
        assert_eq!(count_status(&executor, "lot-1", SpotStatus::Available).await, 3);

        let outcome = create_report_transaction(
            &executor,
            new_report(ReportType::Availability, true),
            ReportPolicy { bulk_update_limit: 2 },
        )
        .await
        .unwrap();
        assert_eq!(outcome.occupied_spot_ids.len(), 2);
        assert_eq!(count_status(&executor, "lot-1", SpotStatus::Available).await, 1);
    }

    #[tokio::test]
    async fn other_reports_leave_spots_alone() {
        let executor = fixture(3).await;

        for input in [
            new_report(ReportType::Availability, false),
            new_report(ReportType::Issue, true),
        ] {
            let outcome = create_report_transaction(&executor, input, ReportPolicy::default())
                .await
                .unwrap();
            assert!(outcome.occupied_spot_ids.is_empty());
        }

        assert_eq!(count_status(&executor, "lot-1", SpotStatus::Available).await, 3);
        let reports = report::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(reports, 2);
    }

    #[tokio::test]
    async fn unknown_lot_is_rejected_and_nothing_is_stored() {
        let executor = fixture(1).await;
        let mut input = new_report(ReportType::Availability, true);
        input.parking_lot_id = "missing".into();

        let err = create_report_transaction(&executor, input, ReportPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err.domain_error(), Some(DomainError::NotFound { entity: "ParkingLot", .. })));
        let reports = report::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(reports, 0);
    }

    #[tokio::test]
    async fn spot_taken_after_sampling_keeps_its_status() {
        let executor = fixture(2).await;
        let db = executor.connection();

        // "reserved" stands for a spot a booking grabbed after the sample read.
        let txn = db.begin().await.unwrap();
        let occupied = occupy_if_available(
            &txn,
            vec!["a1".into(), "reserved".into(), "a2".into()],
            Utc::now(),
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();

        assert_eq!(occupied, vec!["a1".to_string(), "a2".to_string()]);
        assert_eq!(spot_status(db, "reserved").await, SpotStatus::Reserved);
        assert_eq!(spot_status(db, "a1").await, SpotStatus::Occupied);
        assert_eq!(spot_status(db, "a2").await, SpotStatus::Occupied);
    }
}
