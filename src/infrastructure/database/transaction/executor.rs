//! Transaction executor
//!
//! Runs a unit of work inside one database transaction, retrying the whole
//! unit on a fresh transaction when the failure is transient.
//!
//! ```ignore
//! let booking = executor
//!     .execute(move |txn| {
//!         let input = input.clone();
//!         Box::pin(async move { reserve_spot(txn, input).await })
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use tracing::warn;

use super::error::TransactionError;
use super::options::TransactionOptions;
use super::retry::run_with_retry;
use crate::support::{AppError, AppResult};

/// Future returned by a unit of work; borrows the transaction for `'c`.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'c>>;

/// Boxed sub-operation for [`TransactionExecutor::atomic_operation`].
pub type TxOperation<T> =
    Box<dyn for<'c> Fn(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send + Sync>;

/// Owns a handle to the store and the default transaction options.
///
/// Cloning is cheap: the connection is a pool handle.
#[derive(Clone)]
pub struct TransactionExecutor {
    db: DatabaseConnection,
    defaults: TransactionOptions,
}

impl TransactionExecutor {
    pub fn new(db: DatabaseConnection, defaults: TransactionOptions) -> Self {
        Self { db, defaults }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn defaults(&self) -> &TransactionOptions {
        &self.defaults
    }

    /// Run `work` with the executor's default options.
    pub async fn execute<T, F>(&self, work: F) -> Result<T, TransactionError>
    where
        F: for<'c> Fn(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send + Sync,
        T: Send,
    {
        self.execute_with(&self.defaults, work).await
    }

    /// Run `work` inside one transaction per attempt.
    ///
    /// `work` may run several times and must not depend on state left by an
    /// earlier attempt; every attempt's writes are rolled back on failure.
    pub async fn execute_with<T, F>(
        &self,
        options: &TransactionOptions,
        work: F,
    ) -> Result<T, TransactionError>
    where
        F: for<'c> Fn(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send + Sync,
        T: Send,
    {
        let policy = options.retry_policy();
        let isolation: IsolationLevel = options.isolation_level.into();
        let db = &self.db;
        let work = &work;

        run_with_retry(&policy, options.timeout, "transaction", move |_attempt| {
            run_attempt(db, isolation, work)
        })
        .await
    }

    /// Split `items` into chunks of `batch_size` and apply `op` to each chunk,
    /// in input order, all inside one transaction.
    pub async fn batch_operation<I, R, F>(
        &self,
        items: Vec<I>,
        batch_size: usize,
        options: &TransactionOptions,
        op: F,
    ) -> Result<Vec<R>, TransactionError>
    where
        I: Send + Sync + 'static,
        R: Send + 'static,
        F: for<'c> Fn(&'c [I], &'c DatabaseTransaction) -> TxFuture<'c, R>
            + Send
            + Sync
            + 'static,
    {
        let batch_size = batch_size.max(1);
        let items: Arc<[I]> = items.into();
        let op = Arc::new(op);

        self.execute_with(options, move |txn| {
            let items = Arc::clone(&items);
            let op = Arc::clone(&op);
            Box::pin(async move {
                let mut results = Vec::with_capacity(items.len().div_ceil(batch_size));
                for batch in items.chunks(batch_size) {
                    results.push(op(batch, txn).await?);
                }
                Ok::<_, AppError>(results)
            })
        })
        .await
    }

    /// Run `operations` in order inside one transaction, collecting results.
    pub async fn atomic_operation<T>(
        &self,
        operations: Vec<TxOperation<T>>,
        options: &TransactionOptions,
    ) -> Result<Vec<T>, TransactionError>
    where
        T: Send + 'static,
    {
        let operations: Arc<[TxOperation<T>]> = operations.into();

        self.execute_with(options, move |txn| {
            let operations = Arc::clone(&operations);
            Box::pin(async move {
                let mut results = Vec::with_capacity(operations.len());
                for operation in operations.iter() {
                    results.push(operation(txn).await?);
                }
                Ok::<_, AppError>(results)
            })
        })
        .await
    }
}

/// Box a sub-operation for [`TransactionExecutor::atomic_operation`].
pub fn tx_operation<T, F>(f: F) -> TxOperation<T>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send + Sync + 'static,
{
    Box::new(f)
}

/// One attempt: begin, run, commit or roll back.
async fn run_attempt<T, F>(
    db: &DatabaseConnection,
    isolation: IsolationLevel,
    work: &F,
) -> AppResult<T>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> TxFuture<'c, T>,
{
    let txn = db.begin_with_config(Some(isolation), None).await?;

    match work(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::entities::{parking_spot, user};
    use crate::infrastructure::database::transaction::TransactionFailure;
    use crate::support::test_support::{insert_user, test_executor};
    use crate::support::DomainError;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn user_model(id: &str) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(id.to_string()),
            email: Set(format!("{id}@parkpulse.test")),
            name: Set(id.to_string()),
            phone: Set(None),
            role: Set("USER".to_string()),
            created_at: Set(chrono::Utc::now()),
        }
    }

    #[tokio::test]
    async fn commits_on_success() {
        let executor = test_executor().await;

        let id = executor
            .execute(|txn| {
                Box::pin(async move {
                    let m = user_model("alice").insert(txn).await?;
                    Ok::<_, AppError>(m.id)
                })
            })
            .await
            .unwrap();

        assert_eq!(id, "alice");
        let found = user::Entity::find_by_id("alice")
            .one(executor.connection())
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn rolls_back_every_write_on_failure() {
        let executor = test_executor().await;

        let err = executor
            .execute(|txn| {
                Box::pin(async move {
                    user_model("bob").insert(txn).await?;
                    Err::<(), AppError>(DomainError::Validation("abort".into()).into())
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), TransactionFailure::Rejected);
        assert_eq!(err.attempts(), 1);
        let count = user::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn retries_on_fresh_transaction() {
        let executor = test_executor().await;
        let options = executor
            .defaults()
            .clone()
            .with_retry_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        executor
            .execute_with(&options, |txn| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    user_model("carol").insert(txn).await?;
                    if call == 0 {
                        return Err(sea_orm::DbErr::Custom("deadlock detected".into()).into());
                    }
                    Ok::<_, AppError>(())
                })
            })
            .await
            .unwrap();

        // The first attempt's insert was rolled back, otherwise the second
        // insert would hit the primary key.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let count = user::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn batch_operation_keeps_input_order() {
        let executor = test_executor().await;
        let ids: Vec<String> = (1..=5).map(|i| format!("user-{i}")).collect();

        let sizes = executor
            .batch_operation(ids, 2, executor.defaults(), |batch, txn| {
                Box::pin(async move {
                    for id in batch {
                        user_model(id).insert(txn).await?;
                    }
                    Ok::<_, AppError>(batch.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","))
                })
            })
            .await
            .unwrap();

        assert_eq!(sizes, vec!["user-1,user-2", "user-3,user-4", "user-5"]);
        let count = user::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn atomic_operation_is_all_or_nothing() {
        let executor = test_executor().await;
        insert_user(executor.connection(), "dave").await;

        let ops: Vec<TxOperation<u64>> = vec![
            tx_operation(|txn| {
                Box::pin(async move {
                    user_model("erin").insert(txn).await?;
                    Ok::<_, AppError>(1)
                })
            }),
            tx_operation(|txn| {
                Box::pin(async move {
                    // Duplicate primary key: non-retryable store error.
                    user_model("dave").insert(txn).await?;
                    Ok::<_, AppError>(2)
                })
            }),
        ];

        let err = executor
            .atomic_operation(ops, executor.defaults())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), TransactionFailure::Fatal);
        assert!(user::Entity::find_by_id("erin")
            .one(executor.connection())
            .await
            .unwrap()
            .is_none());
        let spots = parking_spot::Entity::find().count(executor.connection()).await.unwrap();
        assert_eq!(spots, 0);
    }
}
