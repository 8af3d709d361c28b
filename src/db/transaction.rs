//! Transaction helper that keeps `ServiceError` intact across the boundary.

use crate::errors::ServiceError;
use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};

/// Runs `f` inside a transaction: commit on `Ok`, rollback on `Err`.
///
/// ```rust,ignore
/// in_transaction(&db, move |txn| {
///     Box::pin(async move {
///         stock_movement::Entity::delete_many().filter(..).exec(txn).await?;
///         part::Entity::delete_by_id(id).exec(txn).await?;
///         Ok(())
///     })
/// })
/// .await?;
/// ```
pub async fn in_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    db.transaction::<F, T, ServiceError>(f)
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
}
