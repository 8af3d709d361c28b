//! Work-order numbering.
//!
//! Numbers come from a counter row in `sequences`, incremented in the same
//! transaction that inserts the order. Each allocation also looks at the
//! highest number on file, so imported orders are stepped over and the
//! result always matches the preview. The unique index on
//! `work_orders.work_number` backs it up: when an insert still collides
//! (a concurrent first seed of the counter) the counter is moved past the
//! stored maximum and the allocation is retried a bounded number of times.

use crate::{
    db::{
        in_transaction,
        retry::{with_retry, ConflictRetryPolicy, RetryConfig},
        DbPool,
    },
    entities::{
        sequence::{self, WORK_NUMBER},
        work_order,
    },
    errors::ServiceError,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// First number of the series
pub const FIRST_WORK_NUMBER: u64 = 40000;

/// Parses a stored work number. Only non-empty ASCII digit strings count;
/// anything else is legacy free text and takes no part in numbering.
pub fn parse_work_number(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Number following the highest one issued or stored, never below the floor
pub fn next_after(last_issued: Option<u64>) -> u64 {
    match last_issued {
        Some(last) => last.saturating_add(1).max(FIRST_WORK_NUMBER),
        None => FIRST_WORK_NUMBER,
    }
}

/// Highest numeric work number currently stored
async fn max_stored_work_number<C>(conn: &C) -> Result<Option<u64>, ServiceError>
where
    C: ConnectionTrait,
{
    let numbers: Vec<String> = work_order::Entity::find()
        .select_only()
        .column(work_order::Column::WorkNumber)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(numbers.iter().filter_map(|n| parse_work_number(n)).max())
}

async fn counter_value<C>(conn: &C) -> Result<Option<u64>, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(sequence::Entity::find_by_id(WORK_NUMBER.to_string())
        .one(conn)
        .await?
        .map(|row| u64::try_from(row.value).unwrap_or(0)))
}

fn to_counter(value: u64) -> Result<i64, ServiceError> {
    i64::try_from(value)
        .map_err(|_| ServiceError::InternalError("work number space exhausted".to_string()))
}

/// Hands out work numbers and inserts the orders carrying them
#[derive(Clone)]
pub struct WorkNumberSequencer {
    db_pool: Arc<DbPool>,
    retry: RetryConfig,
}

impl WorkNumberSequencer {
    pub fn new(db_pool: Arc<DbPool>, max_attempts: u32) -> Self {
        Self {
            db_pool,
            retry: RetryConfig::with_max_attempts(max_attempts),
        }
    }

    /// Preview of the number the next order will receive. Read-only; a
    /// concurrent creation may take it first.
    #[instrument(skip(self))]
    pub async fn next_work_number(&self) -> Result<String, ServiceError> {
        let db = self.db_pool.as_ref();
        let counter = counter_value(db).await?;
        let stored = max_stored_work_number(db).await?;

        Ok(next_after(counter.max(stored)).to_string())
    }

    /// Allocates the next number and inserts `template` with it, atomically.
    ///
    /// `template` carries every column except `work_number`.
    #[instrument(skip(self, template))]
    pub async fn allocate_and_insert(
        &self,
        template: work_order::ActiveModel,
    ) -> Result<work_order::Model, ServiceError> {
        let result = with_retry(&self.retry, ConflictRetryPolicy, |attempt| {
            let template = template.clone();
            async move {
                if attempt > 1 {
                    counter!("turbo_work_orders.number_conflicts", 1);
                    self.reconcile().await?;
                }
                self.try_allocate(template).await
            }
        })
        .await;

        match result {
            Ok(order) => {
                counter!("turbo_work_orders.numbers_allocated", 1);
                info!(work_number = %order.work_number, "Allocated work number");
                Ok(order)
            }
            Err(ServiceError::Conflict(detail)) => {
                warn!("Work number allocation gave up: {}", detail);
                Err(ServiceError::Conflict(format!(
                    "could not allocate a unique work number after {} attempts",
                    self.retry.max_attempts
                )))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_allocate(
        &self,
        template: work_order::ActiveModel,
    ) -> Result<work_order::Model, ServiceError> {
        in_transaction(self.db_pool.as_ref(), move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let bumped = sequence::Entity::update_many()
                    .col_expr(
                        sequence::Column::Value,
                        Expr::col(sequence::Column::Value).add(1),
                    )
                    .col_expr(sequence::Column::UpdatedAt, Expr::value(now))
                    .filter(sequence::Column::Name.eq(WORK_NUMBER))
                    .exec(txn)
                    .await?;

                let number = if bumped.rows_affected == 0 {
                    // First allocation: start past anything already on file
                    let first = next_after(max_stored_work_number(txn).await?);
                    sequence::ActiveModel {
                        name: Set(WORK_NUMBER.to_string()),
                        value: Set(to_counter(first)?),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;
                    first
                } else {
                    let issued = counter_value(txn).await?.ok_or_else(|| {
                        ServiceError::InternalError("work number counter vanished".to_string())
                    })?;
                    // Same rule as the preview: past the counter and past anything stored
                    let number = issued.max(next_after(max_stored_work_number(txn).await?));
                    if number != issued {
                        sequence::Entity::update_many()
                            .col_expr(sequence::Column::Value, Expr::value(to_counter(number)?))
                            .filter(sequence::Column::Name.eq(WORK_NUMBER))
                            .exec(txn)
                            .await?;
                    }
                    number
                };

                let mut order = template;
                order.work_number = Set(number.to_string());
                let order = order.insert(txn).await?;
                Ok(order)
            })
        })
        .await
    }

    /// Moves the counter up to the highest stored number
    async fn reconcile(&self) -> Result<(), ServiceError> {
        in_transaction(self.db_pool.as_ref(), |txn| {
            Box::pin(async move {
                // Write first so the transaction holds the lock before it reads
                sequence::Entity::update_many()
                    .col_expr(sequence::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(sequence::Column::Name.eq(WORK_NUMBER))
                    .exec(txn)
                    .await?;
                let Some(stored) = max_stored_work_number(txn).await? else {
                    return Ok(());
                };
                let stored = to_counter(stored)?;
                let moved = sequence::Entity::update_many()
                    .col_expr(sequence::Column::Value, Expr::value(stored))
                    .filter(sequence::Column::Name.eq(WORK_NUMBER))
                    .filter(sequence::Column::Value.lt(stored))
                    .exec(txn)
                    .await?;
                if moved.rows_affected > 0 {
                    debug!(stored, "Counter moved past stored work numbers");
                }
                Ok(())
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_digit_strings_only() {
        assert_eq!(parse_work_number("43005"), Some(43005));
        assert_eq!(parse_work_number("007"), Some(7));
        assert_eq!(parse_work_number(""), None);
        assert_eq!(parse_work_number("-5"), None);
        assert_eq!(parse_work_number("+5"), None);
        assert_eq!(parse_work_number(" 40000"), None);
        assert_eq!(parse_work_number("A-17"), None);
        assert_eq!(parse_work_number("４０"), None);
        assert_eq!(parse_work_number("99999999999999999999999"), None);
    }

    #[test]
    fn next_number_is_floored_at_first() {
        assert_eq!(next_after(None), 40000);
        assert_eq!(next_after(Some(12)), 40000);
        assert_eq!(next_after(Some(39999)), 40000);
        assert_eq!(next_after(Some(43005)), 43006);
        assert_eq!(next_after(Some(u64::MAX)), u64::MAX);
    }
}
