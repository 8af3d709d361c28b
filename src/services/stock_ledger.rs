use crate::{
    db::{in_transaction, DbPool, MAX_PAGE_SIZE},
    entities::{
        part,
        stock_movement::{self, MovementType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Why a guarded balance update matched no row
enum Rejection {
    MissingPart,
    Insufficient { available: i32 },
    Overflow { available: i32 },
}

/// Append-only stock ledger. The part balance and the movement log change
/// together in one transaction or not at all.
#[derive(Clone)]
pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Applies `quantity` units in `movement_type` direction to the part and
    /// appends the matching movement.
    ///
    /// The balance is changed by a single conditional UPDATE, so two
    /// concurrent OUT movements can never both pass the stock check.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        part_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
    ) -> Result<stock_movement::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "quantity must be a positive integer, got {}",
                quantity
            )));
        }

        let db = self.db_pool.as_ref();
        let outcome = in_transaction::<_, Result<stock_movement::Model, Rejection>>(db, move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let update = part::Entity::update_many()
                    .col_expr(
                        part::Column::StockQuantity,
                        Expr::col(part::Column::StockQuantity)
                            .add(movement_type.signed(quantity)),
                    )
                    .col_expr(part::Column::UpdatedAt, Expr::value(now))
                    .filter(part::Column::Id.eq(part_id));

                let update = match movement_type {
                    MovementType::In => {
                        update.filter(part::Column::StockQuantity.lte(i32::MAX - quantity))
                    }
                    MovementType::Out => update.filter(part::Column::StockQuantity.gte(quantity)),
                };

                let result = update.exec(txn).await?;
                if result.rows_affected == 0 {
                    let rejection = match part::Entity::find_by_id(part_id).one(txn).await? {
                        None => Rejection::MissingPart,
                        Some(p) if movement_type == MovementType::Out => Rejection::Insufficient {
                            available: p.stock_quantity,
                        },
                        Some(p) => Rejection::Overflow {
                            available: p.stock_quantity,
                        },
                    };
                    return Ok(Err(rejection));
                }

                let balance_after = part::Entity::find_by_id(part_id)
                    .one(txn)
                    .await?
                    .map(|p| p.stock_quantity)
                    .ok_or_else(|| ServiceError::not_found("Part", part_id))?;

                let movement = stock_movement::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    part_id: Set(part_id),
                    movement_type: Set(movement_type),
                    quantity: Set(quantity),
                    balance_after: Set(balance_after),
                    created_at: Set(now),
                }
                .insert(txn)
                .await?;

                Ok(Ok(movement))
            })
        })
        .await?;

        match outcome {
            Ok(movement) => {
                counter!(
                    "turbo_stock.movements_recorded",
                    1,
                    "direction" => movement_type.to_string()
                );
                info!(
                    movement_id = %movement.id,
                    balance_after = movement.balance_after,
                    "Recorded stock movement"
                );
                self.event_sender
                    .publish(Event::StockMovementRecorded {
                        movement_id: movement.id,
                        part_id,
                        movement_type,
                        quantity,
                        balance_after: movement.balance_after,
                    })
                    .await;
                Ok(movement)
            }
            Err(Rejection::MissingPart) => Err(ServiceError::not_found("Part", part_id)),
            Err(Rejection::Insufficient { available }) => {
                counter!("turbo_stock.movements_rejected", 1);
                warn!(available, requested = quantity, "Insufficient stock");
                self.event_sender
                    .publish(Event::StockMovementRejected {
                        part_id,
                        requested: quantity,
                        available,
                    })
                    .await;
                Err(ServiceError::InsufficientStock(format!(
                    "part {} has {} in stock, {} requested",
                    part_id, available, quantity
                )))
            }
            Err(Rejection::Overflow { available }) => Err(ServiceError::InvalidInput(format!(
                "adding {} to a balance of {} exceeds the maximum stock quantity",
                quantity, available
            ))),
        }
    }

    /// Movements of a part, most recent first
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        part_id: Uuid,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        part::Entity::find_by_id(part_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Part", part_id))?;

        let movements = stock_movement::Entity::find()
            .filter(stock_movement::Column::PartId.eq(part_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .order_by_desc(stock_movement::Column::Id)
            .limit(MAX_PAGE_SIZE)
            .all(db)
            .await?;

        Ok(movements)
    }
}
