use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::stock_movement::MovementType;
use crate::entities::work_order::WorkOrderStatus;

/// Default capacity of the domain event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end of a fresh channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when nobody listens
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Facts emitted after a write has been committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    StockMovementRecorded {
        movement_id: Uuid,
        part_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        balance_after: i32,
    },
    StockMovementRejected {
        part_id: Uuid,
        requested: i32,
        available: i32,
    },
    PartCreated(Uuid),
    PartDeleted {
        part_id: Uuid,
        movements_removed: u64,
    },
    WorkOrderCreated {
        work_order_id: Uuid,
        work_number: String,
    },
    WorkOrderUpdated {
        work_order_id: Uuid,
        status: WorkOrderStatus,
    },
    WorkOrderDeleted {
        work_order_id: Uuid,
        work_number: String,
    },
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::StockMovementRecorded {
                movement_id,
                part_id,
                movement_type,
                quantity,
                balance_after,
            } => {
                info!(
                    %movement_id,
                    %part_id,
                    %movement_type,
                    quantity,
                    balance_after,
                    "Stock movement recorded"
                );
            }
            Event::StockMovementRejected {
                part_id,
                requested,
                available,
            } => {
                warn!(%part_id, requested, available, "Stock movement rejected");
            }
            Event::PartCreated(part_id) => {
                info!(%part_id, "Part created");
            }
            Event::PartDeleted {
                part_id,
                movements_removed,
            } => {
                info!(%part_id, movements_removed, "Part deleted");
            }
            Event::WorkOrderCreated {
                work_order_id,
                work_number,
            } => {
                info!(%work_order_id, %work_number, "Work order created");
            }
            Event::WorkOrderUpdated {
                work_order_id,
                status,
            } => {
                info!(%work_order_id, %status, "Work order updated");
            }
            Event::WorkOrderDeleted {
                work_order_id,
                work_number,
            } => {
                info!(%work_order_id, %work_number, "Work order deleted; number stays retired");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (sender, rx) = EventSender::channel(4);
        drop(rx);
        let result = sender.send(Event::PartCreated(Uuid::new_v4())).await;
        assert!(result.is_err());
        // publish swallows the same failure
        sender.publish(Event::PartCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (sender, mut rx) = EventSender::channel(4);
        let first = Uuid::new_v4();
        sender.send(Event::PartCreated(first)).await.unwrap();
        sender
            .send(Event::WorkOrderCreated {
                work_order_id: Uuid::new_v4(),
                work_number: "40000".into(),
            })
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(Event::PartCreated(first)));
        assert!(matches!(
            rx.recv().await,
            Some(Event::WorkOrderCreated { work_number, .. }) if work_number == "40000"
        ));
    }
}
