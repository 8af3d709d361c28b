pub mod catalog;
pub mod clients;
pub mod common;
pub mod health;
pub mod parts;
pub mod stock_movements;
pub mod work_orders;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, clients::ClientService, parts::PartService,
    stock_ledger::StockLedgerService, work_number::WorkNumberSequencer,
    work_orders::WorkOrderService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub parts: Arc<PartService>,
    pub stock_ledger: Arc<StockLedgerService>,
    pub clients: Arc<ClientService>,
    pub work_orders: Arc<WorkOrderService>,
}

impl AppServices {
    /// Wires every service against one pool and event channel
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        work_number_max_attempts: u32,
    ) -> Self {
        let sequencer = WorkNumberSequencer::new(db_pool.clone(), work_number_max_attempts);

        Self {
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            parts: Arc::new(PartService::new(db_pool.clone(), event_sender.clone())),
            stock_ledger: Arc::new(StockLedgerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            clients: Arc::new(ClientService::new(db_pool.clone())),
            work_orders: Arc::new(WorkOrderService::new(db_pool, event_sender, sequencer)),
        }
    }
}
