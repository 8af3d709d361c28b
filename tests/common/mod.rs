#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use turbo_service::{
    config::AppConfig,
    db,
    entities::{client, part, work_order},
    errors::ServiceError,
    events::{self, EventSender},
    handlers::AppServices,
    services::{
        clients::CreateClientInput,
        parts::CreatePartInput,
        work_number::WorkNumberSequencer,
        work_orders::{CreateWorkOrderInput, WorkOrderService},
    },
    AppState,
};
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: Option<TempDir>,
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    cfg.auto_migrate = true;
    // One connection keeps the in-memory database alive and shared
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg.db_acquire_timeout_secs = 60;
    cfg
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// File-backed database behind a pool of `connections`, so concurrent
    /// operations really run on separate connections.
    pub async fn pooled(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("create database dir");
        let mut cfg = test_config();
        cfg.database_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("pooled.db").display()
        );
        cfg.db_max_connections = connections;
        cfg.db_min_connections = 1;

        let mut app = Self::with_config(cfg).await;
        app._db_dir = Some(dir);
        app
    }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel(events::EVENT_CHANNEL_CAPACITY);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, Arc::new(event_sender));
        let router = turbo_service::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: None,
        }
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    /// Work order service whose sequencer gives up after `max_attempts`
    pub fn work_orders_with_attempts(&self, max_attempts: u32) -> WorkOrderService {
        WorkOrderService::new(
            self.state.db.clone(),
            self.state.event_sender.clone(),
            WorkNumberSequencer::new(self.state.db.clone(), max_attempts),
        )
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// Send a prebuilt request against the router.
    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a part with fresh catalog references
    pub async fn seed_part(&self, code: &str) -> part::Model {
        let catalog = &self.services().catalog;
        let part_type = catalog
            .create_part_type(&format!("Type for {}", code))
            .await
            .expect("seed part type");
        let supplier = catalog
            .create_supplier(&format!("Supplier for {}", code))
            .await
            .expect("seed supplier");

        self.services()
            .parts
            .create_part(CreatePartInput {
                code: code.to_string(),
                part_type_id: part_type.id,
                supplier_id: supplier.id,
                notes: String::new(),
            })
            .await
            .expect("seed part")
    }

    pub async fn seed_client(&self, name: &str, phone: &str) -> client::Model {
        self.services()
            .clients
            .create_client(CreateClientInput {
                name: name.to_string(),
                phone: phone.to_string(),
                email: String::new(),
                address: String::new(),
                company_name: String::new(),
                tax_number: String::new(),
                notes: String::new(),
            })
            .await
            .expect("seed client")
    }

    pub async fn create_order(&self, client_id: Uuid, turbo_code: &str) -> work_order::Model {
        self.services()
            .work_orders
            .create_work_order(CreateWorkOrderInput {
                client_id,
                vehicle_id: None,
                turbo_code: turbo_code.to_string(),
            })
            .await
            .expect("create work order")
    }

    /// Inserts an order directly, bypassing the sequencer, as imported data would be
    pub async fn insert_legacy_order(
        &self,
        client_id: Uuid,
        work_number: &str,
    ) -> work_order::Model {
        self.try_insert_legacy_order(client_id, work_number)
            .await
            .expect("insert legacy order")
    }

    pub async fn try_insert_legacy_order(
        &self,
        client_id: Uuid,
        work_number: &str,
    ) -> Result<work_order::Model, ServiceError> {
        let now = Utc::now();
        work_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            work_number: Set(work_number.to_string()),
            client_id: Set(client_id),
            vehicle_id: Set(None),
            turbo_code: Set("LEGACY".to_string()),
            received_date: Set(now.date_naive()),
            parts: Set(work_order::ProcessLines::default()),
            status_passed: Set(false),
            status_refused: Set(false),
            cleaning_price: Set(Decimal::ZERO),
            reconditioning_price: Set(Decimal::ZERO),
            turbo_price: Set(Decimal::ZERO),
            status: Set(work_order::WorkOrderStatus::Delivered),
            quote_sent: Set(false),
            quote_accepted: Set(false),
            estimated_completion: Set(None),
            finalized: Set(true),
            client_notified: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.state.db.as_ref())
        .await
        .map_err(ServiceError::from)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Reads a response body as JSON
pub async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&body).expect("response body is json")
}
