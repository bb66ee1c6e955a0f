//! Application layer: configuration and the billing service that wires the
//! domain crates to a document store.

use std::sync::Arc;

use forgebill_store::DocumentStore;

pub mod config;
pub mod services;

pub use config::BillingConfig;
pub use services::{BillRequest, BillingService, PartyDetails, SETTINGS_KEY};

/// Start-up for a host application: JSON logging, then a service over
/// `store` configured from saved settings or the environment.
pub async fn start(store: Arc<dyn DocumentStore>) -> BillingService {
    forgebill_observability::init();
    let service = BillingService::open(store).await;
    tracing::info!(
        seller_state = %service.config().seller_state,
        prefix = %service.config().bill_prefix,
        "billing service ready"
    );
    service
}
