use std::sync::Arc;

use editai_core::generation::PlanGenerator;

use crate::config::ServerConfig;
use crate::inflight::InFlightRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// User and plan storage.
    pub pool: editai_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Plan generation backend.
    pub generator: Arc<dyn PlanGenerator>,
    /// Users with a generation currently running.
    pub in_flight: Arc<InFlightRegistry>,
}

impl AppState {
    pub fn new(
        pool: editai_db::DbPool,
        config: ServerConfig,
        generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            generator,
            in_flight: Arc::new(InFlightRegistry::new()),
        }
    }
}
