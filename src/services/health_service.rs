use tracing::warn;

use crate::{dao::game_store::GameStore, dto::health::HealthResponse, state::SharedState};

/// Probe the storage backend and report hub occupancy. Storage failure
/// degrades the report instead of failing the endpoint.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage = match state.store().health_check().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            false
        }
    };

    HealthResponse {
        status: if storage { "ok" } else { "degraded" },
        storage,
        live_topics: state.channel().topic_count(),
    }
}
