use serde::Serialize;
use utoipa::ToSchema;

/// Health status returned by the healthcheck endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether the storage backend answered the ping.
    pub storage: bool,
    /// Number of live game topics on the channel hub.
    pub live_topics: usize,
}
