use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/games/{pin}/events",
    tag = "sse",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Game event stream", content_type = "text/event-stream", body = String))
)]
/// Stream the game's realtime events to a connected client.
pub async fn game_events(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe(&state, &pin).await?;
    info!(pin, "new game SSE connection");
    Ok(sse_service::to_sse_stream(receiver))
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{pin}/events", get(game_events))
}
