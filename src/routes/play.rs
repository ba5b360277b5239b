use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::game::{
        FinalResults, LeaderboardEntry, ReadyResponse, SubmitAnswerRequest, SubmitAnswerResponse,
    },
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Routes for player-side gameplay operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{pin}/players/{player_id}/ready", post(mark_ready))
        .route(
            "/games/{pin}/players/{player_id}/answers",
            post(submit_answer),
        )
        .route("/games/{pin}/leaderboard", get(leaderboard))
        .route("/games/{pin}/results", get(final_results))
}

/// Signal that this player has finished loading question 1.
#[utoipa::path(
    post,
    path = "/games/{pin}/players/{player_id}/ready",
    tag = "play",
    params(
        ("pin" = String, Path, description = "Join PIN of the game"),
        ("player_id" = Uuid, Path, description = "Player identifier")
    ),
    responses((status = 200, description = "Signal acknowledged", body = ReadyResponse))
)]
pub async fn mark_ready(
    State(state): State<SharedState>,
    Path((pin, player_id)): Path<(String, Uuid)>,
) -> Result<Json<ReadyResponse>, AppError> {
    let response = player_service::mark_ready(&state, &pin, player_id).await?;
    Ok(Json(response))
}

/// Submit an answer (or a timeout) for the live question.
#[utoipa::path(
    post,
    path = "/games/{pin}/players/{player_id}/answers",
    tag = "play",
    params(
        ("pin" = String, Path, description = "Join PIN of the game"),
        ("player_id" = Uuid, Path, description = "Player identifier")
    ),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer scored", body = SubmitAnswerResponse),
        (status = 409, description = "Question is not live")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path((pin, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let response = player_service::submit_answer(&state, &pin, player_id, payload).await?;
    Ok(Json(response))
}

/// Current standings, ordered by score with ties broken by join order.
#[utoipa::path(
    get,
    path = "/games/{pin}/leaderboard",
    tag = "play",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Current standings", body = [LeaderboardEntry]))
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let standings = player_service::leaderboard(&state, &pin).await?;
    Ok(Json(standings))
}

/// Aggregated final results, available once the game has finished.
#[utoipa::path(
    get,
    path = "/games/{pin}/results",
    tag = "play",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses(
        (status = 200, description = "Final results", body = FinalResults),
        (status = 409, description = "Game not finished yet")
    )
)]
pub async fn final_results(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<FinalResults>, AppError> {
    let results = player_service::final_results(&state, &pin).await?;
    Ok(Json(results))
}
