use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::game::{GameSnapshot, LeaderboardEntry, QuestionResults, StartGameResponse, TimerStatus},
    error::AppError,
    services::host_service,
    state::SharedState,
};

/// Routes driving the host side of a live session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{pin}/start", post(start_game))
        .route("/games/{pin}/results", post(show_results))
        .route("/games/{pin}/leaderboard", post(show_leaderboard))
        .route("/games/{pin}/next", post(next_question))
        .route("/games/{pin}/timer/pause", post(pause_timer))
        .route("/games/{pin}/timer/resume", post(resume_timer))
}

/// Start the game: countdown, ready barrier, then question 1.
#[utoipa::path(
    post,
    path = "/games/{pin}/start",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses(
        (status = 200, description = "Countdown started", body = StartGameResponse),
        (status = 409, description = "Not in the lobby, or no players")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<StartGameResponse>, AppError> {
    let started = host_service::start_game(&state, &pin).await?;
    Ok(Json(started))
}

/// Reveal results for the live question, stopping the host timer.
#[utoipa::path(
    post,
    path = "/games/{pin}/results",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses(
        (status = 200, description = "Question results", body = QuestionResults),
        (status = 409, description = "No live question to reveal")
    )
)]
pub async fn show_results(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<QuestionResults>, AppError> {
    let results = host_service::show_results(&state, &pin).await?;
    Ok(Json(results))
}

/// Move the host view from results to the intermediate leaderboard.
#[utoipa::path(
    post,
    path = "/games/{pin}/leaderboard",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Current standings", body = [LeaderboardEntry]))
)]
pub async fn show_leaderboard(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let standings = host_service::show_leaderboard(&state, &pin).await?;
    Ok(Json(standings))
}

/// Advance to the next question, or finish the game after the last one.
#[utoipa::path(
    post,
    path = "/games/{pin}/next",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses(
        (status = 200, description = "Updated snapshot", body = GameSnapshot),
        (status = 409, description = "Not at a results or leaderboard view")
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = host_service::next_question(&state, &pin).await?;
    Ok(Json(snapshot))
}

/// Pause the host question timer. Player countdowns are unaffected.
#[utoipa::path(
    post,
    path = "/games/{pin}/timer/pause",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Timer state", body = TimerStatus))
)]
pub async fn pause_timer(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<TimerStatus>, AppError> {
    let status = host_service::pause_timer(&state, &pin).await?;
    Ok(Json(status))
}

/// Resume a paused host question timer.
#[utoipa::path(
    post,
    path = "/games/{pin}/timer/resume",
    tag = "host",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Timer state", body = TimerStatus))
)]
pub async fn resume_timer(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<TimerStatus>, AppError> {
    let status = host_service::resume_timer(&state, &pin).await?;
    Ok(Json(status))
}
