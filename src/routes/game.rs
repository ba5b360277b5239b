use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{CreateGameRequest, GameSnapshot, JoinGameRequest, JoinResponse, PlayerSummary},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling game lifecycle and lobby operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{pin}", get(game_snapshot))
        .route("/games/{pin}/join", post(join_game))
        .route("/games/{pin}/players", get(list_players))
        .route("/games/by-id/{id}", delete(delete_game))
}

/// Create a live game over a stored quiz; allocates the join PIN.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created in waiting status", body = GameSnapshot),
        (status = 404, description = "No such quiz")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = game_service::create_game(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Current persisted view of the game: the polling fallback for clients
/// whose event stream is down.
#[utoipa::path(
    get,
    path = "/games/{pin}",
    tag = "game",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses(
        (status = 200, description = "Game snapshot", body = GameSnapshot),
        (status = 404, description = "No game with that PIN")
    )
)]
pub async fn game_snapshot(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = game_service::snapshot(&state, &pin).await?;
    Ok(Json(snapshot))
}

/// Join a waiting game by PIN.
#[utoipa::path(
    post,
    path = "/games/{pin}/join",
    tag = "game",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Joined the lobby", body = JoinResponse),
        (status = 409, description = "Game already started")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<JoinResponse>, AppError> {
    let joined = game_service::join_game(&state, &pin, &payload.name).await?;
    Ok(Json(joined))
}

/// Lobby roster in join order.
#[utoipa::path(
    get,
    path = "/games/{pin}/players",
    tag = "game",
    params(("pin" = String, Path, description = "Join PIN of the game")),
    responses((status = 200, description = "Players in join order", body = [PlayerSummary]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = game_service::list_players(&state, &pin).await?;
    Ok(Json(players))
}

/// Delete a game and everything attached to it.
#[utoipa::path(
    delete,
    path = "/games/by-id/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "No such game")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    game_service::delete_game(&state, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
