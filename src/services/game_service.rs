//! Game lifecycle outside the live loop: creation, joining, and the polling
//! snapshot that backs clients without a working event stream.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::game_store::GameStore,
    dto::{
        game::{CreateGameRequest, GameSnapshot, JoinResponse, PlayerSummary},
        validation::{validate_pin, validate_player_name},
    },
    error::ServiceError,
    services::channel_events,
    state::{SharedState, game::Game, game::GameStatus},
};

pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSnapshot, ServiceError> {
    let quiz = state
        .store()
        .find_quiz(request.quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{}` not found", request.quiz_id)))?;

    if quiz.questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "cannot host a quiz without questions".into(),
        ));
    }

    let entity = state
        .store()
        .create_game(quiz.id, request.host_id)
        .await?;
    state.create_session(entity.id, entity.game_pin.clone());
    info!(game_id = %entity.id, pin = %entity.game_pin, quiz_id = %quiz.id, "game created");

    Ok(GameSnapshot::new(&Game::from(entity), 0))
}

/// Resolve a PIN to its game, falling back to the live-session registry for
/// games whose PIN has already been released in storage.
pub async fn find_game_by_pin(state: &SharedState, pin: &str) -> Result<Game, ServiceError> {
    validate_pin(pin, state.config().pin_length as usize)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    if let Some(entity) = state.store().find_game_by_pin(pin.to_string()).await? {
        return Ok(Game::from(entity));
    }

    if let Some(game_id) = state.game_id_for_pin(pin) {
        if let Some(entity) = state.store().find_game(game_id).await? {
            return Ok(Game::from(entity));
        }
    }

    Err(ServiceError::NotFound(format!("no game with pin `{pin}`")))
}

pub async fn join_game(
    state: &SharedState,
    pin: &str,
    name: &str,
) -> Result<JoinResponse, ServiceError> {
    let name = name.trim();
    validate_player_name(name, state.config().max_player_name_len)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let game = find_game_by_pin(state, pin).await?;
    if game.status != GameStatus::Waiting {
        return Err(ServiceError::InvalidState(
            "the game has already started".into(),
        ));
    }

    let session = state.require_session(game.id)?;
    let player = state.store().add_player(game.id, name.to_string()).await?;
    session.register_player(player.id);

    channel_events::player_joined(state, &game.game_pin, player.id, &player.name);
    info!(game_id = %game.id, player_id = %player.id, name = %player.name, "player joined");

    Ok(JoinResponse {
        player_id: player.id,
        game_pin: game.game_pin,
        name: player.name,
    })
}

/// Polling fallback: the full persisted view of the game, fresh enough to
/// recover from any missed broadcast.
pub async fn snapshot(state: &SharedState, pin: &str) -> Result<GameSnapshot, ServiceError> {
    let game = find_game_by_pin(state, pin).await?;
    let players = state.store().list_players(game.id).await?;
    Ok(GameSnapshot::new(&game, players.len()))
}

pub async fn list_players(
    state: &SharedState,
    pin: &str,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let game = find_game_by_pin(state, pin).await?;
    let players = state.store().list_players(game.id).await?;
    Ok(players
        .into_iter()
        .map(|entity| PlayerSummary::from(crate::state::game::Player::from(entity)))
        .collect())
}

pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let deleted = state.store().delete_game(id).await?;
    if !deleted {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    }
    state.remove_session(id);
    info!(game_id = %id, "game deleted");
    Ok(())
}
