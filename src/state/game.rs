use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{AnswerEntity, GameEntity, PlayerEntity};

/// Lifecycle of a game. Variants are ordered so status updates can be checked
/// for monotonicity: a game never moves backwards through this sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Lobby open, players may join.
    Waiting,
    /// Countdown running, ready barrier armed; joins are rejected.
    Starting,
    /// Questions in flight.
    Playing,
    /// Session over; the game row is immutable and only read for reporting.
    Finished,
}

/// One live run of a quiz, identified by its join PIN.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: Uuid,
    /// Fixed-width numeric string, unique among non-finished games.
    pub game_pin: String,
    pub quiz_id: Uuid,
    /// Anonymous hosting is allowed.
    pub host_id: Option<Uuid>,
    pub status: GameStatus,
    pub current_question_index: usize,
    pub created_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
}

/// A participant in one game.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    pub score: u32,
    pub joined_at: OffsetDateTime,
    /// Monotonic per-store join counter; the deterministic leaderboard
    /// tie-break when two players share a score.
    pub join_seq: u64,
}

/// One recorded answer; append-only, at most one per (player, question).
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub id: Uuid,
    pub player_id: Uuid,
    pub question_id: Uuid,
    pub is_correct: bool,
    pub score_awarded: u32,
    pub time_taken_ms: u64,
}

impl From<GameEntity> for Game {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            game_pin: value.game_pin,
            quiz_id: value.quiz_id,
            host_id: value.host_id,
            status: value.status,
            current_question_index: value.current_question_index,
            created_at: value.created_at,
            ended_at: value.ended_at,
        }
    }
}

impl From<Game> for GameEntity {
    fn from(value: Game) -> Self {
        Self {
            id: value.id,
            game_pin: value.game_pin,
            quiz_id: value.quiz_id,
            host_id: value.host_id,
            status: value.status,
            current_question_index: value.current_question_index,
            created_at: value.created_at,
            ended_at: value.ended_at,
        }
    }
}

impl From<PlayerEntity> for Player {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            score: value.score,
            joined_at: value.joined_at,
            join_seq: value.join_seq,
        }
    }
}

impl From<Player> for PlayerEntity {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            score: value.score,
            joined_at: value.joined_at,
            join_seq: value.join_seq,
        }
    }
}

impl From<AnswerEntity> for AnswerRecord {
    fn from(value: AnswerEntity) -> Self {
        Self {
            id: value.id,
            player_id: value.player_id,
            question_id: value.question_id,
            is_correct: value.is_correct,
            score_awarded: value.score_awarded,
            time_taken_ms: value.time_taken_ms,
        }
    }
}

impl From<AnswerRecord> for AnswerEntity {
    fn from(value: AnswerRecord) -> Self {
        Self {
            id: value.id,
            player_id: value.player_id,
            question_id: value.question_id,
            is_correct: value.is_correct,
            score_awarded: value.score_awarded,
            time_taken_ms: value.time_taken_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering_matches_lifecycle() {
        assert!(GameStatus::Waiting < GameStatus::Starting);
        assert!(GameStatus::Starting < GameStatus::Playing);
        assert!(GameStatus::Playing < GameStatus::Finished);
    }

    #[test]
    fn status_serialises_snake_case() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::Finished).unwrap(),
            "\"finished\""
        );
    }
}
