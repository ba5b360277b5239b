use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::game::GameStatus;

/// Persisted form of a game row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntity {
    pub id: Uuid,
    pub game_pin: String,
    pub quiz_id: Uuid,
    pub host_id: Option<Uuid>,
    pub status: GameStatus,
    pub current_question_index: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
}

/// Persisted form of a player row. Rows belong to exactly one game and are
/// removed when the game is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntity {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    pub score: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    pub join_seq: u64,
}

/// Persisted form of an answer row, keyed by (player, question).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntity {
    pub id: Uuid,
    pub player_id: Uuid,
    pub question_id: Uuid,
    pub is_correct: bool,
    pub score_awarded: u32,
    pub time_taken_ms: u64,
}

/// Projection used when listing stored quizzes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizListItemEntity {
    pub id: Uuid,
    pub title: String,
    pub question_count: usize,
}
