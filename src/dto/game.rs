use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_timestamp, quiz::QuestionView},
    state::game::{Game, GameStatus, Player},
    state::quiz::SubmittedAnswer,
};

/// Payload used to create a new live game over a stored quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    pub quiz_id: Uuid,
    /// Anonymous hosting is allowed.
    #[serde(default)]
    pub host_id: Option<Uuid>,
}

/// Join request; the PIN travels in the URL path (`/games/{pin}/join`),
/// mirroring the shareable `/join/{pin}` link format.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// Display name; trimmed server-side, length-capped by configuration.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Response for a successful join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    pub player_id: Uuid,
    pub game_pin: String,
    pub name: String,
}

/// Public projection of a game row: the polling fallback payload. When the
/// real-time channel is unavailable clients poll this until status or index
/// moves.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSnapshot {
    pub id: Uuid,
    pub game_pin: String,
    pub quiz_id: Uuid,
    pub status: GameStatus,
    pub current_question_index: usize,
    pub player_count: usize,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl GameSnapshot {
    pub fn new(game: &Game, player_count: usize) -> Self {
        Self {
            id: game.id,
            game_pin: game.game_pin.clone(),
            quiz_id: game.quiz_id,
            status: game.status,
            current_question_index: game.current_question_index,
            player_count,
            created_at: format_timestamp(game.created_at),
            ended_at: game.ended_at.map(format_timestamp),
        }
    }
}

/// Public projection of a player row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    pub joined_at: String,
}

impl From<Player> for PlayerSummary {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            score: player.score,
            joined_at: format_timestamp(player.joined_at),
        }
    }
}

/// Returned when the host starts the game and the countdown begins.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    pub countdown_secs: u32,
    /// Roster size captured by the ready barrier.
    pub expected_players: usize,
}

/// State of the host-side question timer.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimerStatus {
    pub remaining_secs: u32,
    pub running: bool,
}

/// One answer submission. A missing `answer` means the player's local timer
/// expired without a selection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Index the player believes is live; guards against racing the host.
    pub question_index: usize,
    pub time_taken_ms: u64,
    #[serde(default)]
    pub answer: Option<SubmittedAnswer>,
}

/// Acknowledgment of a ready signal for question 1.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether this signal counted (first signal while the barrier is armed).
    pub counted: bool,
    pub ready_count: usize,
    pub released: bool,
}

/// Feedback returned to the answering player.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// `null` for unscored questions (poll, word cloud, brainstorm).
    pub is_correct: Option<bool>,
    pub score_awarded: u32,
    pub streak: u32,
    pub total_score: u32,
}

/// A row of the live or final leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: Uuid,
    pub name: String,
    pub score: u32,
}

/// Host-side reveal for the current question.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResults {
    pub index: usize,
    pub question: QuestionView,
    /// Correct answer key, serialized for the host reveal screen.
    pub answer_key: serde_json::Value,
    pub answered_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

/// Aggregated report shown on the final results view.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalResults {
    pub game_pin: String,
    pub status: GameStatus,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub questions: Vec<QuestionReport>,
}

/// Per-question aggregation of answer rows.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionReport {
    pub index: usize,
    pub question_id: Uuid,
    pub text: String,
    pub answered_count: usize,
    pub correct_count: usize,
}
