use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

use crate::state::game::GameStatus;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    /// The (player, question) pair already has a recorded answer. This is the
    /// idempotency guard against duplicate submissions.
    #[error("answer already recorded for player `{player_id}` on question `{question_id}`")]
    DuplicateAnswer { player_id: Uuid, question_id: Uuid },
    /// Game status updates must move forward through the lifecycle.
    #[error("game status cannot move from {from:?} to {to:?}")]
    NonMonotonicStatus { from: GameStatus, to: GameStatus },
    /// PIN allocation gave up after repeated collisions with active games.
    #[error("could not allocate a unique game pin after {attempts} attempts")]
    PinSpaceExhausted { attempts: u32 },
    /// The game exists but does not accept the player insert.
    #[error("cannot join game `{game_id}`: {reason}")]
    JoinRejected { game_id: Uuid, reason: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
