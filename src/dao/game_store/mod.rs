pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{AnswerEntity, GameEntity, PlayerEntity, QuizListItemEntity};
use crate::dao::storage::StorageResult;
use crate::state::game::GameStatus;
use crate::state::quiz::Quiz;

/// Abstraction over the persistence layer for quizzes, games, players, and
/// answers. The remote database of a production deployment sits behind this
/// trait; the bundled [`memory::MemoryStore`] implements it in-process.
pub trait GameStore: Send + Sync {
    fn save_quiz(&self, quiz: Quiz) -> BoxFuture<'static, StorageResult<()>>;
    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Quiz>>>;
    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizListItemEntity>>>;

    /// Create a game in `waiting` status, allocating a PIN unique among
    /// non-finished games. Retries internally on collision.
    fn create_game(
        &self,
        quiz_id: Uuid,
        host_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn find_game_by_pin(&self, pin: String)
    -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Monotonic status update. Setting `Finished` stamps `ended_at` and frees
    /// the PIN for reuse.
    fn update_game_status(
        &self,
        id: Uuid,
        status: GameStatus,
        question_index: Option<usize>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Delete a game and cascade to its players and answers.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    fn add_player(
        &self,
        game_id: Uuid,
        name: String,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    /// Roster ordered by join time.
    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn update_player_score(
        &self,
        player_id: Uuid,
        new_score: u32,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Fails with [`StorageError::DuplicateAnswer`] when the (player,
    /// question) pair already has a row.
    ///
    /// [`StorageError::DuplicateAnswer`]: crate::dao::storage::StorageError::DuplicateAnswer
    fn record_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn list_answers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
