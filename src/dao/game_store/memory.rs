use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use rand::Rng;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::game_store::GameStore;
use crate::dao::models::{AnswerEntity, GameEntity, PlayerEntity, QuizListItemEntity};
use crate::dao::storage::{StorageError, StorageResult};
use crate::state::game::GameStatus;
use crate::state::quiz::Quiz;

/// Collision retries before PIN allocation gives up.
const MAX_PIN_ATTEMPTS: u32 = 64;

/// In-process storage backend. Per-row write atomicity comes from the
/// underlying concurrent maps; the uniqueness constraint on
/// (player_id, question_id) backs the answer idempotency guard.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    quizzes: DashMap<Uuid, Quiz>,
    games: DashMap<Uuid, GameEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    answers: DashMap<(Uuid, Uuid), AnswerEntity>,
    /// PINs of non-finished games; the source of PIN uniqueness.
    active_pins: DashMap<String, Uuid>,
    join_seq: AtomicU64,
    pin_length: u32,
}

impl MemoryStore {
    pub fn new(pin_length: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                quizzes: DashMap::new(),
                games: DashMap::new(),
                players: DashMap::new(),
                answers: DashMap::new(),
                active_pins: DashMap::new(),
                join_seq: AtomicU64::new(0),
                pin_length,
            }),
        }
    }
}

impl Inner {
    fn random_pin(&self) -> String {
        let space = 10u64.pow(self.pin_length);
        let value = rand::rng().random_range(0..space);
        format!("{value:0width$}", width = self.pin_length as usize)
    }

    fn create_game(&self, quiz_id: Uuid, host_id: Option<Uuid>) -> StorageResult<GameEntity> {
        for _ in 0..MAX_PIN_ATTEMPTS {
            let pin = self.random_pin();
            match self.active_pins.entry(pin.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let game = GameEntity {
                        id: Uuid::new_v4(),
                        game_pin: pin,
                        quiz_id,
                        host_id,
                        status: GameStatus::Waiting,
                        current_question_index: 0,
                        created_at: OffsetDateTime::now_utc(),
                        ended_at: None,
                    };
                    slot.insert(game.id);
                    self.games.insert(game.id, game.clone());
                    return Ok(game);
                }
            }
        }

        Err(StorageError::PinSpaceExhausted {
            attempts: MAX_PIN_ATTEMPTS,
        })
    }

    fn update_game_status(
        &self,
        id: Uuid,
        status: GameStatus,
        question_index: Option<usize>,
    ) -> StorageResult<GameEntity> {
        let mut game = self
            .games
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("game", id))?;

        // Finished games are immutable; everything else may only move forward.
        if game.status == GameStatus::Finished || status < game.status {
            return Err(StorageError::NonMonotonicStatus {
                from: game.status,
                to: status,
            });
        }

        game.status = status;
        if let Some(index) = question_index {
            game.current_question_index = index;
        }
        if status == GameStatus::Finished {
            game.ended_at = Some(OffsetDateTime::now_utc());
            self.active_pins.remove(&game.game_pin);
        }

        Ok(game.clone())
    }

    fn add_player(&self, game_id: Uuid, name: String) -> StorageResult<PlayerEntity> {
        let game = self
            .games
            .get(&game_id)
            .ok_or_else(|| StorageError::not_found("game", game_id))?;

        if name.trim().is_empty() {
            return Err(StorageError::JoinRejected {
                game_id,
                reason: "player name must not be empty".into(),
            });
        }

        if game.status != GameStatus::Waiting {
            return Err(StorageError::JoinRejected {
                game_id,
                reason: format!("game is not accepting players (status {:?})", game.status),
            });
        }
        drop(game);

        let player = PlayerEntity {
            id: Uuid::new_v4(),
            game_id,
            name,
            score: 0,
            joined_at: OffsetDateTime::now_utc(),
            join_seq: self.join_seq.fetch_add(1, Ordering::Relaxed),
        };
        self.players.insert(player.id, player.clone());
        Ok(player)
    }

    fn list_players(&self, game_id: Uuid) -> Vec<PlayerEntity> {
        let mut players: Vec<PlayerEntity> = self
            .players
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.clone())
            .collect();
        players.sort_by_key(|player| player.join_seq);
        players
    }

    fn record_answer(&self, answer: AnswerEntity) -> StorageResult<()> {
        if !self.players.contains_key(&answer.player_id) {
            return Err(StorageError::not_found("player", answer.player_id));
        }

        match self.answers.entry((answer.player_id, answer.question_id)) {
            Entry::Occupied(_) => Err(StorageError::DuplicateAnswer {
                player_id: answer.player_id,
                question_id: answer.question_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(answer);
                Ok(())
            }
        }
    }

    fn list_answers(&self, game_id: Uuid) -> Vec<AnswerEntity> {
        let player_ids: Vec<Uuid> = self
            .players
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.id)
            .collect();

        self.answers
            .iter()
            .filter(|entry| player_ids.contains(&entry.player_id))
            .map(|entry| entry.clone())
            .collect()
    }

    fn delete_game(&self, id: Uuid) -> bool {
        let Some((_, game)) = self.games.remove(&id) else {
            return false;
        };
        self.active_pins.remove(&game.game_pin);

        let player_ids: Vec<Uuid> = self
            .players
            .iter()
            .filter(|entry| entry.game_id == id)
            .map(|entry| entry.id)
            .collect();
        for player_id in player_ids {
            self.players.remove(&player_id);
            self.answers.retain(|(owner, _), _| *owner != player_id);
        }
        true
    }
}

impl GameStore for MemoryStore {
    fn save_quiz(&self, quiz: Quiz) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.quizzes.insert(quiz.id, quiz);
            Ok(())
        })
    }

    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Quiz>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.quizzes.get(&id).map(|entry| entry.clone())) })
    }

    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizListItemEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .quizzes
                .iter()
                .map(|entry| QuizListItemEntity {
                    id: entry.id,
                    title: entry.title.clone(),
                    question_count: entry.questions.len(),
                })
                .collect())
        })
    }

    fn create_game(
        &self,
        quiz_id: Uuid,
        host_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.create_game(quiz_id, host_id) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.games.get(&id).map(|entry| entry.clone())) })
    }

    fn find_game_by_pin(
        &self,
        pin: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            // Only non-finished games are reachable by PIN.
            let Some(id) = inner.active_pins.get(&pin).map(|entry| *entry.value()) else {
                return Ok(None);
            };
            Ok(inner.games.get(&id).map(|entry| entry.clone()))
        })
    }

    fn update_game_status(
        &self,
        id: Uuid,
        status: GameStatus,
        question_index: Option<usize>,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.update_game_status(id, status, question_index) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.delete_game(id)) })
    }

    fn add_player(
        &self,
        game_id: Uuid,
        name: String,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.add_player(game_id, name) })
    }

    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.list_players(game_id)) })
    }

    fn update_player_score(
        &self,
        player_id: Uuid,
        new_score: u32,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut player = inner
                .players
                .get_mut(&player_id)
                .ok_or_else(|| StorageError::not_found("player", player_id))?;
            player.score = new_score;
            Ok(())
        })
    }

    fn record_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.record_answer(answer) })
    }

    fn list_answers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.list_answers(game_id)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}
