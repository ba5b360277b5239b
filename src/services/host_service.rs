//! Host-side control flow of a live session: start with its countdown and
//! ready barrier, question advancement, reveals, and the question timer.
//!
//! Every phase change runs through [`HostSession::run_transition`], so the
//! game row is persisted before the matching event reaches the channel.
//! Clients that miss a broadcast recover by polling the snapshot.

use std::{sync::Arc, time::Duration};

use serde_json::json;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, info, warn};

use crate::{
    dao::game_store::GameStore,
    dto::game::{GameSnapshot, LeaderboardEntry, QuestionResults, StartGameResponse, TimerStatus},
    error::ServiceError,
    services::{channel_events, game_service, player_service},
    state::{
        HostSession, SharedState,
        game::{Game, GameStatus},
        host::HostEvent,
        player::PlayerEvent,
        quiz::{Question, QuestionKind, Quiz},
        timer::TimerTick,
    },
};

/// Move the game out of the lobby: persist `starting`, broadcast the
/// countdown, arm the ready barrier over the current roster, and spawn the
/// task that releases it (or times out) and begins play.
pub async fn start_game(
    state: &SharedState,
    pin: &str,
) -> Result<StartGameResponse, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;

    let players = state.store().list_players(game.id).await?;
    if players.is_empty() {
        return Err(ServiceError::InvalidState(
            "cannot start a game with no players".into(),
        ));
    }

    let store = state.store().clone();
    let game_id = game.id;
    session
        .run_transition(HostEvent::StartGame, || async move {
            store
                .update_game_status(game_id, GameStatus::Starting, None)
                .await?;
            Ok(())
        })
        .await?;

    let countdown_secs = state.config().countdown_secs;
    channel_events::countdown(state, &game.game_pin, countdown_secs);

    let expected_players = players.len();
    let mut released = session.barrier.lock().await.arm(expected_players);
    info!(
        game_id = %game.id,
        pin = %game.game_pin,
        expected_players,
        "game starting; awaiting ready signals"
    );

    let barrier_timeout = state.config().ready_barrier_timeout;
    let task_state = state.clone();
    let task_session = session.clone();
    tokio::spawn(async move {
        let on_time = tokio::select! {
            result = released.wait_for(|ready| *ready) => result.is_ok(),
            _ = sleep(barrier_timeout) => false,
        };
        if !on_time {
            warn!(
                game_id = %task_session.game_id,
                "ready barrier timed out; starting without full synchronization"
            );
            task_session.barrier.lock().await.force_release();
        }
        if let Err(err) = begin_play(&task_state, &task_session).await {
            warn!(game_id = %task_session.game_id, error = %err, "failed to begin play");
        }
    });

    Ok(StartGameResponse {
        countdown_secs,
        expected_players,
    })
}

/// Barrier released: persist `playing` at question 0, then broadcast the
/// start and the first question and arm the timer.
async fn begin_play(state: &SharedState, session: &Arc<HostSession>) -> Result<(), ServiceError> {
    let store = state.store().clone();
    let game_id = session.game_id;
    let (entity, _) = session
        .run_transition(HostEvent::BarrierReleased, || async move {
            let entity = store
                .update_game_status(game_id, GameStatus::Playing, Some(0))
                .await?;
            Ok(entity)
        })
        .await?;

    channel_events::game_started(state, &session.pin);
    channel_events::question(state, &session.pin, 0);
    drive_players(session, PlayerEvent::QuestionReceived { index: 0 }).await;

    let quiz = load_quiz(state, &Game::from(entity)).await?;
    if let Some(question) = quiz.question(0) {
        spawn_question_timer(state, session, question.time_limit_secs).await;
    }
    info!(game_id = %session.game_id, "play began at question 0");
    Ok(())
}

/// Reveal results for the live question. Stops the timer; the timer expiry
/// path calls this too.
pub async fn show_results(state: &SharedState, pin: &str) -> Result<QuestionResults, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;

    session.timer.lock().await.stop();
    session
        .run_transition(HostEvent::ShowResults, || async { Ok(()) })
        .await?;

    question_results(state, pin).await
}

/// Read-only view of the current question's results, for the host reveal
/// screen and the results polling endpoint.
pub async fn question_results(
    state: &SharedState,
    pin: &str,
) -> Result<QuestionResults, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let quiz = load_quiz(state, &game).await?;
    let index = game.current_question_index;
    let question = quiz
        .question(index)
        .ok_or_else(|| ServiceError::InvalidState(format!("no question at index {index}")))?;

    let answers = state.store().list_answers(game.id).await?;
    let answered: Vec<_> = answers
        .iter()
        .filter(|answer| answer.question_id == question.id)
        .collect();
    let correct_count = answered.iter().filter(|answer| answer.is_correct).count();

    Ok(QuestionResults {
        index,
        question: question.into(),
        answer_key: answer_key(question),
        answered_count: answered.len(),
        correct_count,
        incorrect_count: answered.len() - correct_count,
    })
}

/// Transition the host view from results to the intermediate leaderboard.
pub async fn show_leaderboard(
    state: &SharedState,
    pin: &str,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;

    session
        .run_transition(HostEvent::ShowLeaderboard, || async { Ok(()) })
        .await?;

    player_service::leaderboard(state, pin).await
}

/// Advance to the next question, or finish the game when none remain. The
/// new index is persisted before `question{index}` is broadcast, so a client
/// that misses the event still lands on the right question via the snapshot.
pub async fn next_question(state: &SharedState, pin: &str) -> Result<GameSnapshot, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;
    let quiz = load_quiz(state, &game).await?;

    let next = game.current_question_index + 1;
    let entity = if next < quiz.questions.len() {
        let store = state.store().clone();
        let game_id = game.id;
        let (entity, _) = session
            .run_transition(HostEvent::NextQuestion, || async move {
                let entity = store
                    .update_game_status(game_id, GameStatus::Playing, Some(next))
                    .await?;
                Ok(entity)
            })
            .await?;

        channel_events::question(state, &game.game_pin, next);
        drive_players(&session, PlayerEvent::QuestionReceived { index: next }).await;

        if let Some(question) = quiz.question(next) {
            spawn_question_timer(state, &session, question.time_limit_secs).await;
        }
        info!(game_id = %game.id, index = next, "advanced to next question");
        entity
    } else {
        let store = state.store().clone();
        let game_id = game.id;
        let (entity, _) = session
            .run_transition(HostEvent::Finish, || async move {
                let entity = store
                    .update_game_status(game_id, GameStatus::Finished, None)
                    .await?;
                Ok(entity)
            })
            .await?;

        channel_events::game_finished(state, &game.game_pin);
        drive_players(&session, PlayerEvent::GameFinished).await;
        info!(game_id = %game.id, "game finished");
        entity
    };

    let updated = Game::from(entity);
    let players = state.store().list_players(updated.id).await?;
    Ok(GameSnapshot::new(&updated, players.len()))
}

/// Freeze the host timer. Host-local: players' own countdowns keep running.
pub async fn pause_timer(state: &SharedState, pin: &str) -> Result<TimerStatus, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;

    let mut timer = session.timer.lock().await;
    timer.pause();
    debug!(game_id = %game.id, remaining = timer.remaining_secs(), "host timer paused");
    Ok(TimerStatus {
        remaining_secs: timer.remaining_secs(),
        running: timer.is_running(),
    })
}

/// Continue the host timer from where it was paused.
pub async fn resume_timer(state: &SharedState, pin: &str) -> Result<TimerStatus, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;

    let resumed = {
        let mut timer = session.timer.lock().await;
        timer.resume()
    };
    if resumed {
        spawn_tick_task(state, &session).await;
    }

    let timer = session.timer.lock().await;
    Ok(TimerStatus {
        remaining_secs: timer.remaining_secs(),
        running: timer.is_running(),
    })
}

async fn load_quiz(state: &SharedState, game: &Game) -> Result<Quiz, ServiceError> {
    state
        .store()
        .find_quiz(game.quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{}` not found", game.quiz_id)))
}

/// Apply one event to every registered player machine. Replays are expected;
/// genuinely invalid moves only get a debug line since the store-side
/// idempotency is the real guard.
async fn drive_players(session: &Arc<HostSession>, event: PlayerEvent) {
    for (player_id, machine) in session.player_machines() {
        if let Err(err) = machine.lock().await.apply(event) {
            debug!(%player_id, error = %err, "player machine ignored host event");
        }
    }
}

/// Arm the timer for a fresh question and start its tick task.
async fn spawn_question_timer(state: &SharedState, session: &Arc<HostSession>, secs: u32) {
    session.timer.lock().await.arm(secs);
    spawn_tick_task(state, session).await;
}

/// One-second tick loop. On expiry the reveal runs automatically; if the
/// host already revealed by hand the resulting phase error is ignored.
async fn spawn_tick_task(state: &SharedState, session: &Arc<HostSession>) {
    let task_state = state.clone();
    let task_session = session.clone();
    let handle = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let outcome = task_session.timer.lock().await.tick();
            match outcome {
                TimerTick::Continue(remaining) => {
                    debug!(game_id = %task_session.game_id, remaining, "question timer tick");
                }
                TimerTick::Expired => {
                    info!(game_id = %task_session.game_id, "question timer expired");
                    if let Err(err) = show_results(&task_state, &task_session.pin).await {
                        debug!(
                            game_id = %task_session.game_id,
                            error = %err,
                            "automatic reveal skipped"
                        );
                    }
                    break;
                }
                TimerTick::Stopped => break,
            }
        }
    });
    session.timer.lock().await.attach_task(handle.abort_handle());
}

/// Serialized answer key for the host reveal. `null` for unscored variants.
fn answer_key(question: &Question) -> serde_json::Value {
    match &question.kind {
        QuestionKind::MultipleChoice { correct_option, .. } => {
            json!({ "correct_option": correct_option })
        }
        QuestionKind::TrueFalse { correct } => json!({ "correct": correct }),
        QuestionKind::OpenEnded { accepted_answers } => {
            json!({ "accepted_answers": accepted_answers })
        }
        QuestionKind::Puzzle { correct_order, .. } => json!({ "correct_order": correct_order }),
        QuestionKind::Slider {
            correct_value,
            tolerance,
            ..
        } => json!({ "correct_value": correct_value, "tolerance": tolerance }),
        QuestionKind::Hotspot { regions } => json!({ "regions": regions }),
        QuestionKind::Poll { .. }
        | QuestionKind::WordCloud {}
        | QuestionKind::Brainstorm {} => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn answer_key_exposes_the_hidden_fields() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "q".into(),
            time_limit_secs: 10,
            points: 100,
            media_url: None,
            kind: QuestionKind::MultipleChoice {
                options: vec!["a".into(), "b".into()],
                correct_option: 1,
            },
        };
        assert_eq!(answer_key(&question), json!({ "correct_option": 1 }));
    }

    #[test]
    fn unscored_variants_have_no_answer_key() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "q".into(),
            time_limit_secs: 10,
            points: 0,
            media_url: None,
            kind: QuestionKind::Poll {
                options: vec!["a".into(), "b".into()],
            },
        };
        assert_eq!(answer_key(&question), serde_json::Value::Null);
    }
}
