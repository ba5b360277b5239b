//! Player-side operations: the ready signal for question 1, answer
//! submission with scoring, and the leaderboard and final-results reads.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::AnswerEntity, storage::StorageError},
    dto::game::{
        FinalResults, LeaderboardEntry, QuestionReport, ReadyResponse, SubmitAnswerRequest,
        SubmitAnswerResponse,
    },
    error::ServiceError,
    scoring,
    services::{channel_events, game_service},
    state::{
        SharedState,
        barrier::MarkOutcome,
        game::{GameStatus, Player},
        player::PlayerEvent,
    },
};

/// Record that a player has finished loading question 1. Duplicates and
/// late signals are acknowledged without effect.
pub async fn mark_ready(
    state: &SharedState,
    pin: &str,
    player_id: Uuid,
) -> Result<ReadyResponse, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let session = state.require_session(game.id)?;
    let player = find_player(state, game.id, player_id).await?;

    let (outcome, ready_count, released) = {
        let mut barrier = session.barrier.lock().await;
        let outcome = barrier.mark_ready(player_id);
        (outcome, barrier.ready_count(), barrier.is_released())
    };

    if outcome == MarkOutcome::Counted {
        channel_events::ready_for_q1(state, &game.game_pin, player.id, &player.name);
        debug!(game_id = %game.id, %player_id, ready_count, "ready signal counted");
    }

    Ok(ReadyResponse {
        counted: outcome == MarkOutcome::Counted,
        ready_count,
        released,
    })
}

/// Score and record one answer for the live question.
///
/// Exactly one row per (player, question) ever lands in the store: the
/// player machine rejects a second submission up front, and the store's
/// uniqueness constraint catches the race where two requests pass that
/// check concurrently. Both paths degrade to a no-op acknowledgment
/// rather than a user-facing error.
pub async fn submit_answer(
    state: &SharedState,
    pin: &str,
    player_id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    if game.status != GameStatus::Playing {
        return Err(ServiceError::InvalidState(
            "answers are only accepted while the game is playing".into(),
        ));
    }
    if request.question_index != game.current_question_index {
        return Err(ServiceError::InvalidState(format!(
            "question {} is not live",
            request.question_index
        )));
    }

    let session = state.require_session(game.id)?;
    let player = find_player(state, game.id, player_id).await?;
    let quiz = state
        .store()
        .find_quiz(game.quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{}` not found", game.quiz_id)))?;
    let question = quiz
        .question(request.question_index)
        .ok_or_else(|| {
            ServiceError::InvalidState(format!("no question at index {}", request.question_index))
        })?;

    let machine = session
        .player_machine(player_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` has no session")))?;
    let mut machine = machine.lock().await;

    // A lagged machine catches up to the live index first.
    let index = request.question_index;
    let _ = machine.apply(PlayerEvent::QuestionReceived { index });

    if machine.apply(PlayerEvent::AnswerSubmitted { index }).is_err() {
        debug!(game_id = %game.id, %player_id, index, "duplicate submission ignored");
        return Ok(SubmitAnswerResponse {
            is_correct: None,
            score_awarded: 0,
            streak: machine.streak(),
            total_score: player.score,
        });
    }

    // Timeouts on scored questions count as wrong; unscored variants are
    // never judged.
    let is_correct = match &request.answer {
        Some(answer) => question.check_answer(answer),
        None if question.is_scored() => Some(false),
        None => None,
    };

    let score_awarded = if is_correct == Some(true) {
        scoring::score(
            question.points,
            question.time_limit_secs,
            request.time_taken_ms,
            machine.streak(),
        )
    } else {
        scoring::missed_score()
    };

    let record = AnswerEntity {
        id: Uuid::new_v4(),
        player_id,
        question_id: question.id,
        is_correct: is_correct.unwrap_or(false),
        score_awarded,
        time_taken_ms: request.time_taken_ms,
    };
    if let Err(err) = state.store().record_answer(record).await {
        return match err {
            StorageError::DuplicateAnswer { .. } => {
                debug!(game_id = %game.id, %player_id, index, "answer row already present");
                Ok(SubmitAnswerResponse {
                    is_correct: None,
                    score_awarded: 0,
                    streak: machine.streak(),
                    total_score: player.score,
                })
            }
            other => Err(other.into()),
        };
    }

    machine.record_outcome(is_correct);

    let total_score = player.score + score_awarded;
    if score_awarded > 0 {
        state
            .store()
            .update_player_score(player_id, total_score)
            .await?;
    }

    info!(
        game_id = %game.id,
        %player_id,
        index,
        correct = ?is_correct,
        score_awarded,
        "answer recorded"
    );

    Ok(SubmitAnswerResponse {
        is_correct,
        score_awarded,
        streak: machine.streak(),
        total_score,
    })
}

/// Standings ordered by score, ties broken by earliest join.
pub async fn leaderboard(
    state: &SharedState,
    pin: &str,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    let players = state.store().list_players(game.id).await?;
    Ok(rank_players(players.into_iter().map(Into::into).collect()))
}

/// Aggregated report for the final results view. Available once the game
/// has finished.
pub async fn final_results(state: &SharedState, pin: &str) -> Result<FinalResults, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    if game.status != GameStatus::Finished {
        return Err(ServiceError::InvalidState(
            "final results are only available once the game has finished".into(),
        ));
    }

    let quiz = state
        .store()
        .find_quiz(game.quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{}` not found", game.quiz_id)))?;
    let players = state.store().list_players(game.id).await?;
    let answers = state.store().list_answers(game.id).await?;

    let questions = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let rows: Vec<_> = answers
                .iter()
                .filter(|answer| answer.question_id == question.id)
                .collect();
            QuestionReport {
                index,
                question_id: question.id,
                text: question.text.clone(),
                answered_count: rows.len(),
                correct_count: rows.iter().filter(|answer| answer.is_correct).count(),
            }
        })
        .collect();

    Ok(FinalResults {
        game_pin: game.game_pin,
        status: game.status,
        leaderboard: rank_players(players.into_iter().map(Into::into).collect()),
        questions,
    })
}

/// The roster arrives ordered by join time; a stable sort on descending
/// score therefore leaves ties ordered by earliest join.
fn rank_players(mut players: Vec<Player>) -> Vec<LeaderboardEntry> {
    players.sort_by(|a, b| b.score.cmp(&a.score));
    players
        .into_iter()
        .enumerate()
        .map(|(position, player)| LeaderboardEntry {
            rank: position + 1,
            player_id: player.id,
            name: player.name,
            score: player.score,
        })
        .collect()
}

async fn find_player(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<Player, ServiceError> {
    let players = state.store().list_players(game_id).await?;
    players
        .into_iter()
        .find(|player| player.id == player_id)
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn player(name: &str, score: u32, join_seq: u64) -> Player {
        Player {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            name: name.into(),
            score,
            joined_at: OffsetDateTime::now_utc(),
            join_seq,
        }
    }

    #[test]
    fn ranking_orders_by_score_then_join_order() {
        let ranked = rank_players(vec![
            player("alice", 1200, 0),
            player("bob", 2000, 1),
            player("carol", 1200, 2),
        ]);

        assert_eq!(ranked[0].name, "bob");
        assert_eq!(ranked[0].rank, 1);
        // Alice joined before Carol, so she wins the tie.
        assert_eq!(ranked[1].name, "alice");
        assert_eq!(ranked[2].name, "carol");
        assert_eq!(ranked[2].rank, 3);
    }
}
