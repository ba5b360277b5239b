//! End-to-end session flows over the service layer and the in-memory store:
//! lobby, countdown, ready barrier, questions, scoring, and final results.

use std::{sync::Arc, time::Duration};

use tokio::time::{sleep, timeout};
use uuid::Uuid;

use live_quiz_back::{
    config::AppConfig,
    dao::game_store::{GameStore, memory::MemoryStore},
    dto::{
        game::{CreateGameRequest, SubmitAnswerRequest},
        quiz::{CreateQuizRequest, QuestionInput},
    },
    services::{game_service, host_service, player_service, quiz_service},
    state::{
        AppState, SharedState,
        channel::GameChannelEvent,
        game::GameStatus,
        quiz::{QuestionKind, SubmittedAnswer},
    },
};

fn test_state() -> SharedState {
    let config = AppConfig {
        ready_barrier_timeout: Duration::from_millis(300),
        ..AppConfig::default()
    };
    AppState::new(Arc::new(MemoryStore::new(config.pin_length)), config)
}

fn multiple_choice(text: &str) -> QuestionInput {
    QuestionInput {
        text: text.into(),
        time_limit_secs: 20,
        points: 1000,
        media_url: None,
        kind: QuestionKind::MultipleChoice {
            options: vec!["red".into(), "green".into(), "blue".into()],
            correct_option: 1,
        },
    }
}

fn poll(text: &str) -> QuestionInput {
    QuestionInput {
        text: text.into(),
        time_limit_secs: 20,
        points: 0,
        media_url: None,
        kind: QuestionKind::Poll {
            options: vec!["cats".into(), "dogs".into()],
        },
    }
}

async fn store_quiz(state: &SharedState, questions: Vec<QuestionInput>) -> Uuid {
    quiz_service::create_quiz(
        state,
        CreateQuizRequest {
            title: "Colors".into(),
            description: String::new(),
            questions,
            created_by: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn create_game(state: &SharedState, quiz_id: Uuid) -> String {
    game_service::create_game(
        state,
        CreateGameRequest {
            quiz_id,
            host_id: None,
        },
    )
    .await
    .unwrap()
    .game_pin
}

async fn wait_for_status(state: &SharedState, pin: &str, wanted: GameStatus) {
    timeout(Duration::from_secs(3), async {
        loop {
            let snapshot = game_service::snapshot(state, pin).await.unwrap();
            if snapshot.status == wanted {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("game never reached {wanted:?}"));
}

fn correct_answer(elapsed_ms: u64) -> SubmitAnswerRequest {
    SubmitAnswerRequest {
        question_index: 0,
        time_taken_ms: elapsed_ms,
        answer: Some(SubmittedAnswer::Choice { option: 1 }),
    }
}

#[tokio::test]
async fn full_session_from_lobby_to_final_results() {
    let state = test_state();
    let quiz_id = store_quiz(
        &state,
        vec![
            multiple_choice("q1"),
            multiple_choice("q2"),
            multiple_choice("q3"),
        ],
    )
    .await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    let bob = game_service::join_game(&state, &pin, "Bob").await.unwrap();

    let mut events = state.channel().subscribe(&pin);

    let started = host_service::start_game(&state, &pin).await.unwrap();
    assert_eq!(started.expected_players, 2);

    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    let release = player_service::mark_ready(&state, &pin, bob.player_id)
        .await
        .unwrap();
    assert!(release.released);

    wait_for_status(&state, &pin, GameStatus::Playing).await;

    // Countdown precedes the start, which precedes question 1.
    let mut saw_countdown = false;
    let mut saw_started = false;
    loop {
        match timeout(Duration::from_secs(2), events.recv()).await.unwrap() {
            Ok(GameChannelEvent::Countdown { .. }) => saw_countdown = true,
            Ok(GameChannelEvent::GameStarted { .. }) => {
                assert!(saw_countdown);
                saw_started = true;
            }
            Ok(GameChannelEvent::Question { index }) => {
                assert!(saw_started);
                assert_eq!(index, 0);
                break;
            }
            Ok(_) => {}
            Err(err) => panic!("event stream closed early: {err}"),
        }
    }

    // Question 1: Alice answers correctly after 2 s, Bob times out.
    let scored = player_service::submit_answer(&state, &pin, alice.player_id, correct_answer(2_000))
        .await
        .unwrap();
    assert_eq!(scored.is_correct, Some(true));
    assert_eq!(scored.score_awarded, 1180);
    assert_eq!(scored.streak, 1);

    let missed = player_service::submit_answer(
        &state,
        &pin,
        bob.player_id,
        SubmitAnswerRequest {
            question_index: 0,
            time_taken_ms: 20_000,
            answer: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(missed.is_correct, Some(false));
    assert_eq!(missed.score_awarded, 0);
    assert_eq!(missed.streak, 0);

    let results = host_service::show_results(&state, &pin).await.unwrap();
    assert_eq!(results.answered_count, 2);
    assert_eq!(results.correct_count, 1);
    assert_eq!(results.incorrect_count, 1);

    // Question 2: Alice keeps her streak, Bob answers instantly.
    let snapshot = host_service::next_question(&state, &pin).await.unwrap();
    assert_eq!(snapshot.current_question_index, 1);

    let streaked = player_service::submit_answer(
        &state,
        &pin,
        alice.player_id,
        SubmitAnswerRequest {
            question_index: 1,
            time_taken_ms: 2_000,
            answer: Some(SubmittedAnswer::Choice { option: 1 }),
        },
    )
    .await
    .unwrap();
    // (1000 + 180) * 1.1, truncated.
    assert_eq!(streaked.score_awarded, 1298);
    assert_eq!(streaked.total_score, 2478);

    let bob_second = player_service::submit_answer(
        &state,
        &pin,
        bob.player_id,
        SubmitAnswerRequest {
            question_index: 1,
            time_taken_ms: 0,
            answer: Some(SubmittedAnswer::Choice { option: 1 }),
        },
    )
    .await
    .unwrap();
    assert_eq!(bob_second.score_awarded, 1200);

    // Question 3: Alice picks the wrong option, Bob never answers.
    host_service::show_results(&state, &pin).await.unwrap();
    host_service::next_question(&state, &pin).await.unwrap();

    let wrong = player_service::submit_answer(
        &state,
        &pin,
        alice.player_id,
        SubmitAnswerRequest {
            question_index: 2,
            time_taken_ms: 4_000,
            answer: Some(SubmittedAnswer::Choice { option: 0 }),
        },
    )
    .await
    .unwrap();
    assert_eq!(wrong.is_correct, Some(false));
    assert_eq!(wrong.score_awarded, 0);
    assert_eq!(wrong.streak, 0);

    host_service::show_results(&state, &pin).await.unwrap();
    let final_snapshot = host_service::next_question(&state, &pin).await.unwrap();
    assert_eq!(final_snapshot.status, GameStatus::Finished);

    let results = player_service::final_results(&state, &pin).await.unwrap();
    assert_eq!(results.leaderboard.len(), 2);
    assert_eq!(results.leaderboard[0].name, "Alice");
    assert_eq!(results.leaderboard[0].score, 2478);
    assert_eq!(results.leaderboard[1].name, "Bob");
    assert_eq!(results.leaderboard[1].score, 1200);
    assert_eq!(results.questions.len(), 3);
    assert_eq!(results.questions[0].answered_count, 2);
    assert_eq!(results.questions[0].correct_count, 1);
    assert_eq!(results.questions[2].answered_count, 1);
    assert_eq!(results.questions[2].correct_count, 0);
}

#[tokio::test]
async fn barrier_timeout_starts_the_game_without_ready_signals() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    game_service::join_game(&state, &pin, "Alice").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();

    // Nobody signals ready; the fallback fires after the configured timeout.
    wait_for_status(&state, &pin, GameStatus::Playing).await;
}

#[tokio::test]
async fn joins_are_rejected_once_the_game_leaves_the_lobby() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    game_service::join_game(&state, &pin, "Alice").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();

    let err = game_service::join_game(&state, &pin, "Latecomer")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already started"));
}

#[tokio::test]
async fn starting_an_empty_lobby_is_rejected() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    assert!(host_service::start_game(&state, &pin).await.is_err());
}

#[tokio::test]
async fn duplicate_submission_is_acknowledged_without_effect() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();
    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    wait_for_status(&state, &pin, GameStatus::Playing).await;

    let first = player_service::submit_answer(&state, &pin, alice.player_id, correct_answer(1_000))
        .await
        .unwrap();
    assert_eq!(first.is_correct, Some(true));

    // The UI race replays the request; the second copy changes nothing.
    let replay = player_service::submit_answer(&state, &pin, alice.player_id, correct_answer(1_000))
        .await
        .unwrap();
    assert_eq!(replay.score_awarded, 0);
    assert_eq!(replay.total_score, first.total_score);

    let game = game_service::find_game_by_pin(&state, &pin).await.unwrap();
    let answers = state.store().list_answers(game.id).await.unwrap();
    assert_eq!(answers.len(), 1);
}

#[tokio::test]
async fn answers_for_a_stale_question_index_are_rejected() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1"), multiple_choice("q2")]).await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();
    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    wait_for_status(&state, &pin, GameStatus::Playing).await;

    let err = player_service::submit_answer(
        &state,
        &pin,
        alice.player_id,
        SubmitAnswerRequest {
            question_index: 1,
            time_taken_ms: 1_000,
            answer: Some(SubmittedAnswer::Choice { option: 1 }),
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("not live"));
}

#[tokio::test]
async fn snapshot_always_reflects_the_persisted_question_index() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1"), multiple_choice("q2")]).await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    let mut events = state.channel().subscribe(&pin);
    host_service::start_game(&state, &pin).await.unwrap();
    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    wait_for_status(&state, &pin, GameStatus::Playing).await;

    player_service::submit_answer(&state, &pin, alice.player_id, correct_answer(1_000))
        .await
        .unwrap();
    host_service::show_results(&state, &pin).await.unwrap();
    host_service::next_question(&state, &pin).await.unwrap();

    // Every question broadcast is preceded by the store write, so a client
    // that reacts to the event (or polls instead) always finds the index.
    loop {
        match timeout(Duration::from_secs(2), events.recv()).await.unwrap() {
            Ok(GameChannelEvent::Question { index }) => {
                let snapshot = game_service::snapshot(&state, &pin).await.unwrap();
                assert!(snapshot.current_question_index >= index);
                if index == 1 {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => panic!("event stream closed early: {err}"),
        }
    }
}

#[tokio::test]
async fn unscored_questions_preserve_the_streak() {
    let state = test_state();
    let quiz_id = store_quiz(
        &state,
        vec![multiple_choice("q1"), poll("q2"), multiple_choice("q3")],
    )
    .await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();
    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    wait_for_status(&state, &pin, GameStatus::Playing).await;

    let first = player_service::submit_answer(&state, &pin, alice.player_id, correct_answer(2_000))
        .await
        .unwrap();
    assert_eq!(first.streak, 1);

    host_service::show_results(&state, &pin).await.unwrap();
    host_service::next_question(&state, &pin).await.unwrap();

    let vote = player_service::submit_answer(
        &state,
        &pin,
        alice.player_id,
        SubmitAnswerRequest {
            question_index: 1,
            time_taken_ms: 3_000,
            answer: Some(SubmittedAnswer::Choice { option: 0 }),
        },
    )
    .await
    .unwrap();
    assert_eq!(vote.is_correct, None);
    assert_eq!(vote.score_awarded, 0);
    assert_eq!(vote.streak, 1);

    host_service::show_results(&state, &pin).await.unwrap();
    host_service::next_question(&state, &pin).await.unwrap();

    let third = player_service::submit_answer(
        &state,
        &pin,
        alice.player_id,
        SubmitAnswerRequest {
            question_index: 2,
            time_taken_ms: 2_000,
            answer: Some(SubmittedAnswer::Choice { option: 1 }),
        },
    )
    .await
    .unwrap();
    // Streak multiplier survived the poll: (1000 + 180) * 1.1.
    assert_eq!(third.score_awarded, 1298);
    assert_eq!(third.streak, 2);
}

#[tokio::test]
async fn leaderboard_breaks_score_ties_by_join_order() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    let bob = game_service::join_game(&state, &pin, "Bob").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();
    player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    player_service::mark_ready(&state, &pin, bob.player_id)
        .await
        .unwrap();
    wait_for_status(&state, &pin, GameStatus::Playing).await;

    for player_id in [alice.player_id, bob.player_id] {
        let scored = player_service::submit_answer(&state, &pin, player_id, correct_answer(5_000))
            .await
            .unwrap();
        assert_eq!(scored.is_correct, Some(true));
    }

    let standings = player_service::leaderboard(&state, &pin).await.unwrap();
    assert_eq!(standings[0].score, standings[1].score);
    assert_eq!(standings[0].name, "Alice");
    assert_eq!(standings[0].rank, 1);
    assert_eq!(standings[1].name, "Bob");
    assert_eq!(standings[1].rank, 2);
}

#[tokio::test]
async fn final_results_are_unavailable_before_the_game_ends() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;
    game_service::join_game(&state, &pin, "Alice").await.unwrap();

    let err = player_service::final_results(&state, &pin).await.unwrap_err();
    assert!(err.to_string().contains("finished"));
}

#[tokio::test]
async fn duplicate_ready_signals_do_not_release_the_barrier_early() {
    let state = test_state();
    let quiz_id = store_quiz(&state, vec![multiple_choice("q1")]).await;
    let pin = create_game(&state, quiz_id).await;

    let alice = game_service::join_game(&state, &pin, "Alice").await.unwrap();
    let bob = game_service::join_game(&state, &pin, "Bob").await.unwrap();
    host_service::start_game(&state, &pin).await.unwrap();

    let first = player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    assert!(first.counted);
    assert!(!first.released);

    let repeat = player_service::mark_ready(&state, &pin, alice.player_id)
        .await
        .unwrap();
    assert!(!repeat.counted);
    assert!(!repeat.released);
    assert_eq!(repeat.ready_count, 1);

    let release = player_service::mark_ready(&state, &pin, bob.player_id)
        .await
        .unwrap();
    assert!(release.released);
}
