use thiserror::Error;

/// Phases a single player moves through during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// Joined, waiting for the game to start.
    Waiting,
    /// A question is live and this player has not answered it yet.
    Question { index: usize },
    /// Answered (or timed out); showing feedback until the next broadcast.
    Result { index: usize },
    /// Session over.
    Finished,
}

/// Events driving a player machine. `QuestionReceived` mirrors the
/// `question{index}` broadcast and must tolerate at-least-once delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    QuestionReceived { index: usize },
    /// Exactly one submission (or timeout) per live question.
    AnswerSubmitted { index: usize },
    GameFinished,
}

/// Outcome of applying an event: either the phase changed, or the event was a
/// harmless replay and nothing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Changed(PlayerPhase),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("player event {event:?} is invalid in phase {phase:?}")]
pub struct InvalidPlayerTransition {
    pub phase: PlayerPhase,
    pub event: PlayerEvent,
}

/// Per-player session state machine, tracked server-side so a second answer
/// for the same question is rejected before it ever reaches the store.
#[derive(Debug, Clone)]
pub struct PlayerStateMachine {
    phase: PlayerPhase,
    /// Consecutive correct answers; the scoring multiplier input.
    streak: u32,
}

impl Default for PlayerStateMachine {
    fn default() -> Self {
        Self {
            phase: PlayerPhase::Waiting,
            streak: 0,
        }
    }
}

impl PlayerStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Record the outcome of a scored answer, updating the streak. Unscored
    /// questions leave the streak untouched.
    pub fn record_outcome(&mut self, correct: Option<bool>) {
        match correct {
            Some(true) => self.streak += 1,
            Some(false) => self.streak = 0,
            None => {}
        }
    }

    /// Apply an event. Replayed broadcasts (same or older question index,
    /// repeated finish) are reported as [`Advance::Ignored`]; genuinely
    /// invalid moves, like answering twice, are errors.
    pub fn apply(&mut self, event: PlayerEvent) -> Result<Advance, InvalidPlayerTransition> {
        let next = match (self.phase, event) {
            (PlayerPhase::Waiting, PlayerEvent::QuestionReceived { index }) => {
                // Mid-session joins land directly on the current index.
                PlayerPhase::Question { index }
            }
            (PlayerPhase::Question { index: current }, PlayerEvent::QuestionReceived { index }) => {
                if index <= current {
                    return Ok(Advance::Ignored);
                }
                // Lagged past a result; resynchronize with the host.
                PlayerPhase::Question { index }
            }
            (PlayerPhase::Result { index: current }, PlayerEvent::QuestionReceived { index }) => {
                if index <= current {
                    return Ok(Advance::Ignored);
                }
                PlayerPhase::Question { index }
            }
            (PlayerPhase::Finished, PlayerEvent::QuestionReceived { .. }) => {
                return Ok(Advance::Ignored);
            }
            (PlayerPhase::Question { index: current }, PlayerEvent::AnswerSubmitted { index })
                if index == current =>
            {
                PlayerPhase::Result { index }
            }
            (PlayerPhase::Finished, PlayerEvent::GameFinished) => return Ok(Advance::Ignored),
            (_, PlayerEvent::GameFinished) => PlayerPhase::Finished,
            (phase, event) => return Err(InvalidPlayerTransition { phase, event }),
        };

        self.phase = next;
        Ok(Advance::Changed(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_then_follows_question_broadcasts() {
        let mut sm = PlayerStateMachine::new();
        assert_eq!(sm.phase(), PlayerPhase::Waiting);

        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 0 }).unwrap(),
            Advance::Changed(PlayerPhase::Question { index: 0 })
        );
        assert_eq!(
            sm.apply(PlayerEvent::AnswerSubmitted { index: 0 }).unwrap(),
            Advance::Changed(PlayerPhase::Result { index: 0 })
        );
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 1 }).unwrap(),
            Advance::Changed(PlayerPhase::Question { index: 1 })
        );
    }

    #[test]
    fn replayed_question_broadcast_is_a_no_op() {
        let mut sm = PlayerStateMachine::new();
        sm.apply(PlayerEvent::QuestionReceived { index: 2 }).unwrap();
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 2 }).unwrap(),
            Advance::Ignored
        );
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 1 }).unwrap(),
            Advance::Ignored
        );
        assert_eq!(sm.phase(), PlayerPhase::Question { index: 2 });
    }

    #[test]
    fn second_answer_for_same_question_is_rejected() {
        let mut sm = PlayerStateMachine::new();
        sm.apply(PlayerEvent::QuestionReceived { index: 0 }).unwrap();
        sm.apply(PlayerEvent::AnswerSubmitted { index: 0 }).unwrap();

        let err = sm
            .apply(PlayerEvent::AnswerSubmitted { index: 0 })
            .unwrap_err();
        assert_eq!(err.phase, PlayerPhase::Result { index: 0 });
    }

    #[test]
    fn answer_before_any_question_is_rejected() {
        let mut sm = PlayerStateMachine::new();
        assert!(sm.apply(PlayerEvent::AnswerSubmitted { index: 0 }).is_err());
    }

    #[test]
    fn mid_session_join_lands_on_current_index() {
        let mut sm = PlayerStateMachine::new();
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 3 }).unwrap(),
            Advance::Changed(PlayerPhase::Question { index: 3 })
        );
    }

    #[test]
    fn lagged_player_resynchronizes_to_newer_index() {
        let mut sm = PlayerStateMachine::new();
        sm.apply(PlayerEvent::QuestionReceived { index: 0 }).unwrap();
        // Never answered question 0; host has moved on.
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 1 }).unwrap(),
            Advance::Changed(PlayerPhase::Question { index: 1 })
        );
    }

    #[test]
    fn finish_is_idempotent() {
        let mut sm = PlayerStateMachine::new();
        assert_eq!(
            sm.apply(PlayerEvent::GameFinished).unwrap(),
            Advance::Changed(PlayerPhase::Finished)
        );
        assert_eq!(sm.apply(PlayerEvent::GameFinished).unwrap(), Advance::Ignored);
        assert_eq!(
            sm.apply(PlayerEvent::QuestionReceived { index: 9 }).unwrap(),
            Advance::Ignored
        );
    }

    #[test]
    fn streak_counts_consecutive_correct_answers() {
        let mut sm = PlayerStateMachine::new();
        sm.record_outcome(Some(true));
        sm.record_outcome(Some(true));
        assert_eq!(sm.streak(), 2);
        // Unscored question leaves the streak alone.
        sm.record_outcome(None);
        assert_eq!(sm.streak(), 2);
        sm.record_outcome(Some(false));
        assert_eq!(sm.streak(), 0);
    }
}
