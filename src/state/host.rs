use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

/// Phases the host side of a session moves through.
///
/// `Question`, `Results`, and `Leaderboard` carry the question index they
/// refer to, so replayed or out-of-order events can be checked against the
/// phase instead of trusting arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPhase {
    /// PIN displayed, roster filling up; start enabled once players joined.
    Lobby,
    /// Countdown broadcast, ready barrier armed.
    Countdown,
    /// A question is live and the host timer is running.
    Question { index: usize },
    /// Correct answer and tallies revealed.
    Results { index: usize },
    /// Standings between questions.
    Leaderboard { index: usize },
    /// Game over; only reporting remains.
    Finished,
}

/// Events that can be applied to the host state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Host pressed start from the lobby.
    StartGame,
    /// Ready barrier released (all players ready or timeout).
    BarrierReleased,
    /// Reveal results for the current question, manually or on timer expiry.
    ShowResults,
    /// Show the interstitial leaderboard.
    ShowLeaderboard,
    /// Advance to the next question.
    NextQuestion,
    /// Last question done; end the game.
    Finish,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    pub from: HostPhase,
    pub event: HostEvent,
}

/// Errors that can occur when planning a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    NoPending,
    IdMismatch { expected: PlanId, got: PlanId },
    PhaseMismatch { expected: HostPhase, actual: HostPhase },
}

/// Errors that can occur when aborting a planned transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    NoPending,
    IdMismatch { expected: PlanId, got: PlanId },
}

/// Unique identifier for a planned transition.
pub type PlanId = Uuid;

/// A validated transition that has not been applied yet. The gap between plan
/// and apply is where persistence happens: the new question index is written
/// to the store before the phase change (and its broadcast) becomes visible.
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanId,
    pub from: HostPhase,
    pub to: HostPhase,
    pub event: HostEvent,
    pub pending_since: Instant,
}

/// State machine driving the host flow
/// lobby -> countdown -> question -> results -> leaderboard -> ... -> finished.
#[derive(Debug, Clone)]
pub struct HostStateMachine {
    phase: HostPhase,
    pending: Option<Plan>,
}

impl Default for HostStateMachine {
    fn default() -> Self {
        Self {
            phase: HostPhase::Lobby,
            pending: None,
        }
    }
}

impl HostStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    /// Index of the question the session is currently on, if any.
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            HostPhase::Question { index }
            | HostPhase::Results { index }
            | HostPhase::Leaderboard { index } => Some(index),
            HostPhase::Lobby | HostPhase::Countdown | HostPhase::Finished => None,
        }
    }

    /// Plan a transition by validating that the event applies from the current
    /// phase. The returned plan must later be applied or aborted.
    pub fn plan(&mut self, event: HostEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            pending_since: Instant::now(),
        };
        self.pending = Some(plan.clone());
        Ok(plan)
    }

    /// Apply a planned transition, returning the new phase.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<HostPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        self.phase = plan.to;
        Ok(self.phase)
    }

    /// Abort a planned transition without applying it.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;
        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }
        self.pending = None;
        Ok(())
    }

    fn compute_transition(&self, event: HostEvent) -> Result<HostPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (HostPhase::Lobby, HostEvent::StartGame) => HostPhase::Countdown,
            (HostPhase::Countdown, HostEvent::BarrierReleased) => HostPhase::Question { index: 0 },
            (HostPhase::Question { index }, HostEvent::ShowResults) => {
                HostPhase::Results { index }
            }
            (HostPhase::Results { index }, HostEvent::ShowLeaderboard) => {
                HostPhase::Leaderboard { index }
            }
            (
                HostPhase::Results { index } | HostPhase::Leaderboard { index },
                HostEvent::NextQuestion,
            ) => HostPhase::Question { index: index + 1 },
            (
                HostPhase::Results { .. } | HostPhase::Leaderboard { .. },
                HostEvent::Finish,
            ) => HostPhase::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
