use std::collections::HashSet;

use tokio::sync::watch;
use uuid::Uuid;

/// Where the barrier is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierPhase {
    Idle,
    /// Armed with the roster size captured at start time. Players joining
    /// after arming are not counted; they simply receive the question
    /// broadcast when it fires.
    AwaitingReady { expected: usize },
    Released,
}

/// Result of a ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// First signal from this player; it counted towards the barrier.
    Counted,
    /// Replayed signal, nothing changed.
    Duplicate,
    /// Barrier not armed (already released, or never armed); ignored.
    Inactive,
}

/// Synchronization point ensuring every player connected at start time has
/// loaded question 1 before the host starts the timer. Owns the ready set
/// explicitly; release is observable through a watch channel so the start
/// task can `select!` it against the timeout fallback.
#[derive(Debug)]
pub struct ReadyBarrier {
    phase: BarrierPhase,
    ready: HashSet<Uuid>,
    released: watch::Sender<bool>,
}

impl Default for ReadyBarrier {
    fn default() -> Self {
        let (released, _) = watch::channel(false);
        Self {
            phase: BarrierPhase::Idle,
            ready: HashSet::new(),
            released,
        }
    }
}

impl ReadyBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BarrierPhase {
        self.phase
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn is_released(&self) -> bool {
        matches!(self.phase, BarrierPhase::Released)
    }

    /// Arm the barrier with the current roster size, clearing any previous
    /// ready set. Returns a receiver that flips to `true` on release.
    pub fn arm(&mut self, expected: usize) -> watch::Receiver<bool> {
        self.phase = BarrierPhase::AwaitingReady { expected };
        self.ready.clear();
        let (released, receiver) = watch::channel(false);
        self.released = released;
        receiver
    }

    /// Record a ready signal. Duplicates are harmless; reaching the expected
    /// count (when non-zero) releases the barrier.
    pub fn mark_ready(&mut self, player_id: Uuid) -> MarkOutcome {
        let BarrierPhase::AwaitingReady { expected } = self.phase else {
            return MarkOutcome::Inactive;
        };

        if !self.ready.insert(player_id) {
            return MarkOutcome::Duplicate;
        }

        if expected > 0 && self.ready.len() >= expected {
            self.release();
        }
        MarkOutcome::Counted
    }

    /// Timeout fallback: proceed without full synchronization rather than
    /// stalling the game indefinitely.
    pub fn force_release(&mut self) {
        if !self.is_released() {
            self.release();
        }
    }

    fn release(&mut self) {
        self.phase = BarrierPhase::Released;
        let _ = self.released.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_once_all_expected_players_are_ready() {
        let mut barrier = ReadyBarrier::new();
        let mut released = barrier.arm(3);

        for _ in 0..2 {
            assert_eq!(barrier.mark_ready(Uuid::new_v4()), MarkOutcome::Counted);
            assert!(!barrier.is_released());
        }
        assert_eq!(barrier.mark_ready(Uuid::new_v4()), MarkOutcome::Counted);

        assert!(barrier.is_released());
        assert!(*released.borrow_and_update());
    }

    #[test]
    fn duplicate_ready_signals_count_once() {
        let mut barrier = ReadyBarrier::new();
        barrier.arm(2);

        let player = Uuid::new_v4();
        assert_eq!(barrier.mark_ready(player), MarkOutcome::Counted);
        assert_eq!(barrier.mark_ready(player), MarkOutcome::Duplicate);
        assert_eq!(barrier.ready_count(), 1);
        assert!(!barrier.is_released());
    }

    #[test]
    fn zero_expected_only_releases_via_timeout_path() {
        let mut barrier = ReadyBarrier::new();
        barrier.arm(0);

        assert_eq!(barrier.mark_ready(Uuid::new_v4()), MarkOutcome::Counted);
        assert!(!barrier.is_released());

        barrier.force_release();
        assert!(barrier.is_released());
    }

    #[test]
    fn signals_after_release_are_inactive() {
        let mut barrier = ReadyBarrier::new();
        barrier.arm(1);
        barrier.mark_ready(Uuid::new_v4());
        assert!(barrier.is_released());

        // A late joiner signalling ready changes nothing.
        assert_eq!(barrier.mark_ready(Uuid::new_v4()), MarkOutcome::Inactive);
    }

    #[test]
    fn unarmed_barrier_ignores_signals() {
        let mut barrier = ReadyBarrier::new();
        assert_eq!(barrier.mark_ready(Uuid::new_v4()), MarkOutcome::Inactive);
        assert_eq!(barrier.phase(), BarrierPhase::Idle);
    }

    #[test]
    fn rearming_clears_the_ready_set() {
        let mut barrier = ReadyBarrier::new();
        barrier.arm(2);
        barrier.mark_ready(Uuid::new_v4());

        barrier.arm(2);
        assert_eq!(barrier.ready_count(), 0);
        assert_eq!(barrier.phase(), BarrierPhase::AwaitingReady { expected: 2 });
    }

    #[test]
    fn force_release_is_idempotent() {
        let mut barrier = ReadyBarrier::new();
        barrier.arm(5);
        barrier.force_release();
        barrier.force_release();
        assert!(barrier.is_released());
    }
}
