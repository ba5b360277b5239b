use tokio::task::AbortHandle;

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Seconds left after the tick.
    Continue(u32),
    /// Countdown reached zero; the question is over.
    Expired,
    /// Timer was paused or never armed; the tick task should stop.
    Stopped,
}

/// Host-side countdown for the live question.
///
/// Pause and resume affect only this timer; nothing is broadcast to players,
/// whose own countdowns keep running. The tick task itself is spawned by the
/// host service; this struct owns the remaining time and the task handle.
#[derive(Debug, Default)]
pub struct QuestionTimer {
    remaining_secs: u32,
    running: bool,
    tick_task: Option<AbortHandle>,
}

impl QuestionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm the countdown for a new question, cancelling any previous task.
    pub fn arm(&mut self, secs: u32) {
        self.cancel_task();
        self.remaining_secs = secs;
        self.running = secs > 0;
    }

    /// Freeze the countdown and stop the tick task.
    pub fn pause(&mut self) {
        self.cancel_task();
        self.running = false;
    }

    /// Continue from the remaining time. Returns false when there is nothing
    /// to resume (already running, or expired).
    pub fn resume(&mut self) -> bool {
        if self.running || self.remaining_secs == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop entirely, e.g. when the host reveals results early.
    pub fn stop(&mut self) {
        self.cancel_task();
        self.remaining_secs = 0;
        self.running = false;
    }

    /// Decrement by one second; called by the spawned tick task.
    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Stopped;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            self.tick_task = None;
            TimerTick::Expired
        } else {
            TimerTick::Continue(self.remaining_secs)
        }
    }

    /// Attach the handle of the currently running tick task.
    pub fn attach_task(&mut self, handle: AbortHandle) {
        self.tick_task = Some(handle);
    }

    fn cancel_task(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            handle.abort();
        }
    }
}
