pub mod barrier;
pub mod channel;
pub mod game;
pub mod host;
pub mod player;
pub mod quiz;
pub mod timer;

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::{config::AppConfig, dao::game_store::GameStore, error::ServiceError};

pub use self::host::{AbortError, ApplyError, Plan, PlanError, PlanId};
use self::{
    barrier::ReadyBarrier,
    channel::ChannelHub,
    host::{HostEvent, HostPhase, HostStateMachine},
    player::PlayerStateMachine,
    timer::QuestionTimer,
};

pub type SharedState = Arc<AppState>;

/// Upper bound on the persistence work done inside one transition.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Central application state: storage handle, channel hub, and the registry
/// of live sessions keyed by game id.
pub struct AppState {
    store: Arc<dyn GameStore>,
    channel: ChannelHub,
    sessions: DashMap<Uuid, Arc<HostSession>>,
    config: AppConfig,
}

impl AppState {
    /// Construct shared state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn GameStore>, config: AppConfig) -> SharedState {
        Arc::new(Self {
            store,
            channel: ChannelHub::new(config.channel_capacity),
            sessions: DashMap::new(),
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub fn channel(&self) -> &ChannelHub {
        &self.channel
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register a live session for a freshly created game.
    pub fn create_session(&self, game_id: Uuid, pin: String) -> Arc<HostSession> {
        let session = Arc::new(HostSession::new(game_id, pin));
        self.sessions.insert(game_id, session.clone());
        session
    }

    pub fn session(&self, game_id: Uuid) -> Option<Arc<HostSession>> {
        self.sessions.get(&game_id).map(|entry| entry.clone())
    }

    /// Resolve a PIN to its game id via the live-session registry. Finished
    /// games release their PIN in storage but keep their session until it is
    /// torn down, so the final results view can still be reached by PIN.
    pub fn game_id_for_pin(&self, pin: &str) -> Option<Uuid> {
        self.sessions
            .iter()
            .find(|entry| entry.value().pin == pin)
            .map(|entry| *entry.key())
    }

    pub fn require_session(&self, game_id: Uuid) -> Result<Arc<HostSession>, ServiceError> {
        self.session(game_id)
            .ok_or_else(|| ServiceError::NotFound(format!("no live session for game `{game_id}`")))
    }

    /// Drop a session and its channel topic once the game is over and final
    /// results have been broadcast.
    pub fn remove_session(&self, game_id: Uuid) {
        if let Some((_, session)) = self.sessions.remove(&game_id) {
            self.channel.unsubscribe(&session.pin);
        }
    }
}

/// Live, in-memory side of one game: the host state machine, the ready
/// barrier, the host question timer, and one player machine per participant.
pub struct HostSession {
    pub game_id: Uuid,
    pub pin: String,
    machine: Mutex<HostStateMachine>,
    pub barrier: Mutex<ReadyBarrier>,
    pub timer: Mutex<QuestionTimer>,
    players: DashMap<Uuid, Arc<Mutex<PlayerStateMachine>>>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl HostSession {
    fn new(game_id: Uuid, pin: String) -> Self {
        Self {
            game_id,
            pin,
            machine: Mutex::new(HostStateMachine::new()),
            barrier: Mutex::new(ReadyBarrier::new()),
            timer: Mutex::new(QuestionTimer::new()),
            players: DashMap::new(),
            transition_gate: Mutex::new(()),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        }
    }

    pub async fn phase(&self) -> HostPhase {
        self.machine.lock().await.phase()
    }

    pub async fn current_index(&self) -> Option<usize> {
        self.machine.lock().await.current_index()
    }

    /// Register the state machine for a player who just joined.
    pub fn register_player(&self, player_id: Uuid) -> Arc<Mutex<PlayerStateMachine>> {
        let machine = Arc::new(Mutex::new(PlayerStateMachine::new()));
        self.players.insert(player_id, machine.clone());
        machine
    }

    pub fn player_machine(&self, player_id: Uuid) -> Option<Arc<Mutex<PlayerStateMachine>>> {
        self.players.get(&player_id).map(|entry| entry.clone())
    }

    /// Iterate over registered player machines.
    pub fn player_machines(&self) -> Vec<(Uuid, Arc<Mutex<PlayerStateMachine>>)> {
        self.players
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Run a host transition around its side-effecting work.
    ///
    /// The event is planned (validated against the current phase), the work
    /// future runs — this is where the store write happens — and only on
    /// success is the plan applied. The caller broadcasts after this returns,
    /// so persistence always precedes the corresponding broadcast. A gate
    /// serializes transitions per session; failed or timed-out work aborts
    /// the plan.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: HostEvent,
        work: F,
    ) -> Result<(T, HostPhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }

    async fn plan_transition(&self, event: HostEvent) -> Result<Plan, PlanError> {
        let mut machine = self.machine.lock().await;
        machine.plan(event)
    }

    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<HostPhase, ApplyError> {
        let mut machine = self.machine.lock().await;
        machine.apply(plan_id)
    }

    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut machine = self.machine.lock().await;
        machine.abort(plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> HostSession {
        HostSession::new(Uuid::new_v4(), "123456".into())
    }

    #[tokio::test]
    async fn successful_work_applies_the_transition() {
        let session = session();
        let ((), next) = session
            .run_transition(HostEvent::StartGame, || async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(next, HostPhase::Countdown);
        assert_eq!(session.phase().await, HostPhase::Countdown);
    }

    #[tokio::test]
    async fn failed_work_aborts_and_keeps_the_phase() {
        let session = session();
        let err = session
            .run_transition::<_, _, ()>(HostEvent::StartGame, || async {
                Err(ServiceError::InvalidState("nope".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(session.phase().await, HostPhase::Lobby);

        // The session is usable again after the abort.
        let ((), next) = session
            .run_transition(HostEvent::StartGame, || async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(next, HostPhase::Countdown);
    }

    #[tokio::test]
    async fn invalid_event_is_rejected_before_work_runs() {
        let session = session();
        let err = session
            .run_transition::<_, _, ()>(HostEvent::NextQuestion, || async {
                panic!("work must not run for an invalid transition")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn player_registry_round_trips() {
        let session = session();
        let id = Uuid::new_v4();
        session.register_player(id);
        assert_eq!(session.player_count(), 1);
        assert!(session.player_machine(id).is_some());
        assert!(session.player_machine(Uuid::new_v4()).is_none());
    }
}
