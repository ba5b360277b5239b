use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::game::GameStatus;

/// Control events carried on a game's channel. A closed enum with statically
/// typed payloads; consumers dispatch on the variant, never on a string name.
///
/// Delivery is at-least-once and unordered across subscribers: every variant
/// that refers to a question carries its index explicitly so replays and
/// stragglers can be detected downstream.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameChannelEvent {
    /// Pre-game countdown started.
    Countdown { seconds: u32 },
    /// Ready barrier released; gameplay begins.
    GameStarted { status: GameStatus },
    /// Question `index` is live.
    Question { index: usize },
    /// A player finished loading question 1.
    ReadyForQ1 { player_id: Uuid, player_name: String },
    /// Session over; clients move to final results.
    GameFinished,
    /// Lobby roster update.
    PlayerJoined { player_id: Uuid, player_name: String },
}

impl GameChannelEvent {
    /// SSE event name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            GameChannelEvent::Countdown { .. } => "countdown",
            GameChannelEvent::GameStarted { .. } => "game_started",
            GameChannelEvent::Question { .. } => "question",
            GameChannelEvent::ReadyForQ1 { .. } => "ready_for_q1",
            GameChannelEvent::GameFinished => "game_finished",
            GameChannelEvent::PlayerJoined { .. } => "player_joined",
        }
    }
}

/// Pub/sub hub with one broadcast topic per game PIN (`game:{pin}`).
///
/// Publishing is fire-and-forget: no acknowledgment, and events sent while a
/// topic has no subscribers are dropped. The store remains the source of
/// truth; the channel is a latency optimization.
pub struct ChannelHub {
    topics: DashMap<String, broadcast::Sender<GameChannelEvent>>,
    capacity: usize,
}

/// Topic name for a game PIN.
pub fn topic_for_pin(pin: &str) -> String {
    format!("game:{pin}")
}

impl ChannelHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity,
        }
    }

    /// Register a subscriber on the game's topic, creating it on first use.
    pub fn subscribe(&self, pin: &str) -> broadcast::Receiver<GameChannelEvent> {
        self.topics
            .entry(topic_for_pin(pin))
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send an event to all current subscribers of the game's topic, ignoring
    /// delivery errors.
    pub fn publish(&self, pin: &str, event: GameChannelEvent) {
        if let Some(sender) = self.topics.get(&topic_for_pin(pin)) {
            let _ = sender.send(event);
        }
    }

    /// Tear down the game's topic. Existing receivers observe a closed
    /// channel and terminate.
    pub fn unsubscribe(&self, pin: &str) {
        self.topics.remove(&topic_for_pin(pin));
    }

    /// Number of live topics, for health reporting.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}
