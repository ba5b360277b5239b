//! Broadcast helpers for the per-game channel. Each helper logs at debug and
//! publishes fire-and-forget; the persisted game row is always written before
//! the corresponding event goes out.

use tracing::debug;
use uuid::Uuid;

use crate::state::{SharedState, channel::GameChannelEvent, game::GameStatus};

pub fn countdown(state: &SharedState, pin: &str, seconds: u32) {
    debug!(pin, seconds, "broadcasting countdown");
    state
        .channel()
        .publish(pin, GameChannelEvent::Countdown { seconds });
}

pub fn game_started(state: &SharedState, pin: &str) {
    debug!(pin, "broadcasting game start");
    state.channel().publish(
        pin,
        GameChannelEvent::GameStarted {
            status: GameStatus::Playing,
        },
    );
}

pub fn question(state: &SharedState, pin: &str, index: usize) {
    debug!(pin, index, "broadcasting question");
    state
        .channel()
        .publish(pin, GameChannelEvent::Question { index });
}

pub fn ready_for_q1(state: &SharedState, pin: &str, player_id: Uuid, player_name: &str) {
    debug!(pin, %player_id, "broadcasting ready signal");
    state.channel().publish(
        pin,
        GameChannelEvent::ReadyForQ1 {
            player_id,
            player_name: player_name.to_string(),
        },
    );
}

pub fn game_finished(state: &SharedState, pin: &str) {
    debug!(pin, "broadcasting game end");
    state.channel().publish(pin, GameChannelEvent::GameFinished);
}

pub fn player_joined(state: &SharedState, pin: &str, player_id: Uuid, player_name: &str) {
    debug!(pin, %player_id, "broadcasting lobby join");
    state.channel().publish(
        pin,
        GameChannelEvent::PlayerJoined {
            player_id,
            player_name: player_name.to_string(),
        },
    );
}
