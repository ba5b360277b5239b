use serde::Serialize;

use crate::state::channel::GameChannelEvent;

#[derive(Clone, Debug)]
/// Dispatched payload carried on an SSE connection.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Project a typed channel event onto the wire: the variant becomes the
    /// SSE event name, the payload the data field.
    pub fn from_channel(event: &GameChannelEvent) -> serde_json::Result<Self> {
        Self::json(Some(event.name().to_string()), event)
    }
}
