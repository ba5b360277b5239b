use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{
    dto::events::ServerEvent,
    error::ServiceError,
    services::game_service,
    state::{SharedState, channel::GameChannelEvent},
};

/// Subscribe to a game's channel topic, verifying the PIN resolves first.
pub async fn subscribe(
    state: &SharedState,
    pin: &str,
) -> Result<broadcast::Receiver<GameChannelEvent>, ServiceError> {
    let game = game_service::find_game_by_pin(state, pin).await?;
    Ok(state.channel().subscribe(&game.game_pin))
}

/// Convert a channel receiver into an SSE response.
///
/// A forwarder task bridges the broadcast receiver into a small bounded
/// channel so slow clients exert backpressure on the forwarder, not the hub.
/// Lagged receivers skip ahead rather than dropping the connection; the
/// client recovers missed state from the snapshot endpoint.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<GameChannelEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let server_event = match ServerEvent::from_channel(&payload) {
                                Ok(event) => event,
                                Err(err) => {
                                    warn!(error = %err, "failed to serialize channel event");
                                    continue;
                                }
                            };

                            let mut event = Event::default().data(server_event.data);
                            if let Some(name) = server_event.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "SSE subscriber lagged; skipping ahead");
                            continue;
                        }
                    }
                }
            }
        }
        debug!("game SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
