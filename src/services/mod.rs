/// Channel broadcast helpers for game events.
pub mod channel_events;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game creation, joining, and the polling snapshot.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Host-side session control: start, advance, reveal, timer.
pub mod host_service;
/// Player-side operations: ready signal, answers, leaderboard.
pub mod player_service;
/// Quiz authoring and validation.
pub mod quiz_service;
/// Server-Sent Events bridging onto the channel hub.
pub mod sse_service;
