use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the live quiz backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::create_quiz,
        crate::routes::quiz::get_quiz,
        crate::routes::quiz::list_quizzes,
        crate::routes::game::create_game,
        crate::routes::game::game_snapshot,
        crate::routes::game::join_game,
        crate::routes::game::list_players,
        crate::routes::game::delete_game,
        crate::routes::host::start_game,
        crate::routes::host::show_results,
        crate::routes::host::show_leaderboard,
        crate::routes::host::next_question,
        crate::routes::host::pause_timer,
        crate::routes::host::resume_timer,
        crate::routes::play::mark_ready,
        crate::routes::play::submit_answer,
        crate::routes::play::leaderboard,
        crate::routes::play::final_results,
        crate::routes::sse::game_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::quiz::CreateQuizRequest,
            crate::dto::quiz::QuestionInput,
            crate::dto::quiz::QuizSummary,
            crate::dto::quiz::QuizListItem,
            crate::dto::quiz::QuestionView,
            crate::dto::quiz::QuestionPrompt,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::JoinResponse,
            crate::dto::game::GameSnapshot,
            crate::dto::game::PlayerSummary,
            crate::dto::game::StartGameResponse,
            crate::dto::game::TimerStatus,
            crate::dto::game::ReadyResponse,
            crate::dto::game::SubmitAnswerRequest,
            crate::dto::game::SubmitAnswerResponse,
            crate::dto::game::LeaderboardEntry,
            crate::dto::game::QuestionResults,
            crate::dto::game::FinalResults,
            crate::dto::game::QuestionReport,
            crate::state::quiz::QuestionKind,
            crate::state::quiz::SubmittedAnswer,
            crate::state::quiz::HotspotRegion,
            crate::state::game::GameStatus,
            crate::state::channel::GameChannelEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Quiz authoring and retrieval"),
        (name = "game", description = "Game lifecycle and lobby operations"),
        (name = "host", description = "Host-side session control"),
        (name = "play", description = "Player-side gameplay operations"),
        (name = "sse", description = "Server-sent events stream per game"),
    )
)]
pub struct ApiDoc;
