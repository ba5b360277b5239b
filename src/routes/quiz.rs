use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::quiz::{CreateQuizRequest, QuizListItem, QuizSummary},
    error::AppError,
    services::quiz_service,
    state::SharedState,
    state::quiz::Quiz,
};

/// Routes for quiz authoring and retrieval.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quizzes", post(create_quiz).get(list_quizzes))
        .route("/quizzes/{id}", get(get_quiz))
}

/// Validate and store a new quiz.
#[utoipa::path(
    post,
    path = "/quizzes",
    tag = "quiz",
    request_body = CreateQuizRequest,
    responses(
        (status = 200, description = "Quiz stored", body = QuizSummary),
        (status = 400, description = "Invalid quiz definition")
    )
)]
pub async fn create_quiz(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateQuizRequest>>,
) -> Result<Json<QuizSummary>, AppError> {
    let summary = quiz_service::create_quiz(&state, payload).await?;
    Ok(Json(summary))
}

/// Fetch a stored quiz with its full question definitions.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "The quiz"),
        (status = 404, description = "No such quiz")
    )
)]
pub async fn get_quiz(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = quiz_service::get_quiz(&state, id).await?;
    Ok(Json(quiz))
}

/// List stored quizzes.
#[utoipa::path(
    get,
    path = "/quizzes",
    tag = "quiz",
    responses((status = 200, description = "Stored quizzes", body = [QuizListItem]))
)]
pub async fn list_quizzes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuizListItem>>, AppError> {
    let quizzes = quiz_service::list_quizzes(&state).await?;
    Ok(Json(quizzes))
}
