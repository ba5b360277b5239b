//! Authoring storage for quizzes: build, validate, and persist quiz
//! definitions consumed by live games.

use uuid::Uuid;

use crate::{
    dao::game_store::GameStore,
    dto::quiz::{CreateQuizRequest, QuestionInput, QuizListItem, QuizSummary},
    error::ServiceError,
    state::SharedState,
    state::quiz::{Question, QuestionKind, Quiz},
};

pub async fn create_quiz(
    state: &SharedState,
    request: CreateQuizRequest,
) -> Result<QuizSummary, ServiceError> {
    let quiz = build_quiz(request)?;
    let summary = QuizSummary::from(&quiz);
    state.store().save_quiz(quiz).await?;
    Ok(summary)
}

pub async fn get_quiz(state: &SharedState, id: Uuid) -> Result<Quiz, ServiceError> {
    state
        .store()
        .find_quiz(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{id}` not found")))
}

pub async fn list_quizzes(state: &SharedState) -> Result<Vec<QuizListItem>, ServiceError> {
    let entries = state.store().list_quizzes().await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

fn build_quiz(request: CreateQuizRequest) -> Result<Quiz, ServiceError> {
    let CreateQuizRequest {
        title,
        description,
        questions,
        created_by,
    } = request;

    if title.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "quiz title must not be empty".into(),
        ));
    }

    if questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "a quiz requires at least one question".into(),
        ));
    }

    let questions = questions
        .into_iter()
        .enumerate()
        .map(|(index, input)| build_question(index, input))
        .collect::<Result<Vec<Question>, ServiceError>>()?;

    Ok(Quiz::new(title, description, questions, created_by))
}

fn build_question(index: usize, input: QuestionInput) -> Result<Question, ServiceError> {
    let invalid =
        |message: String| Err(ServiceError::InvalidInput(format!("question {index}: {message}")));

    if input.text.trim().is_empty() {
        return invalid("text must not be empty".into());
    }
    if input.time_limit_secs == 0 {
        return invalid("time limit must be strictly positive".into());
    }

    match &input.kind {
        QuestionKind::MultipleChoice {
            options,
            correct_option,
        } => {
            if options.len() < 2 {
                return invalid("multiple choice needs at least two options".into());
            }
            if *correct_option >= options.len() {
                return invalid(format!(
                    "correct option {correct_option} is out of range for {} options",
                    options.len()
                ));
            }
        }
        QuestionKind::TrueFalse { .. } => {}
        QuestionKind::OpenEnded { accepted_answers } => {
            if accepted_answers.iter().all(|answer| answer.trim().is_empty()) {
                return invalid("open ended needs at least one accepted answer".into());
            }
        }
        QuestionKind::Puzzle {
            items,
            correct_order,
        } => {
            if items.len() < 2 {
                return invalid("puzzle needs at least two items".into());
            }
            let mut seen = vec![false; items.len()];
            if correct_order.len() != items.len()
                || !correct_order.iter().all(|&position| {
                    position < items.len() && !std::mem::replace(&mut seen[position], true)
                })
            {
                return invalid("correct order must be a permutation of the items".into());
            }
        }
        QuestionKind::Poll { options } => {
            if options.len() < 2 {
                return invalid("poll needs at least two options".into());
            }
        }
        QuestionKind::WordCloud {} | QuestionKind::Brainstorm {} => {}
        QuestionKind::Slider {
            min,
            max,
            correct_value,
            ..
        } => {
            if min >= max {
                return invalid("slider range must be non-empty".into());
            }
            if correct_value < min || correct_value > max {
                return invalid("slider target must fall within the range".into());
            }
        }
        QuestionKind::Hotspot { regions } => {
            if regions.is_empty() {
                return invalid("hotspot needs at least one target region".into());
            }
            if regions.iter().any(|region| {
                !(0.0..=1.0).contains(&region.x)
                    || !(0.0..=1.0).contains(&region.y)
                    || region.width <= 0.0
                    || region.height <= 0.0
                    || region.x + region.width > 1.0
                    || region.y + region.height > 1.0
            }) {
                return invalid("hotspot regions must fit in normalized coordinates".into());
            }
        }
    }

    Ok(Question {
        id: Uuid::new_v4(),
        text: input.text,
        time_limit_secs: input.time_limit_secs,
        points: input.points,
        media_url: input.media_url,
        kind: input.kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(kind: QuestionKind) -> QuestionInput {
        QuestionInput {
            text: "q".into(),
            time_limit_secs: 20,
            points: 1000,
            media_url: None,
            kind,
        }
    }

    #[test]
    fn out_of_range_correct_option_is_rejected() {
        let err = build_question(
            0,
            input(QuestionKind::MultipleChoice {
                options: vec!["a".into(), "b".into()],
                correct_option: 2,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn puzzle_order_must_be_a_permutation() {
        let err = build_question(
            0,
            input(QuestionKind::Puzzle {
                items: vec!["x".into(), "y".into()],
                correct_order: vec![0, 0],
            }),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        assert!(
            build_question(
                0,
                input(QuestionKind::Puzzle {
                    items: vec!["x".into(), "y".into()],
                    correct_order: vec![1, 0],
                }),
            )
            .is_ok()
        );
    }

    #[test]
    fn slider_target_must_be_in_range() {
        let err = build_question(
            0,
            input(QuestionKind::Slider {
                min: 0,
                max: 10,
                correct_value: 11,
                tolerance: 0,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn zero_time_limit_is_rejected() {
        let mut question = input(QuestionKind::TrueFalse { correct: true });
        question.time_limit_secs = 0;
        assert!(build_question(0, question).is_err());
    }

    #[test]
    fn quiz_requires_questions() {
        let err = build_quiz(CreateQuizRequest {
            title: "Empty".into(),
            description: String::new(),
            questions: vec![],
            created_by: None,
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
