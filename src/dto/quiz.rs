use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::QuizListItemEntity,
    dto::format_timestamp,
    state::quiz::{Question, QuestionKind, Quiz},
};

/// Payload used to author and store a new quiz.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1))]
    pub questions: Vec<QuestionInput>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

/// Incoming question definition; ids are allocated server-side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuestionInput {
    pub text: String,
    pub time_limit_secs: u32,
    pub points: u32,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Summary returned once a quiz has been stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub created_at: String,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            question_count: quiz.questions.len(),
            created_at: format_timestamp(quiz.created_at),
        }
    }
}

/// Entry in the stored-quiz listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizListItem {
    pub id: Uuid,
    pub title: String,
    pub question_count: usize,
}

impl From<QuizListItemEntity> for QuizListItem {
    fn from(entity: QuizListItemEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            question_count: entity.question_count,
        }
    }
}

/// Player-facing projection of a question: everything needed to render it,
/// with the answer key stripped. Hotspot regions and accepted answers never
/// leave the host side before the reveal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub time_limit_secs: u32,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(flatten)]
    pub prompt: QuestionPrompt,
}

/// Renderable shape of each variant, minus its key.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionPrompt {
    MultipleChoice { options: Vec<String> },
    TrueFalse {},
    OpenEnded {},
    Puzzle { items: Vec<String> },
    Poll { options: Vec<String> },
    WordCloud {},
    Brainstorm {},
    Slider { min: i64, max: i64 },
    Hotspot {},
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        let prompt = match &question.kind {
            QuestionKind::MultipleChoice { options, .. } => QuestionPrompt::MultipleChoice {
                options: options.clone(),
            },
            QuestionKind::TrueFalse { .. } => QuestionPrompt::TrueFalse {},
            QuestionKind::OpenEnded { .. } => QuestionPrompt::OpenEnded {},
            QuestionKind::Puzzle { items, .. } => QuestionPrompt::Puzzle {
                items: items.clone(),
            },
            QuestionKind::Poll { options } => QuestionPrompt::Poll {
                options: options.clone(),
            },
            QuestionKind::WordCloud {} => QuestionPrompt::WordCloud {},
            QuestionKind::Brainstorm {} => QuestionPrompt::Brainstorm {},
            QuestionKind::Slider { min, max, .. } => QuestionPrompt::Slider {
                min: *min,
                max: *max,
            },
            QuestionKind::Hotspot { .. } => QuestionPrompt::Hotspot {},
        };

        Self {
            id: question.id,
            text: question.text.clone(),
            time_limit_secs: question.time_limit_secs,
            points: question.points,
            media_url: question.media_url.clone(),
            prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_view_strips_the_answer_key() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "Pick one".into(),
            time_limit_secs: 10,
            points: 500,
            media_url: None,
            kind: QuestionKind::MultipleChoice {
                options: vec!["a".into(), "b".into()],
                correct_option: 1,
            },
        };

        let view = QuestionView::from(&question);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        assert!(json.get("correct_option").is_none());
        assert_eq!(json["options"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn hotspot_view_hides_regions() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "Click the capital".into(),
            time_limit_secs: 15,
            points: 800,
            media_url: Some("https://example.org/map.png".into()),
            kind: QuestionKind::Hotspot {
                regions: vec![crate::state::quiz::HotspotRegion {
                    x: 0.0,
                    y: 0.0,
                    width: 0.5,
                    height: 0.5,
                }],
            },
        };

        let json = serde_json::to_value(QuestionView::from(&question)).unwrap();
        assert_eq!(json["type"], "hotspot");
        assert!(json.get("regions").is_none());
    }
}
