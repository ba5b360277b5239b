use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authored quiz definition. The order of `questions` is the sequencing
/// contract for gameplay: question `k` of a game is `questions[k]`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    /// Creator identifier; anonymous authoring is allowed.
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl Quiz {
    pub fn new(
        title: String,
        description: String,
        questions: Vec<Question>,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            questions,
            created_by,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// A single question: common timing/points metadata plus a variant-specific
/// answer key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    /// Seconds players have to answer.
    pub time_limit_secs: u32,
    /// Base points before speed bonus and streak multiplier.
    pub points: u32,
    /// Optional media URL shown alongside the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The nine supported question variants. Scoreable variants carry exactly one
/// canonical answer key; poll, word-cloud, and brainstorm are unscored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_option: usize,
    },
    TrueFalse {
        correct: bool,
    },
    /// Free text compared case-insensitively against any accepted answer.
    OpenEnded {
        accepted_answers: Vec<String>,
    },
    /// Items must be returned in `correct_order` (indices into `items`).
    Puzzle {
        items: Vec<String>,
        correct_order: Vec<usize>,
    },
    Poll {
        options: Vec<String>,
    },
    WordCloud {},
    Brainstorm {},
    /// Numeric guess on a range; correct within `tolerance` of the target.
    Slider {
        min: i64,
        max: i64,
        correct_value: i64,
        #[serde(default)]
        tolerance: u64,
    },
    /// Click position must fall inside one of the target regions.
    Hotspot {
        regions: Vec<HotspotRegion>,
    },
}

/// Axis-aligned rectangle in normalized [0, 1] image coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct HotspotRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl HotspotRegion {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A player's submission, mirroring the shape of the question it answers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    /// Option index for multiple-choice and poll questions.
    Choice { option: usize },
    Boolean { value: bool },
    /// Free text for open-ended, word-cloud, and brainstorm questions.
    Text { value: String },
    /// Item ordering for puzzle questions.
    Ordering { order: Vec<usize> },
    /// Numeric value for slider questions.
    Value { value: i64 },
    /// Click position for hotspot questions.
    Point { x: f64, y: f64 },
}

impl Question {
    /// Whether this question contributes to scores and streaks.
    pub fn is_scored(&self) -> bool {
        !matches!(
            self.kind,
            QuestionKind::Poll { .. } | QuestionKind::WordCloud {} | QuestionKind::Brainstorm {}
        )
    }

    /// Check a submission against the answer key.
    ///
    /// Returns `None` for unscored variants. A submission whose shape does not
    /// match the question counts as incorrect rather than an error, so a
    /// malformed client cannot stall the game.
    pub fn check_answer(&self, answer: &SubmittedAnswer) -> Option<bool> {
        match (&self.kind, answer) {
            (
                QuestionKind::MultipleChoice { correct_option, .. },
                SubmittedAnswer::Choice { option },
            ) => Some(option == correct_option),
            (QuestionKind::TrueFalse { correct }, SubmittedAnswer::Boolean { value }) => {
                Some(value == correct)
            }
            (QuestionKind::OpenEnded { accepted_answers }, SubmittedAnswer::Text { value }) => {
                let submitted = value.trim().to_lowercase();
                Some(
                    accepted_answers
                        .iter()
                        .any(|accepted| accepted.trim().to_lowercase() == submitted),
                )
            }
            (QuestionKind::Puzzle { correct_order, .. }, SubmittedAnswer::Ordering { order }) => {
                Some(order == correct_order)
            }
            (QuestionKind::Poll { .. }, _)
            | (QuestionKind::WordCloud {}, _)
            | (QuestionKind::Brainstorm {}, _) => None,
            (
                QuestionKind::Slider {
                    correct_value,
                    tolerance,
                    ..
                },
                SubmittedAnswer::Value { value },
            ) => Some(value.abs_diff(*correct_value) <= *tolerance),
            (QuestionKind::Hotspot { regions }, SubmittedAnswer::Point { x, y }) => {
                Some(regions.iter().any(|region| region.contains(*x, *y)))
            }
            // Shape mismatch on a scoreable variant.
            (
                QuestionKind::MultipleChoice { .. }
                | QuestionKind::TrueFalse { .. }
                | QuestionKind::OpenEnded { .. }
                | QuestionKind::Puzzle { .. }
                | QuestionKind::Slider { .. }
                | QuestionKind::Hotspot { .. },
                _,
            ) => Some(false),
        }
    }
}
