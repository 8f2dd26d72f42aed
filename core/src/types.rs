//! Client-side models for the quiz API.
//!
//! # Design
//! These are the client's shapes, after `mapping::map_to_frontend` has run:
//! questions carry `content`, categories carry `name`. Drafts are the bodies
//! for create and update calls and carry the validation rules in
//! `validation.rs`. Timestamps stay as the ISO-8601 strings the backend sends.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub type Id = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub category_id: Option<Id>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for creating or updating a quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Title is required"),
        length(min = 3, max = 100, message = "Title must be between 3 and 100 characters")
    )]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Description must be less than 500 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Course code must be less than 50 characters"))]
    pub course_code: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Id,
    pub content: String,
    pub quiz_id: Id,
    #[serde(default)]
    pub difficulty_level: Difficulty,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

/// Body for creating a question; the quiz comes from the request path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Question text is required"),
        length(min = 5, max = 1000, message = "Question text must be between 5 and 1000 characters")
    )]
    pub content: String,
    #[serde(default)]
    pub difficulty_level: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: Id,
    pub answer_text: String,
    /// Not sent while an attempt is in progress.
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub question_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptionDraft {
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Answer text is required"),
        length(min = 1, max = 255, message = "Answer text must be between 1 and 255 characters")
    )]
    pub answer_text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Name is required"),
        length(min = 3, max = 100, message = "Name must be between 3 and 100 characters")
    )]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Description must be less than 255 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Id,
    pub quiz_id: Id,
    #[serde(default)]
    pub quiz_title: Option<String>,
    pub student_nickname: String,
    pub rating: u8,
    pub review_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Nickname is required"),
        length(min = 3, max = 100, message = "Nickname must be between 3 and 100 characters")
    )]
    pub student_nickname: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Review text is required"),
        length(min = 10, max = 2000, message = "Review must be between 10 and 2000 characters")
    )]
    pub review_text: String,
}

/// Attempt state. `Unknown` covers unrecognised values and replies that
/// carry no status at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Server-managed progress through one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Id,
    pub quiz_id: Id,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub status: AttemptStatus,
    #[serde(default)]
    pub questions: Vec<AttemptQuestion>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub attempt_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptQuestion {
    pub id: Id,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub answered: bool,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub answered: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u8,
}

impl QuizAttempt {
    /// First question not answered yet, in server order.
    pub fn next_question(&self) -> Option<&AttemptQuestion> {
        self.questions.iter().find(|q| !q.answered)
    }

    pub fn progress(&self) -> Option<Progress> {
        if self.questions.is_empty() {
            return None;
        }
        let total = self.questions.len();
        let answered = self.questions.iter().filter(|q| q.answered).count();
        let percentage = ((answered as f64 / total as f64) * 100.0).round() as u8;
        Some(Progress {
            total,
            answered,
            percentage,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.status == AttemptStatus::Completed
    }
}

/// The server's verdict on one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnswer {
    #[serde(default)]
    pub id: Option<Id>,
    pub attempt_id: Id,
    pub question_id: Id,
    #[serde(default)]
    pub question_text: Option<String>,
    pub chosen_answer_id: Id,
    #[serde(default)]
    pub chosen_answer_text: Option<String>,
    pub correct: bool,
}

/// Aggregated answers across every attempt of one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub quiz_id: Id,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub question_results: Vec<QuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: Id,
    pub question_text: String,
    /// `EASY`, `MEDIUM`, `HARD`, or `N/A` when the question has none.
    #[serde(default)]
    pub question_difficulty: Option<String>,
    pub total_answers: u64,
    pub correct_answers: u64,
    pub wrong_answers: u64,
}

impl QuestionResult {
    /// Share of correct answers in percent, 0 when nobody answered.
    pub fn accuracy(&self) -> f64 {
        if self.total_answers == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.total_answers as f64 * 100.0
    }
}

impl QuizResults {
    pub fn total_answers(&self) -> u64 {
        self.question_results.iter().map(|r| r.total_answers).sum()
    }

    pub fn correct_answers(&self) -> u64 {
        self.question_results.iter().map(|r| r.correct_answers).sum()
    }
}
