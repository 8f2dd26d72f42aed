//! Quizzes, their questions, and the questions' answer options.

use serde_json::{json, Value};

use super::{decode_list, decode_one, encode, encode_with};
use crate::client::{ApiClient, Payload, RequestOptions, ResourceApi};
use crate::error::{ApiError, ResultExt};
use crate::mapping::EntityKind;
use crate::transport::Transport;
use crate::types::{AnswerOption, AnswerOptionDraft, Id, Question, QuestionDraft, Quiz, QuizDraft};
use crate::validation::{check_option_capacity, ensure_valid};

const QUIZZES: &str = "quizzes";
const PUBLISHED_QUIZZES: &str = "published-quizzes";
const QUESTIONS: &str = "quizzes/questions";
const ANSWERS: &str = "quizzes/answers";

const QUIZ_NESTED: &[(&str, EntityKind)] = &[("category", EntityKind::Category)];
const QUESTION_NESTED: &[(&str, EntityKind)] = &[("answerOptions", EntityKind::Answer)];

pub struct QuizService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> QuizService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    fn quizzes(&self) -> ResourceApi<'a, T> {
        self.client.resource(QUIZZES)
    }

    pub fn list(&self) -> Result<Vec<Quiz>, ApiError> {
        self.quizzes()
            .get_all()
            .and_then(|data| decode_list(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| "Failed to fetch quizzes")
    }

    /// Published quizzes only, as students see them.
    pub fn list_published(&self) -> Result<Vec<Quiz>, ApiError> {
        self.client
            .get(PUBLISHED_QUIZZES, &RequestOptions::new())
            .and_then(|data| decode_list(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| "Failed to fetch published quizzes")
    }

    /// `GET /quizzes` filtered by query parameters.
    pub fn find_by(&self, params: &[(&str, &str)]) -> Result<Vec<Quiz>, ApiError> {
        self.quizzes()
            .find_by(params)
            .and_then(|data| decode_list(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| "Failed to fetch quizzes")
    }

    pub fn get(&self, id: Id) -> Result<Quiz, ApiError> {
        self.quizzes()
            .get_by_id(id)
            .and_then(|data| decode_one(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| format!("Failed to fetch quiz with ID {id}"))
    }

    pub fn create(&self, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        ensure_valid(draft)?;
        let payload = Payload::Json(encode(draft, EntityKind::Quiz)?);
        log::debug!("Creating quiz {:?}", draft.title);
        self.quizzes()
            .create(payload)
            .and_then(|data| decode_one(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| "Failed to create quiz")
    }

    pub fn update(&self, id: Id, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        ensure_valid(draft)?;
        let payload = Payload::Json(encode(draft, EntityKind::Quiz)?);
        self.quizzes()
            .update(id, payload)
            .and_then(|data| decode_one(data, EntityKind::Quiz, QUIZ_NESTED))
            .context(|| format!("Failed to update quiz with ID {id}"))
    }

    pub fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.quizzes()
            .delete(id)
            .context(|| format!("Failed to delete quiz with ID {id}"))
    }

    /// Returns the updated quiz when the server sends one back.
    pub fn publish(&self, id: Id) -> Result<Option<Quiz>, ApiError> {
        self.quiz_action(id, "publish")
            .context(|| format!("Failed to publish quiz with ID {id}"))
    }

    pub fn unpublish(&self, id: Id) -> Result<Option<Quiz>, ApiError> {
        self.quiz_action(id, "unpublish")
            .context(|| format!("Failed to unpublish quiz with ID {id}"))
    }

    fn quiz_action(&self, id: Id, action: &str) -> Result<Option<Quiz>, ApiError> {
        let data: Option<Value> = self.quizzes().custom_action(id, action, None)?;
        data.map(|value| decode_one(Some(value), EntityKind::Quiz, QUIZ_NESTED))
            .transpose()
    }

    pub fn questions(&self, quiz_id: Id) -> Result<Vec<Question>, ApiError> {
        self.client
            .get(&format!("{QUIZZES}/{quiz_id}/questions"), &RequestOptions::new())
            .and_then(|data| decode_list(data, EntityKind::Question, QUESTION_NESTED))
            .context(|| format!("Failed to fetch questions for quiz with ID {quiz_id}"))
    }

    pub fn question(&self, question_id: Id) -> Result<Question, ApiError> {
        self.client
            .resource(QUESTIONS)
            .get_by_id(question_id)
            .and_then(|data| decode_one(data, EntityKind::Question, QUESTION_NESTED))
            .context(|| format!("Failed to fetch question with ID {question_id}"))
    }

    pub fn create_question(&self, quiz_id: Id, draft: &QuestionDraft) -> Result<Question, ApiError> {
        ensure_valid(draft)?;
        let payload = encode_with(draft, EntityKind::Question, &[("quizId", json!(quiz_id))])?;
        self.client
            .post(
                &format!("{QUIZZES}/{quiz_id}/questions"),
                Some(payload),
                &RequestOptions::new(),
            )
            .and_then(|data| decode_one(data, EntityKind::Question, QUESTION_NESTED))
            .context(|| format!("Failed to create question for quiz with ID {quiz_id}"))
    }

    pub fn delete_question(&self, question_id: Id) -> Result<(), ApiError> {
        self.client
            .resource(QUESTIONS)
            .delete(question_id)
            .context(|| format!("Failed to delete question with ID {question_id}"))
    }

    pub fn answer_options(&self, question_id: Id) -> Result<Vec<AnswerOption>, ApiError> {
        self.client
            .get(&answers_path(question_id), &RequestOptions::new())
            .and_then(|data| decode_list(data, EntityKind::Answer, &[]))
            .context(|| {
                format!("Failed to fetch answer options for question with ID {question_id}")
            })
    }

    /// Validates the draft, then checks the question still has room for
    /// another option before posting it.
    pub fn create_answer_option(
        &self,
        question_id: Id,
        draft: &AnswerOptionDraft,
    ) -> Result<AnswerOption, ApiError> {
        ensure_valid(draft)?;
        let existing = self.answer_options(question_id)?;
        check_option_capacity(existing.len())?;

        let payload = encode_with(draft, EntityKind::Answer, &[("questionId", json!(question_id))])?;
        self.client
            .post(&answers_path(question_id), Some(payload), &RequestOptions::new())
            .and_then(|data| decode_one(data, EntityKind::Answer, &[]))
            .context(|| {
                format!("Failed to create answer option for question with ID {question_id}")
            })
    }

    pub fn delete_answer_option(&self, answer_id: Id) -> Result<(), ApiError> {
        self.client
            .resource(ANSWERS)
            .delete(answer_id)
            .context(|| format!("Failed to delete answer option with ID {answer_id}"))
    }
}

fn answers_path(question_id: Id) -> String {
    format!("{QUESTIONS}/{question_id}/answers")
}
