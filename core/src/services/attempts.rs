//! Quiz attempts. The server tracks progress and grades answers; the client
//! only reports which option was chosen.

use serde_json::json;

use super::decode_record;
use crate::client::{ApiClient, Payload, RequestOptions};
use crate::error::{ApiError, ResultExt};
use crate::mapping::EntityKind;
use crate::transport::Transport;
use crate::types::{Id, QuizAttempt, QuizResults, StudentAnswer};

const ATTEMPTS: &str = "quiz-attempts";

const ATTEMPT_NESTED: &[(&str, EntityKind)] = &[("questions", EntityKind::Question)];

/// Student id sent when none is given; the backend assumes the same.
pub const DEFAULT_STUDENT_ID: Id = 1;

pub struct AttemptService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> AttemptService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn start(&self, quiz_id: Id) -> Result<QuizAttempt, ApiError> {
        self.start_as(quiz_id, DEFAULT_STUDENT_ID)
    }

    pub fn start_as(&self, quiz_id: Id, student_id: Id) -> Result<QuizAttempt, ApiError> {
        let payload = Payload::Json(json!({ "quizId": quiz_id, "studentId": student_id }));
        let attempt: QuizAttempt = self
            .client
            .post(&format!("{ATTEMPTS}/start"), Some(payload), &RequestOptions::new())
            .and_then(|data| decode_record(data, "quiz attempt", ATTEMPT_NESTED))
            .context(|| format!("Failed to start attempt for quiz with ID {quiz_id}"))?;
        log::info!("Started attempt {} for quiz {quiz_id}", attempt.id);
        Ok(attempt)
    }

    /// Current state of an attempt, with answered flags refreshed.
    pub fn get(&self, attempt_id: Id) -> Result<QuizAttempt, ApiError> {
        self.client
            .resource(ATTEMPTS)
            .get_by_id(attempt_id)
            .and_then(|data| decode_record(data, "quiz attempt", ATTEMPT_NESTED))
            .context(|| format!("Failed to fetch attempt with ID {attempt_id}"))
    }

    /// Returns the server's verdict for the chosen option.
    pub fn submit_answer(
        &self,
        attempt_id: Id,
        question_id: Id,
        answer_option_id: Id,
    ) -> Result<StudentAnswer, ApiError> {
        let payload = Payload::Json(json!({ "answerOptionId": answer_option_id }));
        self.client
            .post(
                &format!("{ATTEMPTS}/{attempt_id}/questions/{question_id}/submit-answer"),
                Some(payload),
                &RequestOptions::new(),
            )
            .and_then(|data| decode_record(data, "student answer", &[]))
            .context(|| {
                format!("Failed to submit answer for question {question_id} in attempt {attempt_id}")
            })
    }

    pub fn results(&self, quiz_id: Id) -> Result<QuizResults, ApiError> {
        self.client
            .get(
                &format!("{ATTEMPTS}/quizzes/{quiz_id}/results"),
                &RequestOptions::new(),
            )
            .and_then(|data| decode_record(data, "quiz result", &[]))
            .context(|| format!("Failed to fetch results for quiz with ID {quiz_id}"))
    }
}
