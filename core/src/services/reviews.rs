//! Quiz reviews, with ownership taken from the student's session.

use serde_json::json;

use super::{decode_list, decode_one, encode_with};
use crate::client::{ApiClient, Payload, RequestOptions};
use crate::error::{ApiError, ResultExt};
use crate::mapping::EntityKind;
use crate::session::{NicknameStore, StudentSession};
use crate::transport::Transport;
use crate::types::{Id, Review, ReviewDraft};
use crate::validation::ensure_valid;

const REVIEWS: &str = "reviews";

pub struct ReviewService<'a, T, S> {
    client: &'a ApiClient<T>,
    session: &'a StudentSession<S>,
}

impl<'a, T: Transport, S: NicknameStore> ReviewService<'a, T, S> {
    pub fn new(client: &'a ApiClient<T>, session: &'a StudentSession<S>) -> Self {
        Self { client, session }
    }

    pub fn for_quiz(&self, quiz_id: Id) -> Result<Vec<Review>, ApiError> {
        self.client
            .get(&format!("quizzes/{quiz_id}/reviews"), &RequestOptions::new())
            .and_then(|data| decode_list(data, EntityKind::Review, &[]))
            .context(|| format!("Failed to fetch reviews for quiz with ID {quiz_id}"))
    }

    pub fn get(&self, review_id: Id) -> Result<Review, ApiError> {
        self.client
            .resource(REVIEWS)
            .get_by_id(review_id)
            .and_then(|data| decode_one(data, EntityKind::Review, &[]))
            .context(|| format!("Failed to fetch review with ID {review_id}"))
    }

    /// Posts the review and remembers its author as the current student.
    pub fn create(&self, quiz_id: Id, draft: &ReviewDraft) -> Result<Review, ApiError> {
        ensure_valid(draft)?;
        let payload = encode_with(draft, EntityKind::Review, &[("quizId", json!(quiz_id))])?;
        let review: Review = self
            .client
            .post(
                &format!("quizzes/{quiz_id}/reviews"),
                Some(payload),
                &RequestOptions::new(),
            )
            .and_then(|data| decode_one(data, EntityKind::Review, &[]))
            .context(|| format!("Failed to create review for quiz with ID {quiz_id}"))?;

        if let Err(e) = self.session.remember(&draft.student_nickname) {
            log::warn!("Review saved but nickname was not remembered: {e}");
        }
        Ok(review)
    }

    /// Sends the ownership header; the server decides whether it matches.
    pub fn update(&self, review_id: Id, quiz_id: Id, draft: &ReviewDraft) -> Result<Review, ApiError> {
        ensure_valid(draft)?;
        let payload = Payload::Json(json!({
            "studentNickname": draft.student_nickname,
            "rating": draft.rating,
            "reviewText": draft.review_text,
            "quizId": quiz_id,
        }));
        self.client
            .resource(REVIEWS)
            .with_options(self.session.ownership_options())
            .update(review_id, payload)
            .and_then(|data| decode_one(data, EntityKind::Review, &[]))
            .context(|| format!("Failed to update review with ID {review_id}"))
    }

    pub fn delete(&self, review_id: Id) -> Result<(), ApiError> {
        self.client
            .resource(REVIEWS)
            .with_options(self.session.ownership_options())
            .delete(review_id)
            .context(|| format!("Failed to delete review with ID {review_id}"))
    }

    pub fn can_modify(&self, review: &Review) -> bool {
        self.session.can_modify(review)
    }
}
