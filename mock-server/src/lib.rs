//! In-memory stand-in for the quiz backend.
//!
//! Serves the same paths and DTO field names as the real service under
//! `/api`: questions carry `questionText`, answer options `answerText`,
//! categories `title`. Failures come back as JSON `{status, error, message,
//! path}`.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub type Id = i64;

pub const NICKNAME_HEADER: &str = "x-student-nickname";
pub const MAX_ANSWER_OPTIONS: usize = 4;

const DIFFICULTIES: [&str; 3] = ["EASY", "MEDIUM", "HARD"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub course_code: Option<String>,
    pub published: bool,
    pub category_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub category_id: Option<Id>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizFilter {
    pub published: Option<bool>,
    pub category_id: Option<Id>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Id,
    pub question_text: String,
    pub difficulty_level: String,
    pub quiz_id: Id,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub question_text: String,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: String,
}

fn default_difficulty() -> String {
    "MEDIUM".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: Id,
    pub answer_text: String,
    pub correct: bool,
    pub question_id: Id,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub answer_text: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Id,
    pub quiz_id: Id,
    pub quiz_title: Option<String>,
    pub student_nickname: String,
    pub rating: i32,
    pub review_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub student_nickname: String,
    pub rating: i32,
    pub review_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAttempt {
    pub quiz_id: Id,
    #[serde(default = "default_student")]
    pub student_id: Id,
}

fn default_student() -> Id {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub answer_option_id: Option<Id>,
}

#[derive(Clone, Debug)]
struct Attempt {
    id: Id,
    quiz_id: Id,
    student_id: Id,
    answered: BTreeSet<Id>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub id: Id,
    pub quiz_id: Id,
    pub quiz_title: String,
    pub student_id: Id,
    pub status: String,
    pub questions: Vec<AttemptQuestion>,
    pub score: Option<f32>,
}

/// A question as shown during an attempt; options carry no `correct` flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptQuestion {
    pub id: Id,
    pub question_text: String,
    pub difficulty_level: String,
    pub answered: bool,
    pub answer_options: Vec<AttemptOption>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOption {
    pub id: Id,
    pub answer_text: String,
    pub question_id: Id,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnswer {
    pub id: Id,
    pub attempt_id: Id,
    pub question_id: Id,
    pub question_text: String,
    pub chosen_answer_id: Id,
    pub chosen_answer_text: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub quiz_id: Id,
    pub quiz_title: String,
    pub question_results: Vec<QuestionResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: Id,
    pub question_text: String,
    pub question_difficulty: String,
    pub total_answers: u64,
    pub correct_answers: u64,
    pub wrong_answers: u64,
}

/// Error body, shaped like the backend's.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

/// Handler failure. Rendered to `ErrorResponse` by `render_errors`, which
/// knows the request path.
#[derive(Clone, Debug, PartialEq)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(entity: &str, id: Id) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{entity} not found with id : '{id}'"),
        )
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

async fn render_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let mut response = next.run(request).await;
    let Some(failure) = response.extensions_mut().remove::<AppError>() else {
        return response;
    };
    log::warn!("{method} {path} -> {}: {}", failure.status, failure.message);
    let body = ErrorResponse {
        status: failure.status.as_u16(),
        error: failure
            .status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        message: failure.message,
        path,
    };
    (failure.status, Json(body)).into_response()
}

fn require_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::bad_request(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn limit_text(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(value) if value.chars().count() > max => Err(AppError::bad_request(format!(
            "{field} must be less than {max} characters"
        ))),
        _ => Ok(()),
    }
}

impl CategoryInput {
    fn check(&self) -> Result<(), AppError> {
        require_text("Title", &self.title, 3, 100)?;
        limit_text("Description", self.description.as_deref(), 255)
    }
}

impl QuizInput {
    fn check(&self) -> Result<(), AppError> {
        require_text("Title", &self.title, 3, 100)?;
        limit_text("Description", self.description.as_deref(), 500)?;
        limit_text("Course code", self.course_code.as_deref(), 50)
    }
}

impl QuestionInput {
    fn check(&self) -> Result<(), AppError> {
        require_text("Question text", &self.question_text, 5, 1000)?;
        if !DIFFICULTIES.contains(&self.difficulty_level.as_str()) {
            return Err(AppError::bad_request(format!(
                "Unknown difficulty level: {}",
                self.difficulty_level
            )));
        }
        Ok(())
    }
}

impl AnswerInput {
    fn check(&self) -> Result<(), AppError> {
        require_text("Answer text", &self.answer_text, 1, 255)
    }
}

impl ReviewInput {
    fn check(&self) -> Result<(), AppError> {
        require_text("Nickname", &self.student_nickname, 3, 100)?;
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::bad_request("Rating must be between 1 and 5"));
        }
        require_text("Review", &self.review_text, 10, 2000)
    }
}

/// The review's author must match the nickname header, ignoring case.
fn ensure_owner(review: &Review, headers: &HeaderMap) -> Result<(), AppError> {
    let nickname = headers
        .get(NICKNAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if nickname.is_empty()
        || nickname.to_lowercase() != review.student_nickname.trim().to_lowercase()
    {
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            "You can only modify your own reviews",
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct Store {
    last_id: Id,
    categories: BTreeMap<Id, Category>,
    quizzes: BTreeMap<Id, Quiz>,
    questions: BTreeMap<Id, Question>,
    answers: BTreeMap<Id, AnswerOption>,
    reviews: BTreeMap<Id, Review>,
    attempts: BTreeMap<Id, Attempt>,
    student_answers: Vec<StudentAnswer>,
}

impl Store {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn quiz(&self, id: Id) -> Result<&Quiz, AppError> {
        self.quizzes.get(&id).ok_or_else(|| AppError::not_found("Quiz", id))
    }

    fn question(&self, id: Id) -> Result<&Question, AppError> {
        self.questions
            .get(&id)
            .ok_or_else(|| AppError::not_found("Question", id))
    }

    fn ensure_category(&self, id: Option<Id>) -> Result<(), AppError> {
        match id {
            Some(id) if !self.categories.contains_key(&id) => {
                Err(AppError::not_found("Category", id))
            }
            _ => Ok(()),
        }
    }

    /// The quiz with its category embedded.
    fn quiz_view(&self, quiz: &Quiz) -> Quiz {
        Quiz {
            category: quiz
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            ..quiz.clone()
        }
    }

    fn options_for(&self, question_id: Id) -> impl Iterator<Item = &AnswerOption> + '_ {
        self.answers
            .values()
            .filter(move |option| option.question_id == question_id)
    }

    fn questions_for(&self, quiz_id: Id) -> impl Iterator<Item = &Question> + '_ {
        self.questions
            .values()
            .filter(move |question| question.quiz_id == quiz_id)
    }

    fn question_view(&self, question: &Question) -> Question {
        Question {
            answer_options: self.options_for(question.id).cloned().collect(),
            ..question.clone()
        }
    }

    fn published_quizzes(&self, category_id: Option<Id>) -> Vec<Quiz> {
        self.quizzes
            .values()
            .filter(|quiz| quiz.published)
            .filter(|quiz| category_id.is_none() || quiz.category_id == category_id)
            .map(|quiz| self.quiz_view(quiz))
            .collect()
    }

    fn attempt_view(&self, attempt: &Attempt) -> AttemptView {
        let questions: Vec<AttemptQuestion> = self
            .questions_for(attempt.quiz_id)
            .map(|question| AttemptQuestion {
                id: question.id,
                question_text: question.question_text.clone(),
                difficulty_level: question.difficulty_level.clone(),
                answered: attempt.answered.contains(&question.id),
                answer_options: self
                    .options_for(question.id)
                    .map(|option| AttemptOption {
                        id: option.id,
                        answer_text: option.answer_text.clone(),
                        question_id: option.question_id,
                    })
                    .collect(),
            })
            .collect();
        let complete = questions.iter().all(|question| question.answered);
        let score = (complete && !questions.is_empty()).then(|| {
            let correct = self
                .student_answers
                .iter()
                .filter(|answer| answer.attempt_id == attempt.id && answer.correct)
                .count();
            correct as f32 / questions.len() as f32 * 100.0
        });
        AttemptView {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            quiz_title: self
                .quizzes
                .get(&attempt.quiz_id)
                .map(|quiz| quiz.title.clone())
                .unwrap_or_default(),
            student_id: attempt.student_id,
            status: if complete { "COMPLETED" } else { "IN_PROGRESS" }.to_string(),
            questions,
            score,
        }
    }

    fn remove_question(&mut self, question_id: Id) {
        self.questions.remove(&question_id);
        self.answers.retain(|_, option| option.question_id != question_id);
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/categories/{id}/quizzes", get(category_quizzes))
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route("/quizzes/{id}", get(get_quiz).put(update_quiz).delete(delete_quiz))
        .route("/quizzes/{id}/publish", post(publish_quiz))
        .route("/quizzes/{id}/unpublish", post(unpublish_quiz))
        .route("/quizzes/{id}/questions", get(quiz_questions).post(create_question))
        .route("/quizzes/{id}/reviews", get(quiz_reviews).post(create_review))
        .route("/quizzes/questions/{id}", get(get_question).delete(delete_question))
        .route(
            "/quizzes/questions/{id}/answers",
            get(question_answers).post(create_answer),
        )
        .route("/quizzes/answers/{id}", delete(delete_answer))
        .route("/published-quizzes", get(published_quizzes))
        .route("/quiz-attempts/start", post(start_attempt))
        .route("/quiz-attempts/{id}", get(get_attempt))
        .route(
            "/quiz-attempts/{id}/questions/{question_id}/submit-answer",
            post(submit_answer),
        )
        .route("/quiz-attempts/quizzes/{id}/results", get(quiz_results))
        .route(
            "/reviews/{id}",
            get(get_review).put(update_review).delete(delete_review),
        );

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(render_errors))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- categories ---

async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    Json(db.read().await.categories.values().cloned().collect())
}

async fn create_category(
    State(db): State<Db>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    input.check()?;
    let mut store = db.write().await;
    let category = Category {
        id: store.next_id(),
        title: input.title.trim().to_string(),
        description: input.description,
    };
    store.categories.insert(category.id, category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Category>, AppError> {
    let store = db.read().await;
    store
        .categories
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Category", id))
}

async fn update_category(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    input.check()?;
    let mut store = db.write().await;
    let category = store
        .categories
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Category", id))?;
    category.title = input.title.trim().to_string();
    category.description = input.description;
    Ok(Json(category.clone()))
}

async fn delete_category(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    store
        .categories
        .remove(&id)
        .ok_or_else(|| AppError::not_found("Category", id))?;
    for quiz in store.quizzes.values_mut() {
        if quiz.category_id == Some(id) {
            quiz.category_id = None;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn category_quizzes(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    let store = db.read().await;
    store.ensure_category(Some(id))?;
    Ok(Json(store.published_quizzes(Some(id))))
}

// --- quizzes ---

async fn list_quizzes(State(db): State<Db>, Query(filter): Query<QuizFilter>) -> Json<Vec<Quiz>> {
    let store = db.read().await;
    let quizzes = store
        .quizzes
        .values()
        .filter(|quiz| filter.published.is_none_or(|published| quiz.published == published))
        .filter(|quiz| filter.category_id.is_none() || quiz.category_id == filter.category_id)
        .map(|quiz| store.quiz_view(quiz))
        .collect();
    Json(quizzes)
}

async fn published_quizzes(State(db): State<Db>) -> Json<Vec<Quiz>> {
    Json(db.read().await.published_quizzes(None))
}

async fn create_quiz(
    State(db): State<Db>,
    Json(input): Json<QuizInput>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    input.check()?;
    let mut store = db.write().await;
    store.ensure_category(input.category_id)?;
    let quiz = Quiz {
        id: store.next_id(),
        title: input.title.trim().to_string(),
        description: input.description,
        course_code: input.course_code,
        published: input.published,
        category_id: input.category_id,
        category: None,
    };
    store.quizzes.insert(quiz.id, quiz.clone());
    log::info!("created quiz {} ({})", quiz.id, quiz.title);
    Ok((StatusCode::CREATED, Json(store.quiz_view(&quiz))))
}

async fn get_quiz(State(db): State<Db>, Path(id): Path<Id>) -> Result<Json<Quiz>, AppError> {
    let store = db.read().await;
    let quiz = store.quiz(id)?;
    Ok(Json(store.quiz_view(quiz)))
}

async fn update_quiz(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<QuizInput>,
) -> Result<Json<Quiz>, AppError> {
    input.check()?;
    let mut store = db.write().await;
    store.ensure_category(input.category_id)?;
    let quiz = store
        .quizzes
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Quiz", id))?;
    quiz.title = input.title.trim().to_string();
    quiz.description = input.description;
    quiz.course_code = input.course_code;
    quiz.published = input.published;
    quiz.category_id = input.category_id;
    let quiz = quiz.clone();
    Ok(Json(store.quiz_view(&quiz)))
}

async fn delete_quiz(State(db): State<Db>, Path(id): Path<Id>) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    store
        .quizzes
        .remove(&id)
        .ok_or_else(|| AppError::not_found("Quiz", id))?;
    let question_ids: Vec<Id> = store.questions_for(id).map(|question| question.id).collect();
    for question_id in question_ids {
        store.remove_question(question_id);
    }
    store.reviews.retain(|_, review| review.quiz_id != id);
    let attempt_ids: BTreeSet<Id> = store
        .attempts
        .values()
        .filter(|attempt| attempt.quiz_id == id)
        .map(|attempt| attempt.id)
        .collect();
    store.attempts.retain(|attempt_id, _| !attempt_ids.contains(attempt_id));
    store
        .student_answers
        .retain(|answer| !attempt_ids.contains(&answer.attempt_id));
    Ok(StatusCode::NO_CONTENT)
}

async fn set_published(db: Db, id: Id, published: bool) -> Result<Json<Quiz>, AppError> {
    let mut store = db.write().await;
    let quiz = store
        .quizzes
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Quiz", id))?;
    quiz.published = published;
    let quiz = quiz.clone();
    log::info!("quiz {id} published={published}");
    Ok(Json(store.quiz_view(&quiz)))
}

async fn publish_quiz(State(db): State<Db>, Path(id): Path<Id>) -> Result<Json<Quiz>, AppError> {
    set_published(db, id, true).await
}

async fn unpublish_quiz(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Quiz>, AppError> {
    set_published(db, id, false).await
}

// --- questions and answer options ---

async fn quiz_questions(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Question>>, AppError> {
    let store = db.read().await;
    store.quiz(id)?;
    Ok(Json(
        store
            .questions_for(id)
            .map(|question| store.question_view(question))
            .collect(),
    ))
}

async fn create_question(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<QuestionInput>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    input.check()?;
    let mut store = db.write().await;
    store.quiz(id)?;
    let question = Question {
        id: store.next_id(),
        question_text: input.question_text.trim().to_string(),
        difficulty_level: input.difficulty_level,
        quiz_id: id,
        answer_options: Vec::new(),
    };
    store.questions.insert(question.id, question.clone());
    Ok((StatusCode::CREATED, Json(question)))
}

async fn get_question(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Question>, AppError> {
    let store = db.read().await;
    let question = store.question(id)?;
    Ok(Json(store.question_view(question)))
}

async fn delete_question(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    store.question(id)?;
    store.remove_question(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn question_answers(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<AnswerOption>>, AppError> {
    let store = db.read().await;
    store.question(id)?;
    Ok(Json(store.options_for(id).cloned().collect()))
}

async fn create_answer(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<AnswerInput>,
) -> Result<(StatusCode, Json<AnswerOption>), AppError> {
    input.check()?;
    let mut store = db.write().await;
    store.question(id)?;
    if store.options_for(id).count() >= MAX_ANSWER_OPTIONS {
        return Err(AppError::bad_request(format!(
            "A question can have at most {MAX_ANSWER_OPTIONS} answer options"
        )));
    }
    let option = AnswerOption {
        id: store.next_id(),
        answer_text: input.answer_text.trim().to_string(),
        correct: input.correct,
        question_id: id,
    };
    store.answers.insert(option.id, option.clone());
    Ok((StatusCode::CREATED, Json(option)))
}

async fn delete_answer(State(db): State<Db>, Path(id): Path<Id>) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    store
        .answers
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::not_found("AnswerOption", id))
}

// --- reviews ---

async fn quiz_reviews(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Review>>, AppError> {
    let store = db.read().await;
    store.quiz(id)?;
    Ok(Json(
        store
            .reviews
            .values()
            .filter(|review| review.quiz_id == id)
            .cloned()
            .collect(),
    ))
}

async fn create_review(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    input.check()?;
    let mut store = db.write().await;
    let quiz_title = store.quiz(id)?.title.clone();
    let review = Review {
        id: store.next_id(),
        quiz_id: id,
        quiz_title: Some(quiz_title),
        student_nickname: input.student_nickname.trim().to_string(),
        rating: input.rating,
        review_text: input.review_text,
    };
    store.reviews.insert(review.id, review.clone());
    Ok((StatusCode::CREATED, Json(review)))
}

async fn get_review(State(db): State<Db>, Path(id): Path<Id>) -> Result<Json<Review>, AppError> {
    let store = db.read().await;
    store
        .reviews
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Review", id))
}

async fn update_review(
    State(db): State<Db>,
    Path(id): Path<Id>,
    headers: HeaderMap,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Review>, AppError> {
    input.check()?;
    let mut store = db.write().await;
    let review = store
        .reviews
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Review", id))?;
    ensure_owner(review, &headers)?;
    review.rating = input.rating;
    review.review_text = input.review_text;
    Ok(Json(review.clone()))
}

async fn delete_review(
    State(db): State<Db>,
    Path(id): Path<Id>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    let review = store
        .reviews
        .get(&id)
        .ok_or_else(|| AppError::not_found("Review", id))?;
    ensure_owner(review, &headers)?;
    store.reviews.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// --- attempts ---

async fn start_attempt(
    State(db): State<Db>,
    Json(input): Json<StartAttempt>,
) -> Result<(StatusCode, Json<AttemptView>), AppError> {
    let mut store = db.write().await;
    if !store.quiz(input.quiz_id)?.published {
        return Err(AppError::bad_request(format!(
            "Quiz with ID {} is not published and cannot be attempted.",
            input.quiz_id
        )));
    }
    let attempt = Attempt {
        id: store.next_id(),
        quiz_id: input.quiz_id,
        student_id: input.student_id,
        answered: BTreeSet::new(),
    };
    store.attempts.insert(attempt.id, attempt.clone());
    log::info!("student {} started attempt {}", attempt.student_id, attempt.id);
    Ok((StatusCode::CREATED, Json(store.attempt_view(&attempt))))
}

async fn get_attempt(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<AttemptView>, AppError> {
    let store = db.read().await;
    let attempt = store
        .attempts
        .get(&id)
        .ok_or_else(|| AppError::not_found("QuizAttempt", id))?;
    Ok(Json(store.attempt_view(attempt)))
}

async fn submit_answer(
    State(db): State<Db>,
    Path((attempt_id, question_id)): Path<(Id, Id)>,
    Json(input): Json<AnswerSubmission>,
) -> Result<Json<StudentAnswer>, AppError> {
    let answer_option_id = input.answer_option_id.ok_or_else(|| {
        AppError::bad_request("AnswerOptionId cannot be null in submission.")
    })?;
    let mut store = db.write().await;
    let attempt = store
        .attempts
        .get(&attempt_id)
        .ok_or_else(|| AppError::not_found("QuizAttempt", attempt_id))?;
    let question = store.question(question_id)?;
    let option = store
        .answers
        .get(&answer_option_id)
        .ok_or_else(|| AppError::not_found("AnswerOption", answer_option_id))?;

    if question.quiz_id != attempt.quiz_id {
        return Err(AppError::bad_request(format!(
            "Question with ID {question_id} does not belong to the quiz of attempt ID {attempt_id}"
        )));
    }
    if option.question_id != question_id {
        return Err(AppError::bad_request(format!(
            "Chosen AnswerOption with ID {answer_option_id} does not belong to Question ID {question_id}"
        )));
    }
    if attempt.answered.contains(&question_id) {
        return Err(AppError::bad_request("Question already answered"));
    }

    let mut answer = StudentAnswer {
        id: 0,
        attempt_id,
        question_id,
        question_text: question.question_text.clone(),
        chosen_answer_id: option.id,
        chosen_answer_text: option.answer_text.clone(),
        correct: option.correct,
    };
    answer.id = store.next_id();
    store.student_answers.push(answer.clone());
    if let Some(attempt) = store.attempts.get_mut(&attempt_id) {
        attempt.answered.insert(question_id);
    }
    Ok(Json(answer))
}

async fn quiz_results(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<QuizResults>, AppError> {
    let store = db.read().await;
    let quiz = store.quiz(id)?;
    let question_results = store
        .questions_for(id)
        .map(|question| {
            let answers: Vec<&StudentAnswer> = store
                .student_answers
                .iter()
                .filter(|answer| answer.question_id == question.id)
                .collect();
            let total_answers = answers.len() as u64;
            let correct_answers = answers.iter().filter(|answer| answer.correct).count() as u64;
            QuestionResult {
                question_id: question.id,
                question_text: question.question_text.clone(),
                question_difficulty: question.difficulty_level.clone(),
                total_answers,
                correct_answers,
                wrong_answers: total_answers - correct_answers,
            }
        })
        .collect();
    Ok(Json(QuizResults {
        quiz_id: id,
        quiz_title: quiz.title.clone(),
        question_results,
    }))
}
