//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port, then drives the
//! services over real HTTP with `UreqTransport`. This checks that field
//! mapping, status handling and the ownership header agree with a server
//! that speaks the backend's DTO shapes.

use quiz_core::services::attempts::DEFAULT_STUDENT_ID;
use quiz_core::types::{
    AnswerOptionDraft, AttemptStatus, CategoryDraft, Difficulty, QuestionDraft, QuizDraft,
    ReviewDraft,
};
use quiz_core::{
    ApiClient, AttemptService, CategoryService, ErrorKind, MemoryNicknameStore, QuizService,
    RequestOptions, ReviewService, StudentSession,
};
use serde_json::Value;

fn start_server() -> ApiClient {
    let _ = env_logger::builder().is_test(true).try_init();

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    ApiClient::new(&format!("http://{addr}/api/"))
}

fn quiz_draft(title: &str) -> QuizDraft {
    QuizDraft {
        title: title.to_string(),
        description: Some("Covers the basics".to_string()),
        course_code: Some("RS101".to_string()),
        ..QuizDraft::default()
    }
}

fn option(text: &str, correct: bool) -> AnswerOptionDraft {
    AnswerOptionDraft {
        answer_text: text.to_string(),
        correct,
    }
}

#[test]
fn authoring_lifecycle() {
    let client = start_server();
    let categories = CategoryService::new(&client);
    let quizzes = QuizService::new(&client);

    let category = categories
        .create(&CategoryDraft {
            name: "Memory".to_string(),
            description: None,
        })
        .unwrap();
    assert_eq!(category.name, "Memory");

    let mut draft = quiz_draft("Ownership basics");
    draft.category_id = Some(category.id);
    let quiz = quizzes.create(&draft).unwrap();
    assert!(!quiz.published);
    assert_eq!(quiz.category.as_ref().map(|c| c.name.as_str()), Some("Memory"));

    assert!(quizzes.list_published().unwrap().is_empty());
    assert!(categories.quizzes(category.id).unwrap().is_empty());
    let published = quizzes.publish(quiz.id).unwrap().unwrap();
    assert!(published.published);
    assert_eq!(quizzes.list_published().unwrap().len(), 1);
    assert_eq!(categories.quizzes(category.id).unwrap()[0].id, quiz.id);
    assert_eq!(quizzes.find_by(&[("published", "true")]).unwrap().len(), 1);

    let question = quizzes
        .create_question(
            quiz.id,
            &QuestionDraft {
                content: "Who owns a moved value?".to_string(),
                difficulty_level: Difficulty::Hard,
            },
        )
        .unwrap();
    assert_eq!(question.content, "Who owns a moved value?");
    assert_eq!(question.quiz_id, quiz.id);

    for (text, correct) in [("The new binding", true), ("Both", false), ("Nobody", false), ("The caller", false)] {
        quizzes
            .create_answer_option(question.id, &option(text, correct))
            .unwrap();
    }
    let err = quizzes
        .create_answer_option(question.id, &option("The heap", false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.user_message(), "A question can have at most 4 answer options");

    let fetched = quizzes.question(question.id).unwrap();
    assert_eq!(fetched.answer_options.len(), 4);
    assert_eq!(fetched.answer_options[0].answer_text, "The new binding");

    quizzes
        .delete_answer_option(fetched.answer_options[3].id)
        .unwrap();
    assert_eq!(quizzes.answer_options(question.id).unwrap().len(), 3);

    let mut renamed = quiz_draft("Ownership in depth");
    renamed.published = true;
    renamed.category_id = Some(category.id);
    let updated = quizzes.update(quiz.id, &renamed).unwrap();
    assert_eq!(updated.title, "Ownership in depth");

    quizzes.unpublish(quiz.id).unwrap();
    assert!(quizzes.list_published().unwrap().is_empty());

    quizzes.delete_question(question.id).unwrap();
    assert!(quizzes.questions(quiz.id).unwrap().is_empty());

    quizzes.delete(quiz.id).unwrap();
    let err = quizzes.get(quiz.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status(), Some(404));

    categories.delete(category.id).unwrap();
    assert!(categories.list().unwrap().is_empty());
}

#[test]
fn student_attempt_and_results() {
    let client = start_server();
    let quizzes = QuizService::new(&client);
    let attempts = AttemptService::new(&client);

    let quiz = quizzes.create(&quiz_draft("Borrowing")).unwrap();
    let question = quizzes
        .create_question(
            quiz.id,
            &QuestionDraft {
                content: "How many &mut at once?".to_string(),
                difficulty_level: Difficulty::Easy,
            },
        )
        .unwrap();
    let one = quizzes.create_answer_option(question.id, &option("One", true)).unwrap();
    quizzes.create_answer_option(question.id, &option("Any", false)).unwrap();

    let err = attempts.start(quiz.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.user_message().contains("is not published"));

    quizzes.publish(quiz.id).unwrap();
    let attempt = attempts.start_as(quiz.id, DEFAULT_STUDENT_ID).unwrap();
    assert_eq!(attempt.status, AttemptStatus::InProgress);
    let next = attempt.next_question().unwrap();
    assert_eq!(next.content.as_deref(), Some("How many &mut at once?"));
    assert_eq!(next.answer_options.len(), 2);

    let verdict = attempts.submit_answer(attempt.id, next.id, one.id).unwrap();
    assert!(verdict.correct);
    assert_eq!(verdict.chosen_answer_text.as_deref(), Some("One"));

    let err = attempts.submit_answer(attempt.id, next.id, one.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let attempt = attempts.get(attempt.id).unwrap();
    assert!(attempt.is_complete());
    assert_eq!(attempt.progress().unwrap().percentage, 100);

    let results = attempts.results(quiz.id).unwrap();
    assert_eq!(results.total_answers(), 1);
    assert_eq!(results.correct_answers(), 1);
    assert_eq!(results.question_results[0].accuracy(), 100.0);
}

#[test]
fn review_ownership_over_http() {
    let client = start_server();
    let quiz = QuizService::new(&client)
        .create(&quiz_draft("Lifetimes"))
        .unwrap();

    let ada = StudentSession::new(MemoryNicknameStore::new());
    let reviews = ReviewService::new(&client, &ada);
    let draft = ReviewDraft {
        student_nickname: "Ada".to_string(),
        rating: 4,
        review_text: "Helpful diagrams throughout".to_string(),
    };
    let review = reviews.create(quiz.id, &draft).unwrap();
    assert_eq!(ada.nickname().as_deref(), Some("Ada"));
    assert!(reviews.can_modify(&review));

    let grace = StudentSession::new(MemoryNicknameStore::with_nickname("grace"));
    let as_grace = ReviewService::new(&client, &grace);
    assert!(!as_grace.can_modify(&review));
    let err = as_grace.delete(review.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.user_message(), "You can only modify your own reviews");

    let edited = ReviewDraft {
        rating: 5,
        ..draft
    };
    let updated = reviews.update(review.id, quiz.id, &edited).unwrap();
    assert_eq!(updated.rating, 5);
    assert_eq!(reviews.get(review.id).unwrap().rating, 5);

    reviews.delete(review.id).unwrap();
    assert!(reviews.for_quiz(quiz.id).unwrap().is_empty());
}

#[test]
fn raw_client_and_error_details() {
    let client = start_server();

    let quizzes: Option<Vec<Value>> = client.resource("/quizzes/").get_all().unwrap();
    assert_eq!(quizzes, Some(Vec::new()));

    let err = client
        .get::<Value>("quizzes/99", &RequestOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message(), "Quiz not found with id : '99'");

    let err = client
        .del::<Value>("quizzes/answers/5", None, &RequestOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}/api"));
    let err = QuizService::new(&client).list().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(
        err.user_message(),
        "No response from server. Please check your connection"
    );
}
