// tests/quiz_detail_tests.rs

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::signed_in;
use prepai::{
    Route,
    models::quiz::Verdict,
    screens::quiz_detail::{DetailState, FreeTextOutcome, QuizDetailScreen},
    token_store::TokenStore,
};
use serde_json::json;

const WHY: &str = "Why did Paris become the capital?";
const RIVER: &str = "Name one river that flows through Paris.";

#[tokio::test]
async fn loads_quiz_by_code() {
    let (_backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    assert_eq!(screen.detail(), DetailState::Loading);
    assert_eq!(screen.render(), "Loading...\n");

    let DetailState::Loaded(quiz) = screen.load().await else {
        panic!("quiz should load");
    };
    assert_eq!(quiz.title, "Chapter 1");
    assert_eq!(quiz.multiple_choice.len(), 1);
    assert_eq!(quiz.free_text.len(), 2);
    assert_eq!(quiz.source_document_id.as_deref(), Some("pdf-001"));
}

#[tokio::test]
async fn unknown_code_alerts_and_shows_invalid_code() {
    let (_backend, state, alerts, store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "NOPE");

    let detail = screen.load().await;

    assert_eq!(detail, DetailState::NotFound);
    assert_eq!(alerts.last().unwrap().title, "Quiz Not Found");
    let rendered = screen.render();
    assert!(rendered.contains("Invalid Code"));
    assert!(!rendered.contains("Score"));
    assert_eq!(screen.submit_multiple_choice(), None);
    // Not a session problem.
    assert!(store.load().await.unwrap().is_some());
    assert_eq!(screen.route(), None);
}

#[tokio::test]
async fn unauthorized_clears_token_and_routes_to_login() {
    let (backend, state, _alerts, store) = signed_in().await;
    backend.set_quiz_status(StatusCode::UNAUTHORIZED);
    let session = state.session.clone();
    let screen = QuizDetailScreen::new(state, "AB12");

    let detail = screen.load().await;

    assert_eq!(detail, DetailState::Unauthorized);
    assert_eq!(screen.route(), Some(Route::Login));
    assert!(!session.is_signed_in());
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn server_errors_are_non_blocking() {
    let (backend, state, alerts, store) = signed_in().await;
    backend.set_quiz_status(StatusCode::INTERNAL_SERVER_ERROR);
    let screen = QuizDetailScreen::new(state, "AB12");

    assert_eq!(screen.load().await, DetailState::Failed);
    assert!(alerts.all().is_empty());
    assert!(store.load().await.unwrap().is_some());
    assert_eq!(screen.route(), None);
}

#[tokio::test]
async fn selection_is_locked_after_submission() {
    let (_backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    assert!(screen.select_option("q-capital", "Lyon"));
    assert!(screen.select_option("q-capital", "Paris"));
    let first = screen.submit_multiple_choice().unwrap();
    assert_eq!((first.correct, first.total), (1, 1));

    let before = screen.answers();
    assert!(!screen.select_option("q-capital", "Lyon"));
    assert_eq!(screen.answers(), before);

    // Score is stable on resubmission.
    assert_eq!(screen.submit_multiple_choice(), Some(first));
}

#[tokio::test]
async fn wrong_or_missing_selection_scores_zero() {
    let (_backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    let score = screen.submit_multiple_choice().unwrap();
    assert_eq!((score.correct, score.total), (0, 1));
    assert!(screen.render().contains("Score: 0 / 1"));
}

#[tokio::test]
async fn options_outside_the_question_are_rejected() {
    let (_backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    assert!(!screen.select_option("q-capital", "Berlin"));
    assert!(!screen.select_option("q-other", "Paris"));
    assert!(screen.answers().selected.is_empty());
}

#[tokio::test]
async fn blank_answer_never_hits_the_network() {
    let (backend, state, alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    assert_eq!(screen.submit_free_text(WHY).await, FreeTextOutcome::Empty);
    screen.set_answer(WHY, "   \n\t ");
    assert_eq!(screen.submit_free_text(WHY).await, FreeTextOutcome::Empty);

    assert_eq!(backend.validate_calls(), 0);
    assert_eq!(alerts.last().unwrap().title, "Enter answer");
}

#[tokio::test]
async fn free_text_verdict_and_feedback_are_stored() {
    let (backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    screen.set_answer(WHY, "  Central location on the Seine  ");
    let outcome = screen.submit_free_text(WHY).await;

    assert_eq!(
        outcome,
        FreeTextOutcome::Graded {
            verdict: Verdict::Correct,
            feedback: "Well explained.".into()
        }
    );
    let sent = backend.validate_requests.lock().unwrap()[0].clone();
    assert_eq!(sent["pdfContentId"], "pdf-001");
    assert_eq!(sent["question"], WHY);
    assert_eq!(sent["answer"], "Central location on the Seine");

    let answers = screen.answers();
    assert_eq!(answers.verdicts.get(WHY), Some(&Verdict::Correct));
    assert!(answers.verdicts.get(RIVER).is_none());
    let rendered = screen.render();
    assert!(rendered.contains("✅ Correct"));
    assert!(rendered.contains("Well explained."));
}

#[tokio::test]
async fn unexpected_verdicts_are_kept_verbatim() {
    let (backend, state, _alerts, _store) = signed_in().await;
    *backend.validate_reply.lock().unwrap() =
        json!({"verdict": "partially", "feedback": "Half of it."});
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    screen.set_answer(RIVER, "The Seine");
    let outcome = screen.submit_free_text(RIVER).await;

    assert!(matches!(
        outcome,
        FreeTextOutcome::Graded { verdict: Verdict::Other(ref v), .. } if v == "partially"
    ));
    assert!(screen.render().contains("❔ partially"));
}

#[tokio::test]
async fn different_questions_validate_concurrently() {
    let (backend, state, _alerts, _store) = signed_in().await;
    backend.validate_delay_ms.store(150, Ordering::SeqCst);
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;
    screen.set_answer(WHY, "Politics");
    screen.set_answer(RIVER, "The Seine");

    let (a, b, again) = tokio::join!(
        screen.submit_free_text(WHY),
        screen.submit_free_text(RIVER),
        async {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            screen.submit_free_text(WHY).await
        }
    );

    assert!(matches!(a, FreeTextOutcome::Graded { .. }));
    assert!(matches!(b, FreeTextOutcome::Graded { .. }));
    // Same question while its first request is in flight.
    assert_eq!(again, FreeTextOutcome::Busy);
    assert_eq!(backend.validate_calls(), 2);
    assert_eq!(screen.answers().verdicts.len(), 2);
}

#[tokio::test]
async fn unknown_question_is_not_sent() {
    let (backend, state, _alerts, _store) = signed_in().await;
    let screen = QuizDetailScreen::new(state, "AB12");
    screen.load().await;

    screen.set_answer("Made-up question?", "answer");
    assert_eq!(
        screen.submit_free_text("Made-up question?").await,
        FreeTextOutcome::UnknownQuestion
    );
    assert_eq!(backend.validate_calls(), 0);
}

#[tokio::test]
async fn expired_session_during_validation() {
    let (backend, state, _alerts, store) = signed_in().await;
    let screen = QuizDetailScreen::new(state.clone(), "AB12");
    screen.load().await;

    // Session rotated elsewhere; the held token is now stale.
    state.session.sign_in("stale-token-value-xyz").await.unwrap();
    screen.set_answer(WHY, "Politics");
    let outcome = screen.submit_free_text(WHY).await;

    assert_eq!(outcome, FreeTextOutcome::SessionExpired);
    assert_eq!(screen.route(), Some(Route::Login));
    assert_eq!(store.load().await.unwrap(), None);
    assert_eq!(backend.validate_calls(), 1);
}

#[tokio::test]
async fn quiz_without_choice_questions() {
    let (backend, state, _alerts, _store) = signed_in().await;
    backend.add_quiz(
        "TXT1",
        json!({"title": "Essay only", "textQuestions": ["Discuss."], "PdfContentId": 42}),
    );
    let screen = QuizDetailScreen::new(state, "TXT1");

    let DetailState::Loaded(quiz) = screen.load().await else {
        panic!("quiz should load");
    };
    assert_eq!(quiz.source_document_id.as_deref(), Some("42"));
    assert!(screen.render().contains("No multiple-choice questions."));
}

#[tokio::test]
async fn quiz_without_source_document_cannot_be_graded() {
    let (backend, state, alerts, _store) = signed_in().await;
    backend.add_quiz(
        "NOSRC",
        json!({"title": "Lost source", "textQuestions": ["Discuss."]}),
    );
    let screen = QuizDetailScreen::new(state, "NOSRC");
    screen.load().await;
    assert!(screen.render().contains("grading unavailable"));

    screen.set_answer("Discuss.", "Something thoughtful");
    let outcome = screen.submit_free_text("Discuss.").await;

    assert_eq!(outcome, FreeTextOutcome::Failed);
    assert_eq!(alerts.last().unwrap().title, "Grading unavailable");
    assert_eq!(backend.validate_calls(), 0);
}
