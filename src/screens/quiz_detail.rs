// src/screens/quiz_detail.rs

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use crate::{
    error::AppError,
    models::quiz::{MultipleChoiceQuestion, QuizDetail, Verdict},
    routes::Route,
    state::AppState,
    ui::Alert,
    utils::text::{one_line, sanitize},
};

/// Lifecycle of one detail-screen visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Loaded(QuizDetail),
    /// The code matched no quiz.
    NotFound,
    /// The session was rejected; the user must sign in again.
    Unauthorized,
    /// Any other failure. Logged only.
    Failed,
}

/// Multiple-choice result: correct answers out of all questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.total)
    }
}

/// Answers given during one visit. Dropped with the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    /// Question id -> chosen option.
    pub selected: HashMap<String, String>,
    /// Free-text question -> answer buffer.
    pub free_text_answers: HashMap<String, String>,
    pub verdicts: HashMap<String, Verdict>,
    pub feedback: HashMap<String, String>,
    /// Set once, on submission. Selections are locked from then on.
    pub submission: Option<Score>,
}

impl AnswerState {
    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }
}

/// Counts questions whose selected option equals the answer key exactly.
pub fn score(questions: &[MultipleChoiceQuestion], selected: &HashMap<String, String>) -> usize {
    questions
        .iter()
        .filter(|q| selected.get(&q.id) == Some(&q.answer_key))
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreeTextOutcome {
    Graded { verdict: Verdict, feedback: String },
    /// Blank answer; nothing was sent.
    Empty,
    /// This question is already being graded.
    Busy,
    NotLoaded,
    UnknownQuestion,
    SessionExpired,
    Failed,
}

/// One quiz, opened by its link code.
pub struct QuizDetailScreen {
    state: AppState,
    code: String,
    detail: Mutex<DetailState>,
    answers: Mutex<AnswerState>,
    validating: Mutex<HashSet<String>>,
}

impl QuizDetailScreen {
    pub fn new(state: AppState, code: impl Into<String>) -> Self {
        Self {
            state,
            code: code.into(),
            detail: Mutex::new(DetailState::Loading),
            answers: Mutex::new(AnswerState::default()),
            validating: Mutex::new(HashSet::new()),
        }
    }

    pub fn detail(&self) -> DetailState {
        self.detail
            .lock()
            .map(|d| d.clone())
            .unwrap_or(DetailState::Failed)
    }

    pub fn answers(&self) -> AnswerState {
        self.answers.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn set_detail(&self, next: DetailState) {
        if let Ok(mut current) = self.detail.lock() {
            *current = next;
        }
    }

    fn loaded(&self) -> Option<QuizDetail> {
        match self.detail() {
            DetailState::Loaded(quiz) => Some(quiz),
            _ => None,
        }
    }

    /// Fetches the quiz for this screen's code.
    pub async fn load(&self) -> DetailState {
        if !self.state.session.is_signed_in() {
            self.set_detail(DetailState::Unauthorized);
            return DetailState::Unauthorized;
        }

        let next = match self.state.api.quiz_by_code(&self.code).await {
            Ok(quiz) => {
                tracing::info!(
                    "Loaded quiz {} ({} choice, {} open)",
                    self.code,
                    quiz.multiple_choice.len(),
                    quiz.free_text.len()
                );
                DetailState::Loaded(quiz)
            }
            Err(AppError::NotFound(_)) => {
                self.state.alerts.alert(Alert::new(
                    "Quiz Not Found",
                    "Please check the code and try again.",
                ));
                DetailState::NotFound
            }
            // The client has already cleared the session.
            Err(AppError::Unauthorized(_)) => DetailState::Unauthorized,
            Err(e) => {
                tracing::error!("Failed to fetch quiz {}: {}", self.code, e);
                DetailState::Failed
            }
        };
        self.set_detail(next.clone());
        next
    }

    /// Where the screen wants to go on its own, if anywhere.
    pub fn route(&self) -> Option<Route> {
        matches!(self.detail(), DetailState::Unauthorized).then_some(Route::Login)
    }

    /// Records an option for a question. Returns whether anything changed.
    pub fn select_option(&self, question_id: &str, option: &str) -> bool {
        let Some(quiz) = self.loaded() else {
            return false;
        };
        let valid = quiz
            .multiple_choice
            .iter()
            .any(|q| q.id == question_id && q.options.iter().any(|o| o == option));
        if !valid {
            return false;
        }

        let Ok(mut answers) = self.answers.lock() else {
            return false;
        };
        if answers.is_submitted() {
            return false;
        }
        answers
            .selected
            .insert(question_id.to_string(), option.to_string());
        true
    }

    /// Scores the multiple-choice section locally. Submitting twice returns
    /// the first score.
    pub fn submit_multiple_choice(&self) -> Option<Score> {
        let quiz = self.loaded()?;
        let mut answers = self.answers.lock().ok()?;
        if let Some(existing) = answers.submission {
            return Some(existing);
        }
        let result = Score {
            correct: score(&quiz.multiple_choice, &answers.selected),
            total: quiz.multiple_choice.len(),
        };
        answers.submission = Some(result);
        tracing::info!("Multiple choice submitted for {}: {}", self.code, result);
        Some(result)
    }

    pub fn set_answer(&self, question: &str, text: &str) {
        if let Ok(mut answers) = self.answers.lock() {
            answers
                .free_text_answers
                .insert(question.to_string(), text.to_string());
        }
    }

    /// Free-text question by 1-based position.
    pub fn free_text_question(&self, index: usize) -> Option<String> {
        let quiz = self.loaded()?;
        index
            .checked_sub(1)
            .and_then(|i| quiz.free_text.get(i).cloned())
    }

    /// Multiple-choice question id and option by 1-based positions.
    pub fn option_at(&self, question: usize, option: usize) -> Option<(String, String)> {
        let quiz = self.loaded()?;
        let q = quiz.multiple_choice.get(question.checked_sub(1)?)?;
        let opt = q.options.get(option.checked_sub(1)?)?;
        Some((q.id.clone(), opt.clone()))
    }

    /// Sends one free-text answer for grading and stores the result.
    pub async fn submit_free_text(&self, question: &str) -> FreeTextOutcome {
        let Some(quiz) = self.loaded() else {
            return FreeTextOutcome::NotLoaded;
        };
        if !quiz.free_text.iter().any(|q| q == question) {
            return FreeTextOutcome::UnknownQuestion;
        }

        let answer = self
            .answers()
            .free_text_answers
            .get(question)
            .map(|a| a.trim().to_string())
            .unwrap_or_default();
        if answer.is_empty() {
            self.state.alerts.alert(Alert::new("Enter answer", ""));
            return FreeTextOutcome::Empty;
        }

        let Some(pdf_content_id) = quiz.source_document_id.clone() else {
            tracing::error!("Quiz {} has no source document id, cannot validate", self.code);
            self.state.alerts.alert(Alert::new(
                "Grading unavailable",
                "This quiz has no source document to grade against.",
            ));
            return FreeTextOutcome::Failed;
        };

        let Some(_slot) = ValidatingSlot::enter(&self.validating, question) else {
            return FreeTextOutcome::Busy;
        };

        match self
            .state
            .api
            .validate_answer(&pdf_content_id, question, &answer)
            .await
        {
            Ok(validation) => {
                if let Ok(mut answers) = self.answers.lock() {
                    answers
                        .verdicts
                        .insert(question.to_string(), validation.verdict.clone());
                    answers
                        .feedback
                        .insert(question.to_string(), validation.feedback.clone());
                }
                FreeTextOutcome::Graded {
                    verdict: validation.verdict,
                    feedback: validation.feedback,
                }
            }
            Err(AppError::Unauthorized(_)) => {
                self.set_detail(DetailState::Unauthorized);
                FreeTextOutcome::SessionExpired
            }
            Err(e) => {
                tracing::error!("Validation failed: {}", e);
                FreeTextOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        match self.detail() {
            DetailState::Loading => "Loading...\n".to_string(),
            DetailState::NotFound => format!("Quiz {}\n\nInvalid Code\n", one_line(&self.code)),
            DetailState::Unauthorized => "Session expired. Please sign in again.\n".to_string(),
            DetailState::Failed => {
                format!("Could not load quiz {}. Try again later.\n", one_line(&self.code))
            }
            DetailState::Loaded(quiz) => self.render_loaded(&quiz),
        }
    }

    fn render_loaded(&self, quiz: &QuizDetail) -> String {
        let answers = self.answers();
        let mut out = format!("{}\n\n", one_line(&quiz.title));

        for (i, q) in quiz.multiple_choice.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, one_line(&q.question)));
            let chosen = answers.selected.get(&q.id);
            for (j, opt) in q.options.iter().enumerate() {
                let mark = if chosen == Some(opt) { "(•)" } else { "( )" };
                out.push_str(&format!("   {} {}. {}\n", mark, j + 1, one_line(opt)));
            }
        }
        match (quiz.multiple_choice.is_empty(), answers.submission) {
            (true, _) => out.push_str("No multiple-choice questions.\n"),
            (false, Some(result)) => out.push_str(&format!("Score: {}\n", result)),
            (false, None) => out.push_str("[submit answers with `submit`]\n"),
        }

        if !quiz.free_text.is_empty() {
            out.push_str("\nText Questions\n");
            if quiz.source_document_id.is_none() {
                out.push_str("(grading unavailable for this quiz)\n");
            }
        }
        for (i, q) in quiz.free_text.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, one_line(q)));
            if let Some(answer) = answers.free_text_answers.get(q) {
                out.push_str(&format!("   Answer: {}\n", one_line(answer)));
            }
            if let Some(verdict) = answers.verdicts.get(q) {
                out.push_str(&format!("   {}\n", sanitize(&verdict.label())));
                if let Some(feedback) = answers.feedback.get(q) {
                    for line in sanitize(feedback).lines() {
                        out.push_str(&format!("   {}\n", line));
                    }
                }
            }
        }
        out
    }
}

/// Marks one free-text question as being graded until dropped.
struct ValidatingSlot<'a> {
    set: &'a Mutex<HashSet<String>>,
    question: String,
}

impl<'a> ValidatingSlot<'a> {
    fn enter(set: &'a Mutex<HashSet<String>>, question: &str) -> Option<Self> {
        let mut guard = set.lock().ok()?;
        guard.insert(question.to_string()).then(|| Self {
            set,
            question: question.to_string(),
        })
    }
}

impl Drop for ValidatingSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.set.lock() {
            guard.remove(&self.question);
        }
    }
}
