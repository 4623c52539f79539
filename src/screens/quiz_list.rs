// src/screens/quiz_list.rs

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::InFlight;
use crate::{
    error::AppError,
    models::quiz::{GenerateOutcome, QuizSummary},
    picker::{DocumentPicker, PDF_MIME, PickedDocument},
    routes::Route,
    state::AppState,
    ui::Alert,
    utils::text::one_line,
};

/// Result of one "create quiz" attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateQuizOutcome {
    Created { code: String },
    /// No document selected.
    MissingDocument,
    MissingTitle,
    /// Another upload is still running.
    Busy,
    /// Non-success HTTP status.
    Rejected { status: u16 },
    /// The backend could not read the document.
    Incompatible,
    /// Success status, but no code came back.
    NoCode,
    Failed,
}

impl CreateQuizOutcome {
    pub fn route(&self) -> Option<Route> {
        match self {
            CreateQuizOutcome::Created { code } => Some(Route::quiz(code.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(PickedDocument),
    Cancelled,
    Failed,
}

/// The user's quizzes, the upload form and direct code entry.
pub struct QuizListScreen {
    state: AppState,
    quizzes: Mutex<Vec<QuizSummary>>,
    document: Mutex<Option<PickedDocument>>,
    title: Mutex<String>,
    uploading: AtomicBool,
}

impl QuizListScreen {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            quizzes: Mutex::new(Vec::new()),
            document: Mutex::new(None),
            title: Mutex::new(String::new()),
            uploading: AtomicBool::new(false),
        }
    }

    pub fn quizzes(&self) -> Vec<QuizSummary> {
        self.quizzes.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn document(&self) -> Option<PickedDocument> {
        self.document.lock().ok().and_then(|d| d.clone())
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    pub fn set_title(&self, title: &str) {
        if let Ok(mut current) = self.title.lock() {
            *current = title.to_string();
        }
    }

    /// Fetches the quiz list if a token is held.
    ///
    /// Failures are logged and leave the list empty; the screen stays usable.
    pub async fn refresh(&self) {
        if !self.state.session.is_signed_in() {
            return;
        }
        let quizzes = match self.state.api.list_quizzes().await {
            Ok(quizzes) => {
                tracing::info!("Fetched {} quizzes", quizzes.len());
                quizzes
            }
            Err(e) => {
                tracing::error!("Failed to fetch quizzes: {}", e);
                Vec::new()
            }
        };
        if let Ok(mut current) = self.quizzes.lock() {
            *current = quizzes;
        }
    }

    /// Lets the user pick a PDF. A cancellation keeps the previous selection.
    pub async fn select_document(&self, picker: &dyn DocumentPicker) -> SelectOutcome {
        let alerts = &self.state.alerts;
        match picker.pick(&[PDF_MIME]).await {
            Ok(Some(document)) => {
                alerts.alert(Alert::new("PDF Selected", document.name.clone()));
                if let Ok(mut current) = self.document.lock() {
                    *current = Some(document.clone());
                }
                SelectOutcome::Selected(document)
            }
            Ok(None) => {
                alerts.alert(Alert::new("Selection cancelled", ""));
                SelectOutcome::Cancelled
            }
            Err(e) => {
                tracing::error!("Error opening document picker: {}", e);
                alerts.alert(Alert::new("Error", "Document picker failed"));
                SelectOutcome::Failed
            }
        }
    }

    /// Uploads the selected PDF with the entered title.
    pub async fn create_quiz(&self) -> CreateQuizOutcome {
        let alerts = &self.state.alerts;

        let Some(document) = self.document() else {
            alerts.alert(Alert::new("Error", "Please select a PDF first."));
            return CreateQuizOutcome::MissingDocument;
        };
        let title = self
            .title
            .lock()
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if title.is_empty() {
            alerts.alert(Alert::new("Error", "Please enter a quiz title."));
            return CreateQuizOutcome::MissingTitle;
        }

        let Some(_guard) = InFlight::enter(&self.uploading) else {
            return CreateQuizOutcome::Busy;
        };

        tracing::info!("Uploading {} as \"{}\"", document.name, title);
        let response = match self.state.api.generate_quiz(&document, &title).await {
            Ok(response) => response,
            Err(e) => {
                if let Some(status) = e.status() {
                    tracing::error!("Upload failed with status {}: {}", status, e);
                    alerts.alert(Alert::new(
                        "Error",
                        format!("Upload failed (Status: {})", status),
                    ));
                    return CreateQuizOutcome::Rejected { status };
                }
                tracing::error!("Quiz creation failed: {}", e);
                let message = match e {
                    AppError::Transport(msg) | AppError::Picker(msg) | AppError::Decode(msg) => msg,
                    other => other.to_string(),
                };
                alerts.alert(Alert::new("Error", message));
                return CreateQuizOutcome::Failed;
            }
        };

        match response.outcome() {
            GenerateOutcome::Created(code) => {
                tracing::info!("Quiz created with code {}", code);
                alerts.alert(Alert::new(
                    "Quiz Created",
                    format!("Your quiz code is {}", code),
                ));
                CreateQuizOutcome::Created { code }
            }
            GenerateOutcome::Unreadable => {
                alerts.alert(Alert::new(
                    "Incompatible file.",
                    "This PDF has no readable content.",
                ));
                CreateQuizOutcome::Incompatible
            }
            GenerateOutcome::MissingCode => {
                tracing::error!("No code returned: {:?}", response);
                alerts.alert(Alert::new("Error", "Quiz created but no code returned"));
                CreateQuizOutcome::NoCode
            }
        }
    }

    /// Opens whatever code the user typed. The detail screen reports unknown codes.
    pub fn direct_navigate(&self, input: &str) -> Option<Route> {
        let code = input.trim();
        (!code.is_empty()).then(|| Route::quiz(code))
    }

    /// Opens the n-th quiz of the list (1-based).
    pub fn open(&self, index: usize) -> Option<Route> {
        let quizzes = self.quizzes();
        index
            .checked_sub(1)
            .and_then(|i| quizzes.get(i))
            .map(|quiz| Route::quiz(quiz.code.clone()))
    }

    /// Code of the n-th quiz (1-based), for copying.
    pub fn code_of(&self, index: usize) -> Option<String> {
        index
            .checked_sub(1)
            .and_then(|i| self.quizzes().get(i).map(|q| q.code.clone()))
    }

    pub async fn logout(&self) -> Route {
        if let Err(e) = self.state.session.sign_out().await {
            tracing::warn!("Logout could not clear storage: {}", e);
        }
        Route::Login
    }

    pub fn render(&self) -> String {
        let mut out = String::from("📚 PrepAI Quiz Manager\n\n");

        match self.document() {
            Some(doc) => {
                out.push_str(&format!("Selected PDF: {}\n", one_line(&doc.name)));
                let title = self.title.lock().map(|t| t.clone()).unwrap_or_default();
                out.push_str(&format!("Quiz title:   {}\n", one_line(&title)));
                if self.is_uploading() {
                    out.push_str("Creating quiz...\n");
                } else if !title.trim().is_empty() {
                    out.push_str("Ready: `create`\n");
                }
            }
            None => out.push_str("No PDF selected (`pick <path>`)\n"),
        }

        out.push_str("\nMy Quizzes\n");
        let quizzes = self.quizzes();
        if quizzes.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, quiz) in quizzes.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {}  [{}]\n",
                i + 1,
                one_line(&quiz.title),
                one_line(&quiz.code)
            ));
        }
        out
    }
}
