// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use prepai::{
    config::Config,
    session::Session,
    state::AppState,
    token_store::{MemoryTokenStore, TokenStore},
    ui::RecordingAlerts,
};
use serde_json::{Value, json};

pub const VALID_TOKEN: &str = "valid-session-token-0001";

/// What the mock backend saw in an upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub title: String,
    pub token: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// In-memory stand-in for the quiz service.
pub struct MockBackend {
    pub users: Mutex<HashMap<String, String>>,
    pub quiz_list: Mutex<Vec<Value>>,
    pub quizzes: Mutex<HashMap<String, Value>>,
    pub list_status: Mutex<Option<StatusCode>>,
    pub quiz_status: Mutex<Option<StatusCode>>,
    pub generate_reply: Mutex<(StatusCode, Value)>,
    pub validate_reply: Mutex<Value>,
    pub validate_delay_ms: AtomicU64,
    pub generate_delay_ms: AtomicU64,
    pub auth_delay_ms: AtomicU64,
    pub validate_calls: AtomicUsize,
    pub validate_requests: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<Upload>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            users: Mutex::new(HashMap::from([(
                "student@example.com".to_string(),
                "password123".to_string(),
            )])),
            quiz_list: Mutex::new(vec![json!({"link_code": "AB12", "title": "Chapter 1"})]),
            quizzes: Mutex::new(HashMap::from([("AB12".to_string(), chapter_one())])),
            list_status: Mutex::new(None),
            quiz_status: Mutex::new(None),
            generate_reply: Mutex::new((StatusCode::OK, json!({"link_code": "NEW1"}))),
            validate_reply: Mutex::new(json!({"verdict": "yes", "feedback": "Well explained."})),
            validate_delay_ms: AtomicU64::new(0),
            generate_delay_ms: AtomicU64::new(0),
            auth_delay_ms: AtomicU64::new(0),
            validate_calls: AtomicUsize::new(0),
            validate_requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }
}

/// The quiz used across the tests: one multiple-choice, two open questions.
pub fn chapter_one() -> Value {
    json!({
        "title": "Chapter 1",
        "quizContent": [
            {
                "_id": "q-capital",
                "question": "What is the capital of France?",
                "options": ["Paris", "Lyon", "Marseille"],
                "answer": "Paris"
            }
        ],
        "textQuestions": [
            "Why did Paris become the capital?",
            "Name one river that flows through Paris."
        ],
        "PdfContentId": "pdf-001"
    })
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_generate_reply(&self, status: StatusCode, body: Value) {
        *self.generate_reply.lock().unwrap() = (status, body);
    }

    pub fn set_quiz_status(&self, status: StatusCode) {
        *self.quiz_status.lock().unwrap() = Some(status);
    }

    pub fn set_list_status(&self, status: StatusCode) {
        *self.list_status.lock().unwrap() = Some(status);
    }

    pub fn add_quiz(&self, code: &str, quiz: Value) {
        self.quizzes.lock().unwrap().insert(code.to_string(), quiz);
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid token"})),
    )
}

async fn pause(delay: &AtomicU64) {
    let ms = delay.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn token_of(body: &Value) -> &str {
    body["token"].as_str().unwrap_or_default()
}

async fn signin(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    pause(&backend.auth_delay_ms).await;
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let users = backend.users.lock().unwrap();
    match users.get(email) {
        Some(stored) if stored == password => (
            StatusCode::OK,
            Json(json!({"user": {"email": email, "token": VALID_TOKEN}})),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        ),
    }
}

async fn signup(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    pause(&backend.auth_delay_ms).await;
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    if !email.contains('@') || username.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid signup data"})),
        );
    }
    let mut users = backend.users.lock().unwrap();
    if users.contains_key(&email) {
        return (
            StatusCode::CREATED,
            Json(json!({"message": "User already exists"})),
        );
    }
    users.insert(email, password);
    (
        StatusCode::OK,
        Json(json!({"user": {"username": username, "token": VALID_TOKEN}})),
    )
}

async fn list_quizzes(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if token_of(&body) != VALID_TOKEN {
        return unauthorized();
    }
    if let Some(status) = *backend.list_status.lock().unwrap() {
        return (status, Json(json!({"error": "forced"})));
    }
    let list = backend.quiz_list.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({"quizList": list})))
}

async fn quiz_by_code(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(status) = *backend.quiz_status.lock().unwrap() {
        return (status, Json(json!({"error": "forced"})));
    }
    if token_of(&body) != VALID_TOKEN {
        return unauthorized();
    }
    let code = body["quizCode"].as_str().unwrap_or_default();
    match backend.quizzes.lock().unwrap().get(code) {
        Some(quiz) => (StatusCode::OK, Json(json!({"quiz": quiz}))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Quiz not found"})),
        ),
    }
}

async fn validate_answer(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.validate_calls.fetch_add(1, Ordering::SeqCst);
    if token_of(&body) != VALID_TOKEN {
        return unauthorized();
    }
    pause(&backend.validate_delay_ms).await;
    backend.validate_requests.lock().unwrap().push(body);
    let reply = backend.validate_reply.lock().unwrap().clone();
    (StatusCode::OK, Json(reply))
}

async fn pdf_to_quiz(
    State(backend): State<Arc<MockBackend>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut upload = Upload {
        title: String::new(),
        token: String::new(),
        file_name: None,
        content_type: None,
        size: 0,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.size = field.bytes().await.unwrap().len();
            }
            "title" => upload.title = field.text().await.unwrap(),
            "token" => upload.token = field.text().await.unwrap(),
            _ => {}
        }
    }
    pause(&backend.generate_delay_ms).await;
    let authorized = upload.token == VALID_TOKEN;
    backend.uploads.lock().unwrap().push(upload);
    if !authorized {
        return unauthorized();
    }
    let (status, body) = backend.generate_reply.lock().unwrap().clone();
    (status, Json(body))
}

/// Spawns the mock backend on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(backend: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/signin", post(signin))
        .route("/signup", post(signup))
        .route("/get-all-quizzes", post(list_quizzes))
        .route("/get-quiz-by-code", post(quiz_by_code))
        .route("/validate-answer", post(validate_answer))
        .route("/pdf-to-quiz", post(pdf_to_quiz))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Client-side state wired to `address`, with recorded alerts.
pub async fn client(
    address: &str,
    store: Arc<dyn TokenStore>,
) -> (AppState, Arc<RecordingAlerts>) {
    let address = address.to_string();
    let config = Config::from_lookup(move |key| match key {
        "BACKEND_URL" => Some(address.clone()),
        "PREPAI_HTTP_TIMEOUT_SECS" => Some("10".to_string()),
        _ => None,
    })
    .expect("valid test config");
    let session = Session::restore(store).await;
    let alerts = Arc::new(RecordingAlerts::new());
    let state = AppState::new(config, session, alerts.clone()).expect("client builds");
    (state, alerts)
}

/// Signed-in client against a fresh mock backend.
pub async fn signed_in() -> (Arc<MockBackend>, AppState, Arc<RecordingAlerts>, Arc<MemoryTokenStore>) {
    let backend = MockBackend::new();
    let address = spawn_app(backend.clone()).await;
    let store = Arc::new(MemoryTokenStore::with_token(VALID_TOKEN));
    let (state, alerts) = client(&address, store.clone()).await;
    (backend, state, alerts, store)
}

/// Writes a small PDF to a unique temp path.
pub fn sample_pdf() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("prepai-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("chapter1.pdf");
    std::fs::write(&path, b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n").unwrap();
    path
}
