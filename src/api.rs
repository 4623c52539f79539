// src/api.rs

use reqwest::{
    Client, Response, StatusCode,
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    config::Config,
    error::AppError,
    models::{
        quiz::{
            AnswerValidation, GenerateQuizResponse, ListQuizzesRequest, ListQuizzesResponse,
            QuizByCodeRequest, QuizDetail, QuizResponse, QuizSummary, ValidateAnswerRequest,
        },
        user::{AuthResponse, LoginForm, SignUpForm},
    },
    picker::PickedDocument,
    session::Session,
};

pub const SIGN_IN: &str = "signin";
pub const SIGN_UP: &str = "signup";
pub const LIST_QUIZZES: &str = "get-all-quizzes";
pub const GENERATE_QUIZ: &str = "pdf-to-quiz";
pub const QUIZ_BY_CODE: &str = "get-quiz-by-code";
pub const VALIDATE_ANSWER: &str = "validate-answer";

/// How the sign-up endpoint answered a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResult {
    Created { token: String },
    /// The backend answers 201 when the account already exists.
    AlreadyExists,
}

/// HTTP client for the quiz service.
///
/// Authenticated calls take the token from the [`Session`]; a 401 from any of
/// them invalidates the session before the error is returned.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base: config.backend_url.clone(),
            session,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, AppError> {
        Ok(self.base.join(name)?)
    }

    fn require_token(&self) -> Result<String, AppError> {
        self.session
            .token()
            .ok_or_else(|| AppError::Unauthorized("not signed in".to_string()))
    }

    /// Invalidates the session if the call was rejected as unauthorized.
    async fn guard<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.session.invalidate().await;
            }
        }
        result
    }

    async fn post_json<B, T>(&self, name: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(name)?;
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        let response = check_status(response).await?;
        decode(response).await
    }

    async fn post_multipart<T>(&self, name: &str, form: Form) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(name)?;
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        decode(response).await
    }

    /// Signs in and returns the issued token. Does not touch the session.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<String, AppError> {
        let res: AuthResponse = self.post_json(SIGN_IN, form).await?;
        Ok(res.user.token)
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResult, AppError> {
        let url = self.endpoint(SIGN_UP)?;
        let response = self.http.post(url).json(form).send().await?;
        let response = check_status(response).await?;

        if response.status() == StatusCode::CREATED {
            return Ok(SignUpResult::AlreadyExists);
        }
        let res: AuthResponse = decode(response).await?;
        Ok(SignUpResult::Created {
            token: res.user.token,
        })
    }

    pub async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, AppError> {
        let token = self.require_token()?;
        let result: Result<ListQuizzesResponse, AppError> = self
            .post_json(LIST_QUIZZES, &ListQuizzesRequest { token: &token })
            .await;
        Ok(self.guard(result).await?.quizzes)
    }

    pub async fn quiz_by_code(&self, code: &str) -> Result<QuizDetail, AppError> {
        let token = self.require_token()?;
        let request = QuizByCodeRequest {
            quiz_code: code,
            token: &token,
        };
        let result: Result<QuizResponse, AppError> = self.post_json(QUIZ_BY_CODE, &request).await;
        Ok(self.guard(result).await?.quiz)
    }

    pub async fn validate_answer(
        &self,
        pdf_content_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<AnswerValidation, AppError> {
        let token = self.require_token()?;
        let request = ValidateAnswerRequest {
            token: &token,
            pdf_content_id,
            question,
            answer,
        };
        let result = self.post_json(VALIDATE_ANSWER, &request).await;
        self.guard(result).await
    }

    /// Uploads a PDF and asks the backend to turn it into a quiz.
    ///
    /// Non-success statuses come back as errors carrying the status; the
    /// payload of a successful call is returned for the caller to interpret.
    pub async fn generate_quiz(
        &self,
        document: &PickedDocument,
        title: &str,
    ) -> Result<GenerateQuizResponse, AppError> {
        let token = self.require_token()?;
        let bytes = tokio::fs::read(&document.path).await.map_err(|e| {
            AppError::Picker(format!("Failed to read {}: {}", document.path.display(), e))
        })?;

        let pdf = Part::bytes(bytes)
            .file_name(document.name.clone())
            .mime_str(&document.mime)?;
        let form = Form::new()
            .part("pdf", pdf)
            .text("title", title.to_string())
            .text("token", token);

        tracing::debug!("Uploading {} ({})", document.name, document.mime);
        let result = self.post_multipart(GENERATE_QUIZ, form).await;
        self.guard(result).await
    }
}

/// Turns non-success responses into errors, keeping the body for the logs.
async fn check_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Request failed with {}: {}", status, body);
    Err(AppError::from_status(status, body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
