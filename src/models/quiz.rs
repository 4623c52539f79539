// src/models/quiz.rs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Marker the backend puts in `error` when it could not read the document.
pub const UNREADABLE_DOCUMENT_MARKER: &str = "Failed to parse Gemini response";

/// One entry of the user's quiz list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuizSummary")]
pub struct QuizSummary {
    pub code: String,
    pub title: String,
}

/// List entries carry `link_code`, `code` or both; either may be a number.
#[derive(Deserialize)]
struct RawQuizSummary {
    #[serde(default)]
    link_code: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
}

#[derive(Debug)]
struct MissingCode;

impl fmt::Display for MissingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("quiz entry has no link code")
    }
}

impl TryFrom<RawQuizSummary> for QuizSummary {
    type Error = MissingCode;

    fn try_from(raw: RawQuizSummary) -> Result<Self, Self::Error> {
        let code = [raw.link_code, raw.code]
            .into_iter()
            .flatten()
            .filter_map(value_to_id)
            .find(|code| !code.is_empty())
            .ok_or(MissingCode)?;
        let title = match raw.title {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Ok(Self { code, title })
    }
}

/// DTO for the list-quizzes call.
#[derive(Debug, Serialize)]
pub struct ListQuizzesRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuizzesResponse {
    /// Entries without a usable code are dropped; the rest still show.
    #[serde(rename = "quizList", default, deserialize_with = "usable_entries")]
    pub quizzes: Vec<QuizSummary>,
}

/// DTO for fetching a quiz by link code.
#[derive(Debug, Serialize)]
pub struct QuizByCodeRequest<'a> {
    #[serde(rename = "quizCode")]
    pub quiz_code: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct QuizResponse {
    pub quiz: QuizDetail,
}

/// A quiz as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizDetail {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(rename = "quizContent", default)]
    pub multiple_choice: Vec<MultipleChoiceQuestion>,

    /// Open questions, identified by their text.
    #[serde(rename = "textQuestions", default)]
    pub free_text: Vec<String>,

    /// Identifier of the uploaded document, needed to grade free-text answers.
    #[serde(rename = "PdfContentId", default, deserialize_with = "opt_id")]
    pub source_document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MultipleChoiceQuestion {
    #[serde(rename = "_id", deserialize_with = "id")]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct option, compared verbatim.
    #[serde(rename = "answer")]
    pub answer_key: String,
}

/// DTO for grading a free-text answer.
#[derive(Debug, Serialize)]
pub struct ValidateAnswerRequest<'a> {
    pub token: &'a str,
    #[serde(rename = "pdfContentId")]
    pub pdf_content_id: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
}

/// Grading result for one free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerValidation {
    pub verdict: Verdict,
    #[serde(default)]
    pub feedback: String,
}

/// Verdict returned by the grader.
///
/// Only "correct" and "incorrect" are known. Anything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum Verdict {
    Correct,
    Incorrect,
    Other(String),
}

impl From<Value> for Verdict {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Verdict::Correct,
            Value::Bool(false) => Verdict::Incorrect,
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "correct" | "true" => Verdict::Correct,
                "no" | "incorrect" | "false" => Verdict::Incorrect,
                _ => Verdict::Other(s),
            },
            other => Verdict::Other(other.to_string()),
        }
    }
}

impl Verdict {
    pub fn label(&self) -> String {
        match self {
            Verdict::Correct => "✅ Correct".to_string(),
            Verdict::Incorrect => "❌ Incorrect".to_string(),
            Verdict::Other(raw) => format!("❔ {}", raw),
        }
    }
}

/// Result of the generate-quiz call, normalized from the raw payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawGenerateQuizResponse")]
pub struct GenerateQuizResponse {
    pub link_code: Option<String>,
    pub error: Option<String>,
}

/// The backend has spelled the code field both ways.
#[derive(Deserialize)]
struct RawGenerateQuizResponse {
    #[serde(default)]
    link_code: Option<Value>,
    #[serde(rename = "link-code", default)]
    link_code_dashed: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl From<RawGenerateQuizResponse> for GenerateQuizResponse {
    fn from(raw: RawGenerateQuizResponse) -> Self {
        let link_code = [raw.link_code, raw.link_code_dashed]
            .into_iter()
            .flatten()
            .filter_map(value_to_id)
            .find(|code| !code.is_empty());
        let error = raw.error.and_then(|e| match e {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });
        Self { link_code, error }
    }
}

/// What a successful upload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Created(String),
    /// The document had no readable content.
    Unreadable,
    /// Success status, but no code in the payload.
    MissingCode,
}

impl GenerateQuizResponse {
    pub fn outcome(&self) -> GenerateOutcome {
        if self
            .error
            .as_deref()
            .is_some_and(|e| e.contains(UNREADABLE_DOCUMENT_MARKER))
        {
            return GenerateOutcome::Unreadable;
        }
        match &self.link_code {
            Some(code) => GenerateOutcome::Created(code.clone()),
            None => GenerateOutcome::MissingCode,
        }
    }
}

fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(value).ok_or_else(|| serde::de::Error::custom("expected string or number id"))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn usable_entries<'de, D>(deserializer: D) -> Result<Vec<QuizSummary>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<QuizSummary>(entry) {
            Ok(quiz) => Some(quiz),
            Err(e) => {
                tracing::warn!("Skipping quiz list entry: {}", e);
                None
            }
        })
        .collect())
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_id))
}
