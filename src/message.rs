// src/message.rs
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FILE_FIELD: &str = "pdf_file";
pub const QUESTION_FIELD: &str = "user_question";
pub const ACTION_FIELD: &str = "action";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
}

/// A validated `POST /` body.
#[derive(Debug)]
pub enum Submission {
    Upload {
        file_name: Option<String>,
        bytes: Vec<u8>,
    },
    Question(String),
}

#[derive(Debug, Default)]
struct SubmissionFields {
    action: Option<String>,
    file: Option<(Option<String>, Vec<u8>)>,
    question: Option<String>,
}

#[derive(Deserialize)]
struct QuestionForm {
    action: Option<String>,
    user_question: Option<String>,
}

impl SubmissionFields {
    /// An explicit `action` decides the branch; otherwise exactly one of the file or
    /// question fields must be present.
    fn into_submission(self) -> Result<Submission, AppError> {
        let upload = |file: Option<(Option<String>, Vec<u8>)>| {
            file.map(|(file_name, bytes)| Submission::Upload { file_name, bytes })
        };

        match self.action.as_deref().map(str::trim) {
            Some("upload") => upload(self.file).ok_or_else(|| {
                AppError::BadRequest(format!("action 'upload' requires a {FILE_FIELD} field"))
            }),
            Some("ask") => self.question.map(Submission::Question).ok_or_else(|| {
                AppError::BadRequest(format!("action 'ask' requires a {QUESTION_FIELD} field"))
            }),
            Some(other) => Err(AppError::BadRequest(format!("unknown action '{other}'"))),
            None => match (self.file, self.question) {
                (Some((file_name, bytes)), None) => Ok(Submission::Upload { file_name, bytes }),
                (None, Some(question)) => Ok(Submission::Question(question)),
                (Some(_), Some(_)) => Err(AppError::BadRequest(format!(
                    "request carries both {FILE_FIELD} and {QUESTION_FIELD}; set {ACTION_FIELD}"
                ))),
                (None, None) => Err(AppError::BadRequest(format!(
                    "expected a {FILE_FIELD} or {QUESTION_FIELD} field"
                ))),
            },
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut fields = SubmissionFields::default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some(FILE_FIELD) => {
                        let file_name = field.file_name().map(str::to_string);
                        let bytes = field.bytes().await.map_err(multipart_error)?;
                        fields.file = Some((file_name, bytes.to_vec()));
                    }
                    Some(QUESTION_FIELD) => {
                        fields.question = Some(field.text().await.map_err(multipart_error)?);
                    }
                    Some(ACTION_FIELD) => {
                        fields.action = Some(field.text().await.map_err(multipart_error)?);
                    }
                    _ => {}
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<QuestionForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            fields.action = form.action;
            fields.question = form.user_question;
        } else {
            return Err(AppError::BadRequest(
                "expected a multipart/form-data or application/x-www-form-urlencoded body"
                    .to_string(),
            ));
        }

        fields.into_submission()
    }
}
