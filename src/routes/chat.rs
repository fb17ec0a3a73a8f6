use axum::{
    Extension, Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppError,
    message::{QuestionResponse, ResetResponse, Submission, UploadResponse},
    routes::page::render_index,
    services::{
        chatbot::generate_reply,
        metrics_manager::{MetricsData, Outcome},
    },
    state::SharedState,
};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "PDF uploaded successfully!";

/// Session id resolved from the signed cookie for the current request.
#[derive(Clone, Debug)]
pub struct SessionId(pub String);

/// Resolves the caller's session, creating one (and its cookie) when the request
/// carries no valid session cookie.
pub async fn session_middleware(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let (session_id, is_new) = match state.cookies.session_from_headers(req.headers()) {
        Some(id) => (state.sessions.ensure_session(&id).await, false),
        None => (state.sessions.create_session().await, true),
    };

    req.extensions_mut().insert(SessionId(session_id.clone()));
    let mut response = next.run(req).await;

    if is_new {
        let active_sessions = state.sessions.len().await;
        tracing::debug!(session_id = %session_id, active_sessions, "Issued new session cookie");
        if let Some(cookie) = state.cookies.set_cookie_header(&session_id) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }
    response
}

pub async fn index_handler(
    State(state): State<SharedState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Html<String>, AppError> {
    let history = state.sessions.history(&session_id).await;
    Ok(Html(render_index(&history)?))
}

pub async fn submit_handler(
    State(state): State<SharedState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    submission: Submission,
) -> Result<Response, AppError> {
    match submission {
        Submission::Upload { file_name, bytes } => {
            let resp = upload(&state, &session_id, file_name, bytes).await?;
            Ok(resp.into_response())
        }
        Submission::Question(question) => {
            Ok(ask(&state, &session_id, &question).await.into_response())
        }
    }
}

async fn upload(
    state: &SharedState,
    session_id: &str,
    file_name: Option<String>,
    bytes: Vec<u8>,
) -> Result<Json<UploadResponse>, AppError> {
    let size = bytes.len();
    let file_name = file_name.unwrap_or_else(|| "unknown".to_string());
    tracing::debug!(session_id, file_name = %file_name, bytes = size, "Processing PDF upload");

    match state.extractor.extract(bytes).await {
        Ok(text) => {
            state.sessions.set_document_text(session_id, text).await;
            state.metrics.record(Outcome::UploadSucceeded).await;
            tracing::info!(session_id, file_name = %file_name, bytes = size, "Document stored");
            Ok(Json(UploadResponse {
                success: true,
                message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            }))
        }
        Err(e) => {
            state.metrics.record(Outcome::UploadFailed).await;
            tracing::warn!(session_id, file_name = %file_name, error = %e, "PDF upload rejected");
            Err(AppError::Document(e))
        }
    }
}

async fn ask(state: &SharedState, session_id: &str, question: &str) -> Json<QuestionResponse> {
    let reply = generate_reply(
        &state.sessions,
        state.answers.as_ref(),
        &state.metrics,
        session_id,
        question,
    )
    .await;

    Json(QuestionResponse {
        success: reply.success(),
        response: reply.text().to_string(),
    })
}

pub async fn reset_handler(
    State(state): State<SharedState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Json<ResetResponse> {
    state.sessions.reset(&session_id).await;
    tracing::info!(session_id = %session_id, "Session reset");
    Json(ResetResponse { success: true })
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
