// src/services/chatbot.rs
use super::{
    llm::AnswerService,
    metrics_manager::{MetricsManager, Outcome},
    prompt::build_prompt,
    relevance::is_question_relevant,
    session_manager::SessionStore,
};

pub const UPLOAD_FIRST_MESSAGE: &str = "Please upload a PDF file first.";
pub const IRRELEVANT_MESSAGE: &str = "I can only answer questions related to the PDF.";
pub const LLM_FAILURE_MESSAGE: &str = "I'm sorry, there was an error processing your request.";

/// Result of handling one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The LLM answered; the turn was recorded.
    Answered(String),
    /// The question shares no token with the document.
    Irrelevant,
    /// No document has been uploaded in this session.
    MissingDocument,
    /// The LLM call failed; the apology was recorded as the answer.
    Failed,
}

impl Reply {
    pub fn success(&self) -> bool {
        !matches!(self, Reply::MissingDocument)
    }

    pub fn text(&self) -> &str {
        match self {
            Reply::Answered(answer) => answer,
            Reply::Irrelevant => IRRELEVANT_MESSAGE,
            Reply::MissingDocument => UPLOAD_FIRST_MESSAGE,
            Reply::Failed => LLM_FAILURE_MESSAGE,
        }
    }
}

/// Answers `question` against the session's current document.
pub async fn generate_reply(
    sessions: &SessionStore,
    answers: &dyn AnswerService,
    metrics: &MetricsManager,
    session_id: &str,
    question: &str,
) -> Reply {
    // Snapshot taken once; a concurrent upload does not affect this question.
    let document_text = match sessions.document_text(session_id).await {
        Some(text) if !text.is_empty() => text,
        _ => {
            tracing::debug!(session_id, "Question asked before any upload");
            metrics.record(Outcome::MissingDocument).await;
            return Reply::MissingDocument;
        }
    };

    if !is_question_relevant(question, &document_text) {
        tracing::debug!(session_id, "Question shares no token with the document");
        metrics.record(Outcome::Refused).await;
        return Reply::Irrelevant;
    }

    let prompt = build_prompt(&document_text, question);

    match answers.answer(&prompt).await {
        Ok(answer) => {
            let turns = sessions.append_turn(session_id, question, answer.as_str()).await;
            tracing::info!(session_id, turns, "Question answered");
            metrics.record(Outcome::Answered).await;
            Reply::Answered(answer)
        }
        Err(e) => {
            if e.is_transient() {
                tracing::warn!(session_id, kind = e.kind(), transient = true, error = %e, "LLM call failed");
            } else {
                tracing::error!(session_id, kind = e.kind(), transient = false, error = %e, "LLM call failed");
            }
            sessions
                .append_turn(session_id, question, LLM_FAILURE_MESSAGE)
                .await;
            metrics.record(Outcome::LlmFailed).await;
            metrics.record_llm_error(e.kind()).await;
            Reply::Failed
        }
    }
}
