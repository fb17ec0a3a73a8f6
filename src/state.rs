// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::llm::AnswerService;
use crate::services::metrics_manager::MetricsManager;
use crate::services::pdf_extractor::PdfTextExtractor;
use crate::services::session_cookie::SessionCookies;
use crate::services::session_manager::SessionStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionStore,
    pub metrics: MetricsManager,
    pub answers: Arc<dyn AnswerService>,
    pub extractor: PdfTextExtractor,
    pub cookies: SessionCookies,
    pub admin_key: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, answers: Arc<dyn AnswerService>) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl),
            metrics: MetricsManager::new(),
            answers,
            extractor: PdfTextExtractor::new(config.extraction_timeout),
            cookies: SessionCookies::new(&config.session_secret),
            admin_key: config.admin_key.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
