use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What happened to one upload or question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UploadSucceeded,
    UploadFailed,
    Answered,
    Refused,
    MissingDocument,
    LlmFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::UploadSucceeded => "upload_succeeded",
            Outcome::UploadFailed => "upload_failed",
            Outcome::Answered => "answered",
            Outcome::Refused => "refused",
            Outcome::MissingDocument => "missing_document",
            Outcome::LlmFailed => "llm_failed",
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    pub outcomes: BTreeMap<String, u64>,
    pub llm_errors: BTreeMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record(&self, outcome: Outcome) {
        let mut data = self.inner.write().await;
        *data.outcomes.entry(outcome.as_str().to_string()).or_insert(0) += 1;
    }

    pub async fn record_llm_error(&self, kind: &str) {
        let mut data = self.inner.write().await;
        *data.llm_errors.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
