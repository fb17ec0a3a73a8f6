// src/services/mod.rs
pub mod chatbot;
pub mod llm;
pub mod metrics_manager;
pub mod pdf_extractor;
pub mod prompt;
pub mod relevance;
pub mod session_cookie;
pub mod session_manager;
