// src/routes/page.rs
use askama::Template;

use crate::services::session_manager::Turn;

/// Chat page with the session's history and the upload/question forms.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub history: &'a [Turn],
}

pub fn render_index(history: &[Turn]) -> askama::Result<String> {
    IndexPage { history }.render()
}
