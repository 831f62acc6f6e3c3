//! Axum route handlers for the HTML pages.

use axum::{response::Html, Form};
use serde::Deserialize;
use tracing::debug;

use crate::pages::{index_page, theme_page, EMPTY_TOPIC_MESSAGE};

#[derive(Debug, Deserialize)]
pub struct TopicForm {
    #[serde(default)]
    pub topic: String,
}

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(index_page(None))
}

/// POST /select_theme
///
/// A blank topic sends the user back to the form with an inline message.
pub async fn handle_select_theme(Form(form): Form<TopicForm>) -> Html<String> {
    let topic = form.topic.trim();
    if topic.is_empty() {
        debug!("Rejected blank topic");
        return Html(index_page(Some(EMPTY_TOPIC_MESSAGE)));
    }
    Html(theme_page(topic))
}
