//! Axum route handler for deck generation.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::{effective_topic, generate_presentation};
use crate::render::{theme_by_name, Logo, DEFAULT_THEME};
use crate::state::AppState;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub topic: Option<String>,
    pub theme: Option<String>,
}

/// `Content-Disposition` for a download. Non-ASCII names get an RFC 5987
/// `filename*` alongside an ASCII fallback.
pub fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if fallback == filename {
        format!("attachment; filename=\"{filename}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

/// POST /generate_ppt
///
/// Generates a deck for the submitted topic and theme and returns it as a
/// `.pptx` attachment. Upstream failures still yield a (one-slide) deck.
pub async fn handle_generate_ppt(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Result<Response, AppError> {
    let topic = effective_topic(form.topic.as_deref());
    let theme = theme_by_name(form.theme.as_deref().unwrap_or(DEFAULT_THEME));
    let logo = Logo::load(state.config.logo_path.as_deref()).await;

    let generated = generate_presentation(
        state.outlines.as_ref(),
        state.images.as_ref(),
        &logo,
        topic,
        theme,
    )
    .await?;
    info!(
        "Serving deck {} as {} ({} slides, {} render failures)",
        generated.deck_id,
        generated.filename,
        generated.slide_count,
        generated.diagnostics.len()
    );

    let headers = [
        (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            attachment_disposition(&generated.filename),
        ),
    ];
    Ok((headers, generated.bytes).into_response())
}
