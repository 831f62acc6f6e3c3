//! Deck Generation — orchestrates topic → outline → slides → package.
//!
//! Flow: outline source → parse_outline → render_deck → Presentation::to_bytes.
//!
//! Upstream failures never fail the request: they turn into the one-slide error
//! deck. Only packaging errors propagate.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::generation::outline::{parse_outline, SlideDeck};
use crate::llm_client::LlmError;
use crate::pptx::PptxError;
use crate::render::{render_deck, Diagnostic, ImageFetcher, Logo, Theme};

pub const DEFAULT_TOPIC: &str = "Untitled Presentation";

/// Produces raw slide-outline text for a topic.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    async fn outline(&self, topic: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A finished `.pptx` file plus what happened while drawing it.
#[derive(Debug)]
pub struct GeneratedDeck {
    pub deck_id: Uuid,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub slide_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Attachment file name: the topic with spaces replaced by underscores.
pub fn deck_filename(topic: &str) -> String {
    format!("{}.pptx", topic.replace(' ', "_"))
}

/// Topic used for generation; blank input falls back to [`DEFAULT_TOPIC`].
pub fn effective_topic(topic: Option<&str>) -> &str {
    match topic.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TOPIC,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Asks `source` for an outline and parses it.
///
/// On failure the parser is skipped and the error deck carries the failure
/// description instead.
pub async fn generate_outline(source: &dyn OutlineSource, topic: &str) -> SlideDeck {
    match source.outline(topic).await {
        Ok(text) => {
            let deck = parse_outline(&text);
            info!("Outline for {topic:?} parsed into {} slides", deck.len());
            debug!("Normalized outline:\n{}", deck.to_outline_text());
            deck
        }
        Err(e) => {
            warn!("Outline generation failed for {topic:?}: {e}");
            SlideDeck::error(e.error_details())
        }
    }
}

/// Runs the full pipeline for one request.
///
/// Steps:
/// 1. outline text from `source` (or the error deck)
/// 2. one slide per record, with a best-effort image per slide title
/// 3. package the presentation into `.pptx` bytes
pub async fn generate_presentation(
    source: &dyn OutlineSource,
    images: &dyn ImageFetcher,
    logo: &Logo,
    topic: &str,
    theme: &Theme,
) -> Result<GeneratedDeck, PptxError> {
    let deck_id = Uuid::new_v4();
    info!("Generating deck {deck_id} for {topic:?} with theme {}", theme.name);

    let deck = generate_outline(source, topic).await;
    if deck.is_error() {
        info!("Deck {deck_id} carries the upstream error slide");
    }
    let rendered = render_deck(&deck, topic, theme, images, logo).await;

    let diagnostics = rendered.report.diagnostics();
    for diagnostic in &diagnostics {
        warn!("Deck {deck_id}: {diagnostic}");
    }

    let bytes = rendered.presentation.to_bytes()?;
    info!(
        "Deck {deck_id} ready: {} slides, {} bytes, {} render failures",
        rendered.presentation.slide_count(),
        bytes.len(),
        diagnostics.len()
    );

    Ok(GeneratedDeck {
        deck_id,
        filename: deck_filename(topic),
        bytes,
        slide_count: rendered.presentation.slide_count(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::{Image, ImageFormat};
    use crate::render::{theme_by_name, FetchError, RenderStep};
    use std::io::{Cursor, Read};

    struct FixedOutline(&'static str);

    #[async_trait]
    impl OutlineSource for FixedOutline {
        async fn outline(&self, _topic: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOutline;

    #[async_trait]
    impl OutlineSource for FailingOutline {
        async fn outline(&self, _topic: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 401,
                body: "{\"error\":\"bad key\"}".to_string(),
            })
        }
    }

    struct MissingKey;

    #[async_trait]
    impl OutlineSource for MissingKey {
        async fn outline(&self, _topic: &str) -> Result<String, LlmError> {
            Err(LlmError::MissingApiKey)
        }
    }

    struct NoImages;

    #[async_trait]
    impl ImageFetcher for NoImages {
        async fn fetch(&self, _title: &str) -> Result<Image, FetchError> {
            Err(FetchError::Status(404))
        }
    }

    struct PngImages;

    #[async_trait]
    impl ImageFetcher for PngImages {
        async fn fetch(&self, _title: &str) -> Result<Image, FetchError> {
            Ok(Image::new(vec![0x89, b'P', b'N', b'G'], ImageFormat::Png))
        }
    }

    fn slide_entries(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_deck_filename_replaces_spaces() {
        assert_eq!(deck_filename("Solar Power 101"), "Solar_Power_101.pptx");
        assert_eq!(deck_filename("Rust"), "Rust.pptx");
    }

    #[test]
    fn test_effective_topic_defaults_when_blank() {
        assert_eq!(effective_topic(None), DEFAULT_TOPIC);
        assert_eq!(effective_topic(Some("   ")), DEFAULT_TOPIC);
        assert_eq!(effective_topic(Some(" Rust ")), "Rust");
    }

    #[tokio::test]
    async fn test_generate_outline_parses_source_text() {
        let source =
            FixedOutline("Slide 1: Intro\n- Point A\n- Point B\nSlide 2: Details\n- Point C\n");
        let deck = generate_outline(&source, "Topic").await;
        assert_eq!(deck.len(), 5);
        assert_eq!(deck.slides()[0].title, "Intro");
        assert!(!deck.is_error());
    }

    #[tokio::test]
    async fn test_upstream_failure_yields_error_deck() {
        let deck = generate_outline(&FailingOutline, "Topic").await;
        assert!(deck.is_error());
        assert_eq!(deck.slides()[0].bullets[0], "API error: 401");
        assert_eq!(deck.slides()[0].bullets[1], "{\"error\":\"bad key\"}");

        let deck = generate_outline(&MissingKey, "Topic").await;
        assert_eq!(
            deck.slides()[0].bullets,
            vec!["No API key set. Set OPENROUTER_KEY environment variable.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generate_presentation_writes_one_part_per_slide() {
        let source = FixedOutline("Slide 1: Intro\n- Point A\n");
        let generated = generate_presentation(
            &source,
            &PngImages,
            &Logo::None,
            "Solar Power",
            theme_by_name("aqua_minimal"),
        )
        .await
        .unwrap();

        assert_eq!(generated.filename, "Solar_Power.pptx");
        assert_eq!(generated.slide_count, 5);
        assert!(generated.diagnostics.is_empty());
        assert_eq!(slide_entries(&generated.bytes).len(), 5);

        let first = read_entry(&generated.bytes, "ppt/slides/slide1.xml");
        assert!(first.contains("Intro"));
        assert!(first.contains("Point A"));
        assert!(!first.contains("- Point A"));
        assert!(first.contains(r#"val="F5FFFF""#));
    }

    #[tokio::test]
    async fn test_error_deck_still_renders_single_slide() {
        let generated = generate_presentation(
            &MissingKey,
            &NoImages,
            &Logo::None,
            DEFAULT_TOPIC,
            theme_by_name("modern_blue"),
        )
        .await
        .unwrap();

        assert_eq!(generated.slide_count, 1);
        assert_eq!(generated.filename, "Untitled_Presentation.pptx");
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].step, RenderStep::Image);

        let slide = read_entry(&generated.bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("No API key set."));
    }
}
