use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::OutlineSource;
use crate::render::ImageFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Outline text source. Default: the OpenRouter `LlmClient`.
    pub outlines: Arc<dyn OutlineSource>,
    /// Slide image source. Default: `HttpImageFetcher` against `IMAGE_ENDPOINT`.
    pub images: Arc<dyn ImageFetcher>,
}
