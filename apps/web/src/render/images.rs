//! Illustrative image lookup for slides.
//!
//! Fetching is best-effort: every failure comes back as a `FetchError` that the
//! renderer records and moves past.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect, Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::pptx::{Image, ImageFormat};

const FETCH_TIMEOUT: Duration = Duration::from_secs(7);
const USER_AGENT: &str = "pptx-generator/1.0";
/// Query used when a slide has no usable title.
const FALLBACK_QUERY: &str = "abstract";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an image (content type {0:?})")]
    NotAnImage(String),

    #[error("unsupported image type {0}")]
    UnsupportedFormat(String),
}

/// Source of illustrative images, keyed by slide title.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, title: &str) -> Result<Image, FetchError>;
}

/// Fetches stock photos over HTTP from a query endpoint such as
/// `https://source.unsplash.com/800x600/`.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
    endpoint: String,
}

impl HttpImageFetcher {
    pub fn new(endpoint: String) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// `{endpoint}?{percent-encoded title}`.
    pub fn image_url(&self, title: &str) -> String {
        let title = title.trim();
        let query = if title.is_empty() { FALLBACK_QUERY } else { title };
        format!("{}?{}", self.endpoint, urlencoding::encode(query))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, title: &str) -> Result<Image, FetchError> {
        let url = self.image_url(title);
        debug!("Fetching slide image: {url}");

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image") {
            return Err(FetchError::NotAnImage(content_type));
        }
        let format = ImageFormat::from_mime(&content_type)
            .ok_or_else(|| FetchError::UnsupportedFormat(content_type.clone()))?;

        let data = response.bytes().await?;
        debug!("Fetched {} bytes of {}", data.len(), format.content_type());
        Ok(Image::new(data, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn fetcher_for(server: &Server) -> HttpImageFetcher {
        HttpImageFetcher::new(format!("{}/800x600/", server.url())).unwrap()
    }

    #[test]
    fn test_image_url_encodes_spaces() {
        let fetcher =
            HttpImageFetcher::new("https://source.unsplash.com/800x600/".to_string()).unwrap();
        assert_eq!(
            fetcher.image_url("Solar Power"),
            "https://source.unsplash.com/800x600/?Solar%20Power"
        );
        assert_eq!(
            fetcher.image_url("  "),
            "https://source.unsplash.com/800x600/?abstract"
        );
    }

    #[tokio::test]
    async fn test_fetch_accepts_200_image() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Regex("^/800x600/".to_string()))
            .match_query(Matcher::Any)
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body([0xFF, 0xD8, 0xFF, 0xE0])
            .create_async()
            .await;

        let image = fetcher_for(&server).fetch("Solar Power").await.unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!(image.data.as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_404() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Regex("^/800x600/".to_string()))
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "image/png")
            .create_async()
            .await;

        let err = fetcher_for(&server).fetch("Missing").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_image_content() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Regex("^/800x600/".to_string()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = fetcher_for(&server).fetch("Page").await.unwrap_err();
        assert!(matches!(err, FetchError::NotAnImage(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_image_type() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Regex("^/800x600/".to_string()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "image/svg+xml")
            .with_body("<svg/>")
            .create_async()
            .await;

        let err = fetcher_for(&server).fetch("Vector").await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedFormat(_)));
    }
}
