// Minimal PresentationML writer.
// Produces a complete .pptx package (zip) from slides built out of rectangles,
// text boxes and pictures. Only what the deck renderer needs is modelled.

pub mod package;
pub mod shape;
pub mod slide;
pub mod template;

use std::borrow::Cow;

use bytes::Bytes;
use thiserror::Error;

pub use shape::{Align, Paragraph, Shape, TextStyle};
pub use slide::Slide;

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Default slide size: 10" × 7.5" (4:3).
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

pub type Result<T> = std::result::Result<T, PptxError>;

#[derive(Debug, Error)]
pub enum PptxError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("XML generation error: {0}")]
    Xml(String),
}

impl From<std::fmt::Error> for PptxError {
    fn from(e: std::fmt::Error) -> Self {
        PptxError::Xml(e.to_string())
    }
}

/// Converts inches to EMUs, rounding to the nearest unit.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// 24-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    /// Upper-case hex as used by `a:srgbClr`, e.g. `0B66B6`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Shapes need a positive extent and a non-negative offset.
    pub fn validate(&self, shape_name: &str) -> Result<()> {
        if self.cx <= 0 || self.cy <= 0 {
            return Err(PptxError::InvalidGeometry(format!(
                "{shape_name}: extent {}x{} must be positive",
                self.cx, self.cy
            )));
        }
        if self.x < 0 || self.y < 0 {
            return Err(PptxError::InvalidGeometry(format!(
                "{shape_name}: offset ({}, {}) lies outside the slide",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

/// Raster formats that can be embedded as slide pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detects the format from a `Content-Type` value such as `image/jpeg; charset=binary`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Encoded image bytes plus their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub data: Bytes,
    pub format: ImageFormat,
}

impl Image {
    pub fn new(data: impl Into<Bytes>, format: ImageFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }
}

/// A presentation under construction.
#[derive(Debug, Clone)]
pub struct Presentation {
    title: String,
    slides: Vec<Slide>,
    slide_width: i64,
    slide_height: i64,
}

impl Presentation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slides: Vec::new(),
            slide_width: DEFAULT_SLIDE_WIDTH,
            slide_height: DEFAULT_SLIDE_HEIGHT,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slide_width(&self) -> i64 {
        self.slide_width
    }

    pub fn slide_height(&self) -> i64 {
        self.slide_height
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Appends an empty slide and returns it for drawing.
    pub fn add_slide(&mut self) -> &mut Slide {
        let index = self.slides.len();
        self.slides.push(Slide::new());
        &mut self.slides[index]
    }

    /// Serializes the whole package into `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        package::write_package(self)
    }
}

/// Escapes text for XML content and attributes, dropping characters XML 1.0 forbids.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden_xml_char) {
        let cleaned: String = text.chars().filter(|c| !is_forbidden_xml_char(*c)).collect();
        Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
    } else {
        quick_xml::escape::escape(text)
    }
}

fn is_forbidden_xml_char(c: char) -> bool {
    c < ' ' && c != '\t' && c != '\n' && c != '\r'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_emu() {
        assert_eq!(inches(1.0), EMU_PER_INCH);
        assert_eq!(inches(0.6), 548_640);
        assert_eq!(inches(10.0), DEFAULT_SLIDE_WIDTH);
    }

    #[test]
    fn test_rgb_hex_is_upper_case_and_padded() {
        assert_eq!(RgbColor(4, 58, 107).hex(), "043A6B");
        assert_eq!(RgbColor(255, 255, 255).hex(), "FFFFFF");
    }

    #[test]
    fn test_image_format_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::from_mime("IMAGE/PNG; charset=binary"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_mime("image/svg+xml"), None);
        assert_eq!(ImageFormat::from_mime("text/html"), None);
    }

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("webp"), None);
    }

    #[test]
    fn test_escape_text_drops_control_characters() {
        assert_eq!(escape_text("a\u{0007}b & c"), "ab &amp; c");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_frame_validation() {
        assert!(Frame::new(0, 0, 1, 1).validate("ok").is_ok());
        assert!(Frame::new(0, 0, 0, 1).validate("flat").is_err());
        assert!(Frame::new(-1, 0, 1, 1).validate("offslide").is_err());
    }

    #[test]
    fn test_add_slide_returns_new_slide() {
        let mut pres = Presentation::new("Deck");
        pres.add_slide().set_background(RgbColor(1, 1, 1));
        assert_eq!(pres.slide_count(), 1);
        assert_eq!(pres.slides()[0].background(), Some(RgbColor(1, 1, 1)));
    }
}
