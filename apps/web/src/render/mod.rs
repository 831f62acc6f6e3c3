//! Deck Renderer — draws slide records onto presentation slides.
//!
//! Every slide gets the same fixed template: background fill, a left accent
//! bar, a title box, a bullet box, an illustrative picture and an optional logo.
//! Each of those is an independent step. A failed step is recorded in the
//! slide's [`SlideReport`] and logged; it never stops the slide or the deck.

pub mod images;
pub mod themes;

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::generation::outline::{SlideDeck, SlideRecord};
use crate::pptx::{inches, Align, Frame, Image, ImageFormat, Paragraph, Presentation, TextStyle};

pub use images::{FetchError, HttpImageFetcher, ImageFetcher};
pub use themes::{theme_by_name, Theme, DEFAULT_THEME, THEMES};

const TITLE_SIZE_PT: u16 = 32;
const BULLET_SIZE_PT: u16 = 18;
const LOGO_WIDTH_IN: f64 = 0.9;

// ────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ────────────────────────────────────────────────────────────────────────────

/// One drawing step of the slide template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStep {
    Background,
    AccentBar,
    Title,
    Bullets,
    Image,
    Logo,
}

impl fmt::Display for RenderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStep::Background => "background",
            RenderStep::AccentBar => "accent bar",
            RenderStep::Title => "title",
            RenderStep::Bullets => "bullets",
            RenderStep::Image => "image",
            RenderStep::Logo => "logo",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Nothing to draw (e.g. no logo configured).
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: RenderStep,
    pub outcome: StepOutcome,
}

/// Outcomes of every step for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideReport {
    /// 1-based slide number.
    pub slide: usize,
    pub steps: Vec<StepResult>,
}

impl SlideReport {
    fn new(slide: usize) -> Self {
        Self {
            slide,
            steps: Vec::with_capacity(6),
        }
    }

    fn record<E: fmt::Display>(&mut self, step: RenderStep, result: Result<StepOutcome, E>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Slide {} {step} step failed: {e}", self.slide);
                StepOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.steps.push(StepResult { step, outcome });
    }

    #[cfg(test)]
    pub fn outcome(&self, step: RenderStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }
}

/// A non-fatal failure, flattened out of the per-slide reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub slide: usize,
    pub step: RenderStep,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slide {} {}: {}", self.slide, self.step, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub slides: Vec<SlideReport>,
}

impl RenderReport {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.slides
            .iter()
            .flat_map(|report| {
                report.steps.iter().filter_map(move |s| match &s.outcome {
                    StepOutcome::Failed { reason } => Some(Diagnostic {
                        slide: report.slide,
                        step: s.step,
                        reason: reason.clone(),
                    }),
                    _ => None,
                })
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Logo
// ────────────────────────────────────────────────────────────────────────────

/// State of the optional corner logo for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logo {
    /// No logo configured, or the configured file does not exist.
    None,
    /// Pixel size is kept so the drawn height follows the logo's aspect ratio.
    Loaded {
        image: Image,
        width_px: u32,
        height_px: u32,
    },
    /// The file exists but could not be used; every slide reports the reason.
    Unusable(String),
}

fn pixel_size(data: &[u8]) -> Result<(u32, u32), image::ImageError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
}

impl Logo {
    /// Reads the pixel size from the image header. Undecodable data is unusable.
    pub fn from_image(image: Image) -> Self {
        match pixel_size(&image.data) {
            Ok((width_px, height_px)) if width_px > 0 && height_px > 0 => Logo::Loaded {
                image,
                width_px,
                height_px,
            },
            Ok((w, h)) => Logo::Unusable(format!("logo has no area ({w}x{h} px)")),
            Err(e) => Logo::Unusable(format!("unreadable logo image: {e}")),
        }
    }

    /// Height in EMUs when drawn `width` EMUs wide.
    fn scaled_height(width: i64, width_px: u32, height_px: u32) -> i64 {
        let (w, h) = (i64::from(width_px), i64::from(height_px));
        (width * h + w / 2) / w
    }

    pub async fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Logo::None;
        };
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!("Logo {} not found; rendering without logo", path.display());
            return Logo::None;
        }
        let Some(format) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
        else {
            return Logo::Unusable(format!("unsupported logo file type: {}", path.display()));
        };
        match tokio::fs::read(path).await {
            Ok(data) => Logo::from_image(Image::new(data, format)),
            Err(e) => Logo::Unusable(format!("failed to read {}: {e}", path.display())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

fn bullet_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^[\-•*\d.)\s]+").expect("MARKER regex is valid"))
}

/// Removes a leading run of bullet/numbering characters (`-`, `•`, `*`, digits,
/// `.`, `)`, whitespace) and trims the rest.
pub fn strip_bullet_marker(bullet: &str) -> &str {
    bullet_marker_regex()
        .find(bullet)
        .map_or(bullet, |m| &bullet[m.end()..])
        .trim()
}

/// Appends one slide for `record` and reports each drawing step.
///
/// `image` is the outcome of the illustrative-image lookup for this slide.
pub fn render_slide(
    presentation: &mut Presentation,
    record: &SlideRecord,
    theme: &Theme,
    image: Result<Image, FetchError>,
    logo: &Logo,
) -> SlideReport {
    let width = presentation.slide_width();
    let height = presentation.slide_height();
    let number = presentation.slide_count() + 1;
    let slide = presentation.add_slide();
    let mut report = SlideReport::new(number);

    slide.set_background(theme.background);
    report.record::<String>(RenderStep::Background, Ok(StepOutcome::Done));

    report.record(
        RenderStep::AccentBar,
        slide
            .add_rectangle("Accent Bar", Frame::new(0, 0, inches(0.6), height), theme.accent_bar)
            .map(|_| StepOutcome::Done),
    );

    let title_style = TextStyle {
        size_pt: TITLE_SIZE_PT,
        bold: true,
        color: theme.title_color,
        font: theme.font.to_string(),
        align: Some(Align::Left),
    };
    report.record(
        RenderStep::Title,
        slide
            .add_text_box(
                "Title",
                Frame::new(inches(0.8), inches(0.3), inches(6.5), inches(1.0)),
                false,
                vec![Paragraph::new(record.title.as_str(), title_style)],
            )
            .map(|_| StepOutcome::Done),
    );

    let bullet_style = TextStyle {
        size_pt: BULLET_SIZE_PT,
        bold: false,
        color: theme.bullet_color,
        font: theme.font.to_string(),
        align: None,
    };
    let paragraphs: Vec<Paragraph> = record
        .bullets
        .iter()
        .map(|b| strip_bullet_marker(b))
        .filter(|text| !text.is_empty())
        .map(|text| Paragraph::new(text, bullet_style.clone()))
        .collect();
    report.record(
        RenderStep::Bullets,
        slide
            .add_text_box(
                "Bullets",
                Frame::new(inches(0.8), inches(1.4), inches(5.8), inches(4.4)),
                true,
                paragraphs,
            )
            .map(|_| StepOutcome::Done),
    );

    let image_step = image
        .map_err(|e| e.to_string())
        .and_then(|image| {
            slide
                .add_picture(
                    "Picture",
                    Frame::new(inches(6.2), inches(1.2), inches(3.0), inches(2.2)),
                    image,
                )
                .map_err(|e| e.to_string())
        })
        .map(|_| StepOutcome::Done);
    report.record(RenderStep::Image, image_step);

    let logo_step = match logo {
        Logo::None => Ok(StepOutcome::Skipped),
        Logo::Unusable(reason) => Err(reason.clone()),
        Logo::Loaded {
            image,
            width_px,
            height_px,
        } => {
            let cx = inches(LOGO_WIDTH_IN);
            let cy = Logo::scaled_height(cx, *width_px, *height_px);
            slide
                .add_picture(
                    "Logo",
                    Frame::new(width - inches(1.2), height - inches(0.9), cx, cy),
                    image.clone(),
                )
                .map(|_| StepOutcome::Done)
                .map_err(|e| e.to_string())
        }
    };
    report.record(RenderStep::Logo, logo_step);

    report
}

/// A rendered deck and the outcome of every drawing step.
#[derive(Debug)]
pub struct RenderedDeck {
    pub presentation: Presentation,
    pub report: RenderReport,
}

/// Renders every record of `deck`, fetching one illustrative image per slide.
pub async fn render_deck(
    deck: &SlideDeck,
    document_title: &str,
    theme: &Theme,
    images: &dyn ImageFetcher,
    logo: &Logo,
) -> RenderedDeck {
    let mut presentation = Presentation::new(document_title);
    let mut report = RenderReport::default();

    for record in deck {
        let image = images.fetch(&record.title).await;
        report
            .slides
            .push(render_slide(&mut presentation, record, theme, image, logo));
    }

    debug!(
        "Rendered {} slides with theme {} ({} step failures)",
        presentation.slide_count(),
        theme.name,
        report.diagnostics().len()
    );

    RenderedDeck {
        presentation,
        report,
    }
}
