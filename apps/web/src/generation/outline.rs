//! Outline Parser — turns loosely structured LLM text into an ordered slide deck.
//!
//! The input is expected to look like repeated "Slide N: Title" headings followed
//! by bullet lines, but nothing about the format is guaranteed. The parser is a
//! single forward pass over the lines, driven by a two-state machine:
//!
//! - `NoTitleOpen` — nothing has been opened yet; the next usable line becomes a title.
//! - `TitleOpen`   — a record is being accumulated; headings close it and open the next.
//!
//! Each line is classified once (see [`LineKind`]) and the classification is applied
//! to the current state in a fixed priority order. The parser never fails: the worst
//! case is a single synthetic title holding every line, padded out by normalization.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum number of records in a parsed deck. Short decks are padded with filler.
pub const MIN_SLIDES: usize = 5;
/// Maximum number of records in a parsed deck. Long decks are truncated.
pub const MAX_SLIDES: usize = 7;
/// Implicit (marker-less) bullets are only accepted while a record holds fewer than this.
pub const MAX_IMPLICIT_BULLETS: usize = 6;
/// Marker-less lines with this many tokens or more are never taken as implicit bullets.
pub const IMPLICIT_BULLET_MAX_TOKENS: usize = 20;

pub const FILLER_TITLE: &str = "Additional Info";
pub const FILLER_BULLETS: [&str; 3] = [
    "More details coming soon...",
    "Edit this slide",
    "Customize content",
];

pub const ERROR_TITLE: &str = "Error";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One slide's worth of text: a title and its bullets.
///
/// Bullets keep whatever marker the source text used (`- `, `• `, `* `, `1. `).
/// Stripping markers is the renderer's job, so alternate renderers can pick their
/// own glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub title: String,
    pub bullets: Vec<String>,
}

impl SlideRecord {
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
        }
    }

    /// The placeholder record appended when the source produced too few slides.
    pub fn filler() -> Self {
        Self::new(
            FILLER_TITLE,
            FILLER_BULLETS.iter().map(|b| b.to_string()).collect(),
        )
    }
}

/// An ordered sequence of slide records, ready for rendering.
///
/// Decks built by [`parse_outline`] always hold between [`MIN_SLIDES`] and
/// [`MAX_SLIDES`] records. The one exception is [`SlideDeck::error`], the
/// single-slide deck substituted when the upstream text source failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDeck {
    slides: Vec<SlideRecord>,
}

impl SlideDeck {
    /// Builds a deck from raw records, clamping the length into `[MIN_SLIDES, MAX_SLIDES]`.
    pub fn normalized(mut slides: Vec<SlideRecord>) -> Self {
        if slides.len() < MIN_SLIDES {
            let missing = MIN_SLIDES - slides.len();
            debug!("Padding outline with {missing} filler slides");
            slides.extend(std::iter::repeat_with(SlideRecord::filler).take(missing));
        } else if slides.len() > MAX_SLIDES {
            debug!(
                "Truncating outline from {} to {MAX_SLIDES} slides",
                slides.len()
            );
            slides.truncate(MAX_SLIDES);
        }
        Self { slides }
    }

    /// A one-slide deck titled "Error" whose bullets describe the failure.
    pub fn error(details: Vec<String>) -> Self {
        Self {
            slides: vec![SlideRecord::new(ERROR_TITLE, details)],
        }
    }

    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.slides.len() == 1 && self.slides[0].title == ERROR_TITLE
    }

    /// Renders the deck back into the canonical `Slide N: Title` / `- bullet` text form.
    ///
    /// Bullets that already carry a marker are written as-is; bare bullets get `- `.
    pub fn to_outline_text(&self) -> String {
        let mut out = String::new();
        for (index, slide) in self.slides.iter().enumerate() {
            out.push_str(&format!("Slide {}: {}\n", index + 1, slide.title));
            for bullet in &slide.bullets {
                if has_bullet_marker(bullet) {
                    out.push_str(bullet);
                } else {
                    out.push_str("- ");
                    out.push_str(bullet);
                }
                out.push('\n');
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a SlideDeck {
    type Item = &'a SlideRecord;
    type IntoIter = std::slice::Iter<'a, SlideRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line classification
// ────────────────────────────────────────────────────────────────────────────

/// What a single trimmed, non-blank line looks like, before considering parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `Slide 3: Title`, `slide 3- Title`, `SLIDE3) Title` — carries the title text.
    Heading(&'a str),
    /// Starts with `-`, `•` or `*`.
    Bulleted,
    /// `3. Title` — carries the title text.
    NumberedHeading(&'a str),
    /// Anything else.
    Plain,
}

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"(?i)^slide\s*\d+[:\-)]\s*(.+)$").expect("HEADING regex is valid")
    })
}

fn numbered_regex() -> &'static Regex {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    NUMBERED.get_or_init(|| Regex::new(r"^\d+\.\s+(.+)$").expect("NUMBERED regex is valid"))
}

fn has_bullet_marker(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('•') || line.starts_with('*')
}

/// Classifies one trimmed line. Explicit headings win over bullets, which win
/// over numbered headings, so `Slide 2: ...` is never read as a numbered item.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(caps) = heading_regex().captures(line) {
        if let Some(title) = caps.get(1) {
            return LineKind::Heading(title.as_str().trim());
        }
    }
    if has_bullet_marker(line) {
        return LineKind::Bulleted;
    }
    if let Some(caps) = numbered_regex().captures(line) {
        if let Some(title) = caps.get(1) {
            return LineKind::NumberedHeading(title.as_str().trim());
        }
    }
    LineKind::Plain
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

/// The rule that consumed a line, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Explicit `Slide N:` heading closed the open record and opened a new one.
    Heading,
    /// Marked bullet appended to the open record.
    Bullet,
    /// Marked bullet seen before any title; the next title resets bullets, so it is dropped.
    OrphanBullet,
    /// `N. Title` heading closed the open record and opened a new one.
    NumberedHeading,
    /// Short marker-less line appended while the record still had room.
    ImplicitBullet,
    /// First usable line with no title open became the title.
    ImplicitTitle,
    /// Marker-less line that failed the implicit-bullet guard, appended anyway.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OutlineState {
    NoTitleOpen,
    TitleOpen { title: String, bullets: Vec<String> },
}

/// Accumulates closed records while walking the input.
#[derive(Debug)]
struct OutlineParser {
    state: OutlineState,
    slides: Vec<SlideRecord>,
}

impl OutlineParser {
    fn new() -> Self {
        Self {
            state: OutlineState::NoTitleOpen,
            slides: Vec::new(),
        }
    }

    /// Closes the open record (if any) and opens a new one with no bullets.
    fn open(&mut self, title: &str) {
        self.close();
        self.state = OutlineState::TitleOpen {
            title: title.to_string(),
            bullets: Vec::new(),
        };
    }

    fn close(&mut self) {
        if let OutlineState::TitleOpen { title, bullets } =
            std::mem::replace(&mut self.state, OutlineState::NoTitleOpen)
        {
            self.slides.push(SlideRecord { title, bullets });
        }
    }

    /// Applies one trimmed, non-blank line and reports which rule consumed it.
    fn feed(&mut self, line: &str) -> Rule {
        match classify_line(line) {
            LineKind::Heading(title) => {
                self.open(title);
                Rule::Heading
            }
            LineKind::Bulleted => match &mut self.state {
                OutlineState::TitleOpen { bullets, .. } => {
                    bullets.push(line.to_string());
                    Rule::Bullet
                }
                OutlineState::NoTitleOpen => {
                    debug!("Dropping bullet before first title: {line:?}");
                    Rule::OrphanBullet
                }
            },
            LineKind::NumberedHeading(title) => {
                self.open(title);
                Rule::NumberedHeading
            }
            LineKind::Plain => match &mut self.state {
                OutlineState::TitleOpen { bullets, .. } => {
                    let rule = if is_implicit_bullet(line, bullets.len()) {
                        Rule::ImplicitBullet
                    } else {
                        Rule::Overflow
                    };
                    bullets.push(line.to_string());
                    rule
                }
                OutlineState::NoTitleOpen => {
                    self.open(line);
                    Rule::ImplicitTitle
                }
            },
        }
    }

    fn finish(mut self) -> Vec<SlideRecord> {
        self.close();
        self.slides
    }
}

/// Whether a marker-less line would be accepted as an implicit bullet by the
/// guarded rule (room left and short enough). Lines failing the guard are still
/// appended by the fallback rule once a title is open.
pub fn is_implicit_bullet(line: &str, current_bullets: usize) -> bool {
    current_bullets < MAX_IMPLICIT_BULLETS
        && line.split_whitespace().count() < IMPLICIT_BULLET_MAX_TOKENS
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Splits on every line-break character, not only `\n` and `\r\n`: completions
/// sometimes arrive with bare `\r` or Unicode line/paragraph separators. A `\r\n`
/// pair yields an empty piece, which is dropped with the other blank lines.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_line_break)
}

/// Parses raw outline text into the ordered records, without normalization.
pub fn parse_records(text: &str) -> Vec<SlideRecord> {
    let mut parser = OutlineParser::new();
    for line in split_lines(text).map(str::trim).filter(|l| !l.is_empty()) {
        if parser.feed(line) == Rule::Overflow {
            debug!("Kept line beyond implicit-bullet limits: {line:?}");
        }
    }
    parser.finish()
}

/// Parses raw outline text into a deck of 5–7 slides.
pub fn parse_outline(text: &str) -> SlideDeck {
    let records = parse_records(text);
    debug!("Parsed {} slide records from outline text", records.len());
    SlideDeck::normalized(records)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
