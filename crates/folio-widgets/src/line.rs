#![forbid(unsafe_code)]

//! Styled inline output handed to the rendering layer.

use std::fmt;

use folio_style::{ColorDowngrader, Style};
use unicode_width::UnicodeWidthStr;

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
}

impl Segment {
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in terminal cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// Ordered segments forming one paragraph line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    segments: Vec<Segment>,
}

impl Line {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) {
        if segment.text.is_empty() {
            return;
        }
        // Merge with the previous run when the style is unchanged.
        if let Some(last) = self.segments.last_mut() {
            if last.style == segment.style {
                last.text.push_str(&segment.text);
                return;
            }
        }
        self.segments.push(segment);
    }

    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.push(Segment::raw(text));
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    /// The line's text without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// The line with SGR escapes for the downgrader's terminal profile.
    #[must_use]
    pub fn to_ansi(&self, downgrader: &mut ColorDowngrader) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let open = segment.style.sgr_open(downgrader);
            if open.is_empty() {
                out.push_str(&segment.text);
            } else {
                out.push_str(&open);
                out.push_str(&segment.text);
                out.push_str("\x1b[0m");
            }
        }
        out
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}
