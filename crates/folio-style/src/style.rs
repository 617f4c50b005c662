#![forbid(unsafe_code)]

//! Render style carried by output segments.

use crate::annotation::{AnnotationStyle, UnderlineStyle};
use crate::color::{ColorDowngrader, Rgb};

/// Visual attributes of one rendered segment.
///
/// Unset fields inherit from the surrounding paragraph; [`patch`](Style::patch)
/// layers a more specific style over a base one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub underline: Option<UnderlineStyle>,
    pub bold: bool,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            underline: None,
            bold: false,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = Some(underline);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.underline.is_none() && !self.bold
    }

    /// `other` layered over `self`: set fields in `other` win.
    #[must_use]
    pub fn patch(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            underline: other.underline.or(self.underline),
            bold: self.bold || other.bold,
        }
    }

    /// SGR escape opening this style for `downgrader`'s terminal profile, or
    /// an empty string for an empty style.
    #[must_use]
    pub fn sgr_open(&self, downgrader: &mut ColorDowngrader) -> String {
        let mut params: Vec<String> = Vec::new();
        if self.bold {
            params.push("1".into());
        }
        if let Some(sgr) = self.underline.and_then(UnderlineStyle::sgr) {
            params.push(sgr.into());
        }
        if let Some(fg) = self.fg.and_then(|c| downgrader.downgrade(c).fg_sgr()) {
            params.push(fg);
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", params.join(";"))
        }
    }
}

impl From<AnnotationStyle> for Style {
    fn from(style: AnnotationStyle) -> Self {
        Self {
            fg: style.color,
            underline: match style.underline {
                UnderlineStyle::None => None,
                other => Some(other),
            },
            bold: false,
        }
    }
}
