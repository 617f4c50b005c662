#![forbid(unsafe_code)]

//! Presentation metadata for annotated text.

use std::fmt;
use std::str::FromStr;

use crate::color::Rgb;

/// How an annotated span is underlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum UnderlineStyle {
    #[default]
    None,
    Solid,
    Dotted,
    Dashed,
    Wavy,
    Double,
}

impl UnderlineStyle {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::Wavy => "wavy",
            Self::Double => "double",
        }
    }

    /// SGR underline parameter (`4:n` extended form), if underlined.
    #[must_use]
    pub const fn sgr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Solid => Some("4"),
            Self::Double => Some("4:2"),
            Self::Wavy => Some("4:3"),
            Self::Dotted => Some("4:4"),
            Self::Dashed => Some("4:5"),
        }
    }
}

impl fmt::Display for UnderlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnderlineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "solid" => Ok(Self::Solid),
            "dotted" => Ok(Self::Dotted),
            "dashed" => Ok(Self::Dashed),
            "wavy" => Ok(Self::Wavy),
            "double" => Ok(Self::Double),
            other => Err(format!("unknown underline style '{other}'")),
        }
    }
}

/// Display metadata for one annotation id.
///
/// Immutable once placed in a registry. [`AnnotationStyle::PLAIN`] is the
/// "no styling" result for ids nobody defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationStyle {
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<Rgb>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub underline: UnderlineStyle,
}

impl AnnotationStyle {
    pub const PLAIN: Self = Self {
        color: None,
        underline: UnderlineStyle::None,
    };

    #[must_use]
    pub const fn new(color: Rgb, underline: UnderlineStyle) -> Self {
        Self {
            color: Some(color),
            underline,
        }
    }

    #[must_use]
    pub const fn is_plain(&self) -> bool {
        self.color.is_none() && matches!(self.underline, UnderlineStyle::None)
    }
}
