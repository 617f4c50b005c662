#![forbid(unsafe_code)]

//! Color tokens, terminal profiles, and downgrade logic.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;

/// An sRGB color token, written `#rrggbb` or `#rgb` in document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`, case-insensitive. The `#` is required.
    pub fn parse_hex(token: &str) -> Result<Self, ColorParseError> {
        let digits = token
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(token.to_owned()))?;
        if !digits.is_ascii() {
            return Err(ColorParseError::InvalidDigit(token.to_owned()));
        }
        let nibble = |i: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[i..=i], 16)
                .map_err(|_| ColorParseError::InvalidDigit(token.to_owned()))
        };
        match digits.len() {
            3 => Ok(Self::new(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Ok(Self::new(
                nibble(0)? << 4 | nibble(1)?,
                nibble(2)? << 4 | nibble(3)?,
                nibble(4)? << 4 | nibble(5)?,
            )),
            len => Err(ColorParseError::BadLength {
                token: token.to_owned(),
                len,
            }),
        }
    }

    fn distance(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let v = i32::from(a) - i32::from(b);
            (v * v) as u32
        };
        d(self.r, other.r) * 2126 + d(self.g, other.g) * 7152 + d(self.b, other.b) * 722
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Errors from parsing a color token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    MissingHash(String),
    InvalidDigit(String),
    BadLength { token: String, len: usize },
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHash(t) => write!(f, "color token '{t}' must start with '#'"),
            Self::InvalidDigit(t) => write!(f, "color token '{t}' has a non-hex digit"),
            Self::BadLength { token, len } => {
                write!(f, "color token '{token}' has {len} digits, expected 3 or 6")
            }
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Color capability of the output terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorProfile {
    Mono,
    Ansi16,
    Ansi256,
    #[default]
    TrueColor,
}

impl FromStr for ColorProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mono" | "none" => Ok(Self::Mono),
            "ansi16" | "16" => Ok(Self::Ansi16),
            "ansi256" | "256" => Ok(Self::Ansi256),
            "truecolor" | "24bit" => Ok(Self::TrueColor),
            other => Err(format!("unknown color profile '{other}'")),
        }
    }
}

/// The sixteen base terminal colors, in SGR order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ansi16Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

const ANSI16: [(Ansi16Color, Rgb); 16] = [
    (Ansi16Color::Black, Rgb::new(0, 0, 0)),
    (Ansi16Color::Red, Rgb::new(205, 0, 0)),
    (Ansi16Color::Green, Rgb::new(0, 205, 0)),
    (Ansi16Color::Yellow, Rgb::new(205, 205, 0)),
    (Ansi16Color::Blue, Rgb::new(0, 0, 238)),
    (Ansi16Color::Magenta, Rgb::new(205, 0, 205)),
    (Ansi16Color::Cyan, Rgb::new(0, 205, 205)),
    (Ansi16Color::White, Rgb::new(229, 229, 229)),
    (Ansi16Color::BrightBlack, Rgb::new(127, 127, 127)),
    (Ansi16Color::BrightRed, Rgb::new(255, 0, 0)),
    (Ansi16Color::BrightGreen, Rgb::new(0, 255, 0)),
    (Ansi16Color::BrightYellow, Rgb::new(255, 255, 0)),
    (Ansi16Color::BrightBlue, Rgb::new(92, 92, 255)),
    (Ansi16Color::BrightMagenta, Rgb::new(255, 0, 255)),
    (Ansi16Color::BrightCyan, Rgb::new(0, 255, 255)),
    (Ansi16Color::BrightWhite, Rgb::new(255, 255, 255)),
];

impl Ansi16Color {
    /// Palette index, 0..=15.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn rgb(self) -> Rgb {
        ANSI16[self as usize].1
    }

    /// SGR foreground parameter (30..=37, 90..=97).
    #[must_use]
    pub const fn fg_sgr(self) -> u8 {
        let code = self.code();
        if code < 8 { 30 + code } else { 90 + code - 8 }
    }
}

/// A color expressed in what the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalColor {
    TrueColor(Rgb),
    Ansi256(u8),
    Ansi16(Ansi16Color),
    /// Mono terminals keep the default foreground.
    Default,
}

impl TerminalColor {
    /// SGR parameters selecting this color as foreground, if any.
    #[must_use]
    pub fn fg_sgr(self) -> Option<String> {
        match self {
            Self::TrueColor(c) => Some(format!("38;2;{};{};{}", c.r, c.g, c.b)),
            Self::Ansi256(n) => Some(format!("38;5;{n}")),
            Self::Ansi16(c) => Some(c.fg_sgr().to_string()),
            Self::Default => None,
        }
    }
}

/// Cached color downgrader for a specific terminal profile.
#[derive(Debug, Default)]
pub struct ColorDowngrader {
    profile: ColorProfile,
    cache: AHashMap<Rgb, TerminalColor>,
}

impl ColorDowngrader {
    #[must_use]
    pub fn new(profile: ColorProfile) -> Self {
        Self {
            profile,
            cache: AHashMap::new(),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> ColorProfile {
        self.profile
    }

    #[must_use]
    pub fn downgrade(&mut self, color: Rgb) -> TerminalColor {
        let profile = self.profile;
        *self.cache.entry(color).or_insert_with(|| match profile {
            ColorProfile::TrueColor => TerminalColor::TrueColor(color),
            ColorProfile::Ansi256 => TerminalColor::Ansi256(to_ansi256(color)),
            ColorProfile::Ansi16 => TerminalColor::Ansi16(to_ansi16(color)),
            ColorProfile::Mono => TerminalColor::Default,
        })
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn to_ansi256(c: Rgb) -> u8 {
    if c.r == c.g && c.g == c.b {
        return match c.r {
            0..8 => 16,
            249.. => 231,
            v => 232 + ((v - 8) / 10).min(23),
        };
    }
    let cube = |v: u8| (u16::from(v) * 6 / 256) as u8;
    16 + 36 * cube(c.r) + 6 * cube(c.g) + cube(c.b)
}

fn to_ansi16(c: Rgb) -> Ansi16Color {
    ANSI16
        .iter()
        .min_by_key(|(_, candidate)| c.distance(*candidate))
        .map_or(Ansi16Color::White, |(color, _)| *color)
}
