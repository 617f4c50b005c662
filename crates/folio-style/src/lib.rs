#![forbid(unsafe_code)]

//! Style types for Folio documents.
//!
//! This crate provides:
//! - [`Rgb`] color tokens and [`ColorDowngrader`] for terminal profiles
//!   (TrueColor → 256 → 16 → mono)
//! - [`AnnotationStyle`] presentation metadata for annotated text
//! - [`AnnotationRegistry`] and [`AnnotationScope`] for resolving annotation ids
//!   against the nearest enclosing document region
//! - [`Style`], the render style carried by output segments

pub mod annotation;
pub mod color;
pub mod registry;
pub mod style;

pub use annotation::{AnnotationStyle, UnderlineStyle};
pub use color::{Ansi16Color, ColorDowngrader, ColorParseError, ColorProfile, Rgb, TerminalColor};
pub use registry::{AnnotationRegistry, AnnotationScope};
pub use style::Style;
