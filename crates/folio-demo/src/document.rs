#![forbid(unsafe_code)]

//! Lesson documents: variables, annotation styles, and paragraphs as TOML.
//!
//! ```toml
//! [variables]
//! hexagon_sides = 6
//!
//! [annotations.hexagon]
//! color = "#f59e0b"
//! underline = "dotted"
//!
//! [[paragraphs]]
//! items = [
//!     { text = "Bees build " },
//!     { span = "hexagon", text = "hexagonal cells" },
//!     { text = " with " },
//!     { stepper = { initial = 6, min = 3, max = 12, key = "hexagon_sides" } },
//!     { text = " sides." },
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use folio_runtime::{Value, VariableDefaults, VariableStore};
use folio_style::{AnnotationRegistry, AnnotationScope, AnnotationStyle};
use folio_widgets::{AnnotatedSpan, BoundText, Inline, NumericStepper, Paragraph, StepperConfig};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::DemoError;

/// The lesson shown when no document is given.
pub const BUILTIN_LESSON: &str = include_str!("../lessons/nature.toml");

/// One inline item as written in a document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InlineEntry {
    Span {
        span: String,
        text: String,
    },
    Stepper {
        stepper: StepperConfig,
    },
    Value {
        value: String,
        #[serde(default)]
        fallback: Option<Value>,
        #[serde(default)]
        suffix: Option<String>,
        #[serde(default)]
        annotation: Option<String>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParagraphEntry {
    #[serde(default)]
    pub items: Vec<InlineEntry>,
}

/// A parsed lesson, not yet bound to a store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LessonDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub defaults: VariableDefaults,
    #[serde(default)]
    pub annotations: BTreeMap<String, AnnotationStyle>,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphEntry>,
}

impl LessonDocument {
    pub fn from_toml_str(input: &str) -> Result<Self, DemoError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, DemoError> {
        let text = fs::read_to_string(path).map_err(|source| DemoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_toml_str(&text)?;
        info!(path = %path.display(), paragraphs = document.paragraphs.len(), "loaded lesson");
        Ok(document)
    }

    pub fn builtin() -> Result<Self, DemoError> {
        Self::from_toml_str(BUILTIN_LESSON)
    }

    /// Seed `store` and build the paragraphs against it.
    pub fn mount(&self, store: &VariableStore) -> MountedLesson {
        let seeded = self.defaults.apply(store);
        let registry = AnnotationRegistry::from(self.annotations.clone());
        let scope = AnnotationScope::root().nest(registry);
        let paragraphs = self
            .paragraphs
            .iter()
            .map(|entry| {
                entry.items
                    .iter()
                    .fold(Paragraph::new(), |p, item| p.with(mount_item(item, store)))
            })
            .collect::<Vec<_>>();
        debug!(seeded, paragraphs = paragraphs.len(), "mounted lesson");
        MountedLesson {
            title: self.title.clone(),
            scope,
            paragraphs,
        }
    }
}

fn mount_item(item: &InlineEntry, store: &VariableStore) -> Inline {
    match item {
        InlineEntry::Text { text } => Inline::Text(text.clone()),
        InlineEntry::Span { span, text } => AnnotatedSpan::new(span.as_str(), text.as_str()).into(),
        InlineEntry::Stepper { stepper } => NumericStepper::mount(stepper, store).into(),
        InlineEntry::Value {
            value,
            fallback,
            suffix,
            annotation,
        } => {
            let fallback = fallback.clone().unwrap_or_else(|| Value::Text(String::new()));
            let mut text = BoundText::new(store, value, fallback);
            if let Some(suffix) = suffix {
                text = text.suffix(suffix.as_str());
            }
            if let Some(id) = annotation {
                text = text.annotated(id.as_str());
            }
            text.into()
        }
    }
}

/// A lesson whose widgets are live against a store.
#[derive(Debug)]
pub struct MountedLesson {
    pub title: Option<String>,
    pub scope: AnnotationScope,
    pub paragraphs: Vec<Paragraph>,
}

impl MountedLesson {
    /// Stepper `index` counting across all paragraphs in reading order.
    pub fn stepper_mut(&mut self, index: usize) -> Option<&mut NumericStepper> {
        self.paragraphs
            .iter_mut()
            .flat_map(Paragraph::steppers_mut)
            .nth(index)
    }

    /// First stepper bound to `key`.
    pub fn stepper_for_key(&mut self, key: &str) -> Option<&mut NumericStepper> {
        self.paragraphs
            .iter_mut()
            .flat_map(Paragraph::steppers_mut)
            .find(|s| s.key() == Some(key))
    }

    #[must_use]
    pub fn stepper_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.steppers().count()).sum()
    }
}
