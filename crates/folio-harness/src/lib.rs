#![forbid(unsafe_code)]

//! Test harness and reference fixtures for Folio.
//!
//! - [`CallProbe`] records what a store subscription receives.
//! - [`render_plain`] / [`assert_plain!`] compare rendered paragraphs as text.
//! - [`lesson`] builds the "mathematics in nature" reference lesson.

pub mod lesson;

use std::cell::RefCell;
use std::rc::Rc;

use folio_runtime::{Subscription, Value, VariableStore};
use folio_style::AnnotationScope;
use folio_widgets::Paragraph;

/// Records every value delivered to the subscriptions it creates.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallProbe {
    log: Rc<RefCell<Vec<Value>>>,
}

impl CallProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `key`, logging each notification.
    pub fn attach(&self, store: &VariableStore, key: &str) -> Subscription {
        let log = Rc::clone(&self.log);
        store.subscribe(key, move |value| log.borrow_mut().push(value.clone()))
    }

    /// Number of notifications received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.log.borrow().len()
    }

    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.log.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Value> {
        self.log.borrow().last().cloned()
    }

    /// Integer payloads, skipping values of other kinds.
    #[must_use]
    pub fn ints(&self) -> Vec<i64> {
        self.log.borrow().iter().filter_map(Value::as_int).collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Render each paragraph in `scope` to unstyled text.
#[must_use]
pub fn render_plain(paragraphs: &[Paragraph], scope: &AnnotationScope) -> Vec<String> {
    paragraphs
        .iter()
        .map(|p| p.render_line(scope).plain_text())
        .collect()
}

/// Assert a paragraph's unstyled rendering.
///
/// ```
/// use folio_harness::assert_plain;
/// use folio_style::AnnotationScope;
/// use folio_widgets::Paragraph;
///
/// let p = Paragraph::new().with("plain words");
/// assert_plain!(p, AnnotationScope::root(), "plain words");
/// ```
#[macro_export]
macro_rules! assert_plain {
    ($paragraph:expr, $scope:expr, $expected:expr $(,)?) => {{
        let rendered = $paragraph.render_line(&$scope).plain_text();
        assert_eq!(
            rendered, $expected,
            "rendered paragraph differs from expected text"
        );
    }};
}
