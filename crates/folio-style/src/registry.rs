#![forbid(unsafe_code)]

//! Annotation registries and the scope chain used to resolve annotation ids.
//!
//! A document region supplies one [`AnnotationRegistry`] when it mounts. Spans
//! inside the region resolve their id through an [`AnnotationScope`], which
//! walks from the innermost region outward.
//!
//! # Invariants
//!
//! 1. **Immutable registries**: no mutation is exposed after construction, so
//!    every span in a scope sees the same style for the same id at any instant.
//! 2. **Resolution never fails**: an id that no registry on the chain defines,
//!    or a chain with no registry at all, resolves to
//!    [`AnnotationStyle::PLAIN`].
//! 3. **Shadowing per id**: a nested registry overrides outer registries only
//!    for the ids it defines; other ids continue to resolve outward.
//! 4. **Thread safety**: registries and scopes are `Send + Sync` (all data is
//!    immutable and shared through `Arc`).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown id | Typo or missing entry | [`AnnotationStyle::PLAIN`] |
//! | No enclosing registry | Span outside any region | [`AnnotationStyle::PLAIN`] |
//! | Duplicate id at construction | Content defines an id twice | Last entry wins (logged) |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::annotation::AnnotationStyle;

/// Lookup table from annotation id to style for one document region.
///
/// Cloning is cheap and yields a registry with identical contents.
///
/// ```
/// use folio_style::{AnnotationRegistry, AnnotationStyle, Rgb, UnderlineStyle};
///
/// let amber = AnnotationStyle::new(Rgb::new(0xf5, 0x9e, 0x0b), UnderlineStyle::Dotted);
/// let registry = AnnotationRegistry::new([("hexagon", amber)]);
///
/// assert_eq!(registry.resolve("hexagon"), amber);
/// assert_eq!(registry.resolve("unknown-id"), AnnotationStyle::PLAIN);
/// ```
#[derive(Clone, Default)]
pub struct AnnotationRegistry {
    styles: Arc<AHashMap<String, AnnotationStyle>>,
}

impl AnnotationRegistry {
    /// Build a registry from the complete id → style mapping of a region.
    pub fn new<K: Into<String>>(styles: impl IntoIterator<Item = (K, AnnotationStyle)>) -> Self {
        let mut map = AHashMap::new();
        for (id, style) in styles {
            let id = id.into();
            if let Some(previous) = map.insert(id.clone(), style) {
                if previous != style {
                    warn!(id = %id, "annotation id defined twice, keeping the last style");
                }
            }
        }
        debug!(annotations = map.len(), "built annotation registry");
        Self {
            styles: Arc::new(map),
        }
    }

    /// A registry that defines nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Style for `id`, or [`AnnotationStyle::PLAIN`] when undefined.
    #[must_use]
    pub fn resolve(&self, id: &str) -> AnnotationStyle {
        self.get(id).copied().unwrap_or(AnnotationStyle::PLAIN)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnnotationStyle> {
        self.styles.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Defined ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl<K: Into<String>> FromIterator<(K, AnnotationStyle)> for AnnotationRegistry {
    fn from_iter<I: IntoIterator<Item = (K, AnnotationStyle)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<BTreeMap<String, AnnotationStyle>> for AnnotationRegistry {
    fn from(styles: BTreeMap<String, AnnotationStyle>) -> Self {
        Self::new(styles)
    }
}

impl fmt::Debug for AnnotationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

struct ScopeFrame {
    registry: AnnotationRegistry,
    parent: Option<Arc<ScopeFrame>>,
}

/// Explicit chain of enclosing registries for a rendering context.
///
/// The root scope has no registry. Each [`nest`](Self::nest) adds an inner
/// region; the parent scope is unaffected, so a region "unmounts" simply by
/// dropping its scope.
///
/// ```
/// use folio_style::{AnnotationRegistry, AnnotationScope, AnnotationStyle, Rgb, UnderlineStyle};
///
/// let blue = AnnotationStyle::new(Rgb::new(0x3b, 0x82, 0xf6), UnderlineStyle::Dotted);
/// let pink = AnnotationStyle::new(Rgb::new(0xec, 0x48, 0x99), UnderlineStyle::Solid);
///
/// let outer = AnnotationScope::root().nest(AnnotationRegistry::new([("circle", blue), ("spiral", blue)]));
/// let inner = outer.nest(AnnotationRegistry::new([("spiral", pink)]));
///
/// assert_eq!(inner.resolve("spiral"), pink);
/// assert_eq!(inner.resolve("circle"), blue);
/// assert_eq!(outer.resolve("spiral"), blue);
/// assert_eq!(AnnotationScope::root().resolve("circle"), AnnotationStyle::PLAIN);
/// ```
#[derive(Clone, Default)]
pub struct AnnotationScope {
    frame: Option<Arc<ScopeFrame>>,
}

impl AnnotationScope {
    /// The outermost scope: no registry, everything resolves plain.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A child scope whose nearest registry is `registry`.
    #[must_use]
    pub fn nest(&self, registry: AnnotationRegistry) -> Self {
        Self {
            frame: Some(Arc::new(ScopeFrame {
                registry,
                parent: self.frame.clone(),
            })),
        }
    }

    /// The nearest enclosing registry.
    #[must_use]
    pub fn registry(&self) -> Option<&AnnotationRegistry> {
        self.frame.as_deref().map(|f| &f.registry)
    }

    /// Number of registries on the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames().count()
    }

    /// Style from the nearest registry defining `id`.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<AnnotationStyle> {
        self.frames().find_map(|f| f.registry.get(id).copied())
    }

    /// Style for `id`, or [`AnnotationStyle::PLAIN`] when nothing on the chain
    /// defines it.
    #[must_use]
    pub fn resolve(&self, id: &str) -> AnnotationStyle {
        self.lookup(id).unwrap_or(AnnotationStyle::PLAIN)
    }

    fn frames(&self) -> impl Iterator<Item = &ScopeFrame> {
        std::iter::successors(self.frame.as_deref(), |f| f.parent.as_deref())
    }
}

impl fmt::Debug for AnnotationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationScope")
            .field("depth", &self.depth())
            .finish()
    }
}
