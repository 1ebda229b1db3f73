//! Gameplay tags and the reference tag store.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::TagStore;

/// A hierarchical gameplay tag such as `Status.Debuff.Poison`.
///
/// Owning a tag also satisfies queries for every parent, so an entity
/// tagged `Status.Debuff.Poison` has `Status.Debuff` and `Status`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag(pub String);

impl Tag {
    /// Create a new tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether owning `self` satisfies a query for `query`.
    ///
    /// ```
    /// use gameplay_effects::tags::Tag;
    ///
    /// let poison = Tag::new("Status.Debuff.Poison");
    /// assert!(poison.matches(&Tag::new("Status.Debuff")));
    /// assert!(poison.matches(&poison));
    /// assert!(!poison.matches(&Tag::new("Status.Deb")));
    /// assert!(!Tag::new("Status").matches(&poison));
    /// ```
    #[must_use]
    pub fn matches(&self, query: &Tag) -> bool {
        let own = self.0.as_str();
        let q = query.0.as_str();
        own == q || (own.starts_with(q) && own.as_bytes().get(q.len()) == Some(&b'.'))
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory `TagStore` with reference-counted grants.
///
/// Two effects granting the same tag each hold one reference; the tag is
/// only gone once both have revoked it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagContainer {
    counts: FxHashMap<Tag, u32>,
}

impl TagContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.add_tag(&tag.into());
        self
    }

    /// Number of outstanding grants of exactly `tag`.
    #[must_use]
    pub fn count(&self, tag: &Tag) -> u32 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Number of distinct tags held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no tags are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over held tags.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.counts.keys()
    }
}

impl TagStore for TagContainer {
    fn has_tag(&self, tag: &Tag) -> bool {
        self.counts.keys().any(|owned| owned.matches(tag))
    }

    fn add_tag(&mut self, tag: &Tag) {
        *self.counts.entry(tag.clone()).or_insert(0) += 1;
    }

    fn remove_tag(&mut self, tag: &Tag) {
        if let Some(count) = self.counts.get_mut(tag) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(tag);
            }
        }
    }
}
