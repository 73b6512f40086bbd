//! # Event Path Normalization
//!
//! Event names address locations in the namespace tree. Callers may supply a
//! dot-delimited string (`"a.b.c"`), a pre-split segment sequence, or an
//! already-built [`EventPath`]; every public API normalizes its input through
//! [`IntoEventPath`] before touching the tree.
//!
//! Normalization is pure: converting a name never creates tree nodes or has
//! any other side effect.

use compact_str::{CompactString, ToCompactString};
use smallvec::SmallVec;
use std::fmt;
use uuid::Uuid;

/// An ordered sequence of path segments identifying a tree location.
///
/// The empty path addresses the root of the namespace universe. Segments are
/// stored inline for the common shallow case (up to four segments without a
/// heap allocation).
///
/// # Examples
///
/// ```rust
/// use eventspace::EventPath;
///
/// let path = EventPath::parse("player.inventory.changed");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "player.inventory.changed");
///
/// // The empty string is the root, not a single empty segment.
/// assert!(EventPath::parse("").is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventPath {
    segments: SmallVec<[CompactString; 4]>,
}

impl EventPath {
    /// The root path (empty segment sequence).
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits a dot-delimited name into segments.
    ///
    /// The empty string normalizes to the root path, not to `[""]`.
    pub fn parse(name: &str) -> Self {
        if name.is_empty() {
            return Self::root();
        }
        Self {
            segments: name.split('.').map(CompactString::new).collect(),
        }
    }

    /// Builds a path from pre-split segments, passed through unchanged.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToCompactString,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| s.to_compact_string())
                .collect(),
        }
    }

    /// The ordered segment slice.
    pub fn segments(&self) -> &[CompactString] {
        &self.segments
    }

    /// True for the empty path addressing the root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends one segment. Accepts strings and integers alike, so numeric
    /// path segments need no manual conversion.
    pub fn push(&mut self, segment: impl ToCompactString) {
        self.segments.push(segment.to_compact_string());
    }

    /// Appends a single-use random segment.
    ///
    /// One-shot registration suffixes the nominal path with such a segment so
    /// each one-shot listener lives at its own private leaf and cannot be
    /// removed by an unrelated cancellation of the nominal path's local set.
    pub fn push_unique(&mut self) {
        self.segments
            .push(Uuid::new_v4().simple().to_compact_string());
    }
}

impl fmt::Display for EventPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

/// Conversion of caller-supplied event names into an [`EventPath`].
///
/// Implemented for dot-delimited strings and for pre-split segment sequences;
/// already-built paths pass through unchanged.
pub trait IntoEventPath {
    fn into_event_path(self) -> EventPath;
}

impl IntoEventPath for EventPath {
    fn into_event_path(self) -> EventPath {
        self
    }
}

impl IntoEventPath for &EventPath {
    fn into_event_path(self) -> EventPath {
        self.clone()
    }
}

impl IntoEventPath for &str {
    fn into_event_path(self) -> EventPath {
        EventPath::parse(self)
    }
}

impl IntoEventPath for String {
    fn into_event_path(self) -> EventPath {
        EventPath::parse(&self)
    }
}

impl IntoEventPath for &[&str] {
    fn into_event_path(self) -> EventPath {
        EventPath::from_segments(self.iter().copied())
    }
}

impl<const N: usize> IntoEventPath for [&str; N] {
    fn into_event_path(self) -> EventPath {
        EventPath::from_segments(self)
    }
}

impl IntoEventPath for Vec<String> {
    fn into_event_path(self) -> EventPath {
        EventPath::from_segments(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_dots() {
        let path = EventPath::parse("a.b.c");
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[0], "a");
        assert_eq!(path.segments()[2], "c");
    }

    #[test]
    fn test_empty_string_is_root() {
        let path = EventPath::parse("");
        assert!(path.is_root());
        assert_eq!(path.len(), 0);
    }

    #[test]
    fn test_parse_round_trips_with_presplit() {
        let parsed = EventPath::parse("test.2.3");
        let presplit = ["test", "2", "3"].into_event_path();
        assert_eq!(parsed, presplit);
        // Normalizing an already-built path is the identity.
        assert_eq!(parsed.clone().into_event_path(), parsed);
    }

    #[test]
    fn test_display_round_trips() {
        let path = EventPath::parse("player.inventory.changed");
        assert_eq!(EventPath::parse(&path.to_string()), path);
        assert_eq!(EventPath::root().to_string(), "");
    }

    #[test]
    fn test_numeric_segments() {
        let mut path = EventPath::parse("test");
        path.push(2u64);
        assert_eq!(path, EventPath::parse("test.2"));
    }

    #[test]
    fn test_unique_segments_never_collide() {
        let mut a = EventPath::parse("test");
        let mut b = EventPath::parse("test");
        a.push_unique();
        b.push_unique();
        assert_ne!(a, b);
        assert_eq!(a.len(), 2);
    }
}
