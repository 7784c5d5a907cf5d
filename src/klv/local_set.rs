//! Ordered tag → value multi-map.

use super::value::{Tag, Value};

/// A KLV local set: entries keyed by small integer tags.
///
/// Tags may repeat, and iteration follows insertion order. Equality compares
/// entries pairwise in order, recursing into nested sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalSet {
    entries: Vec<(Tag, Value)>,
}

impl LocalSet {
    /// Create an empty local set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Existing entries with the same tag are kept.
    pub fn insert(&mut self, tag: impl Into<Tag>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((tag.into(), value.into()));
        self
    }

    /// Number of entries with `tag`.
    pub fn count(&self, tag: impl Into<Tag>) -> usize {
        let tag = tag.into();
        self.entries.iter().filter(|(t, _)| *t == tag).count()
    }

    /// Whether any entry has `tag`.
    pub fn has(&self, tag: impl Into<Tag>) -> bool {
        let tag = tag.into();
        self.entries.iter().any(|(t, _)| *t == tag)
    }

    /// The value for a tag expected to be unique.
    ///
    /// Returns `None` if the tag is absent or repeated.
    pub fn at(&self, tag: impl Into<Tag>) -> Option<&Value> {
        let mut matches = self.all_at(tag);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    /// Mutable access to the value for a tag expected to be unique.
    pub fn at_mut(&mut self, tag: impl Into<Tag>) -> Option<&mut Value> {
        let tag = tag.into();
        if self.count(tag) != 1 {
            return None;
        }
        self.entries
            .iter_mut()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v)
    }

    /// Every value with `tag`, in insertion order.
    pub fn all_at(&self, tag: impl Into<Tag>) -> impl Iterator<Item = &Value> {
        let tag = tag.into();
        self.entries
            .iter()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, v)| v)
    }

    /// Every value with `tag`, mutably, in insertion order.
    pub fn all_at_mut(&mut self, tag: impl Into<Tag>) -> impl Iterator<Item = &mut Value> {
        let tag = tag.into();
        self.entries
            .iter_mut()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, v)| v)
    }

    /// Remove every entry with `tag`, returning how many were removed.
    pub fn erase(&mut self, tag: impl Into<Tag>) -> usize {
        let tag = tag.into();
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != tag);
        before - self.entries.len()
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Into<Tag>, V: Into<Value>> FromIterator<(T, V)> for LocalSet {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut set = LocalSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Into<Tag>, V: Into<Value>> Extend<(T, V)> for LocalSet {
    fn extend<I: IntoIterator<Item = (T, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(t, v)| (t.into(), v.into())));
    }
}

impl IntoIterator for LocalSet {
    type Item = (Tag, Value);
    type IntoIter = std::vec::IntoIter<(Tag, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_tags_keep_order() {
        let mut set = LocalSet::new();
        set.insert(4u64, "first").insert(1u64, 10u64).insert(4u64, "second");

        assert_eq!(set.count(4u64), 2);
        let all: Vec<_> = set.all_at(4u64).filter_map(Value::as_str).collect();
        assert_eq!(all, vec!["first", "second"]);

        let tags: Vec<_> = set.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec![4, 1, 4]);
    }

    #[test]
    fn test_erase_removes_every_entry() {
        let mut set = LocalSet::new();
        set.insert(4u64, "a").insert(4u64, "b").insert(2u64, 1u64);

        assert_eq!(set.erase(4u64), 2);
        assert_eq!(set.count(4u64), 0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.erase(4u64), 0);
    }

    #[test]
    fn test_at_requires_unique_tag() {
        let mut set = LocalSet::new();
        set.insert(1u64, 5u64).insert(2u64, "x").insert(2u64, "y");

        assert_eq!(set.at(1u64), Some(&Value::Uint(5)));
        assert_eq!(set.at(2u64), None);
        assert_eq!(set.at(3u64), None);
        assert!(set.at_mut(2u64).is_none());
    }

    #[test]
    fn test_at_mut_and_all_at_mut() {
        let mut set = LocalSet::new();
        set.insert(1u64, 5u64).insert(2u64, 1u64).insert(2u64, 2u64);

        *set.at_mut(1u64).unwrap() = Value::Uint(6);
        for value in set.all_at_mut(2u64) {
            *value = Value::Uint(0);
        }

        let expected: LocalSet = [(1u64, 6u64), (2, 0), (2, 0)].into_iter().collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: LocalSet = [(1u64, 1u64), (2, 2)].into_iter().collect();
        let b: LocalSet = [(2u64, 2u64), (1, 1)].into_iter().collect();
        assert_ne!(a, b);
    }
}
