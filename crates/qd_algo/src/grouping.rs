//! Grouping engine: partition records by a derived string key.
//!
//! - Keys and the records inside each bucket keep first-seen order.
//! - A key function returning `None` routes the record to `GroupKey::Unknown`;
//!   nothing is ever dropped, so bucket sizes always sum to the input length.
//! - Empty input yields empty `Groups`, never an error.

use core::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Map key of a bucket. `Unknown` collects records whose key is missing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Value(String),
    Unknown,
}

impl GroupKey {
    pub fn value(s: impl Into<String>) -> Self {
        GroupKey::Value(s.into())
    }

    pub fn from_option(k: Option<String>) -> Self {
        match k {
            Some(s) => GroupKey::Value(s),
            None => GroupKey::Unknown,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            GroupKey::Value(s) => Some(s.as_str()),
            GroupKey::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, GroupKey::Unknown)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Value(s) => f.write_str(s),
            GroupKey::Unknown => f.write_str("(unknown)"),
        }
    }
}

/// `Value(s)` serializes as the string, `Unknown` as `null`.
impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Value(v) => s.serialize_str(v),
            GroupKey::Unknown => s.serialize_none(),
        }
    }
}

/// Insertion-ordered buckets of borrowed records.
#[derive(Debug, Clone)]
pub struct Groups<'a, T> {
    buckets: IndexMap<GroupKey, Vec<&'a T>>,
    total: usize,
}

impl<'a, T> Default for Groups<'a, T> {
    fn default() -> Self {
        Self { buckets: IndexMap::new(), total: 0 }
    }
}

impl<'a, T> Groups<'a, T> {
    /// Number of distinct keys (including `Unknown` when present).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of records grouped, across all buckets.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn get(&self, key: &GroupKey) -> Option<&[&'a T]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Bucket size for `key`; 0 when the key was never seen.
    pub fn count(&self, key: &GroupKey) -> usize {
        self.buckets.get(key).map_or(0, Vec::len)
    }

    pub fn unknown(&self) -> Option<&[&'a T]> {
        self.get(&GroupKey::Unknown)
    }

    /// Buckets in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[&'a T])> + '_ {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Buckets with a real key, `Unknown` skipped.
    pub fn known(&self) -> impl Iterator<Item = (&str, &[&'a T])> + '_ {
        self.buckets
            .iter()
            .filter_map(|(k, v)| k.as_value().map(|s| (s, v.as_slice())))
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.buckets.keys()
    }

    /// `(key, size)` pairs in first-seen order.
    pub fn sizes(&self) -> Vec<(GroupKey, usize)> {
        self.buckets.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }
}

/// Group `items` by `key_fn`, preserving first-seen order of keys and records.
pub fn group_by<'a, T, I, F>(items: I, key_fn: F) -> Groups<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<String>,
{
    let mut buckets: IndexMap<GroupKey, Vec<&'a T>> = IndexMap::new();
    let mut total = 0usize;
    for item in items {
        let key = GroupKey::from_option(key_fn(item));
        buckets.entry(key).or_default().push(item);
        total += 1;
    }
    Groups { buckets, total }
}
