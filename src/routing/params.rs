//! Typed path variables.

use std::fmt;

use crate::store::ObjectId;

/// Value bound to a path variable after validation.
///
/// Variables without a registered validator are always `Str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue {
    Str(String),
    Int(i64),
    Id(ObjectId),
}

impl PathValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PathValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PathValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            PathValue::Id(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Str(s) => f.write_str(s),
            PathValue::Int(n) => write!(f, "{}", n),
            PathValue::Id(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for PathValue {
    fn from(s: &str) -> Self {
        PathValue::Str(s.to_string())
    }
}

impl From<String> for PathValue {
    fn from(s: String) -> Self {
        PathValue::Str(s)
    }
}

impl From<i64> for PathValue {
    fn from(n: i64) -> Self {
        PathValue::Int(n)
    }
}

impl From<ObjectId> for PathValue {
    fn from(id: ObjectId) -> Self {
        PathValue::Id(id)
    }
}

/// Variables captured for one request, in path order (root to leaf).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, PathValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, replacing an earlier value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: PathValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PathValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PathValue::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PathValue::as_int)
    }

    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.get(name).and_then(PathValue::as_object_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, PathValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, PathValue)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
