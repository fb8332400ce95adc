use std::fmt;
use std::ops::Range;

use crate::error::{ModelError, Result};
use crate::matcher::ElementMatcher;
use crate::method::MethodDescription;

/// An ordered list of methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MethodList(Vec<MethodDescription>);

impl MethodList {
    pub fn new(methods: Vec<MethodDescription>) -> Self {
        Self(methods)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MethodDescription> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodDescription> {
        self.0.iter()
    }

    pub fn contains(&self, method: &MethodDescription) -> bool {
        self.0.contains(method)
    }

    /// Keeps the methods accepted by `matcher`, preserving order.
    pub fn filter<M>(&self, matcher: &M) -> MethodList
    where
        M: ElementMatcher<MethodDescription> + ?Sized,
    {
        Self(self.0.iter().filter(|m| matcher.matches(m)).cloned().collect())
    }

    /// Returns the single element of this list.
    pub fn only(&self) -> Result<&MethodDescription> {
        match self.0.as_slice() {
            [only] => Ok(only),
            other => Err(ModelError::NotExactlyOne { found: other.len() }),
        }
    }

    /// Out-of-range bounds are clamped to the list.
    pub fn sub_list(&self, range: Range<usize>) -> MethodList {
        let end = range.end.min(self.0.len());
        let start = range.start.min(end);
        Self(self.0[start..end].to_vec())
    }

    pub fn into_vec(self) -> Vec<MethodDescription> {
        self.0
    }
}

impl From<Vec<MethodDescription>> for MethodList {
    fn from(methods: Vec<MethodDescription>) -> Self {
        Self(methods)
    }
}

impl FromIterator<MethodDescription> for MethodList {
    fn from_iter<I: IntoIterator<Item = MethodDescription>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MethodList {
    type Item = MethodDescription;
    type IntoIter = std::vec::IntoIter<MethodDescription>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MethodList {
    type Item = &'a MethodDescription;
    type IntoIter = std::slice::Iter<'a, MethodDescription>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for MethodList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, method) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{method}")?;
        }
        f.write_str("]")
    }
}
