//! Ordered child builders for list-valued target fields

use serde::{Deserialize, Serialize};

/// Append-only ordered list of target builders
///
/// Holds one builder per occurrence of a list-valued target field. Entries
/// can be reached by position and modified in place, but never removed or
/// reordered during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderList<B> {
    entries: Vec<B>,
}

impl<B> Default for BuilderList<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B> BuilderList<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a builder and return its position
    pub fn push(&mut self, builder: B) -> usize {
        self.entries.push(builder);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&B> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        self.entries.get_mut(index)
    }

    /// First builder matching `predicate`, with its position
    pub fn find_mut(&mut self, predicate: impl Fn(&B) -> bool) -> Option<(usize, &mut B)> {
        self.entries
            .iter_mut()
            .enumerate()
            .find(|(_, builder)| predicate(builder))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, B> {
        self.entries.iter_mut()
    }

    pub fn into_inner(self) -> Vec<B> {
        self.entries
    }
}

impl<B: Default> BuilderList<B> {
    /// Builder at `index`, appending default builders until it exists
    pub fn get_or_append(&mut self, index: usize) -> &mut B {
        while self.entries.len() <= index {
            self.entries.push(B::default());
        }
        &mut self.entries[index]
    }
}

impl<B> From<Vec<B>> for BuilderList<B> {
    fn from(entries: Vec<B>) -> Self {
        Self { entries }
    }
}

impl<B> FromIterator<B> for BuilderList<B> {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, B> IntoIterator for &'a BuilderList<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
