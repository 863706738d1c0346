//! Latest extracted values per conversation group.

use crate::{GroupId, TagName};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Tag contents taken from the most recent reply of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupState {
    values: HashMap<TagName, String>,
}

impl GroupState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: TagName, content: String) {
        self.values.insert(tag, content);
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.values.get(tag).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.values.contains_key(tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(TagName, String)> for GroupState {
    fn from_iter<I: IntoIterator<Item = (TagName, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Shared map from group to its latest [`GroupState`].
///
/// States are stored behind `Arc` and swapped whole, so a reader holds
/// either the previous or the new state of a group, never a mix. There is
/// no eviction: one entry lives per group ever written until [`clear`].
///
/// [`clear`]: GroupStore::clear
#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    groups: Arc<RwLock<HashMap<GroupId, Arc<GroupState>>>>,
}

impl GroupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, group: &GroupId) -> Option<Arc<GroupState>> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group)
            .cloned()
    }

    /// Replace the state of `group` wholesale.
    pub fn set(&self, group: GroupId, state: GroupState) {
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group, Arc::new(state));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
