// set.rs - Unordered instance set

use super::{Instance, InstanceRange};
use std::collections::hash_set;
use std::collections::HashSet;
use std::iter::Copied;

/// Hash set of instances. Iteration order is unspecified.
pub struct InstanceSet<C> {
    data: HashSet<Instance<C>>,
}

impl<C> InstanceSet<C> {
    pub fn new() -> Self {
        Self {
            data: HashSet::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the instance was not yet present.
    pub fn add(&mut self, instance: Instance<C>) -> bool {
        self.data.insert(instance)
    }

    /// Returns `true` if the instance was present.
    pub fn remove(&mut self, instance: Instance<C>) -> bool {
        self.data.remove(&instance)
    }

    pub fn add_range<R: InstanceRange<C>>(&mut self, range: &R) {
        self.data.extend(range.iter());
    }

    pub fn remove_range<R: InstanceRange<C>>(&mut self, range: &R) {
        for instance in range.iter() {
            self.data.remove(&instance);
        }
    }

    pub fn add_array(&mut self, instances: &[Instance<C>]) {
        self.data.extend(instances.iter().copied());
    }

    pub fn remove_array(&mut self, instances: &[Instance<C>]) {
        for instance in instances {
            self.data.remove(instance);
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<C> Default for InstanceSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InstanceSet<C> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<C> std::fmt::Debug for InstanceSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.data.iter()).finish()
    }
}

impl<C> FromIterator<Instance<C>> for InstanceSet<C> {
    fn from_iter<I: IntoIterator<Item = Instance<C>>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<C> InstanceRange<C> for InstanceSet<C> {
    type Iter<'a>
        = Copied<hash_set::Iter<'a, Instance<C>>>
    where
        Self: 'a;

    #[inline]
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn has(&self, instance: Instance<C>) -> bool {
        self.data.contains(&instance)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.data.iter().copied()
    }
}
