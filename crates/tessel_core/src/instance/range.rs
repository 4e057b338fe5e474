// range.rs - Instance ranges
//
// A range is a set-like collection of instances with membership tests and
// iteration. Linear ranges cover a contiguous block; array ranges wrap an
// explicit list of handles.

use super::Instance;
use std::collections::HashSet;
use std::iter::Copied;
use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::slice;

/// Uniform interface over every kind of instance range.
pub trait InstanceRange<C> {
    type Iter<'a>: Iterator<Item = Instance<C>>
    where
        Self: 'a;

    fn is_empty(&self) -> bool;

    fn has(&self, instance: Instance<C>) -> bool;

    fn iter(&self) -> Self::Iter<'_>;

    fn for_each<F: FnMut(Instance<C>)>(&self, f: F) {
        self.iter().for_each(f);
    }

    fn to_vec(&self) -> Vec<Instance<C>> {
        self.iter().collect()
    }
}

/// Contiguous block `first..=last`.
pub struct InstanceLinearRange<C> {
    first: Instance<C>,
    last: Instance<C>,
}

impl<C> InstanceLinearRange<C> {
    pub const fn new(first: Instance<C>, last: Instance<C>) -> Self {
        Self { first, last }
    }

    #[inline]
    pub fn first(&self) -> Instance<C> {
        self.first
    }

    #[inline]
    pub fn last(&self) -> Instance<C> {
        self.last
    }

    /// Number of instances covered.
    pub fn len(&self) -> usize {
        if InstanceRange::is_empty(self) {
            0
        } else {
            (self.last.index() - self.first.index()) as usize + 1
        }
    }
}

impl<C> Clone for InstanceLinearRange<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for InstanceLinearRange<C> {}

impl<C> PartialEq for InstanceLinearRange<C> {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first && self.last == other.last
    }
}

impl<C> std::fmt::Debug for InstanceLinearRange<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstanceLinearRange({}..={})", self.first.index(), self.last.index())
    }
}

impl<C> InstanceRange<C> for InstanceLinearRange<C> {
    type Iter<'a>
        = LinearIter<C>
    where
        Self: 'a;

    #[inline]
    fn is_empty(&self) -> bool {
        self.first.index() < 1 || self.last < self.first
    }

    #[inline]
    fn has(&self, instance: Instance<C>) -> bool {
        !self.is_empty() && self.first <= instance && instance <= self.last
    }

    fn iter(&self) -> LinearIter<C> {
        let indices = if self.is_empty() {
            1..=0
        } else {
            self.first.index()..=self.last.index()
        };
        LinearIter {
            indices,
            _store: PhantomData,
        }
    }
}

impl<C> IntoIterator for InstanceLinearRange<C> {
    type Item = Instance<C>;
    type IntoIter = LinearIter<C>;

    fn into_iter(self) -> LinearIter<C> {
        self.iter()
    }
}

/// Ascending iterator over a linear range.
pub struct LinearIter<C> {
    indices: RangeInclusive<u32>,
    _store: PhantomData<fn() -> C>,
}

impl<C> Iterator for LinearIter<C> {
    type Item = Instance<C>;

    #[inline]
    fn next(&mut self) -> Option<Instance<C>> {
        self.indices.next().map(Instance::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<C> DoubleEndedIterator for LinearIter<C> {
    fn next_back(&mut self) -> Option<Instance<C>> {
        self.indices.next_back().map(Instance::new)
    }
}

/// Explicit list of handles, duplicates removed, first occurrence order kept.
///
/// Ranges built with [`InstanceArrayRange::sorted`] keep their handles in
/// ascending order and answer `has` by binary search.
pub struct InstanceArrayRange<C> {
    handles: Vec<Instance<C>>,
    sorted: bool,
}

impl<C> InstanceArrayRange<C> {
    pub fn new(handles: impl IntoIterator<Item = Instance<C>>) -> Self {
        let mut seen = HashSet::new();
        let handles = handles.into_iter().filter(|h| seen.insert(*h)).collect();
        Self {
            handles,
            sorted: false,
        }
    }

    /// Sorted, duplicate-free range.
    pub fn sorted(handles: impl IntoIterator<Item = Instance<C>>) -> Self {
        let mut handles: Vec<Instance<C>> = handles.into_iter().collect();
        handles.sort_unstable();
        handles.dedup();
        Self {
            handles,
            sorted: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    #[inline]
    pub fn as_slice(&self) -> &[Instance<C>] {
        &self.handles
    }

    pub fn into_vec(self) -> Vec<Instance<C>> {
        self.handles
    }
}

impl<C> Clone for InstanceArrayRange<C> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
            sorted: self.sorted,
        }
    }
}

impl<C> std::fmt::Debug for InstanceArrayRange<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handles.iter()).finish()
    }
}

impl<C> From<Vec<Instance<C>>> for InstanceArrayRange<C> {
    fn from(handles: Vec<Instance<C>>) -> Self {
        Self::new(handles)
    }
}

impl<C> FromIterator<Instance<C>> for InstanceArrayRange<C> {
    fn from_iter<I: IntoIterator<Item = Instance<C>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<C> InstanceRange<C> for InstanceArrayRange<C> {
    type Iter<'a>
        = Copied<slice::Iter<'a, Instance<C>>>
    where
        Self: 'a;

    #[inline]
    fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn has(&self, instance: Instance<C>) -> bool {
        if self.sorted {
            self.handles.binary_search(&instance).is_ok()
        } else {
            self.handles.contains(&instance)
        }
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.handles.iter().copied()
    }
}
