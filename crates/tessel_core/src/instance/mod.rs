//! Instance handles
//!
//! An instance is a 1-based record number inside one component store. The
//! store type is carried as a phantom parameter so a transform instance
//! cannot be passed where a collider instance is expected.
//!
//! Example:
//! ```ignore
//! let inst: Instance<TransformManager> = transforms.create(...);
//! colliders.destroy(inst); // compile error: wrong store
//! ```

mod range;
mod set;

pub use range::{InstanceArrayRange, InstanceLinearRange, InstanceRange, LinearIter};
pub use set::InstanceSet;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque handle to a record in component store `C`. Index 0 means "no instance".
pub struct Instance<C> {
    index: u32,
    _store: PhantomData<fn() -> C>,
}

impl<C> Instance<C> {
    pub const NONE: Self = Self::new(0);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            _store: PhantomData,
        }
    }

    /// Instance for the zero-based record slot `slot`.
    ///
    /// # Panics
    /// Panics if `slot + 1` does not fit the `u32` handle range.
    #[inline]
    pub fn from_slot(slot: usize) -> Self {
        let index = slot
            .checked_add(1)
            .and_then(|index| u32::try_from(index).ok())
            .expect("record slot exceeds the u32 handle range");
        Self::new(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.index == 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.index != 0
    }

    /// Zero-based record slot of this instance.
    #[inline]
    pub fn slot(self) -> usize {
        debug_assert!(self.is_some(), "the none instance has no slot");
        self.index as usize - 1
    }
}

// Manual impls: derives would require the marker type itself to implement them.

impl<C> Clone for Instance<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Instance<C> {}

impl<C> PartialEq for Instance<C> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<C> Eq for Instance<C> {}

impl<C> PartialOrd for Instance<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Instance<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<C> Hash for Instance<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<C> Default for Instance<C> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<C> fmt::Debug for Instance<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.index)
    }
}

impl<C> From<Instance<C>> for u32 {
    fn from(instance: Instance<C>) -> Self {
        instance.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Transforms;

    #[test]
    fn none_is_zero() {
        let none = Instance::<Transforms>::NONE;
        assert!(none.is_none());
        assert_eq!(Instance::<Transforms>::default(), none);
        assert!(Instance::<Transforms>::new(1).is_some());
    }

    #[test]
    fn slots_are_zero_based() {
        let inst = Instance::<Transforms>::from_slot(4);
        assert_eq!(inst.index(), 5);
        assert_eq!(inst.slot(), 4);
        assert_eq!(u32::from(inst), 5);
    }

    #[test]
    fn largest_slot_maps_to_last_handle() {
        let last = Instance::<Transforms>::from_slot(u32::MAX as usize - 1);
        assert_eq!(last.index(), u32::MAX);
    }

    #[test]
    #[should_panic(expected = "u32 handle range")]
    fn slot_past_handle_range_panics() {
        let _ = Instance::<Transforms>::from_slot(u32::MAX as usize);
    }

    #[test]
    fn ordering_follows_index() {
        let a = Instance::<Transforms>::new(2);
        let b = Instance::<Transforms>::new(7);
        assert!(a < b);
        assert_eq!(format!("{b:?}"), "Instance(7)");
    }
}
