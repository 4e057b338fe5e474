//! Component store convention
//!
//! Every manager that hands out [`Instance`] handles exposes the same small
//! surface: a record count, `all()` as a linear range over `1..=count`, and
//! per-instance `destroy`. Destroying never compacts storage or recycles
//! the index; the slot stays allocated and the handle stays unique.

use crate::instance::{Instance, InstanceLinearRange, InstanceRange};

pub trait ComponentStore: Sized {
    /// Number of instances ever created in this store.
    fn count(&self) -> usize;

    /// Release whatever the store keeps for `instance`.
    fn destroy(&mut self, instance: Instance<Self>);

    fn all(&self) -> InstanceLinearRange<Self> {
        let last = u32::try_from(self.count()).unwrap_or(u32::MAX);
        InstanceLinearRange::new(Instance::new(1), Instance::new(last))
    }

    fn valid(&self, instance: Instance<Self>) -> bool {
        instance.is_some() && instance.slot() < self.count()
    }

    fn destroy_range<R: InstanceRange<Self>>(&mut self, range: &R) {
        for instance in range.iter() {
            self.destroy(instance);
        }
    }
}
