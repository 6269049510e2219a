//! Typed bulk allocator for graph entities.
//!
//! An [`Arena<T>`] owns every instance of one entity kind for one graph. It
//! hands out [`Slot<T>`] handles that stay valid for the arena's whole
//! lifetime: there is no removal, no eviction and no compaction, so a slot
//! never dangles and never gets reused. Instances are released together when
//! the arena is dropped.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Non-owning, typed position inside an [`Arena<T>`].
pub struct Slot<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slot<T> {
    fn new(index: usize) -> Self {
        Slot {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    /// Position of this slot in allocation order.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

// Manual impls: derives would put bounds on `T`.

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Slot<T> {}

impl<T> Hash for Slot<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.index)
    }
}

/// Append-only pool that is the sole owner of its instances.
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Moves `value` into the arena and returns its slot.
    pub fn alloc(&mut self, value: T) -> Slot<T> {
        let slot = Slot::new(self.items.len());
        self.items.push(value);
        slot
    }

    pub fn get(&self, slot: Slot<T>) -> Option<&T> {
        self.items.get(slot.index())
    }

    pub fn get_mut(&mut self, slot: Slot<T>) -> Option<&mut T> {
        self.items.get_mut(slot.index())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over all instances in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot<T>, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (Slot::new(index), item))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Slot<T>> for Arena<T> {
    type Output = T;

    fn index(&self, slot: Slot<T>) -> &T {
        &self.items[slot.index()]
    }
}

impl<T> IndexMut<Slot<T>> for Arena<T> {
    fn index_mut(&mut self, slot: Slot<T>) -> &mut T {
        &mut self.items[slot.index()]
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> Drop for Arena<T> {
    /// Tears down every instance, in allocation order, before the backing
    /// storage is released.
    fn drop(&mut self) {
        let count = self.items.len();
        for item in self.items.drain(..) {
            drop(item);
        }
        tracing::trace!(
            count,
            kind = std::any::type_name::<T>(),
            "arena released"
        );
    }
}
