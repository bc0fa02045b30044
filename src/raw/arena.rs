use core::num::NonZero;

use alloc::vec::Vec;

// Narrow handles under test so the arena capacity limit is reachable.
#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Slot index into an [`Arena`], stored off-by-one so `Option<Handle>` is the
/// size of a bare index. Only the arena hands them out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// The largest slot index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Encodes `index`, or `None` once it leaves the handle space.
    fn new(index: usize) -> Option<Self> {
        index
            .checked_add(1)
            .and_then(|raw| RawHandle::try_from(raw).ok())
            .and_then(NonZero::new)
            .map(Self)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    // Vacant slots form a singly linked free list, most recently freed first.
    Vacant { next_free: Option<Handle> },
}

/// Slot storage for tree nodes. Handles stay valid until their slot is taken.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserves room for `additional` live elements beyond the current ones.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let vacant = self.slots.len() - self.len;
        self.slots.reserve(additional.saturating_sub(vacant));
    }

    /// Number of occupied slots.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Stores `element`, reusing the most recently freed slot first.
    ///
    /// # Panics
    ///
    /// Panics when every slot is occupied and the next index has no handle.
    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        let handle = if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.index()];
            let Slot::Vacant { next_free } = *slot else {
                panic!("`Arena::alloc()` - free list points at an occupied slot!");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied(element);
            handle
        } else {
            let Some(handle) = Handle::new(self.slots.len()) else {
                panic!("`Arena::alloc()` - arena is at maximum capacity ({})", Handle::MAX + 1);
            };
            self.slots.push(Slot::Occupied(element));
            handle
        };
        self.len += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    /// Moves the element out and pushes its slot onto the free list.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match core::mem::replace(&mut self.slots[handle.index()], vacant) {
            Slot::Occupied(element) => {
                self.free_head = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant { next_free } => {
                // Undo so the free list stays intact before reporting the bad handle.
                self.slots[handle.index()] = Slot::Vacant { next_free };
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    /// Drops every element. Capacity is kept for reuse.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}
