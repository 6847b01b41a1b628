//! Fixed-capacity entity storage.
//!
//! Every pool owns `N` slots plus a compact list of the slot indices that are
//! currently alive.  Spawning appends to that list, despawning swap-removes
//! from it, so both are O(1) apart from the free-slot scan on spawn.  Nothing
//! here allocates after construction.
//!
//! Slots are addressed from outside through [`Handle`]s, which carry the
//! slot's generation.  A despawn bumps the generation, so a handle kept
//! across a despawn/respawn of the same slot no longer resolves.

/// Weak, generation-checked reference to a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u16,
    generation: u32,
}

impl Handle {
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    value: T,
    active: bool,
    generation: u32,
    /// Position of this slot in the active list; only meaningful while active.
    list_pos: u16,
}

#[derive(Clone, Debug)]
pub struct EntityPool<T, const N: usize> {
    slots: [Slot<T>; N],
    active: [u16; N],
    count: usize,
}

impl<T: Default, const N: usize> EntityPool<T, N> {
    pub fn new() -> Self {
        debug_assert!(N <= u16::MAX as usize, "pool capacity must fit a u16 index");
        Self {
            slots: core::array::from_fn(|_| Slot {
                value: T::default(),
                active: false,
                generation: 0,
                list_pos: 0,
            }),
            active: [0; N],
            count: 0,
        }
    }
}

impl<T: Default, const N: usize> Default for EntityPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> EntityPool<T, N> {
    pub const CAPACITY: usize = N;

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    fn handle_of(&self, index: usize) -> Handle {
        Handle {
            index: index as u16,
            generation: self.slots[index].generation,
        }
    }

    /// Place `value` in the first free slot.  Returns `None` when the pool is
    /// full; the spawn is simply dropped.
    pub fn spawn(&mut self, value: T) -> Option<Handle> {
        if self.count == N {
            log::trace!("pool of {} full, spawn dropped", N);
            return None;
        }
        let index = self.slots.iter().position(|s| !s.active)?;
        let slot = &mut self.slots[index];
        slot.value = value;
        slot.active = true;
        slot.list_pos = self.count as u16;
        self.active[self.count] = index as u16;
        self.count += 1;
        debug_assert!(self.check_invariants());
        Some(self.handle_of(index))
    }

    /// Swap-remove the entry at `pos` in the active list.  The last active
    /// entry moves into `pos`, so a caller walking the list must look at
    /// `pos` again instead of advancing.
    pub fn despawn_at(&mut self, pos: usize) -> Option<Handle> {
        if pos >= self.count {
            return None;
        }
        let index = self.active[pos] as usize;
        let handle = self.handle_of(index);

        let last = self.count - 1;
        let moved = self.active[last];
        self.active[pos] = moved;
        self.slots[moved as usize].list_pos = pos as u16;
        self.count = last;

        let slot = &mut self.slots[index];
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        debug_assert!(self.check_invariants());
        Some(handle)
    }

    /// Despawn by handle.  Stale handles are ignored.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        if !self.is_valid(handle) {
            return false;
        }
        let pos = self.slots[handle.index()].list_pos as usize;
        self.despawn_at(pos).is_some()
    }

    pub fn is_valid(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if self.is_valid(handle) {
            Some(&self.slots[handle.index()].value)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if self.is_valid(handle) {
            Some(&mut self.slots[handle.index()].value)
        } else {
            None
        }
    }

    /// Entity at position `pos` of the active list.
    pub fn get_at(&self, pos: usize) -> Option<&T> {
        if pos >= self.count {
            return None;
        }
        Some(&self.slots[self.active[pos] as usize].value)
    }

    pub fn handle_at(&self, pos: usize) -> Option<Handle> {
        if pos >= self.count {
            return None;
        }
        Some(self.handle_of(self.active[pos] as usize))
    }

    /// Entity stored in slot `index`, if that slot is alive.
    pub fn slot(&self, index: usize) -> Option<&T> {
        self.slots
            .get(index)
            .filter(|s| s.active)
            .map(|s| &s.value)
    }

    /// Active entries in active-list order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.active[..self.count].iter().map(move |&i| {
            let slot = &self.slots[i as usize];
            (
                Handle {
                    index: i,
                    generation: slot.generation,
                },
                &slot.value,
            )
        })
    }

    pub fn for_each_active<F: FnMut(Handle, &mut T)>(&mut self, mut f: F) {
        for pos in 0..self.count {
            let index = self.active[pos] as usize;
            let handle = self.handle_of(index);
            f(handle, &mut self.slots[index].value);
        }
    }

    /// Visit every active entry once; entries for which `keep` returns
    /// `false` are despawned on the spot.
    pub fn retain<F: FnMut(Handle, &mut T) -> bool>(&mut self, mut keep: F) {
        let mut pos = 0;
        while pos < self.count {
            let index = self.active[pos] as usize;
            let handle = self.handle_of(index);
            if keep(handle, &mut self.slots[index].value) {
                pos += 1;
            } else {
                // The swapped-in entry now sits at `pos`; look at it next.
                self.despawn_at(pos);
            }
        }
    }

    /// Deactivate everything.  Outstanding handles all go stale.
    pub fn clear(&mut self) {
        for &index in &self.active[..self.count] {
            let slot = &mut self.slots[index as usize];
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.count = 0;
    }

    /// Active list and slot flags agree: no duplicates, no stale entries,
    /// every active slot listed exactly once.
    pub fn check_invariants(&self) -> bool {
        if self.count > N {
            return false;
        }
        let listed_ok = self.active[..self.count].iter().enumerate().all(|(pos, &i)| {
            let slot = &self.slots[i as usize];
            slot.active && slot.list_pos as usize == pos
        });
        let flagged = self.slots.iter().filter(|s| s.active).count();
        listed_ok && flagged == self.count
    }
}
