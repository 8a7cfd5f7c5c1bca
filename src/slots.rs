use std::collections::BTreeSet;

/// Index of one slot in a [`SlotPool`]. Stable for the pool's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotHandle(usize);

impl SlotHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One fixed display unit. Holds at most one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot<R> {
    pub index: usize,
    pub occupied: bool,
    pub record: Option<R>,
}

/// Fixed number of slots plus the set of indices that are free.
///
/// Every index in `0..capacity` is either free or occupied, never both.
/// `acquire` always hands out the lowest free index.
#[derive(Clone, Debug)]
pub struct SlotPool<R> {
    slots: Vec<Slot<R>>,
    free: BTreeSet<usize>,
}

impl<R> SlotPool<R> {
    /// Creates a pool with every slot free.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|index| Slot {
                    index,
                    occupied: false,
                    record: None,
                })
                .collect(),
            free: (0..capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.len() == self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Takes the lowest free slot. `None` means the pool is full.
    pub fn acquire(&mut self) -> Option<SlotHandle> {
        let index = self.free.pop_first()?;
        self.slots[index].occupied = true;
        Some(SlotHandle(index))
    }

    /// Attaches `record` to an occupied slot, returning the record it replaced.
    /// Returns `Err(record)` if the slot is free or out of range.
    pub fn bind(&mut self, handle: SlotHandle, record: R) -> Result<Option<R>, R> {
        match self.slots.get_mut(handle.0) {
            Some(slot) if slot.occupied => Ok(slot.record.replace(record)),
            _ => Err(record),
        }
    }

    /// Acquires the lowest free slot and binds `record` to it.
    /// Hands the record back if the pool is full.
    pub fn insert(&mut self, record: R) -> Result<SlotHandle, R> {
        let Some(handle) = self.acquire() else {
            return Err(record);
        };
        self.slots[handle.0].record = Some(record);
        Ok(handle)
    }

    /// Frees an occupied slot and returns its record.
    /// Out-of-range or already-free handles are ignored.
    pub fn release(&mut self, handle: SlotHandle) -> Option<R> {
        let slot = self.slots.get_mut(handle.0)?;
        if !slot.occupied {
            return None;
        }
        slot.occupied = false;
        self.free.insert(handle.0);
        slot.record.take()
    }

    /// Frees every slot.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.occupied = false;
            slot.record = None;
        }
        self.free = (0..self.slots.len()).collect();
    }

    pub fn is_occupied(&self, handle: SlotHandle) -> bool {
        self.slots.get(handle.0).is_some_and(|s| s.occupied)
    }

    /// Handle for `index` if it belongs to this pool.
    pub fn handle(&self, index: usize) -> Option<SlotHandle> {
        (index < self.slots.len()).then_some(SlotHandle(index))
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&R> {
        self.slots.get(handle.0)?.record.as_ref()
    }

    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut R> {
        self.slots.get_mut(handle.0)?.record.as_mut()
    }

    pub fn slots(&self) -> &[Slot<R>] {
        &self.slots
    }

    /// Bound records with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &R)> {
        self.slots
            .iter()
            .filter(|s| s.occupied)
            .filter_map(|s| s.record.as_ref().map(|r| (SlotHandle(s.index), r)))
    }

    /// Bound records in slot order. This is what gets persisted.
    pub fn records(&self) -> Vec<R>
    where
        R: Clone,
    {
        self.iter().map(|(_, r)| r.clone()).collect()
    }

    /// Indices currently free, lowest first.
    pub fn free_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.free.iter().copied()
    }
}
