//! Slot arena with stable indices
//!
//! Entities are never removed mid-iteration: they flag themselves dead and a
//! single `prune` pass per tick frees their slots for reuse.

#[derive(Debug, Clone)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    /// Freed slot indices, kept sorted descending so `pop` yields the lowest
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value, reusing the lowest free slot; returns its index
    pub fn insert(&mut self, value: T) -> usize {
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Remove every value for which `keep` returns false
    pub fn prune(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|v| !keep(v)) {
                *slot = None;
                self.free.push(idx);
                removed += 1;
            }
        }
        if removed > 0 {
            self.free.sort_unstable_by(|a, b| b.cmp(a));
            self.len -= removed;
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated (live + free)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_frees_slots_for_reuse() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        assert_eq!((a, b, c), (0, 1, 2));

        assert_eq!(arena.prune(|v| *v != 2 && *v != 1), 2);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(b).is_none());

        // Lowest freed slot comes back first
        assert_eq!(arena.insert(4), 0);
        assert_eq!(arena.insert(5), 1);
        assert_eq!(arena.insert(6), 3);
        assert_eq!(arena.capacity(), 4);
        assert_eq!(arena.iter().copied().collect::<Vec<_>>(), vec![4, 5, 3, 6]);
    }

    #[test]
    fn test_iter_mut_skips_empty_slots() {
        let mut arena = SlotArena::new();
        arena.insert(10);
        arena.insert(20);
        arena.prune(|v| *v != 10);
        for v in arena.iter_mut() {
            *v += 1;
        }
        assert_eq!(arena.iter().copied().collect::<Vec<_>>(), vec![21]);
        assert!(!arena.is_empty());
    }
}
