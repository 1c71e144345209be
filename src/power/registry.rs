// Held-lock registry.
// NOTE: fixed-size, no alloc. Slots are reused as locks come and go;
// listing order is slot order, not acquisition order. A lock that found
// the registry full stays unlisted for its whole life, even if slots free
// up later: the registry never sees it again until it is released.

use super::LockKind;
use super::label::LockLabel;

/// Locks beyond this are still honoured, just not listed.
pub const MAX_LISTED_LOCKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldLock {
    pub id: LockId,
    pub label: LockLabel,
    pub kind: LockKind,
}

#[derive(Clone, Copy)]
pub struct LockRegistry<const N: usize> {
    slots: [Option<HeldLock>; N],
    len: usize,
}

impl<const N: usize> LockRegistry<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            len: 0,
        }
    }

    // returns the entry back if every slot is taken
    pub fn insert(&mut self, lock: HeldLock) -> Result<(), HeldLock> {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(lock);
                self.len += 1;
                Ok(())
            }
            None => Err(lock),
        }
    }

    pub fn remove(&mut self, id: LockId) -> Option<HeldLock> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| matches!(s, Some(l) if l.id == id))?;
        self.len -= 1;
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeldLock> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for LockRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(id: u32, label: &str) -> HeldLock {
        HeldLock {
            id: LockId(id),
            label: LockLabel::new(label),
            kind: LockKind::NoLightSleep,
        }
    }

    #[test]
    fn insert_and_remove() {
        let mut reg = LockRegistry::<4>::new();
        reg.insert(held(1, "uart")).unwrap();
        reg.insert(held(2, "i2c")).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.iter().any(|l| l.id == LockId(2)));

        let gone = reg.remove(LockId(1)).unwrap();
        assert_eq!(gone.label.as_str(), "uart");
        assert_eq!(reg.len(), 1);
        assert!(reg.iter().all(|l| l.id != LockId(1)));
        assert!(reg.remove(LockId(1)).is_none());
    }

    #[test]
    fn full_registry_hands_the_entry_back() {
        let mut reg = LockRegistry::<2>::new();
        reg.insert(held(1, "a")).unwrap();
        reg.insert(held(2, "b")).unwrap();
        let rejected = reg.insert(held(3, "c")).unwrap_err();
        assert_eq!(rejected.id, LockId(3));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut reg = LockRegistry::<2>::new();
        reg.insert(held(1, "a")).unwrap();
        reg.insert(held(2, "b")).unwrap();
        reg.remove(LockId(1));
        reg.insert(held(3, "c")).unwrap();

        let labels: Vec<&str> = reg.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["c", "b"]);
    }
}
