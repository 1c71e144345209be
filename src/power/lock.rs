// Scoped interval lock.
//
// While an IntervalLock is alive the loop runs at the fast interval.
// Dropping it hands the lock back to the power manager, which decides
// whether the loop can slow down again. Release happens on every exit
// path (return, `?`, panic unwind) because it lives in Drop.

use super::LockKind;
use super::label::LockLabel;
use super::registry::LockId;

/// Receives lock releases. Implemented by power managers.
pub trait LockSink {
    fn release_lock(&self, lock: &IntervalLock<'_>);
}

#[must_use = "the lock is released as soon as it is dropped"]
pub struct IntervalLock<'a> {
    sink: &'a dyn LockSink,
    id: LockId,
    label: LockLabel,
    kind: LockKind,
}

impl<'a> IntervalLock<'a> {
    /// Wrap an already-acquired lock. The sink gets exactly one
    /// `release_lock` call for it.
    pub fn new(sink: &'a dyn LockSink, id: LockId, label: LockLabel, kind: LockKind) -> Self {
        Self {
            sink,
            id,
            label,
            kind,
        }
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn kind(&self) -> LockKind {
        self.kind
    }
}

impl Drop for IntervalLock<'_> {
    fn drop(&mut self) {
        self.sink.release_lock(self);
    }
}

impl core::fmt::Debug for IntervalLock<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntervalLock")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish()
    }
}
