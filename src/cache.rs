//! Cache module: one shared instance per numeric kind.
//!
//! Operator families keep a `static` KindCache and fill it lazily from their
//! factory. A slot is published at most once and never replaced, so readers
//! only ever observe an empty slot or its final value.

use crate::types::NumericKind;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub struct KindCache<I> {
    slots: [OnceLock<Arc<I>>; NumericKind::COUNT],
}

impl<I> KindCache<I> {
    pub const fn new() -> Self {
        Self {
            slots: [const { OnceLock::new() }; NumericKind::COUNT],
        }
    }

    /// Returns the published instance for `kind`, if any.
    pub fn get(&self, kind: NumericKind) -> Option<Arc<I>> {
        self.slots[kind.index()].get().cloned()
    }

    /// Returns the instance for `kind`, building and publishing it on first use.
    pub fn get_or_init<F>(&self, kind: NumericKind, init: F) -> Arc<I>
    where
        F: FnOnce() -> I,
    {
        Arc::clone(self.slots[kind.index()].get_or_init(|| {
            log::debug!("publishing cached instance for {}", kind);
            Arc::new(init())
        }))
    }

    /// Number of kinds with a published instance.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I> Default for KindCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: fmt::Debug> fmt::Debug for KindCache<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in NumericKind::ALL {
            if let Some(value) = self.slots[kind.index()].get() {
                map.entry(&kind, value);
            }
        }
        map.finish()
    }
}
