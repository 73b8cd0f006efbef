// CLASSIFICATION: COMMUNITY
// Filename: mailbox.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Single-slot handoff of entry contexts to sub cores.
//!
//! One lock guards every slot and is held only for the slot access. Posting
//! overwrites whatever is pending; the owning core takes it at most once.

use std::sync::Mutex;

use crate::cpu::{Context, CoreId, CORE_COUNT};
use crate::sync::with_lock;

pub struct EntryMailbox {
    slots: Mutex<[Option<Context>; CORE_COUNT]>,
}

impl EntryMailbox {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new([None; CORE_COUNT]),
        }
    }

    /// Store `context` for `core_id`, returning the unconsumed context it
    /// replaced. Out-of-range ids are ignored.
    pub fn post(&self, core_id: CoreId, context: Context) -> Option<Context> {
        with_lock(&self.slots, |slots| {
            slots
                .get_mut(core_id)
                .and_then(|slot| slot.replace(context))
        })
    }

    pub fn take(&self, core_id: CoreId) -> Option<Context> {
        with_lock(&self.slots, |slots| slots.get_mut(core_id).and_then(Option::take))
    }

    pub fn is_pending(&self, core_id: CoreId) -> bool {
        with_lock(&self.slots, |slots| {
            slots.get(core_id).is_some_and(Option::is_some)
        })
    }
}

impl Default for EntryMailbox {
    fn default() -> Self {
        Self::new()
    }
}
