//! Carry-over of emergencies that could not be fully served.
//!
//! The backlog lives inside [`EngineState`], which the caller owns and passes to
//! every cycle. Each cycle takes the whole backlog as input and rebuilds it from
//! scratch with whatever it failed to serve.

use std::collections::HashSet;

use crate::model::{Emergency, EmergencyId};

/// Ordered set of emergencies, unique by identity.
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    entries: Vec<Emergency>,
    ids: HashSet<EmergencyId>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `emergency` unless one with the same identity is already queued.
    /// Returns whether it was added.
    pub fn push(&mut self, emergency: Emergency) -> bool {
        if !self.ids.insert(emergency.id) {
            return false;
        }
        self.entries.push(emergency);
        true
    }

    /// Empties the backlog and hands back its contents in queue order.
    pub fn take(&mut self) -> Vec<Emergency> {
        self.ids.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    pub fn contains(&self, id: EmergencyId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emergency> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<EmergencyId> {
        self.entries.iter().map(|emergency| emergency.id).collect()
    }
}

impl Extend<Emergency> for Backlog {
    fn extend<T: IntoIterator<Item = Emergency>>(&mut self, iter: T) {
        for emergency in iter {
            self.push(emergency);
        }
    }
}

/// Process-lifetime engine state threaded through every cycle.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub backlog: Backlog,
    /// Cycles that ran to completion.
    pub cycles_completed: u64,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }
}
