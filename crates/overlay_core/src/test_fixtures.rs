//! Shared test fixtures for `overlay_core` and downstream crates.
//!
//! `FakeWorld` owns a set of named entities whose liveness can be flipped
//! from tests. `FakeHandle` is the cache-side link to one of them.

use crate::{EntityKey, ReconcileConfig, ReconciledViewCache, SourceHandle};
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct FakeHandle {
    key: EntityKey,
    alive: Rc<Cell<bool>>,
}

impl SourceHandle for FakeHandle {
    fn key(&self) -> EntityKey {
        self.key.clone()
    }

    fn is_valid(&self) -> bool {
        self.alive.get()
    }
}

#[derive(Debug, Default)]
pub struct FakeWorld {
    entities: BTreeMap<String, Rc<Cell<bool>>>,
}

impl FakeWorld {
    /// World with one live entity per name.
    pub fn with(names: &[&str]) -> Self {
        let mut world = Self::default();
        for name in names {
            world.spawn(name);
        }
        world
    }

    pub fn spawn(&mut self, name: &str) -> FakeHandle {
        let alive = self
            .entities
            .entry(name.to_string())
            .or_insert_with(|| Rc::new(Cell::new(true)));
        alive.set(true);
        FakeHandle {
            key: EntityKey::from(name),
            alive: Rc::clone(alive),
        }
    }

    pub fn kill(&mut self, name: &str) {
        if let Some(alive) = self.entities.get(name) {
            alive.set(false);
        }
    }

    pub fn handle(&self, name: &str) -> FakeHandle {
        let alive = self
            .entities
            .get(name)
            .cloned()
            .unwrap_or_else(|| Rc::new(Cell::new(false)));
        FakeHandle {
            key: EntityKey::from(name),
            alive,
        }
    }

    /// Handles in the given order, as a host would enumerate them.
    pub fn handles(&self, names: &[&str]) -> Vec<FakeHandle> {
        names.iter().map(|name| self.handle(name)).collect()
    }

    /// Handles for every live entity, sorted by name.
    pub fn live(&self) -> Vec<FakeHandle> {
        self.entities
            .iter()
            .filter(|(_, alive)| alive.get())
            .map(|(name, _)| self.handle(name))
            .collect()
    }
}

/// Builds `"view:<key>"` for every handle.
pub fn label_view(handle: &FakeHandle) -> Option<String> {
    Some(format!("view:{}", handle.key))
}

/// Factory that refuses to build views for a fixed set of keys.
#[derive(Debug, Default)]
pub struct FlakyFactory {
    pub refuse: HashSet<String>,
    pub calls: usize,
}

impl FlakyFactory {
    pub fn refusing(keys: &[&str]) -> Self {
        Self {
            refuse: keys.iter().map(ToString::to_string).collect(),
            calls: 0,
        }
    }
}

impl crate::ViewFactory<FakeHandle, String> for FlakyFactory {
    fn build(&mut self, source: &FakeHandle) -> Option<String> {
        self.calls += 1;
        if self.refuse.contains(source.key.as_str()) {
            None
        } else {
            label_view(source)
        }
    }
}

pub fn cache_with_delay(delay_ticks: u32) -> ReconciledViewCache<FakeHandle, String> {
    ReconciledViewCache::new(ReconcileConfig::with_delay(delay_ticks))
}

pub fn keys(names: &[&str]) -> Vec<EntityKey> {
    names.iter().map(|name| EntityKey::from(*name)).collect()
}
