use ahash::{AHashMap, AHashSet};

use crate::debounce::PendingReconciliation;
use crate::order::SlotOrder;
use crate::{
    EntityKey, ObserveReport, ReconcileConfig, ReconcileReport, SourceHandle, ViewEntry,
    ViewFactory,
};

/// Local views of externally owned entities, kept eventually consistent.
///
/// Views are built lazily by [`observe`](Self::observe) and pruned only by
/// clean reconciliation passes or [`clear`](Self::clear). Requests for a
/// pass are debounced: [`request_reconcile`](Self::request_reconcile) only
/// resets a counter, and [`tick`](Self::tick) runs the pass once the counter
/// runs out.
///
/// One owner drives the cache from a single loop; there is no interior
/// locking.
#[derive(Debug)]
pub struct ReconciledViewCache<H, V> {
    config: ReconcileConfig,
    entries: AHashMap<EntityKey, ViewEntry<H, V>>,
    /// Key order from the latest `observe`. Windows index into this.
    observed: Vec<EntityKey>,
    active: Vec<EntityKey>,
    /// `(start, count)` the active subset was last computed for.
    active_window: Option<(usize, usize)>,
    /// Set whenever `active` may no longer match the entries.
    stale: bool,
    generation: u64,
    pending: PendingReconciliation,
    passes: u64,
}

impl<H, V> Default for ReconciledViewCache<H, V> {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

impl<H, V> ReconciledViewCache<H, V> {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config: config.sanitized(),
            entries: AHashMap::new(),
            observed: Vec::new(),
            active: Vec::new(),
            active_window: None,
            stale: true,
            generation: 0,
            pending: PendingReconciliation::Idle,
            passes: 0,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Applies a new config. Takes effect on the next request; an armed
    /// countdown keeps its remaining ticks.
    pub fn set_config(&mut self, config: ReconcileConfig) {
        self.config = config.sanitized();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &EntityKey) -> Option<&ViewEntry<H, V>> {
        self.entries.get(key)
    }

    /// All cached keys, sorted.
    pub fn keys(&self) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn observed_order(&self) -> &[EntityKey] {
        &self.observed
    }

    pub fn pending(&self) -> PendingReconciliation {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_armed()
    }

    /// Number of reconciliation passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Increments on every recomputation of the active subset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn active_keys(&self) -> &[EntityKey] {
        &self.active
    }

    /// The active subset in display order.
    ///
    /// Entries evicted since the last selection are skipped.
    pub fn active_views(&self) -> impl Iterator<Item = &ViewEntry<H, V>> + '_ {
        self.active.iter().filter_map(|key| self.entries.get(key))
    }

    /// Arms (or re-arms) the debounce countdown.
    ///
    /// The latest `clean` flag wins over earlier ones in the same burst.
    pub fn request_reconcile(&mut self, clean: bool) {
        self.pending.arm(self.config.delay_ticks, clean);
    }

    /// Empties the cache. Used when the whole source collection is replaced.
    ///
    /// Returns the dropped entries, sorted by key. An armed countdown stays
    /// armed.
    pub fn clear(&mut self) -> Vec<ViewEntry<H, V>> {
        let mut evicted: Vec<ViewEntry<H, V>> = self.entries.drain().map(|(_, e)| e).collect();
        evicted.sort_by(|a, b| a.key.cmp(&b.key));
        self.observed.clear();
        self.active.clear();
        self.active_window = None;
        self.stale = true;
        evicted
    }

    /// Recomputes the active subset from the observed order.
    ///
    /// Takes `count` observed keys starting at `start`, keeps those with a
    /// cached entry, and applies `order`. A zero `count` uses the configured
    /// window length. Work is skipped unless `start` or `count` changed or
    /// the subset is stale; a different `order` alone does not trigger a
    /// recompute. Returns whether the subset was rebuilt.
    pub fn select_active_subset(&mut self, start: usize, count: usize, order: &SlotOrder) -> bool {
        let count = if count == 0 {
            self.config.window_len
        } else {
            count
        };
        if !self.stale && self.active_window == Some((start, count)) {
            return false;
        }
        let window: Vec<EntityKey> = self
            .observed
            .iter()
            .skip(start)
            .take(count)
            .filter(|key| self.entries.contains_key(*key))
            .cloned()
            .collect();
        self.active = order.apply(window);
        self.active_window = Some((start, count));
        self.stale = false;
        self.generation += 1;
        true
    }
}

impl<H: SourceHandle, V> ReconciledViewCache<H, V> {
    /// Adds a view for every handle in `collection` whose key is not cached.
    ///
    /// Never removes entries. A handle whose factory returns `None` is left
    /// out and tried again on the next call. Duplicate keys in one collection
    /// are only considered once.
    pub fn observe<I, F>(&mut self, collection: I, factory: &mut F) -> ObserveReport
    where
        I: IntoIterator<Item = H>,
        F: ViewFactory<H, V> + ?Sized,
    {
        let mut report = ObserveReport::default();
        let mut seen = AHashSet::new();
        let mut order = Vec::new();

        for handle in collection {
            let key = handle.key();
            if !seen.insert(key.clone()) {
                continue;
            }
            order.push(key.clone());
            if self.entries.contains_key(&key) {
                continue;
            }
            match factory.build(&handle) {
                Some(view) => {
                    self.entries.insert(
                        key.clone(),
                        ViewEntry {
                            key: key.clone(),
                            handle,
                            view,
                        },
                    );
                    report.added.push(key);
                }
                None => report.skipped.push(key),
            }
        }

        if !report.added.is_empty() || order != self.observed {
            self.stale = true;
        }
        self.observed = order;
        report
    }

    /// Advances the debounce countdown by one tick.
    ///
    /// On the tick the countdown runs out, runs a reconciliation pass and
    /// returns its report; otherwise returns `None`.
    pub fn tick(&mut self) -> Option<ReconcileReport<H, V>> {
        let clean = self.pending.advance()?;
        Some(self.run_pass(clean))
    }

    /// Runs a pass immediately and cancels any armed countdown.
    pub fn reconcile_now(&mut self, clean: bool) -> ReconcileReport<H, V> {
        self.pending = PendingReconciliation::Idle;
        self.run_pass(clean)
    }

    fn run_pass(&mut self, clean: bool) -> ReconcileReport<H, V> {
        let mut evicted = Vec::new();
        if clean {
            let mut dead: Vec<EntityKey> = self
                .entries
                .iter()
                .filter(|(_, entry)| !entry.handle.is_valid())
                .map(|(key, _)| key.clone())
                .collect();
            dead.sort();
            for key in dead {
                if let Some(entry) = self.entries.remove(&key) {
                    evicted.push(entry);
                }
            }
        }
        self.passes += 1;
        self.stale = true;
        ReconcileReport {
            pass: self.passes,
            clean,
            evicted,
        }
    }
}
