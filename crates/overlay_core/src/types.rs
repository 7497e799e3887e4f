//! Type definitions for `overlay_core`.
//!
//! Keys, the source/view seams, cache entries, and reconciliation config.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(EntityKey);

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// A cheap link to an entity owned by someone else.
///
/// The cache stores handles, never the entities themselves. `is_valid` is
/// asked only during clean reconciliation passes.
pub trait SourceHandle {
    fn key(&self) -> EntityKey;
    fn is_valid(&self) -> bool;
}

/// Builds the local view for a source entity.
///
/// Returning `None` skips the entity for this pass; it is retried on the
/// next `observe`.
pub trait ViewFactory<H, V> {
    fn build(&mut self, source: &H) -> Option<V>;
}

impl<H, V, F> ViewFactory<H, V> for F
where
    F: FnMut(&H) -> Option<V>,
{
    fn build(&mut self, source: &H) -> Option<V> {
        self(source)
    }
}

// ---------------------------------------------------------------------------
// Entries and reports
// ---------------------------------------------------------------------------

/// A locally owned view plus the handle it was built from.
///
/// Anything the view owns is released when the entry is dropped.
#[derive(Debug)]
pub struct ViewEntry<H, V> {
    pub(crate) key: EntityKey,
    pub(crate) handle: H,
    pub(crate) view: V,
}

impl<H, V> ViewEntry<H, V> {
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

/// Outcome of one `observe` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveReport {
    pub added: Vec<EntityKey>,
    /// Entities whose factory returned `None` this pass.
    pub skipped: Vec<EntityKey>,
}

impl ObserveReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.skipped.is_empty()
    }
}

/// Outcome of a reconciliation pass. Evicted entries are handed back so the
/// owner can release whatever their views hold.
#[derive(Debug)]
pub struct ReconcileReport<H, V> {
    /// 1-based count of passes run by this cache.
    pub pass: u64,
    pub clean: bool,
    /// Sorted by key.
    pub evicted: Vec<ViewEntry<H, V>>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub const DEFAULT_DELAY_TICKS: u32 = 5;
pub const MAX_DELAY_TICKS: u32 = 600;
pub const DEFAULT_WINDOW_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Quiet period between the last request and the pass.
    #[serde(default = "default_delay_ticks")]
    pub delay_ticks: u32,
    /// Window size used when a caller asks for a zero-length window.
    #[serde(default = "default_window_len")]
    pub window_len: usize,
}

fn default_delay_ticks() -> u32 {
    DEFAULT_DELAY_TICKS
}

fn default_window_len() -> usize {
    DEFAULT_WINDOW_LEN
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            delay_ticks: DEFAULT_DELAY_TICKS,
            window_len: DEFAULT_WINDOW_LEN,
        }
    }
}

impl ReconcileConfig {
    pub fn with_delay(delay_ticks: u32) -> Self {
        Self {
            delay_ticks,
            ..Self::default()
        }
        .sanitized()
    }

    /// Clamps out-of-range values instead of rejecting them.
    ///
    /// A zero delay falls back to the default, overly long delays are capped,
    /// and a zero window uses the default window.
    pub fn sanitized(self) -> Self {
        let delay_ticks = match self.delay_ticks {
            0 => DEFAULT_DELAY_TICKS,
            d => d.min(MAX_DELAY_TICKS),
        };
        let window_len = match self.window_len {
            0 => DEFAULT_WINDOW_LEN,
            n => n,
        };
        Self {
            delay_ticks,
            window_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_falls_back_to_default() {
        assert_eq!(ReconcileConfig::with_delay(0).delay_ticks, DEFAULT_DELAY_TICKS);
    }

    #[test]
    fn long_delay_is_capped() {
        assert_eq!(ReconcileConfig::with_delay(10_000).delay_ticks, MAX_DELAY_TICKS);
    }

    #[test]
    fn zero_window_falls_back_to_default() {
        let config = ReconcileConfig {
            delay_ticks: 7,
            window_len: 0,
        }
        .sanitized();
        assert_eq!(config.delay_ticks, 7);
        assert_eq!(config.window_len, DEFAULT_WINDOW_LEN);
    }

    #[test]
    fn config_fields_default_when_missing() {
        let config: ReconcileConfig = serde_json::from_str(r#"{"delay_ticks": 9}"#).unwrap();
        assert_eq!(config.delay_ticks, 9);
        assert_eq!(config.window_len, DEFAULT_WINDOW_LEN);
    }

    #[test]
    fn closures_act_as_factories() {
        let mut built = 0;
        let mut factory = |n: &u32| {
            built += 1;
            (*n > 1).then_some(n * 10)
        };
        assert_eq!(factory.build(&1u32), None);
        assert_eq!(factory.build(&2u32), Some(20));
        assert_eq!(built, 2);
    }
}
