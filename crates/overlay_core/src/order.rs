//! Display-slot ordering for a window of views.
//!
//! Portrait galleries do not always lay a window out left to right: two and
//! three visible portraits use their own slot order. `SlotOrder` captures
//! the rule so the cache can hand out views already in display order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrder {
    #[default]
    Linear,
    Reversed,
    /// `result[i] = window[perm[i]]`. Ignored unless it is a permutation of
    /// the window length.
    Permuted(Vec<usize>),
    /// Resolved per window length with [`SlotOrder::portrait_gallery`].
    Gallery,
}

impl SlotOrder {
    /// The gallery's special cases: two visible slots are reversed, three
    /// swap the last two, anything else is linear.
    pub fn portrait_gallery(visible: usize) -> Self {
        match visible {
            2 => Self::Reversed,
            3 => Self::Permuted(vec![0, 2, 1]),
            _ => Self::Linear,
        }
    }

    /// Reorders `items` into display order.
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        match self {
            Self::Linear => items,
            Self::Reversed => {
                items.reverse();
                items
            }
            Self::Permuted(perm) => {
                if !is_permutation(perm, items.len()) {
                    return items;
                }
                let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
                perm.iter().filter_map(|&i| slots[i].take()).collect()
            }
            Self::Gallery => Self::portrait_gallery(items.len()).apply(items),
        }
    }
}

fn is_permutation(perm: &[usize], len: usize) -> bool {
    if perm.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in perm {
        if i >= len || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
