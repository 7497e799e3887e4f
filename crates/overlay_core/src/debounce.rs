//! Tick-counted debounce for reconciliation requests.

/// Either idle or counting down to a reconciliation pass.
///
/// Re-arming while armed restarts the countdown and replaces the `clean`
/// flag, so a burst of requests collapses into one pass `delay` ticks after
/// the last request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingReconciliation {
    #[default]
    Idle,
    Armed { remaining: u32, clean: bool },
}

impl PendingReconciliation {
    pub fn arm(&mut self, delay_ticks: u32, clean: bool) {
        *self = Self::Armed {
            remaining: delay_ticks.max(1),
            clean,
        };
    }

    /// Advances one tick. Returns the `clean` flag on the tick the deadline
    /// elapses, after which the state is `Idle` again.
    pub fn advance(&mut self) -> Option<bool> {
        match *self {
            Self::Idle => None,
            Self::Armed { remaining, clean } if remaining <= 1 => {
                *self = Self::Idle;
                Some(clean)
            }
            Self::Armed { remaining, clean } => {
                *self = Self::Armed {
                    remaining: remaining - 1,
                    clean,
                };
                None
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Armed { remaining, .. } => Some(*remaining),
        }
    }
}
