//! Navigation over the record sequence: bounds, gating, the transition
//! debounce, and the sliding timeline window.
//!
//! The historical pages disagreed on several behaviors (wraparound vs.
//! clamped stepping, status- vs. time-gated blocking, reflowed vs.
//! truncated windows, whether auto-advance survives manual navigation).
//! Each of those is an explicit policy on [`SessionConfig`] rather than a
//! silently chosen default.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::itinerary::ItineraryRecord;
use crate::schedule::{has_passed, ResolverPolicy};

/// Visible timeline slots: 2 before, the active one, 2 after.
pub const TIMELINE_WINDOW_SIZE: usize = 5;

/// What blocks a navigation request beyond plain bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    /// Records whose status marks them completed are not navigable-to.
    Status,
    /// Records that have temporally passed are not navigable-to.
    #[default]
    Temporal,
    /// Bounds checks only.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// When clamped at an edge, shift the window to consume the deficit
    /// from the available side.
    #[default]
    Reflow,
    /// Truncate at the boundary without shifting.
    Truncate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAdvancePolicy {
    /// Follow the clock on every tick.
    Enabled,
    /// Follow the clock until the user navigates manually.
    #[default]
    UntilManualNav,
    /// Never move on a tick.
    Disabled,
}

/// Per-session policy flags, fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub resolver: ResolverPolicy,
    pub gating: GatingPolicy,
    pub allow_wraparound: bool,
    pub window: WindowPolicy,
    pub auto_advance: AutoAdvancePolicy,
}

/// Reentrancy guard for the visual transition. A debounce, not a queue:
/// requests arriving while `Transitioning` are dropped, never replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    Next,
    Prev,
    Jump(usize),
}

/// Why a navigation request was dropped. Rejections are silent in the UI;
/// the variants exist for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRejection {
    Transitioning,
    OutOfBounds,
    AlreadyCurrent,
    GatedByStatus,
    GatedByTime,
}

/// Resolve a navigation request to a target index, or reject it.
///
/// Gating applies to the target record only; bounds behavior follows
/// `config.allow_wraparound`.
pub fn resolve_nav(
    records: &[ItineraryRecord],
    current: usize,
    request: NavRequest,
    phase: TransitionPhase,
    config: &SessionConfig,
    now: NaiveDateTime,
) -> Result<usize, NavRejection> {
    if phase == TransitionPhase::Transitioning {
        return Err(NavRejection::Transitioning);
    }
    let len = records.len();
    if len == 0 {
        return Err(NavRejection::OutOfBounds);
    }

    let target = match request {
        NavRequest::Next => {
            if current + 1 < len {
                current + 1
            } else if config.allow_wraparound {
                0
            } else {
                return Err(NavRejection::OutOfBounds);
            }
        }
        NavRequest::Prev => {
            if current > 0 {
                current - 1
            } else if config.allow_wraparound {
                len - 1
            } else {
                return Err(NavRejection::OutOfBounds);
            }
        }
        NavRequest::Jump(index) => {
            if index >= len {
                return Err(NavRejection::OutOfBounds);
            }
            if index == current {
                return Err(NavRejection::AlreadyCurrent);
            }
            index
        }
    };

    match config.gating {
        GatingPolicy::Status if records[target].is_completed() => {
            Err(NavRejection::GatedByStatus)
        }
        GatingPolicy::Temporal if has_passed(&records[target], now) => {
            Err(NavRejection::GatedByTime)
        }
        _ => Ok(target),
    }
}

/// Whether a clock tick may move the current index.
#[must_use]
pub fn auto_advance_allowed(policy: AutoAdvancePolicy, manual_nav: bool) -> bool {
    match policy {
        AutoAdvancePolicy::Enabled => true,
        AutoAdvancePolicy::UntilManualNav => !manual_nav,
        AutoAdvancePolicy::Disabled => false,
    }
}

/// The window of indices shown as timeline affordances around `current`,
/// clamped to `[0, len)`.
#[must_use]
pub fn timeline_window(len: usize, current: usize, policy: WindowPolicy) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let current = current.min(len - 1);
    let half = TIMELINE_WINDOW_SIZE / 2;

    let (start, end) = match policy {
        WindowPolicy::Reflow => {
            let mut start = current as isize - half as isize;
            let mut end = current as isize + half as isize;
            if start < 0 {
                end += -start;
                start = 0;
            }
            let last = len as isize - 1;
            if end > last {
                start -= end - last;
                end = last;
            }
            (start.max(0) as usize, end as usize)
        }
        WindowPolicy::Truncate => (
            current.saturating_sub(half),
            (current + half).min(len - 1),
        ),
    };

    (start..=end).collect()
}
