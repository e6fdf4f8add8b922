//! The level curve: a pure mapping from accumulated XP to a level.
//!
//! # Level-Up Formula
//!
//! XP required to advance from level N to level N+1 is `N * step`. With the
//! default step of 100, level 1 to 2 costs 100 XP, level 2 to 3 costs
//! 200 XP, and so on. The minimum XP to *reach* level L is therefore
//!
//! ```text
//! threshold(L) = step * L * (L - 1) / 2
//! ```
//!
//! so `threshold(1) == 0` and every level span is non-empty. Levels are capped
//! at the highest level whose threshold fits in a `u64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::LevelError;

/// Default XP cost multiplier per level.
pub const DEFAULT_LEVEL_STEP: u64 = 100;

/// A quadratic level curve parameterized by its per-level step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCurve {
    /// XP cost multiplier: advancing from N to N+1 costs `N * step`.
    step: u64,
    /// Highest level whose threshold is representable.
    max_level: u32,
}

/// Where an XP total sits within its level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// The derived level.
    pub level: u32,
    /// Minimum XP of the current level.
    pub floor_xp: u64,
    /// Minimum XP of the next level (saturates at the level cap).
    pub next_xp: u64,
    /// XP earned since reaching the current level.
    pub into_level: u64,
    /// Fraction of the current level completed, in `[0, 1)`.
    pub fraction: Decimal,
}

impl LevelProgress {
    /// Progress as a percentage rounded to one decimal place.
    pub fn percent(&self) -> Decimal {
        self.fraction
            .checked_mul(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO)
            .round_dp(1)
    }

    /// XP still needed to reach the next level.
    pub const fn remaining(&self) -> u64 {
        self.next_xp.saturating_sub(self.floor_xp.saturating_add(self.into_level))
    }
}

impl LevelCurve {
    /// Create a curve with the given step.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::ZeroStep`] if `step` is zero.
    pub fn new(step: u64) -> Result<Self, LevelError> {
        if step == 0 {
            return Err(LevelError::ZeroStep);
        }
        Ok(Self {
            step,
            max_level: compute_max_level(step),
        })
    }

    /// The configured step.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// The highest reachable level.
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Minimum XP required to reach `level`.
    ///
    /// Levels below 1 are treated as level 1. Levels past the cap saturate
    /// to `u64::MAX`.
    pub fn threshold_for(&self, level: u32) -> u64 {
        exact_threshold(self.step, level.max(1)).unwrap_or(u64::MAX)
    }

    /// The level reached with `xp` accumulated. Always at least 1.
    ///
    /// Finds the largest level whose threshold does not exceed `xp` by
    /// binary search over `[1, max_level]`.
    pub fn level_of(&self, xp: u64) -> u32 {
        let mut lo: u32 = 1;
        let mut hi: u32 = self.max_level;

        while lo < hi {
            // Upper midpoint so `lo = mid` always makes progress.
            let mid = lo.saturating_add(hi.saturating_sub(lo).div_ceil(2));
            if self.threshold_for(mid) <= xp {
                lo = mid;
            } else {
                hi = mid.saturating_sub(1);
            }
        }

        lo
    }

    /// Progress through the current level for display.
    pub fn progress(&self, xp: u64) -> LevelProgress {
        let level = self.level_of(xp);
        let floor_xp = self.threshold_for(level);
        let next_xp = self.threshold_for(level.saturating_add(1));
        let into_level = xp.saturating_sub(floor_xp);
        let span = next_xp.saturating_sub(floor_xp);

        let fraction = if span == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(into_level)
                .checked_div(Decimal::from(span))
                .unwrap_or(Decimal::ZERO)
        };

        LevelProgress {
            level,
            floor_xp,
            next_xp,
            into_level,
            fraction,
        }
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            step: DEFAULT_LEVEL_STEP,
            max_level: compute_max_level(DEFAULT_LEVEL_STEP),
        }
    }
}

/// `step * L * (L - 1) / 2`, or `None` if it does not fit in a `u64`.
fn exact_threshold(step: u64, level: u32) -> Option<u64> {
    let l = u128::from(level);
    let pairs = l.checked_mul(l.checked_sub(1)?)?.checked_div(2)?;
    let total = pairs.checked_mul(u128::from(step))?;
    u64::try_from(total).ok()
}

/// Largest level whose threshold fits in a `u64`.
fn compute_max_level(step: u64) -> u32 {
    let mut lo: u32 = 1;
    let mut hi: u32 = u32::MAX;

    while lo < hi {
        let mid = lo.saturating_add(hi.saturating_sub(lo).div_ceil(2));
        if exact_threshold(step, mid).is_some() {
            lo = mid;
        } else {
            hi = mid.saturating_sub(1);
        }
    }

    lo
}
