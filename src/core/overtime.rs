//! Weekly overtime policy: 37 h regular, the next 15 h tier 1, the rest tier 2.

use serde::Serialize;

/// 37 h/week.
pub const REGULAR_CAP_MINUTES: i64 = 37 * 60;
/// 52 h/week.
pub const TIER1_CAP_MINUTES: i64 = 52 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OvertimeSplit {
    pub regular_minutes: i64,
    pub tier1_minutes: i64,
    pub tier2_minutes: i64,
}

impl OvertimeSplit {
    pub fn total(&self) -> i64 {
        self.regular_minutes + self.tier1_minutes + self.tier2_minutes
    }
}

/// Partitions a non-negative weekly total into regular / tier 1 / tier 2.
/// Negative totals are treated as zero.
pub fn split_overtime(total_minutes: i64) -> OvertimeSplit {
    let total = total_minutes.max(0);

    OvertimeSplit {
        regular_minutes: total.min(REGULAR_CAP_MINUTES),
        tier1_minutes: (total - REGULAR_CAP_MINUTES)
            .clamp(0, TIER1_CAP_MINUTES - REGULAR_CAP_MINUTES),
        tier2_minutes: (total - TIER1_CAP_MINUTES).max(0),
    }
}
