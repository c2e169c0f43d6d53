//! Review sampling threshold for third-party collections.
//!
//! Large third-party batches are not reviewed item by item: a sample must
//! pass manual review before the rest is bulk-approved. The sample size is
//! ratio-based with a floor and a cap.

use serde::{Deserialize, Serialize};

/// Review all items below this collection size.
pub const MIN_TP_ITEMS_TO_REVIEW: u64 = 50;
/// Never require more than this many reviewed items.
pub const MAX_TP_ITEMS_TO_REVIEW: u64 = 300;
/// Fraction of the collection sampled for review.
pub const TP_REVIEW_RATIO: f64 = 0.01;

/// Sampling policy for third-party review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Collections smaller than this are reviewed in full
    pub min_items: u64,
    /// Cap on the sample size
    pub max_items: u64,
    /// Sampled fraction of the collection
    pub sample_ratio: f64,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            min_items: MIN_TP_ITEMS_TO_REVIEW,
            max_items: MAX_TP_ITEMS_TO_REVIEW,
            sample_ratio: TP_REVIEW_RATIO,
        }
    }
}

impl ReviewPolicy {
    /// How many items of a collection must pass manual review.
    ///
    /// Monotonically non-decreasing in `total_items`, floor-guaranteed at
    /// `min_items` once the collection is large enough, capped at
    /// `max_items`.
    pub fn threshold_to_review(&self, total_items: u64) -> u64 {
        if total_items < self.min_items {
            return total_items;
        }
        let sampled = (total_items as f64 * self.sample_ratio).ceil() as u64;
        if (total_items as f64) * self.sample_ratio < self.max_items as f64 {
            sampled.max(self.min_items)
        } else {
            sampled.min(self.max_items)
        }
    }
}

/// Threshold under the default policy.
pub fn threshold_to_review(total_items: u64) -> u64 {
    ReviewPolicy::default().threshold_to_review(total_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_collections_are_reviewed_in_full() {
        assert_eq!(threshold_to_review(0), 0);
        assert_eq!(threshold_to_review(10), 10);
        assert_eq!(threshold_to_review(49), 49);
    }

    #[test]
    fn test_floor_applies_to_mid_size_collections() {
        // 1% of 1000 is 10, but the floor wins
        assert_eq!(threshold_to_review(1000), 50);
        assert_eq!(threshold_to_review(50), 50);
        assert_eq!(threshold_to_review(5000), 50);
    }

    #[test]
    fn test_ratio_applies_between_floor_and_cap() {
        assert_eq!(threshold_to_review(10_000), 100);
        assert_eq!(threshold_to_review(25_001), 251);
    }

    #[test]
    fn test_cap_applies_to_large_collections() {
        assert_eq!(threshold_to_review(50_000), 300);
        assert_eq!(threshold_to_review(1_000_000), 300);
    }

    #[test]
    fn test_threshold_is_monotonic() {
        let mut last = 0;
        for total in 0..60_000 {
            let threshold = threshold_to_review(total);
            assert!(threshold >= last, "threshold regressed at {total}");
            last = threshold;
        }
    }
}
