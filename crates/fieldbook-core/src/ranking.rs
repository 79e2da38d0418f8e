//! Ordering of slot search results.

use std::cmp::Ordering;

/// Aggregate of a technician's historical reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub total: i64,
    pub count: i64,
}

impl RatingSummary {
    /// `total / count`, or 0 when there are no reviews.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.count <= 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Anything that can be ranked as a slot search result.
pub trait Ranked {
    fn distance_km(&self) -> f64;
    fn average_rating(&self) -> f64;
    /// Final tiebreak so the order is deterministic.
    fn tiebreak(&self) -> uuid::Uuid;
}

/// Nearest first; equal distances prefer the better rated technician.
pub fn compare<T: Ranked>(a: &T, b: &T) -> Ordering {
    a.distance_km()
        .total_cmp(&b.distance_km())
        .then_with(|| b.average_rating().total_cmp(&a.average_rating()))
        .then_with(|| a.tiebreak().cmp(&b.tiebreak()))
}

pub fn rank<T: Ranked>(candidates: &mut [T]) {
    candidates.sort_by(compare);
}
