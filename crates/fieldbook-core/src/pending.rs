//! The technician's "pending requests" view.
//!
//! ## Summary
//! Requests are grouped by (schedule, time). A group that already has a
//! booked member is hidden completely, even if some siblings were never
//! explicitly cancelled, so a stale pending row can never be offered for
//! promotion twice.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::RequestStatus;

/// The fields of a request the pending view needs.
pub trait RequestLike {
    fn schedule_id(&self) -> uuid::Uuid;
    fn time(&self) -> DateTime<Utc>;
    fn status(&self) -> RequestStatus;
}

/// Returns the still-actionable requests, preserving input order.
pub fn pending_view<T: RequestLike>(requests: Vec<T>) -> Vec<T> {
    let booked_groups: HashSet<(uuid::Uuid, DateTime<Utc>)> = requests
        .iter()
        .filter(|r| r.status() == RequestStatus::Booked)
        .map(|r| (r.schedule_id(), r.time()))
        .collect();

    requests
        .into_iter()
        .filter(|r| r.status() == RequestStatus::Pending)
        .filter(|r| !booked_groups.contains(&(r.schedule_id(), r.time())))
        .collect()
}
