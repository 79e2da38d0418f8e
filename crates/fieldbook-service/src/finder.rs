//! Slot finder: nearby technicians with a free slot at an exact time.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fieldbook_core::geo::GeoPoint;
use fieldbook_core::ranking::{self, RatingSummary, Ranked};
use fieldbook_core::types::Address;
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::query::{review, schedule};

use crate::error::ServiceResult;
use crate::rules::BookingRules;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FindSlots {
    pub service_id: uuid::Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    pub time: DateTime<Utc>,
}

/// One technician with the requested slot free.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCandidate {
    pub technician_id: uuid::Uuid,
    pub display_name: String,
    pub schedule_id: uuid::Uuid,
    pub date: NaiveDate,
    pub time: DateTime<Utc>,
    pub address: Address,
    pub location: GeoPoint,
    pub distance_km: f64,
    pub average_rating: f64,
    pub review_count: i64,
}

impl Ranked for SlotCandidate {
    fn distance_km(&self) -> f64 {
        self.distance_km
    }

    fn average_rating(&self) -> f64 {
        self.average_rating
    }

    fn tiebreak(&self) -> uuid::Uuid {
        self.technician_id
    }
}

/// ## Summary
/// Finds technicians offering `service_id` whose schedule for `date` lies
/// within the configured radius and has the slot at `time` available.
///
/// Ordered by distance, then average rating descending. An empty result is
/// not an error.
///
/// ## Errors
/// Returns `ValidationError` for an invalid origin.
#[tracing::instrument(skip(conn, rules))]
pub async fn find(
    conn: &mut DbConnection<'_>,
    rules: &BookingRules,
    query: FindSlots,
) -> ServiceResult<Vec<SlotCandidate>> {
    let origin = GeoPoint::new(query.longitude, query.latitude)?;
    if !rules.catalog.contains(query.date, query.time) {
        tracing::debug!("Requested time is not a catalog slot");
        return Ok(Vec::new());
    }
    let filter = schedule::CandidateFilter {
        service_id: query.service_id,
        date: query.date,
        time: query.time,
        bounds: origin.bounding_box(rules.search_radius_km),
    };

    let rows = schedule::candidates(conn, &filter).await?;

    let mut nearby = Vec::with_capacity(rows.len());
    for (schedule, slot, technician) in rows {
        let location = GeoPoint {
            longitude: schedule.longitude,
            latitude: schedule.latitude,
        };
        let distance_km = origin.distance_km(&location);
        if distance_km > rules.search_radius_km {
            continue;
        }
        nearby.push((schedule, slot, technician, location, distance_km));
    }

    let technician_ids: Vec<uuid::Uuid> = nearby.iter().map(|(_, _, t, _, _)| t.id).collect();
    let ratings: HashMap<uuid::Uuid, RatingSummary> =
        review::rating_summaries(conn, &technician_ids)
            .await?
            .into_iter()
            .collect();

    let mut candidates = nearby
        .into_iter()
        .map(|(schedule, slot, technician, location, distance_km)| {
            let rating = ratings.get(&technician.id).copied().unwrap_or_default();
            Ok(SlotCandidate {
                technician_id: technician.id,
                display_name: technician.display_name,
                schedule_id: schedule.id,
                date: schedule.date,
                time: slot.time,
                address: serde_json::from_value(schedule.address)?,
                location,
                distance_km,
                average_rating: rating.average(),
                review_count: rating.count,
            })
        })
        .collect::<ServiceResult<Vec<_>>>()?;

    ranking::rank(&mut candidates);
    tracing::debug!(result_count = candidates.len(), "Slot search finished");
    Ok(candidates)
}
