//! Fixed catalog of bookable times generated for every published day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

/// Describes the discrete slot times of a day, e.g. 09:00, 10:00, ... 17:00,
/// in the marketplace's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCatalog {
    tz: Tz,
    first_hour: u32,
    last_hour: u32,
    interval_minutes: u32,
}

impl Default for SlotCatalog {
    /// Hourly slots from 09:00 to 17:00 UTC.
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            first_hour: 9,
            last_hour: 17,
            interval_minutes: 60,
        }
    }
}

impl SlotCatalog {
    /// ## Errors
    /// Returns a configuration error if the hours are out of order or out of
    /// range, or if the interval is zero.
    pub fn new(tz: Tz, first_hour: u32, last_hour: u32, interval_minutes: u32) -> CoreResult<Self> {
        if last_hour > 23 || first_hour > last_hour {
            return Err(CoreError::ConfigError(format!(
                "slot hours must satisfy first <= last <= 23, got {first_hour}..={last_hour}"
            )));
        }
        if interval_minutes == 0 || interval_minutes > 24 * 60 {
            return Err(CoreError::ConfigError(format!(
                "slot interval must be between 1 and 1440 minutes, got {interval_minutes}"
            )));
        }
        Ok(Self {
            tz,
            first_hour,
            last_hour,
            interval_minutes,
        })
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local wall-clock times of the catalog, independent of date.
    #[must_use]
    pub fn local_times(&self) -> Vec<NaiveTime> {
        let mut times = Vec::new();
        let step = Duration::minutes(i64::from(self.interval_minutes));
        let Some(mut current) = NaiveTime::from_hms_opt(self.first_hour, 0, 0) else {
            return times;
        };
        let Some(last) = NaiveTime::from_hms_opt(self.last_hour, 0, 0) else {
            return times;
        };

        while current <= last {
            times.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        times
    }

    /// ## Summary
    /// Returns the UTC instants of every slot on `date`.
    ///
    /// Local times that do not exist on that date (DST gaps) are skipped;
    /// ambiguous times resolve to the earlier instant.
    #[must_use]
    pub fn times_for(&self, date: NaiveDate) -> Vec<DateTime<Utc>> {
        self.local_times()
            .into_iter()
            .filter_map(|time| {
                self.tz
                    .from_local_datetime(&date.and_time(time))
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
            })
            .collect()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate, time: DateTime<Utc>) -> bool {
        self.times_for(date).contains(&time)
    }

    /// Calendar date of `instant` in the catalog timezone.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}
