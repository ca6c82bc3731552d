//! Day-schedule generation.
//!
//! For one calendar date the generator walks the operating window hour by
//! hour and produces the ordered slot list, marking each slot unavailable
//! when an administrator block or an existing booking covers it.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

use crate::catalog;
use crate::errors::ScheduleResult;
use crate::models::slot::{DaySchedule, OccupancyIndex, OperatingWindow, Slot};
use crate::ports::BlockRegistry;

pub struct SlotGenerator {
    window: OperatingWindow,
    /// The zone the slot grid is anchored in; display strings convert the
    /// grid instant from here into the requested zone.
    canonical_zone: Tz,
}

impl SlotGenerator {
    pub fn new(window: OperatingWindow, canonical_zone: Tz) -> Self {
        Self {
            window,
            canonical_zone,
        }
    }

    pub fn window(&self) -> &OperatingWindow {
        &self.window
    }

    /// Generate the slot list for `date` rendered in `zone`.
    ///
    /// Fails only on an unrecognized zone. A block-registry failure does not
    /// fail the call: the schedule is computed from occupancy alone and
    /// returned with `degraded = true` so the caller can warn instead of
    /// presenting false availability.
    pub async fn generate(
        &self,
        date: NaiveDate,
        zone: &str,
        occupancy: &OccupancyIndex,
        registry: &dyn BlockRegistry,
    ) -> ScheduleResult<DaySchedule> {
        let display_zone = catalog::resolve(zone)?;

        let (blocked, degraded) = match registry.blocked_slots(date).await {
            Ok(blocked) => (blocked, false),
            Err(err) => {
                warn!(%date, error = %err, "block registry unreachable, serving degraded schedule");
                (Default::default(), true)
            }
        };

        let mut slots = Vec::with_capacity(self.window.len());
        for hour in self.window.hours() {
            let system_time = NaiveTime::from_hms_opt(hour, 0, 0)
                .expect("window hours are validated to 0..=23");
            let is_available = !(blocked.contains(&system_time)
                || occupancy.is_occupied(date, system_time));

            slots.push(Slot {
                system_time,
                display_time: self.display_time(date, system_time, display_zone),
                is_available,
            });
        }

        Ok(DaySchedule {
            date,
            time_zone: zone.to_string(),
            slots,
            degraded,
        })
    }

    /// Render the grid instant `date@time` (anchored in the canonical zone)
    /// as a 12-hour clock string in the viewer's zone.
    fn display_time(&self, date: NaiveDate, time: NaiveTime, display_zone: Tz) -> String {
        let local = date.and_time(time);
        match self.canonical_zone.from_local_datetime(&local).earliest() {
            Some(instant) => instant
                .with_timezone(&display_zone)
                .format("%-I:%M %p")
                .to_string(),
            // A DST gap swallowed the hour; fall back to the naive reading.
            None => local.format("%-I:%M %p").to_string(),
        }
    }
}
