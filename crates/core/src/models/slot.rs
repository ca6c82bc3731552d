use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::booking::BookingRecord;

/// One bookable hour on a given date.
///
/// `system_time` is the slot's fixed wall-clock key on the operating-window
/// grid; `display_time` is that hour rendered in the session's active
/// timezone. A slot is immutable once generated; changing the date or the
/// active timezone regenerates the whole schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub system_time: NaiveTime,
    pub display_time: String,
    pub is_available: bool,
}

/// The ordered slots for one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub time_zone: String,
    pub slots: Vec<Slot>,
    /// Set when the block registry could not be read. Availability was then
    /// computed from occupancy alone and the caller must warn rather than
    /// present the slots as authoritative.
    pub degraded: bool,
}

impl DaySchedule {
    pub fn slot_at(&self, time: NaiveTime) -> Option<&Slot> {
        self.slots.iter().find(|s| s.system_time == time)
    }
}

/// The fixed daily hour range eligible for scheduling, inclusive on both
/// ends, one slot per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl OperatingWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, String> {
        if start_hour > end_hour || end_hour > 23 {
            return Err(format!(
                "invalid operating window {start_hour}..={end_hour}"
            ));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// Number of slots in the window.
    pub fn len(&self) -> usize {
        (self.end_hour - self.start_hour + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> {
        self.start_hour..=self.end_hour
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        use chrono::Timelike;
        time.minute() == 0
            && time.second() == 0
            && time.hour() >= self.start_hour
            && time.hour() <= self.end_hour
    }
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 21,
        }
    }
}

/// Slots already booked per date for one employee.
///
/// Rebuilt from the ledger whenever a negotiation session starts, then used
/// as a read-only snapshot; the authoritative occupancy check happens again
/// at commit time inside the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupancyIndex {
    by_date: HashMap<NaiveDate, HashSet<NaiveTime>>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the primary slot of each booking. Alternate proposals hold no
    /// reservation until a later accept flow promotes them.
    pub fn from_bookings(bookings: &[BookingRecord]) -> Self {
        let mut index = Self::new();
        for booking in bookings {
            index.insert(booking.primary_date, booking.primary_time);
        }
        index
    }

    pub fn insert(&mut self, date: NaiveDate, time: NaiveTime) {
        self.by_date.entry(date).or_default().insert(time);
    }

    pub fn is_occupied(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.by_date
            .get(&date)
            .map(|times| times.contains(&time))
            .unwrap_or(false)
    }

    pub fn occupied_count(&self, date: NaiveDate) -> usize {
        self.by_date.get(&date).map(HashSet::len).unwrap_or(0)
    }

    /// A date with every window slot taken cannot accept new bookings.
    pub fn is_full(&self, date: NaiveDate, window: &OperatingWindow) -> bool {
        self.occupied_count(date) >= window.len()
    }
}
