//! Static timezone catalog.
//!
//! Maps a coarse region to the zone identifiers (with display labels) the UI
//! offers for it. The catalog only scopes what gets *listed*: any IANA
//! identifier chrono-tz knows is accepted by [`resolve`], cataloged or not.

use chrono_tz::Tz;
use serde::Serialize;

use crate::errors::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneEntry {
    pub id: &'static str,
    pub label: &'static str,
}

pub struct Region {
    pub name: &'static str,
    pub zones: &'static [ZoneEntry],
}

const INDIA: &[ZoneEntry] = &[ZoneEntry {
    id: "Asia/Kolkata",
    label: "India Standard Time (IST)",
}];

const NORTH_AMERICA: &[ZoneEntry] = &[
    ZoneEntry {
        id: "America/New_York",
        label: "Eastern Time (ET)",
    },
    ZoneEntry {
        id: "America/Chicago",
        label: "Central Time (CT)",
    },
    ZoneEntry {
        id: "America/Denver",
        label: "Mountain Time (MT)",
    },
    ZoneEntry {
        id: "America/Los_Angeles",
        label: "Pacific Time (PT)",
    },
];

const EUROPE: &[ZoneEntry] = &[
    ZoneEntry {
        id: "Europe/London",
        label: "United Kingdom (GMT/BST)",
    },
    ZoneEntry {
        id: "Europe/Paris",
        label: "Central European Time (CET)",
    },
    ZoneEntry {
        id: "Europe/Berlin",
        label: "Germany (CET)",
    },
];

const ASIA_PACIFIC: &[ZoneEntry] = &[
    ZoneEntry {
        id: "Asia/Singapore",
        label: "Singapore (SGT)",
    },
    ZoneEntry {
        id: "Asia/Tokyo",
        label: "Japan (JST)",
    },
    ZoneEntry {
        id: "Australia/Sydney",
        label: "Australia East (AEST)",
    },
];

const MIDDLE_EAST: &[ZoneEntry] = &[
    ZoneEntry {
        id: "Asia/Dubai",
        label: "Gulf Standard Time (GST)",
    },
    ZoneEntry {
        id: "Asia/Riyadh",
        label: "Arabia Standard Time (AST)",
    },
];

const REGIONS: &[Region] = &[
    Region {
        name: "India",
        zones: INDIA,
    },
    Region {
        name: "North America",
        zones: NORTH_AMERICA,
    },
    Region {
        name: "Europe",
        zones: EUROPE,
    },
    Region {
        name: "Asia Pacific",
        zones: ASIA_PACIFIC,
    },
    Region {
        name: "Middle East",
        zones: MIDDLE_EAST,
    },
];

/// All catalog regions, in display order.
pub fn regions() -> impl Iterator<Item = &'static Region> {
    REGIONS.iter()
}

/// The zones listed for a region, if the region exists.
pub fn zones_in(region: &str) -> Option<&'static [ZoneEntry]> {
    REGIONS
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(region))
        .map(|r| r.zones)
}

/// Resolve a zone identifier to a concrete timezone.
pub fn resolve(zone: &str) -> ScheduleResult<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimeZone(zone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cataloged_zone_resolves() {
        for region in regions() {
            for zone in region.zones {
                assert!(resolve(zone.id).is_ok(), "{} failed to parse", zone.id);
            }
        }
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = resolve("Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimeZone(_)));
    }

    #[test]
    fn region_lookup_is_case_insensitive() {
        assert!(zones_in("north america").is_some());
        assert!(zones_in("Atlantis").is_none());
    }
}
