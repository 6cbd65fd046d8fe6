//! Timezone lookups against the IANA database.
//!
//! Pure data source feeding the HTTP handlers: name resolution, per-zone
//! time snapshots, and the region-grouped catalog. DST and offset rules come
//! from chrono-tz; nothing here touches I/O.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Offset, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz, TZ_VARIANTS};
use serde::Serialize;
use thiserror::Error;

use crate::clock::cities::WORLD_CITIES;

/// Curated subset surfaced as `common_timezones` in the catalog.
const COMMON_TIMEZONES: [&str; 12] = [
    "UTC",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Sao_Paulo",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Kolkata",
    "Australia/Sydney",
];

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Current-time snapshot for a single timezone.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSnapshot {
    pub timezone: String,
    pub datetime: String,
    pub time: String,
    pub date: String,
    pub day: String,
    pub offset: String,
    pub offset_hours: i32,
    pub is_dst: bool,
}

/// One `/world-clocks` entry. Failed lookups degrade to an error entry
/// instead of failing the whole response.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WorldClockEntry {
    Time {
        city: String,
        #[serde(flatten)]
        snapshot: TimeSnapshot,
        time_12h: String,
        is_day: bool,
    },
    Failed {
        city: String,
        error: String,
    },
}

/// Region-grouped timezone catalog.
#[derive(Debug, Clone, Serialize)]
pub struct TimezoneCatalog {
    pub count: usize,
    pub regions: BTreeMap<String, Vec<String>>,
    pub common_timezones: Vec<String>,
}

/// Resolve a timezone name against the IANA database.
pub fn resolve(name: &str) -> Result<Tz, ClockError> {
    name.parse::<Tz>()
        .map_err(|_| ClockError::UnknownTimezone(name.to_string()))
}

/// Build a snapshot of the current time in `tz`.
pub fn now(tz: Tz) -> TimeSnapshot {
    snapshot_at(Utc::now(), tz)
}

/// Snapshot a specific instant in `tz`. Split out from [`now`] so tests can
/// pin the instant.
pub fn snapshot_at(instant: DateTime<Utc>, tz: Tz) -> TimeSnapshot {
    let local = instant.with_timezone(&tz);
    let offset = local.offset();
    // Truncate toward zero so "+0530" reports 5 and "-0430" reports -4.
    let offset_hours = offset.fix().local_minus_utc() / 3600;
    let is_dst = !offset.dst_offset().is_zero();

    TimeSnapshot {
        timezone: tz.name().to_string(),
        datetime: local.to_rfc3339(),
        time: local.format("%H:%M:%S").to_string(),
        date: local.format("%Y-%m-%d").to_string(),
        day: local.format("%A").to_string(),
        offset: local.format("%z").to_string(),
        offset_hours,
        is_dst,
    }
}

/// All canonical timezone names grouped by region prefix, plus the curated
/// common subset.
pub fn list_all() -> TimezoneCatalog {
    let mut regions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tz in TZ_VARIANTS.iter() {
        let name = tz.name();
        if let Some((region, _)) = name.split_once('/') {
            regions
                .entry(region.to_string())
                .or_default()
                .push(name.to_string());
        }
    }

    TimezoneCatalog {
        count: TZ_VARIANTS.len(),
        regions,
        common_timezones: COMMON_TIMEZONES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Per-city snapshots for the fixed city table.
pub fn world_clocks() -> Vec<WorldClockEntry> {
    let instant = Utc::now();
    WORLD_CITIES
        .iter()
        .map(|(city, tz_name)| match resolve(tz_name) {
            Ok(tz) => {
                let local = instant.with_timezone(&tz);
                let snapshot = snapshot_at(instant, tz);
                let hour = local.hour();
                WorldClockEntry::Time {
                    city: city.to_string(),
                    snapshot,
                    time_12h: local.format("%I:%M:%S %p").to_string(),
                    is_day: (6..18).contains(&hour),
                }
            }
            Err(e) => WorldClockEntry::Failed {
                city: city.to_string(),
                error: e.to_string(),
            },
        })
        .collect()
}

/// Minimal wall-clock string for the legacy endpoint.
pub fn legacy_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_known_zone() {
        assert!(resolve("Europe/London").is_ok());
        assert!(resolve("UTC").is_ok());
    }

    #[test]
    fn test_resolve_unknown_zone() {
        let err = resolve("Invalid/Zone").unwrap_err();
        assert_eq!(err.to_string(), "unknown timezone: Invalid/Zone");
    }

    #[test]
    fn test_offset_format() {
        let snapshot = now(resolve("Asia/Tokyo").unwrap());
        let bytes = snapshot.offset.as_bytes();
        assert_eq!(bytes.len(), 5);
        assert!(bytes[0] == b'+' || bytes[0] == b'-');
        assert!(bytes[1..].iter().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_dst_consistent_with_offset() {
        // July in London is BST (+0100, DST); January is GMT (+0000).
        let summer = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let tz = resolve("Europe/London").unwrap();

        let s = snapshot_at(summer, tz);
        assert_eq!(s.offset, "+0100");
        assert!(s.is_dst);

        let w = snapshot_at(winter, tz);
        assert_eq!(w.offset, "+0000");
        assert!(!w.is_dst);
    }

    #[test]
    fn test_half_hour_offset_truncates() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let s = snapshot_at(instant, resolve("Asia/Kolkata").unwrap());
        assert_eq!(s.offset, "+0530");
        assert_eq!(s.offset_hours, 5);
    }

    #[test]
    fn test_world_clocks_entry_count() {
        let entries = world_clocks();
        assert_eq!(entries.len(), 12);
        assert!(entries
            .iter()
            .all(|e| matches!(e, WorldClockEntry::Time { .. })));
    }

    #[test]
    fn test_catalog_grouping() {
        let catalog = list_all();
        assert!(catalog.count > 400);
        assert!(catalog.regions.contains_key("America"));
        assert!(catalog.regions.contains_key("Europe"));
        assert!(catalog
            .regions
            .get("Europe")
            .unwrap()
            .contains(&"Europe/London".to_string()));
        assert!(!catalog.common_timezones.is_empty());
    }
}
