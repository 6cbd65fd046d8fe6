//! Built-in city table for the world-clock view.

/// Major cities and their IANA timezone identifiers.
///
/// The `/world-clocks` response always contains exactly one entry per city
/// in this table, in this order.
pub const WORLD_CITIES: [(&str, &str); 12] = [
    ("New York", "America/New_York"),
    ("London", "Europe/London"),
    ("Tokyo", "Asia/Tokyo"),
    ("Sydney", "Australia/Sydney"),
    ("Dubai", "Asia/Dubai"),
    ("Singapore", "Asia/Singapore"),
    ("São Paulo", "America/Sao_Paulo"),
    ("Mumbai", "Asia/Kolkata"),
    ("Paris", "Europe/Paris"),
    ("Los Angeles", "America/Los_Angeles"),
    ("Hong Kong", "Asia/Hong_Kong"),
    ("Berlin", "Europe/Berlin"),
];
