//! Defaults shared by the configuration layer and the Overpass adapter

/// Public Overpass interpreter endpoint
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Overpass area id (relation id + 3600000000) the motorway search is limited to
pub const DEFAULT_AREA_ID: u64 = 3_600_186_382;

/// Server-side timeout embedded in the Overpass query
pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u64 = 25;

/// Two posts sharing a distance further apart than this are different milestones
pub const DEFAULT_MERGE_DISTANCE_M: f64 = 100.0;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Environment variable overriding the configured Overpass endpoint
pub const OVERPASS_URL_ENV: &str = "MILESTONES_OVERPASS_URL";

/// Separator used when two source ids are joined by a merge
pub const SOURCE_ID_SEPARATOR: &str = ";";
