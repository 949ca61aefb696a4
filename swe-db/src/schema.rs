//! SQL schema for the zone mask store.

/// Returns the full SQL schema as a single batch string.
///
/// `zone_masks` holds one binary raster per zone: its dimensions, the affine
/// transform as a JSON array of six numbers, and one byte per cell in
/// row-major order (`1` inside the zone).
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS zone_masks (
        name TEXT PRIMARY KEY,
        width INTEGER NOT NULL,
        height INTEGER NOT NULL,
        transform TEXT NOT NULL,
        cells BLOB NOT NULL
    );
    "#
}
