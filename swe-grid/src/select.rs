//! Coordinate selection: bounding-box windows and nearest-neighbour lookup.

use std::ops::Range;

/// Coordinates closer than this (in degrees) count as the same position.
pub const COORD_TOLERANCE: f64 = 1e-6;

/// Index range of the monotonic `coords` that lie within `[min, max]`.
///
/// Works for ascending and descending axes. `None` when nothing falls
/// inside the bounds.
pub fn coordinate_window(coords: &[f64], min: f64, max: f64) -> Option<Range<usize>> {
    let inside = |c: &f64| *c >= min && *c <= max;
    let start = coords.iter().position(inside)?;
    let end = coords.iter().rposition(inside)?;
    Some(start..end + 1)
}

/// For every target, the index of the nearest source coordinate.
///
/// Targets outside the source's coordinate range get `None`. When a target
/// is exactly halfway between two sources, the lower coordinate wins.
pub fn nearest_indices(source: &[f64], targets: &[f64]) -> Vec<Option<usize>> {
    let (lo, hi) = match (
        source.iter().copied().reduce(f64::min),
        source.iter().copied().reduce(f64::max),
    ) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => return vec![None; targets.len()],
    };

    targets
        .iter()
        .map(|&target| {
            if target < lo - COORD_TOLERANCE || target > hi + COORD_TOLERANCE {
                return None;
            }
            let mut best: Option<(usize, f64)> = None;
            for (i, &coord) in source.iter().enumerate() {
                let distance = (coord - target).abs();
                best = match best {
                    Some((j, d)) if distance > d => Some((j, d)),
                    Some((j, d)) if distance == d && source[j] <= coord => Some((j, d)),
                    _ => Some((i, distance)),
                };
            }
            best.map(|(i, _)| i)
        })
        .collect()
}

/// Whether two coordinate axes describe the same positions.
pub fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= COORD_TOLERANCE)
}
