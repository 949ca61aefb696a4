use serde::{Deserialize, Serialize};

/// Inclusive lat/lon bounds used to subset a gridded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Bounds of the given coordinate axes. `None` if either axis is empty.
    pub fn from_coords(lat: &[f64], lon: &[f64]) -> Option<BoundingBox> {
        let (min_lat, max_lat) = extent(lat)?;
        let (min_lon, max_lon) = extent(lon)?;
        Some(BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Floor the minimums and ceil the maximums, per axis.
    ///
    /// The result always contains `self`, so an edge cell is never lost
    /// before nearest-neighbour resampling.
    pub fn padded(&self) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.floor(),
            max_lat: self.max_lat.ceil(),
            min_lon: self.min_lon.floor(),
            max_lon: self.max_lon.ceil(),
        }
    }
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_box(outer: &BoundingBox, inner: &BoundingBox) -> bool {
        outer.min_lat <= inner.min_lat
            && outer.max_lat >= inner.max_lat
            && outer.min_lon <= inner.min_lon
            && outer.max_lon >= inner.max_lon
    }

    #[test]
    fn padded_box_contains_true_extent() {
        let lats = [37.0208, 37.0625, 38.9792];
        let lons = [-108.9792, -107.5, -106.0208];
        let bbox = BoundingBox::from_coords(&lats, &lons).unwrap();
        let padded = bbox.padded();
        assert_eq!(padded.min_lat, 37.0);
        assert_eq!(padded.max_lat, 39.0);
        assert_eq!(padded.min_lon, -109.0);
        assert_eq!(padded.max_lon, -106.0);
        assert!(contains_box(&padded, &bbox));
    }

    #[test]
    fn padding_on_whole_degrees_is_a_no_op() {
        let bbox = BoundingBox::from_coords(&[37.0, 38.0], &[-109.0, -108.0]).unwrap();
        assert_eq!(bbox.padded(), bbox);
    }

    #[test]
    fn empty_axis_has_no_box() {
        assert!(BoundingBox::from_coords(&[], &[1.0]).is_none());
    }
}
