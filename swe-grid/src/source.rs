//! Gridded SWE sources indexed `time x lat x lon`.

use chrono::NaiveDate;
use ndarray::{concatenate, s, Array3, ArrayView3, Axis};
use rayon::prelude::*;
use std::ops::Range;

use crate::error::{GridError, Result};
use crate::select::same_axis;

/// Values this large are fill values that escaped `_FillValue` handling.
const MAX_VALID_MAGNITUDE: f32 = 1e30;

/// Whether a data value is usable: finite and not a sentinel.
pub fn is_valid_f32(value: f32) -> bool {
    value.is_finite() && value.abs() < MAX_VALID_MAGNITUDE
}

/// A dataset that can hand out rectangular lat/lon windows over all time
/// steps. Coordinates are read eagerly; values only on
/// [`GriddedSource::read_window`].
pub trait GriddedSource: Send + Sync {
    fn lat(&self) -> &[f64];
    fn lon(&self) -> &[f64];
    fn times(&self) -> &[NaiveDate];

    /// Values for `lat` x `lon` at every time step, shaped
    /// `(times, lat, lon)`. Missing values come back as `NaN`.
    fn read_window(&self, lat: Range<usize>, lon: Range<usize>) -> Result<Array3<f32>>;
}

fn check_window(source: &dyn GriddedSource, lat: &Range<usize>, lon: &Range<usize>) -> Result<()> {
    if lat.end > source.lat().len() || lon.end > source.lon().len() {
        return Err(GridError::GridMismatch(format!(
            "window {lat:?} x {lon:?} exceeds grid of {} x {}",
            source.lat().len(),
            source.lon().len()
        )));
    }
    Ok(())
}

/// A gridded dataset held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    times: Vec<NaiveDate>,
    data: Array3<f32>,
    fill_value: Option<f32>,
}

impl InMemoryGrid {
    pub fn new(
        lat: Vec<f64>,
        lon: Vec<f64>,
        times: Vec<NaiveDate>,
        data: Array3<f32>,
    ) -> Result<InMemoryGrid> {
        let expected = (times.len(), lat.len(), lon.len());
        if data.dim() != expected {
            return Err(GridError::GridMismatch(format!(
                "data of shape {:?} does not match {} times x {} lats x {} lons",
                data.dim(),
                expected.0,
                expected.1,
                expected.2
            )));
        }
        Ok(InMemoryGrid {
            lat,
            lon,
            times,
            data,
            fill_value: None,
        })
    }

    /// Treat `fill` as a missing value.
    pub fn with_fill_value(mut self, fill: f32) -> InMemoryGrid {
        self.fill_value = Some(fill);
        self
    }
}

impl GriddedSource for InMemoryGrid {
    fn lat(&self) -> &[f64] {
        &self.lat
    }

    fn lon(&self) -> &[f64] {
        &self.lon
    }

    fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    fn read_window(&self, lat: Range<usize>, lon: Range<usize>) -> Result<Array3<f32>> {
        check_window(self, &lat, &lon)?;
        let fill = self.fill_value;
        Ok(self.data.slice(s![.., lat, lon]).mapv(|v| {
            if Some(v) == fill || !is_valid_f32(v) {
                f32::NAN
            } else {
                v
            }
        }))
    }
}

/// Several sources concatenated along time.
///
/// All members share the same lat/lon axes. Members are ordered by their
/// first time step, so files may be given in any order.
pub struct MultiFileDataset {
    sources: Vec<Box<dyn GriddedSource>>,
    times: Vec<NaiveDate>,
}

impl MultiFileDataset {
    pub fn new(mut sources: Vec<Box<dyn GriddedSource>>) -> Result<MultiFileDataset> {
        let first = sources.first().ok_or(GridError::NoSources)?;
        let (lat, lon) = (first.lat().to_vec(), first.lon().to_vec());
        for (i, source) in sources.iter().enumerate().skip(1) {
            if !same_axis(&lat, source.lat()) || !same_axis(&lon, source.lon()) {
                return Err(GridError::GridMismatch(format!(
                    "source {i} has different lat/lon coordinates than source 0"
                )));
            }
        }

        sources.sort_by_key(|source| source.times().first().copied());
        let times = sources
            .iter()
            .flat_map(|source| source.times().iter().copied())
            .collect::<Vec<_>>();
        log::debug!(
            "Combined {} sources into {} time steps",
            sources.len(),
            times.len()
        );
        Ok(MultiFileDataset { sources, times })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl GriddedSource for MultiFileDataset {
    fn lat(&self) -> &[f64] {
        self.sources.first().map_or(&[][..], |s| s.lat())
    }

    fn lon(&self) -> &[f64] {
        self.sources.first().map_or(&[][..], |s| s.lon())
    }

    fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    fn read_window(&self, lat: Range<usize>, lon: Range<usize>) -> Result<Array3<f32>> {
        check_window(self, &lat, &lon)?;
        let parts = self
            .sources
            .par_iter()
            .map(|source| source.read_window(lat.clone(), lon.clone()))
            .collect::<Result<Vec<_>>>()?;
        let views: Vec<ArrayView3<f32>> = parts.iter().map(|part| part.view()).collect();
        Ok(concatenate(Axis(0), &views)?)
    }
}
