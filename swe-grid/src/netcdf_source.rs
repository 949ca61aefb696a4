//! SWANN NetCDF files as gridded sources.

use serde::{Deserialize, Serialize};

/// Variable and coordinate names used when reading NetCDF files.
///
/// The [`Default`] matches the SWANN daily files: a `SWE` variable indexed
/// `time x lat x lon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Data variable to read.
    pub variable: String,
    /// Aliases tried in order when looking up latitude.
    pub lat_aliases: Vec<String>,
    /// Aliases tried in order when looking up longitude.
    pub lon_aliases: Vec<String>,
    /// Time coordinate variable; must carry CF `units`.
    pub time_var: String,
    /// Extra missing-value marker on top of `_FillValue`/`missing_value`.
    pub fill_value: Option<f32>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            variable: "SWE".into(),
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            time_var: "time".into(),
            fill_value: None,
        }
    }
}

impl ReaderConfig {
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    pub fn with_fill_value(mut self, fill: Option<f32>) -> Self {
        self.fill_value = fill;
        self
    }
}

#[cfg(feature = "netcdf")]
pub use reader::NetcdfSource;

#[cfg(feature = "netcdf")]
mod reader {
    use chrono::NaiveDate;
    use ndarray::Array3;
    use rayon::prelude::*;
    use std::ops::Range;
    use std::path::{Path, PathBuf};

    use super::ReaderConfig;
    use crate::error::{GridError, Result};
    use crate::source::{is_valid_f32, GriddedSource, MultiFileDataset};
    use crate::time_units::TimeUnits;

    /// One NetCDF file. Coordinates and times are read on open; the data
    /// variable is read per window.
    #[derive(Debug, Clone)]
    pub struct NetcdfSource {
        path: PathBuf,
        variable: String,
        lat: Vec<f64>,
        lon: Vec<f64>,
        times: Vec<NaiveDate>,
        fill_values: Vec<f32>,
        scale_factor: f64,
        add_offset: f64,
    }

    fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
        var.attribute_value(name)
            .and_then(|r| r.ok())
            .and_then(|v| match v {
                netcdf::AttributeValue::Double(d) => Some(d),
                netcdf::AttributeValue::Float(f) => Some(f as f64),
                netcdf::AttributeValue::Short(s) => Some(s as f64),
                netcdf::AttributeValue::Int(i) => Some(i as f64),
                _ => None,
            })
    }

    fn attr_str(var: &netcdf::Variable, name: &str) -> Option<String> {
        var.attribute_value(name)
            .and_then(|r| r.ok())
            .and_then(|v| match v {
                netcdf::AttributeValue::Str(s) => Some(s),
                _ => None,
            })
    }

    fn read_axis(file: &netcdf::File, aliases: &[String], path: &Path) -> Result<Vec<f64>> {
        for name in aliases {
            if let Some(var) = file.variable(name) {
                return Ok(var.get_values::<f64, _>(..)?);
            }
        }
        Err(GridError::MissingVariable {
            name: aliases.join("|"),
            source_name: path.display().to_string(),
        })
    }

    impl NetcdfSource {
        pub fn open(path: &Path, config: &ReaderConfig) -> Result<NetcdfSource> {
            let file = netcdf::open(path)?;
            let missing = |name: &str| GridError::MissingVariable {
                name: name.to_string(),
                source_name: path.display().to_string(),
            };

            let lat = read_axis(&file, &config.lat_aliases, path)?;
            let lon = read_axis(&file, &config.lon_aliases, path)?;

            let time_var = file
                .variable(&config.time_var)
                .ok_or_else(|| missing(&config.time_var))?;
            let units = attr_str(&time_var, "units")
                .ok_or_else(|| GridError::TimeUnits(format!("{} has no units", config.time_var)))?;
            let offsets: Vec<f64> = time_var.get_values(..)?;
            let times = TimeUnits::parse(&units)?.decode(&offsets)?;

            let var = file
                .variable(&config.variable)
                .ok_or_else(|| missing(&config.variable))?;
            let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            if dims != [times.len(), lat.len(), lon.len()] {
                return Err(GridError::GridMismatch(format!(
                    "{} in {} has dimensions {:?}, expected time x lat x lon = {:?}",
                    config.variable,
                    path.display(),
                    dims,
                    [times.len(), lat.len(), lon.len()]
                )));
            }

            let fill_values: Vec<f32> = ["_FillValue", "missing_value"]
                .iter()
                .filter_map(|name| attr_f64(&var, name).map(|v| v as f32))
                .chain(config.fill_value)
                .collect();

            log::debug!(
                "Opened {} ({} times, {} x {})",
                path.display(),
                times.len(),
                lat.len(),
                lon.len()
            );
            Ok(NetcdfSource {
                path: path.to_path_buf(),
                variable: config.variable.clone(),
                lat,
                lon,
                times,
                fill_values,
                scale_factor: attr_f64(&var, "scale_factor").unwrap_or(1.0),
                add_offset: attr_f64(&var, "add_offset").unwrap_or(0.0),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl GriddedSource for NetcdfSource {
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
            let file = netcdf::open(&self.path)?;
            let var = file
                .variable(&self.variable)
                .ok_or_else(|| GridError::MissingVariable {
                    name: self.variable.clone(),
                    source_name: self.path.display().to_string(),
                })?;
            let shape = (self.times.len(), lat.len(), lon.len());
            let raw: Vec<f32> = var.get_values((0..self.times.len(), lat, lon))?;

            let (scale, offset) = (self.scale_factor, self.add_offset);
            let values = raw
                .into_iter()
                .map(|v| {
                    if self.fill_values.contains(&v) || !is_valid_f32(v) {
                        f32::NAN
                    } else {
                        (v as f64 * scale + offset) as f32
                    }
                })
                .collect();
            Ok(Array3::from_shape_vec(shape, values)?)
        }
    }

    impl MultiFileDataset {
        /// Open every file and combine them along time.
        pub fn open_netcdf(paths: &[PathBuf], config: &ReaderConfig) -> Result<MultiFileDataset> {
            let sources = paths
                .par_iter()
                .map(|path| {
                    NetcdfSource::open(path, config)
                        .map(|source| Box::new(source) as Box<dyn GriddedSource>)
                })
                .collect::<Result<Vec<_>>>()?;
            log::info!("Opened {} NetCDF files", sources.len());
            MultiFileDataset::new(sources)
        }
    }
}


#[cfg(all(test, feature = "netcdf"))]
mod netcdf_tests {
    use super::*;
    use crate::error::GridError;
    use crate::source::GriddedSource;
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};

    const FILL: f32 = -999.0;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("swe-grid-netcdf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    /// 2 days x 2 lats x 2 lons of packed SWE.
    fn write_swe_file(path: &Path, swe_dims: &[&str], swe: &[f32]) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_dimension("time", 2)?;
        file.add_dimension("lat", 2)?;
        file.add_dimension("lon", 2)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "days since 2000-01-01 00:00:00")?;
        time.put_values(&[0.0, 1.0], ..)?;

        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_values(&[36.0, 36.5], ..)?;
        let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
        lon.put_values(&[-108.0, -107.5], ..)?;

        let mut var = file.add_variable::<f32>("SWE", swe_dims)?;
        var.put_attribute("_FillValue", FILL)?;
        var.put_attribute("scale_factor", 2.0f32)?;
        var.put_attribute("add_offset", 0.5f32)?;
        var.put_values(swe, ..)?;
        Ok(())
    }

    #[test]
    fn reads_scaled_windows_with_fill_values() {
        let path = temp_path("swann.nc");
        write_swe_file(
            &path,
            &["time", "lat", "lon"],
            &[1.0, 2.0, FILL, 3.0, 4.0, 5.0, 6.0, -5.0],
        )
        .unwrap();

        let source = NetcdfSource::open(&path, &ReaderConfig::default()).unwrap();
        assert_eq!(
            source.times(),
            &[
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2000, 1, 2).unwrap()
            ]
        );
        assert_eq!(source.lat(), &[36.0, 36.5]);
        assert_eq!(source.lon(), &[-108.0, -107.5]);

        let data = source.read_window(0..2, 0..2).unwrap();
        assert_eq!(data.dim(), (2, 2, 2));
        assert_eq!(data[[0, 0, 0]], 2.5);
        assert_eq!(data[[0, 0, 1]], 4.5);
        assert!(data[[0, 1, 0]].is_nan());
        assert_eq!(data[[1, 1, 1]], -9.5);

        let south_east = source.read_window(1..2, 1..2).unwrap();
        assert_eq!(south_east.dim(), (2, 1, 1));
        assert_eq!(south_east[[0, 0, 0]], 6.5);
        assert_eq!(south_east[[1, 0, 0]], -9.5);

        // an extra marker is compared on the packed value
        let config = ReaderConfig::default().with_fill_value(Some(-5.0));
        let masked = NetcdfSource::open(&path, &config).unwrap();
        assert!(masked.read_window(1..2, 1..2).unwrap()[[1, 0, 0]].is_nan());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn variable_without_time_axis_is_rejected() {
        let path = temp_path("no-time.nc");
        write_swe_file(&path, &["lat", "lon"], &[1.0, 2.0, 3.0, 4.0]).unwrap();

        assert!(matches!(
            NetcdfSource::open(&path, &ReaderConfig::default()),
            Err(GridError::GridMismatch(_))
        ));
        assert!(matches!(
            NetcdfSource::open(&path, &ReaderConfig::default().with_variable("swe")),
            Err(GridError::MissingVariable { .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }
}
