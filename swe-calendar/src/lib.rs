pub mod align;
pub mod date_range;
pub mod error;
pub mod peak;
pub mod reference_year;
pub mod series;
pub mod snow17;
pub mod water_year;

pub use align::{Comparison, ComparisonResult, PeakDatePair};
pub use error::{CalendarError, Result};
pub use peak::{peak_for_water_year, peak_swe_for_zone, peak_swe_table, PeakSwe, PeakTable};
pub use reference_year::ReferenceYear;
pub use series::DailySeries;
pub use snow17::Snow17Swe;
pub use water_year::WaterYear;
