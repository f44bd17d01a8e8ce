//! Read-only analytics over the calibration and error logs.

pub mod calibration;
pub mod weakness;

pub use calibration::{CalibrationStats, ConfidenceLevel};
pub use weakness::{CategoryWeakness, ErrorCategory, WeaknessReport};
