// Library interface for growthrs modules
// This allows integration tests and the CLI to share the core functionality

pub mod age;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod percentile;
pub mod reference;
pub mod trend;
pub mod units;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use age::{calculate_age_in_days, format_age, format_date};
pub use percentile::{PercentileCalculator, PercentileOutcome};
pub use reference::{ReferencePoint, ReferenceTable};
pub use trend::get_measurement_trend;
pub use validation::MeasurementValidator;
pub use config::AppConfig;
pub use error::{GrowthError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
