//! Unified error hierarchy for growthrs
//!
//! The public calculators keep their silent fallbacks (age `0`, percentile
//! `50`), but every fallible step underneath reports a structured error so
//! diagnostic callers and the CLI can tell a real result from a fallback.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{MeasurementType, Sex};

/// Top-level error type for all growthrs operations
#[derive(Debug, Error)]
pub enum GrowthError {
    /// Date string could not be parsed as a calendar date
    #[error("Invalid date: {input}")]
    InvalidDate { input: String },

    /// Percentile or LMS calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Reference table loading or shape errors
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    /// Measurement validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Measurement history import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Calculation errors raised by the LMS estimator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    /// No reference points to interpolate from
    #[error("Empty reference series for {sex} {measurement}")]
    EmptySeries {
        sex: Sex,
        measurement: MeasurementType,
    },

    /// Measurement value outside the LMS domain
    #[error("Measurement value must be positive, got {value}")]
    NonPositiveValue { value: f64 },

    /// Invalid LMS parameter in the reference data
    #[error("Invalid LMS parameter {parameter}={value} at {age_in_days} days")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        age_in_days: i64,
    },

    /// Intermediate result overflowed or became NaN
    #[error("Non-finite result in {calculation}")]
    NonFinite { calculation: &'static str },

    /// Percentile requested outside (0, 100)
    #[error("Percentile must be within (0, 100), got {percentile}")]
    PercentileOutOfRange { percentile: f64 },
}

/// Reference table errors
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Reference file not found
    #[error("Reference file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Reference file could not be parsed
    #[error("Malformed reference file: {reason}")]
    Malformed { reason: String },

    /// Series violates the reference point invariants
    #[error("Invalid {sex} {measurement} series: {reason}")]
    InvalidSeries {
        sex: Sex,
        measurement: MeasurementType,
        reason: String,
    },
}

/// Result type alias for growthrs operations
pub type Result<T> = std::result::Result<T, GrowthError>;

impl GrowthError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GrowthError::InvalidDate { .. } => ErrorSeverity::Warning,
            GrowthError::Validation(_) => ErrorSeverity::Warning,
            GrowthError::Calculation(_) => ErrorSeverity::Warning,
            GrowthError::Reference(_) => ErrorSeverity::Error,
            GrowthError::Import(_) => ErrorSeverity::Error,
            GrowthError::Configuration(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            GrowthError::InvalidDate { input } => {
                format!("'{}' is not a valid date. Please use YYYY-MM-DD.", input)
            }
            GrowthError::Calculation(CalculationError::NonPositiveValue { .. }) => {
                "Measurements must be greater than zero.".to_string()
            }
            GrowthError::Reference(ReferenceError::FileNotFound { path }) => {
                format!("Could not find reference data file: {}", path.display())
            }
            GrowthError::Validation(message) => message.clone(),
            GrowthError::Configuration(message) => {
                format!("{}. Check your config file.", message)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Recoverable problem, usually answered with a fallback value
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
