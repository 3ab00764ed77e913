use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GrowthError;
use crate::logging::LogConfig;
use crate::models::{BabyProfile, Units};
use crate::reference::ReferenceTable;
use crate::trend::DEFAULT_TREND_THRESHOLD_PERCENT;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Display preferences
    pub display: DisplaySettings,

    /// Percentile and trend settings
    pub analysis: AnalysisSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,

    /// Profile used when the CLI is not given a birth date and sex
    pub profile: Option<BabyProfile>,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Display preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Unit system for input and output
    pub units: Units,

    /// chrono format string for dates
    pub date_format: String,
}

/// Percentile and trend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Percent change beyond which a trend counts as up or down
    pub trend_threshold_percent: f64,

    /// JSON LMS table replacing the bundled WHO subset
    pub reference_table: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            display: DisplaySettings::default(),
            analysis: AnalysisSettings::default(),
            logging: LogConfig::default(),
            profile: None,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            units: Units::Metric,
            date_format: "%b %d, %Y".to_string(),
        }
    }
}

impl DisplaySettings {
    /// Render a date with the configured format string
    pub fn format_date(&self, date: NaiveDate) -> Result<String> {
        let mut rendered = String::new();
        write!(
            rendered,
            "{}",
            date.format_with_items(StrftimeItems::new(&self.date_format))
        )
        .map_err(|_| invalid_date_format(&self.date_format))?;
        Ok(rendered)
    }
}

fn invalid_date_format(format: &str) -> anyhow::Error {
    GrowthError::Configuration(format!("Invalid date_format '{}'", format)).into()
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            trend_threshold_percent: DEFAULT_TREND_THRESHOLD_PERCENT,
            reference_table: None,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".growthrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %err,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Configuration for a CLI run. An explicit path that does not exist
    /// yet is only acceptable when the run is about to create it.
    pub fn load_for_run(path: Option<&Path>, creating: bool) -> Result<Self> {
        match path {
            Some(path) if creating && !path.exists() => Ok(Self::default()),
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_or_default()),
        }
    }

    /// Write a default configuration to `path`, refusing to overwrite
    pub fn init_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }

        let mut config = Self::default();
        config.save_to_file(path)?;
        tracing::info!(path = %path.display(), "Wrote default configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.analysis.trend_threshold_percent;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(GrowthError::Configuration(format!(
                "trend_threshold_percent must be a non-negative number, got {}",
                threshold
            ))
            .into());
        }

        let date_format = &self.display.date_format;
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid_date_format(date_format));
        }

        Ok(())
    }

    /// Reference table selected by the configuration: the custom file when
    /// one is set, otherwise the bundled WHO subset
    pub fn reference_table(&self) -> Result<ReferenceTable> {
        match &self.analysis.reference_table {
            Some(path) => ReferenceTable::load_from_file(path)
                .with_context(|| format!("Failed to load reference table: {}", path.display())),
            None => Ok(ReferenceTable::who().clone()),
        }
    }
}
