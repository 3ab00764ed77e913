use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{settings::Style, Table, Tabled};
use tracing::Level;

use growthrs::age::{age_in_days_between, format_age, parse_date};
use growthrs::history::{
    annotate_measurement, build_history_rows, read_measurements_csv, sort_newest_first,
};
use growthrs::logging::{init_logging, LogLevel};
use growthrs::units::{cm_to_in, in_to_cm, kg_to_lb, lb_to_kg, to_metric, unit_label};
use growthrs::{AppConfig, BabyProfile, GrowthError, MeasurementType, MeasurementValidator};
use growthrs::{PercentileCalculator, Sex, Trend, Units};

/// growthrs - Infant Growth Percentile CLI
///
/// Computes ages, WHO LMS percentiles and growth trends for infant weight,
/// length and head circumference.
#[derive(Parser)]
#[command(name = "growthrs")]
#[command(author = "growthrs Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Infant Growth Percentile CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the age in days between two dates
    Age {
        /// Birth date (YYYY-MM-DD or ISO-8601 timestamp)
        #[arg(short, long)]
        birth: String,

        /// Measurement date (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Compute the percentile of a single measurement
    Percentile {
        /// Sex of the child (male, female); defaults to the configured profile
        #[arg(short, long)]
        sex: Option<Sex>,

        /// Measurement type (weight, height, head)
        #[arg(short, long)]
        measure: MeasurementType,

        /// Measured value in the selected units
        #[arg(long)]
        value: f64,

        /// Age in days; overrides --birth and --date
        #[arg(short, long)]
        age_days: Option<i64>,

        /// Birth date; defaults to the configured profile
        #[arg(short, long)]
        birth: Option<String>,

        /// Measurement date (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Unit system of the value (metric, imperial)
        #[arg(short, long)]
        units: Option<Units>,
    },

    /// Convert a value between metric and imperial units
    Convert {
        /// Value to convert
        #[arg(long)]
        value: f64,

        /// Unit of the value
        #[arg(short, long, value_enum)]
        from: ConvertUnit,
    },

    /// Annotate a measurement history CSV with ages, percentiles and trends
    History {
        /// Input CSV file (date, weight, height, head, optional id and notes)
        #[arg(short = 'i', long)]
        file: PathBuf,

        /// Birth date; defaults to the configured profile
        #[arg(short, long)]
        birth: Option<String>,

        /// Sex of the child; defaults to the configured profile
        #[arg(short, long)]
        sex: Option<Sex>,

        /// Unit system of the CSV values
        #[arg(short, long)]
        units: Option<Units>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Tabulate a centile curve over the reference ages
    Curve {
        /// Sex of the child (male, female)
        #[arg(short, long)]
        sex: Sex,

        /// Measurement type (weight, height, head)
        #[arg(short, long)]
        measure: MeasurementType,

        /// Percentile of the curve
        #[arg(short, long, default_value = "50")]
        percentile: f64,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,

        /// Print the active configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConvertUnit {
    Kg,
    Lb,
    Cm,
    In,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct HistoryTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Height")]
    height: String,
    #[tabled(rename = "Head")]
    head: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "Age (days)")]
    age_in_days: u32,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let creating = matches!(cli.command, Commands::Config { init: true, .. });
    let config = AppConfig::load_for_run(cli.config.as_deref(), creating)?;

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Age { birth, date } => {
            let birth_date = parse_date(&birth)?;
            let date = resolve_date(date.as_deref())?;
            let days = age_in_days_between(birth_date, date);

            println!("{}", "Age".green().bold());
            println!("  Days: {}", days);
            println!("  Age:  {}", format_age(days));
        }

        Commands::Percentile {
            sex,
            measure,
            value,
            age_days,
            birth,
            date,
            units,
        } => {
            let sex = resolve_sex(sex, &config)?;
            let age_in_days = match age_days {
                Some(days) => days,
                None => {
                    let birth_date = resolve_birth(birth.as_deref(), &config)?;
                    age_in_days_between(birth_date, resolve_date(date.as_deref())?)
                }
            };
            let units = units.unwrap_or(config.display.units);
            if let Some(issue) = MeasurementValidator::validate_input_value(measure, value, units) {
                return Err(GrowthError::Validation(issue.message).into());
            }
            let value_metric = to_metric(value, measure, units);

            let table = config.reference_table()?;
            let outcome = PercentileCalculator::calculate_percentile_with_diagnostics(
                value_metric,
                age_in_days,
                measure,
                sex,
                table.series(sex, measure),
            );

            println!("{}", "Percentile".blue().bold());
            println!(
                "  {} {} {} at {}",
                measure,
                value,
                unit_label(measure, units),
                format_age(age_in_days)
            );
            println!("  Percentile: {}", format!("{:.1}", outcome.percentile).bold());
            match (outcome.z_score, &outcome.fallback) {
                (Some(z), _) => println!("  Z-score:    {:.2}", z),
                (None, Some(reason)) => {
                    println!("  {}", format!("Fell back to the median: {}", reason).yellow())
                }
                (None, None) => {}
            }
        }

        Commands::Convert { value, from } => {
            let (converted, unit) = match from {
                ConvertUnit::Kg => (kg_to_lb(value), "lb"),
                ConvertUnit::Lb => (lb_to_kg(value), "kg"),
                ConvertUnit::Cm => (cm_to_in(value), "in"),
                ConvertUnit::In => (in_to_cm(value), "cm"),
            };
            println!("{} {}", converted, unit);
        }

        Commands::History {
            file,
            birth,
            sex,
            units,
            format,
        } => {
            let profile = resolve_profile(birth.as_deref(), sex, &config)?;
            let units = units.unwrap_or(config.display.units);
            let table = config.reference_table()?;

            let reader = File::open(&file)
                .with_context(|| format!("Failed to open history file: {}", file.display()))?;
            let inputs = read_measurements_csv(reader, units)?;

            let mut history = inputs
                .iter()
                .map(|input| annotate_measurement(&profile, input, &table))
                .collect::<growthrs::Result<Vec<_>>>()?;
            sort_newest_first(&mut history);

            let today = Local::now().date_naive();
            let rows = build_history_rows(
                &history,
                profile.birth_date,
                today,
                config.analysis.trend_threshold_percent,
            );

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                OutputFormat::Table => {
                    let display_rows = rows
                        .iter()
                        .map(|row| {
                            let cell = |measure: MeasurementType| {
                                history_cell(
                                    row.measurement.value(measure),
                                    row.measurement.percentile(measure),
                                    row.trends.get(measure),
                                    measure,
                                    units,
                                )
                            };
                            Ok(HistoryTableRow {
                                date: config.display.format_date(row.measurement.date)?,
                                age: row.age.clone(),
                                weight: cell(MeasurementType::Weight),
                                height: cell(MeasurementType::Height),
                                head: cell(MeasurementType::Head),
                                notes: row.measurement.notes.clone().unwrap_or_default(),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    println!("{}", format!("Growth history for {}", profile.name).cyan().bold());
                    println!("{}", Table::new(display_rows).with(Style::rounded()));

                    for row in rows.iter().filter(|row| !row.issues.is_empty()) {
                        for issue in &row.issues {
                            println!(
                                "{} {}: {} ({})",
                                "⚠".yellow(),
                                row.measurement.date,
                                issue.message,
                                issue.value
                            );
                        }
                    }
                }
            }
        }

        Commands::Curve {
            sex,
            measure,
            percentile,
        } => {
            let table = config.reference_table()?;
            let series = table.series(sex, measure);

            let rows = series
                .iter()
                .map(|point| {
                    let age_in_days = i64::from(point.age_in_days);
                    let value = PercentileCalculator::value_at_percentile(
                        percentile,
                        age_in_days,
                        measure,
                        sex,
                        series,
                    )?;
                    Ok(CurveRow {
                        age_in_days: point.age_in_days,
                        age: format_age(age_in_days),
                        value: format!("{:.2} {}", value, measure.metric_unit()),
                    })
                })
                .collect::<Result<Vec<_>, growthrs::error::CalculationError>>()?;

            println!(
                "{}",
                format!("{} {} curve, P{}", sex, measure, percentile).magenta().bold()
            );
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Config { init, show } => {
            let config = if init {
                let created = AppConfig::init_file(&config_path)?;
                println!(
                    "{}",
                    format!("✓ Wrote default config to {}", config_path.display()).green()
                );
                created
            } else {
                config
            };

            if show || !init {
                println!("{}", format!("Config: {}", config_path.display()).white().bold());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(date) => Ok(parse_date(date)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn resolve_sex(sex: Option<Sex>, config: &AppConfig) -> Result<Sex> {
    match (sex, &config.profile) {
        (Some(sex), _) => Ok(sex),
        (None, Some(profile)) => Ok(profile.sex),
        (None, None) => bail!("--sex is required when no profile is configured"),
    }
}

fn resolve_birth(birth: Option<&str>, config: &AppConfig) -> Result<NaiveDate> {
    match (birth, &config.profile) {
        (Some(birth), _) => Ok(parse_date(birth)?),
        (None, Some(profile)) => Ok(profile.birth_date),
        (None, None) => bail!("--birth is required when no profile is configured"),
    }
}

fn report_error(err: &anyhow::Error) {
    let (level, message) = match err.downcast_ref::<GrowthError>() {
        Some(growth_error) => (
            growth_error.severity().to_tracing_level(),
            growth_error.user_message(),
        ),
        None => (Level::ERROR, format!("{:#}", err)),
    };

    if level == Level::WARN {
        tracing::warn!(error = %err, "Command rejected");
    } else {
        tracing::error!(error = %err, "Command failed");
    }
    eprintln!("{} {}", "Error:".red().bold(), message);
}

fn resolve_profile(
    birth: Option<&str>,
    sex: Option<Sex>,
    config: &AppConfig,
) -> Result<BabyProfile> {
    let birth_date = resolve_birth(birth, config)?;
    let sex = resolve_sex(sex, config)?;
    let name = config
        .profile
        .as_ref()
        .map(|profile| profile.name.clone())
        .unwrap_or_else(|| "baby".to_string());
    Ok(BabyProfile::new(name, birth_date, sex))
}

fn history_cell(
    value_metric: f64,
    percentile: Option<f64>,
    trend: Trend,
    measure: MeasurementType,
    units: Units,
) -> String {
    let value = growthrs::units::from_metric(value_metric, measure, units);
    let percentile = percentile
        .map(|p| format!("P{:.1}", p))
        .unwrap_or_else(|| "-".to_string());
    let symbol = match trend {
        Trend::Up => trend.symbol().green().to_string(),
        Trend::Down => trend.symbol().red().to_string(),
        Trend::Stable | Trend::None => trend.symbol().to_string(),
    };
    format!("{} {} {} {}", value, unit_label(measure, units), percentile, symbol)
}
