//! Pulse CLI - Command-line interface for MacroPulse core
//!
//! Commands:
//! - series: Build the gap-filled analytics series
//! - tdee: Estimate maintenance calories over a trailing window
//! - progress: Show progress against daily goals
//! - validate: Validate exported daily logs
//! - doctor: Diagnose installation and configuration

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use macropulse_core::format::{
    format_date_label, format_number, format_water, format_weight, to_percentage,
};
use macropulse_core::schema::LogAdapter;
use macropulse_core::store::{LogProvider, SettingsProvider, CACHE_VERSION};
use macropulse_core::types::{DailyLog, SeriesWindow, TdeeWindow, UserSettings, WeightUnit};
use macropulse_core::{PulseProcessor, PRODUCER_NAME, PULSE_VERSION};

/// Pulse - On-device analytics for MacroPulse daily logs
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = PULSE_VERSION)]
#[command(about = "Compute wellness analytics from daily logs", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "json")]
    input_format: InputFormat,

    /// User settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the gap-filled analytics series
    Series {
        #[command(flatten)]
        input: InputArgs,

        /// Window length in days (7, 14 or 30)
        #[arg(long, default_value = "7")]
        window: u32,

        /// Date used when there are no logs (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Estimate maintenance calories (TDEE)
    Tdee {
        #[command(flatten)]
        input: InputArgs,

        /// Window length in days (14, 21 or 30)
        #[arg(long, default_value = "14")]
        window: u32,

        /// Weight unit of the logged weights (overrides settings)
        #[arg(long)]
        unit: Option<String>,
    },

    /// Show progress against daily goals
    Progress {
        #[command(flatten)]
        input: InputArgs,

        /// Day to report (YYYY-MM-DD, defaults to the latest log)
        #[arg(long)]
        date: Option<String>,
    },

    /// Validate exported daily logs
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose installation and configuration
    Doctor {
        /// Check a user settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Check a persisted log store
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of logs
    Json,
    /// Newline-delimited JSON (one log per line)
    Ndjson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Verbosity 0 is warn, 1 info, 2 debug, 3+ trace. `RUST_LOG` wins if set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("macropulse_core={level},pulse={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Series {
            input,
            window,
            today,
        } => cmd_series(&input, window, today.as_deref()),

        Commands::Tdee {
            input,
            window,
            unit,
        } => cmd_tdee(&input, window, unit.as_deref()),

        Commands::Progress { input, date } => cmd_progress(&input, date.as_deref()),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor {
            settings,
            store,
            json,
        } => cmd_doctor(settings.as_deref(), store.as_deref(), json),
    }
}

fn cmd_series(
    args: &InputArgs,
    window: u32,
    today: Option<&str>,
) -> Result<(), PulseCliError> {
    let window = SeriesWindow::try_from(window)?;
    let today = match today {
        Some(s) => LogAdapter::parse_date(s)?,
        None => Local::now().date_naive(),
    };

    let processor = load_processor(args)?;
    let result = processor.series(window, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let units = processor.settings().unit_preference();

    println!("Analytics Series ({} days)", window.days());
    println!("=========================");
    println!(
        "Period: {} - {}",
        format_date_label(result.start),
        format_date_label(result.end)
    );
    println!();

    for point in &result.daily_series {
        println!(
            "  {:<14} {:>8} kcal  {:>8}  {:>8} steps  {:>10}",
            format_date_label(point.date),
            format_number(point.calories, 0),
            format_water(point.water, units.hydration),
            format_number(point.steps, 0),
            format_weight(point.weight, units.weight),
        );
    }

    println!("\nAverages (logged days):");
    println!(
        "  Calories:     {} kcal",
        format_number(result.averages.calories as f64, 0)
    );
    println!(
        "  Water:        {}",
        format_water(result.averages.water, units.hydration)
    );
    println!(
        "  Steps:        {}",
        format_number(result.averages.steps as f64, 0)
    );
    println!(
        "  Weight delta: {}",
        format_weight(result.averages.weight_delta, units.weight)
    );

    if !result.hydration_scatter.is_empty() {
        println!("\nHydration vs. stool quality:");
        for point in &result.hydration_scatter {
            println!(
                "  {:<14} {:>8}  Bristol {}",
                format_date_label(point.date),
                format_water(point.hydration, units.hydration),
                point.quality_scale
            );
        }
    }

    Ok(())
}

fn cmd_tdee(args: &InputArgs, window: u32, unit: Option<&str>) -> Result<(), PulseCliError> {
    let window = TdeeWindow::try_from(window)?;
    let mut processor = load_processor(args)?;

    if let Some(unit) = unit {
        let weight: WeightUnit = unit.parse()?;
        let mut settings = processor.settings().clone();
        settings.units.weight = weight;
        processor.set_settings(settings);
    }

    let result = processor.tdee(window);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("TDEE Estimate ({})", result.period_label);
    println!("==================");
    println!("Maintenance:      {} kcal/day", format_number(result.tdee as f64, 0));
    println!(
        "Average intake:   {} kcal/day",
        format_number(result.average_calories as f64, 0)
    );
    println!(
        "Weight change:    {}",
        format_weight(result.weight_change, result.weight_unit)
    );

    if result.deficit > 0 {
        println!("Daily deficit:    {} kcal", format_number(result.deficit as f64, 0));
    } else if result.surplus > 0 {
        println!("Daily surplus:    {} kcal", format_number(result.surplus as f64, 0));
    } else {
        println!("Energy balance:   at maintenance");
    }

    if !result.valid {
        println!("\nNot enough data: at least 7 logged days are needed for a reliable estimate.");
    }

    Ok(())
}

fn cmd_progress(args: &InputArgs, date: Option<&str>) -> Result<(), PulseCliError> {
    let processor = load_processor(args)?;

    let date = match date {
        Some(s) => LogAdapter::parse_date(s)?,
        None => processor
            .store()
            .all_logs()
            .last()
            .map(|log| log.date)
            .ok_or(PulseCliError::NoLogs)?,
    };

    let progress = processor
        .progress_for(date)
        .ok_or(PulseCliError::NoLogForDate(date))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    println!("Goal Progress for {}", format_date_label(date));
    println!("==============================");
    for (name, ratio) in [
        ("Calories", progress.calories),
        ("Protein", progress.protein),
        ("Carbs", progress.carbs),
        ("Fat", progress.fat),
        ("Water", progress.water),
        ("Steps", progress.steps),
    ] {
        println!("  {:<10} {:>7}", name, to_percentage(ratio * 100.0, 0));
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), PulseCliError> {
    let logs = read_logs(input, &input_format)?;
    let results = LogAdapter::validate_logs(&logs);

    let report = ValidationReport {
        total_logs: logs.len(),
        valid_logs: logs.len() - results.len(),
        invalid_logs: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                date: r.date.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total logs:   {}", report.total_logs);
        println!("Valid logs:   {}", report.valid_logs);
        println!("Invalid logs: {}", report.invalid_logs);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Log {} (index {}): {}", err.date, err.index, err.error);
            }
        }
    }

    if report.invalid_logs > 0 {
        Err(PulseCliError::ValidationFailed(report.invalid_logs))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    settings: Option<&Path>,
    store: Option<&Path>,
    json: bool,
) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "pulse_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("MacroPulse core version {}", PULSE_VERSION),
        },
        DoctorCheck {
            name: "cache_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Log store cache version: {}", CACHE_VERSION),
        },
    ];

    if let Some(path) = settings {
        checks.push(check_file(path, "settings", |content| {
            serde_json::from_str::<UserSettings>(content)
                .map(|s| {
                    format!(
                        "Settings valid (weight in {}, water in {})",
                        s.units.weight, s.units.hydration
                    )
                })
                .map_err(|e| format!("Invalid settings JSON: {}", e))
        }));
    }

    if let Some(path) = store {
        checks.push(check_file(path, "store", |content| {
            let value: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| format!("Invalid store JSON: {}", e))?;
            let version = value
                .get("cache_version")
                .and_then(|v| v.as_str())
                .unwrap_or("missing");
            if version != CACHE_VERSION {
                return Err(format!(
                    "Store cache version {} does not match {}; it will be discarded on load",
                    version, CACHE_VERSION
                ));
            }
            let days = value
                .get("logs")
                .and_then(|v| v.as_object())
                .map(|logs| logs.len())
                .unwrap_or(0);
            Ok(format!("Store valid ({} logged days)", days))
        }));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass logs with --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn check_file(
    path: &Path,
    name: &str,
    inspect: impl FnOnce(&str) -> Result<String, String>,
) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} file does not exist", path.display()),
        };
    }

    let (status, message) = match fs::read_to_string(path) {
        Ok(content) => match inspect(&content) {
            Ok(message) => (CheckStatus::Ok, message),
            Err(message) => (CheckStatus::Error, message),
        },
        Err(e) => (CheckStatus::Error, format!("Cannot read {}: {}", path.display(), e)),
    };

    DoctorCheck {
        name: name.to_string(),
        status,
        message,
    }
}

fn read_input(input: &Path) -> Result<String, PulseCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_logs(input: &Path, input_format: &InputFormat) -> Result<Vec<DailyLog>, PulseCliError> {
    let data = read_input(input)?;
    let logs = match input_format {
        InputFormat::Json => LogAdapter::parse_array(&data)?,
        InputFormat::Ndjson => LogAdapter::parse_ndjson(&data)?,
    };
    debug!(count = logs.len(), path = %input.display(), "read daily logs");
    Ok(logs)
}

/// Build a processor from the input logs and optional settings file
fn load_processor(args: &InputArgs) -> Result<PulseProcessor, PulseCliError> {
    let settings = match &args.settings {
        Some(path) => serde_json::from_str::<UserSettings>(&fs::read_to_string(path)?)?,
        None => UserSettings::default(),
    };

    let logs = read_logs(&args.input, &args.input_format)?;
    if let Some(bad) = LogAdapter::validate_logs(&logs).into_iter().next() {
        return Err(PulseCliError::Validation(bad.error));
    }

    let mut processor = PulseProcessor::with_settings(settings);
    processor.hydrate(logs);
    info!(days = processor.store().len(), "loaded log store");
    Ok(processor)
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Compute(macropulse_core::ComputeError),
    Json(serde_json::Error),
    Validation(macropulse_core::schema::ValidationError),
    NoLogs,
    NoLogForDate(NaiveDate),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<macropulse_core::ComputeError> for PulseCliError {
    fn from(e: macropulse_core::ComputeError) -> Self {
        PulseCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Compute(e) => {
                use macropulse_core::ComputeError;
                let hint = match &e {
                    ComputeError::InvalidWindow { allowed, .. } => {
                        format!("Use one of {} for --window", allowed)
                    }
                    ComputeError::InvalidUnit(_) => "Use kg or lbs for --unit".to_string(),
                    ComputeError::DateParseError(_) => "Dates use YYYY-MM-DD".to_string(),
                    _ => "Ensure input is an array of daily logs".to_string(),
                };
                CliError {
                    code: "COMPUTE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'pulse validate' for details".to_string()),
            },
            PulseCliError::NoLogs => CliError {
                code: "NO_LOGS".to_string(),
                message: "No daily logs found in input".to_string(),
                hint: Some("Pass --date or ensure the input is not empty".to_string()),
            },
            PulseCliError::NoLogForDate(date) => CliError {
                code: "NO_LOG_FOR_DATE".to_string(),
                message: format!("No log recorded for {}", date),
                hint: None,
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} logs failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_logs: usize,
    valid_logs: usize,
    invalid_logs: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
