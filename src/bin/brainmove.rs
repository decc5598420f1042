//! Brain Move CLI - Command-line interface for the Brain Move metrics engine
//!
//! Commands:
//! - dat: Score a Divergent Association Task attempt and record it
//! - validate: Check a word submission without scoring it
//! - add: Record a session from another training module
//! - report / profile: Dashboard views over the stored history
//! - export / import / clear: Whole-history operations
//! - analyze: Run one of the stateless analytic models
//! - doctor: Diagnose configuration and stored data

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use brainmove_metrics::models::{
    AdaptiveDifficultyEngine, CognitiveLoadCalculator, FlowStateDetector, ReactionTimeAnalyzer,
};
use brainmove_metrics::types::{ModuleType, SessionRecord, ValidationReport};
use brainmove_metrics::{
    CognitiveTracker, DatScorer, FileStorage, ScoringConfig, ScoringError, SessionStorage,
    StorageError, ENGINE_VERSION, PRODUCER_NAME,
};
use chrono::{DateTime, Utc};

/// Brain Move - Scoring and progress tracking for cognitive training
#[derive(Parser)]
#[command(name = "brainmove")]
#[command(author = "Brain Move Gym")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score cognitive-training exercises and track progress", long_about = None)]
struct Cli {
    /// Directory holding the session history
    #[arg(long, global = true, default_value = "./.brainmove")]
    data_dir: PathBuf,

    /// Scoring configuration file (JSON, partial files allowed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the scoring noise (reproducible results)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score ten words and record the attempt as a creativity session
    Dat {
        /// The words (read from stdin when omitted and stdin is piped)
        words: Vec<String>,

        /// Time spent on the attempt in milliseconds
        #[arg(long, default_value = "0")]
        duration: u64,

        /// Score without recording a session
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate ten words without scoring them
    Validate {
        /// The words (read from stdin when omitted and stdin is piped)
        words: Vec<String>,
    },

    /// Record a session from any training module
    Add {
        /// Module type: cmi, leadership, conflict, sensory, creativity
        #[arg(short, long)]
        module: ModuleType,

        /// Session score
        #[arg(short, long)]
        score: f64,

        /// Session duration in milliseconds
        #[arg(short, long, default_value = "0")]
        duration: u64,

        /// Sub-score as name=value (repeatable)
        #[arg(long = "subscore", value_parser = parse_subscore)]
        subscores: Vec<(String, f64)>,

        /// Session time (RFC 3339), defaults to now
        #[arg(long)]
        timestamp: Option<DateTime<Utc>>,
    },

    /// Print the dashboard report
    Report,

    /// Print the Brain Move profile
    Profile,

    /// Export the whole history with its report
    Export {
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the history with an export document
    Import {
        /// Export file path (use - for stdin)
        input: PathBuf,
    },

    /// Delete the whole history
    Clear,

    /// Run an analytic model
    Analyze {
        #[command(subcommand)]
        model: AnalyzeCommand,
    },

    /// Diagnose configuration and stored data
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AnalyzeCommand {
    /// Processing speed (0-100) from reaction times in ms
    Speed { times: Vec<f64> },

    /// Percent slowdown between the two halves of a run
    Fatigue { times: Vec<f64> },

    /// Cognitive load (0-100)
    Load {
        /// Task complexity (0-100)
        #[arg(long)]
        complexity: f64,

        /// Performance score (0-100)
        #[arg(long)]
        performance: f64,

        /// Time spent in milliseconds
        #[arg(long)]
        time_ms: f64,
    },

    /// Flow score and state from challenge and skill (0-1)
    Flow {
        #[arg(long)]
        challenge: f64,

        #[arg(long)]
        skill: f64,

        /// Focus level (0-1)
        #[arg(long, default_value = "1.0")]
        focus: f64,
    },

    /// Next difficulty level from recent scores
    Difficulty {
        /// Current difficulty (1-5)
        #[arg(long)]
        current: f64,

        /// Past scores, oldest first
        history: Vec<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), BrainMoveCliError> {
    // doctor reports a broken config instead of failing on it
    if let Commands::Doctor { json } = cli.command {
        return cmd_doctor(cli.config.as_deref(), &cli.data_dir, json);
    }

    let config = load_config(cli.config.as_deref())?;
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Dat {
            words,
            duration,
            dry_run,
        } => cmd_dat(config, &data_dir, words, duration, dry_run, cli.seed),

        Commands::Validate { words } => cmd_validate(config, words),

        Commands::Add {
            module,
            score,
            duration,
            subscores,
            timestamp,
        } => cmd_add(&data_dir, module, score, duration, subscores, timestamp),

        Commands::Report => {
            let tracker = open_tracker(config, &data_dir);
            print_json(&tracker.report())
        }

        Commands::Profile => {
            let tracker = open_tracker(config, &data_dir);
            print_json(&tracker.profile())
        }

        Commands::Export { output } => cmd_export(config, &data_dir, output.as_deref()),

        Commands::Import { input } => cmd_import(config, &data_dir, &input),

        Commands::Clear => {
            let mut tracker = open_tracker(config, &data_dir);
            let removed = tracker.store().len();
            tracker.store_mut().try_clear_data()?;
            print_json(&json!({ "cleared": removed }))
        }

        Commands::Analyze { model } => cmd_analyze(model),

        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), &data_dir, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoringConfig, BrainMoveCliError> {
    match path {
        Some(path) => Ok(ScoringConfig::from_file(path)?),
        None => Ok(ScoringConfig::default()),
    }
}

fn open_tracker(config: ScoringConfig, data_dir: &Path) -> CognitiveTracker<FileStorage> {
    CognitiveTracker::with_config(config, FileStorage::in_dir(data_dir))
}

fn make_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    }
}

/// Words from the arguments, or from stdin when none were given and stdin is piped.
///
/// Piped input is either a JSON array or one word per line.
fn collect_words(words: Vec<String>) -> Result<Vec<String>, BrainMoveCliError> {
    if !words.is_empty() {
        return Ok(words);
    }
    if atty::is(atty::Stream::Stdin) {
        return Err(BrainMoveCliError::NoWords);
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let trimmed = input.trim();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let words: Vec<String> = trimmed
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if words.is_empty() {
        Err(BrainMoveCliError::NoWords)
    } else {
        Ok(words)
    }
}

fn cmd_dat(
    config: ScoringConfig,
    data_dir: &Path,
    words: Vec<String>,
    duration: u64,
    dry_run: bool,
    seed: Option<u64>,
) -> Result<(), BrainMoveCliError> {
    let words = collect_words(words)?;
    let mut rng = make_rng(seed);

    let result = if dry_run {
        DatScorer::new(config).score_with_rng(&words, &mut *rng)?
    } else {
        let mut tracker = open_tracker(config, data_dir);
        tracker.record_dat_with_rng(&words, duration, &mut *rng)?
    };

    print_json(&result)
}

fn cmd_validate(config: ScoringConfig, words: Vec<String>) -> Result<(), BrainMoveCliError> {
    let words = collect_words(words)?;
    let report = DatScorer::new(config).validate(&words);

    print_json(&report)?;

    if report.valid {
        Ok(())
    } else {
        Err(BrainMoveCliError::ValidationFailed(report))
    }
}

fn cmd_add(
    data_dir: &Path,
    module: ModuleType,
    score: f64,
    duration: u64,
    subscores: Vec<(String, f64)>,
    timestamp: Option<DateTime<Utc>>,
) -> Result<(), BrainMoveCliError> {
    ensure_finite("score", score)?;

    let mut record = SessionRecord::at(timestamp.unwrap_or_else(Utc::now), module, score, duration);
    if !subscores.is_empty() {
        record = record.with_subscores(subscores.into_iter().collect::<BTreeMap<_, _>>());
    }

    let mut tracker = open_tracker(ScoringConfig::default(), data_dir);
    tracker.store_mut().try_add_session(record.clone())?;

    print_json(&record)
}

fn cmd_export(
    config: ScoringConfig,
    data_dir: &Path,
    output: Option<&Path>,
) -> Result<(), BrainMoveCliError> {
    let tracker = open_tracker(config, data_dir);
    let json = tracker.store().export_json()?;

    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_import(
    config: ScoringConfig,
    data_dir: &Path,
    input: &Path,
) -> Result<(), BrainMoveCliError> {
    let json = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let mut tracker = open_tracker(config, data_dir);
    let count = tracker.store_mut().import_json(&json)?;

    print_json(&json!({ "imported": count }))
}

fn cmd_analyze(model: AnalyzeCommand) -> Result<(), BrainMoveCliError> {
    let output = match model {
        AnalyzeCommand::Speed { times } => {
            ensure_all_finite("reaction time", &times)?;
            json!({ "processing_speed": ReactionTimeAnalyzer::calculate_processing_speed(&times) })
        }
        AnalyzeCommand::Fatigue { times } => {
            ensure_all_finite("reaction time", &times)?;
            json!({ "cognitive_fatigue": ReactionTimeAnalyzer::detect_cognitive_fatigue(&times) })
        }
        AnalyzeCommand::Load {
            complexity,
            performance,
            time_ms,
        } => {
            ensure_finite("complexity", complexity)?;
            ensure_finite("performance", performance)?;
            ensure_finite("time", time_ms)?;
            let load = CognitiveLoadCalculator::calculate_load(complexity, performance, time_ms);
            json!({ "cognitive_load": load })
        }
        AnalyzeCommand::Flow {
            challenge,
            skill,
            focus,
        } => {
            ensure_finite("challenge", challenge)?;
            ensure_finite("skill", skill)?;
            ensure_finite("focus", focus)?;
            json!({
                "flow_score": FlowStateDetector::calculate_flow_score(challenge, skill, focus),
                "flow_state": FlowStateDetector::get_flow_state(challenge, skill),
            })
        }
        AnalyzeCommand::Difficulty { current, history } => {
            ensure_finite("current difficulty", current)?;
            ensure_all_finite("score", &history)?;
            let level = AdaptiveDifficultyEngine::recommend_difficulty(current, &history);
            json!({ "recommended_difficulty": level })
        }
    };

    print_json(&output)
}

fn cmd_doctor(config: Option<&Path>, data_dir: &Path, json: bool) -> Result<(), BrainMoveCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    // Check config file if provided
    if let Some(config_path) = config {
        match ScoringConfig::from_file(config_path) {
            Ok(_) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!("Config file valid ({})", config_path.display()),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid config: {}", e),
            }),
        }
    }

    let storage = FileStorage::in_dir(data_dir);
    let history_check = match storage.load() {
        Ok(Some(content)) => match serde_json::from_str::<Vec<SessionRecord>>(&content) {
            Ok(sessions) => DoctorCheck {
                name: "history".to_string(),
                status: CheckStatus::Ok,
                message: format!("{} sessions in {}", sessions.len(), storage.path().display()),
            },
            Err(e) => DoctorCheck {
                name: "history".to_string(),
                status: CheckStatus::Warning,
                message: format!("Stored history is corrupt and will be ignored: {}", e),
            },
        },
        Ok(None) => DoctorCheck {
            name: "history".to_string(),
            status: CheckStatus::Ok,
            message: "No history yet (created on first session)".to_string(),
        },
        Err(e) => DoctorCheck {
            name: "history".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot read history: {}", e),
        },
    };
    checks.push(history_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (words taken from arguments)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (words can be piped in)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Brain Move Doctor Report");
        println!("========================");
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

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BrainMoveCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), BrainMoveCliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_finite(name: &str, value: f64) -> Result<(), BrainMoveCliError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoringError::InvalidParameter(format!("{} must be a finite number", name)).into())
    }
}

fn ensure_all_finite(name: &str, values: &[f64]) -> Result<(), BrainMoveCliError> {
    values.iter().try_for_each(|v| ensure_finite(name, *v))
}

fn parse_subscore(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Ok((name.trim().to_string(), value))
}

// Error types

#[derive(Debug)]
enum BrainMoveCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Scoring(ScoringError),
    ValidationFailed(ValidationReport),
    NoWords,
    DoctorFailed,
}

impl From<io::Error> for BrainMoveCliError {
    fn from(e: io::Error) -> Self {
        BrainMoveCliError::Io(e)
    }
}

impl From<serde_json::Error> for BrainMoveCliError {
    fn from(e: serde_json::Error) -> Self {
        BrainMoveCliError::Json(e)
    }
}

impl From<ScoringError> for BrainMoveCliError {
    fn from(e: ScoringError) -> Self {
        BrainMoveCliError::Scoring(e)
    }
}

impl From<StorageError> for BrainMoveCliError {
    fn from(e: StorageError) -> Self {
        BrainMoveCliError::Scoring(e.into())
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BrainMoveCliError> for CliError {
    fn from(e: BrainMoveCliError) -> Self {
        match e {
            BrainMoveCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BrainMoveCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BrainMoveCliError::Scoring(ScoringError::InvalidInput(report)) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: report.errors.join("; "),
                hint: Some("Run 'brainmove validate' for details".to_string()),
            },
            BrainMoveCliError::Scoring(ScoringError::InvalidParameter(msg)) => CliError {
                code: "INVALID_PARAMETER".to_string(),
                message: msg,
                hint: None,
            },
            BrainMoveCliError::Scoring(ScoringError::JsonError(e)) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Check that the input is a brainmove config or export document".to_string(),
                ),
            },
            BrainMoveCliError::Scoring(ScoringError::Storage(e)) => CliError {
                code: "STORAGE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that --data-dir is writable".to_string()),
            },
            BrainMoveCliError::ValidationFailed(report) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} problems with the submitted words", report.errors.len()),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            BrainMoveCliError::NoWords => CliError {
                code: "NO_WORDS".to_string(),
                message: "No words given".to_string(),
                hint: Some("Pass ten words as arguments or pipe them in, one per line".to_string()),
            },
            BrainMoveCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

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
