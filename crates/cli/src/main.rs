// crosscheck CLI - headless bank/ledger reconciliation

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use crosscheck_recon::{load_csv_transactions, MatchConfig, Mode, Reconciler, Side};

// Exit codes are part of the shell contract - scripts rely on them.
const EXIT_UNMATCHED: u8 = 3;
const EXIT_INVALID_CONFIG: u8 = 4;
const EXIT_RUNTIME: u8 = 5;

#[derive(Parser)]
#[command(name = "crosscheck")]
#[command(about = "Reconcile a bank statement against an internal ledger")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation over two CSV files
    #[command(after_help = "\
Examples:
  crosscheck run --bank bank.csv --ledger ledger.csv
  crosscheck run --bank bank.csv --ledger ledger.csv --mode speed --json
  crosscheck run --bank bank.csv --ledger ledger.csv --config profile.toml --output result.json")]
    Run {
        /// Bank-side CSV (columns: id,date,description,amount,type)
        #[arg(long)]
        bank: PathBuf,

        /// Ledger-side CSV (same columns)
        #[arg(long)]
        ledger: PathBuf,

        /// Built-in profile to use
        #[arg(long, value_enum, default_value = "accuracy")]
        mode: ModeArg,

        /// Custom TOML profile (overrides --mode)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a TOML profile without running
    #[command(after_help = "\
Examples:
  crosscheck validate-config profile.toml")]
    ValidateConfig {
        /// Path to the profile
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Accuracy,
    Speed,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Accuracy => Mode::Accuracy,
            ModeArg::Speed => Mode::Speed,
        }
    }
}

struct CliError {
    code: u8,
    message: String,
}

fn cli_err(code: u8, message: impl Into<String>) -> CliError {
    CliError {
        code,
        message: message.into(),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            bank,
            ledger,
            mode,
            config,
            json,
            output,
        } => cmd_run(bank, ledger, mode.into(), config, json, output),
        Commands::ValidateConfig { config } => cmd_validate_config(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(e.code)
        }
    }
}

fn load_config(mode: Mode, path: Option<&PathBuf>) -> Result<MatchConfig, CliError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;
            MatchConfig::from_toml(&raw).map_err(|e| cli_err(EXIT_INVALID_CONFIG, e.to_string()))
        }
        None => Ok(MatchConfig::for_mode(mode)),
    }
}

fn load_side(side: Side, path: &PathBuf) -> Result<Vec<crosscheck_recon::Transaction>, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot read {}: {e}", path.display())))?;
    load_csv_transactions(side, &raw).map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))
}

fn cmd_run(
    bank_path: PathBuf,
    ledger_path: PathBuf,
    mode: Mode,
    config_path: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(mode, config_path.as_ref())?;
    let bank = load_side(Side::Bank, &bank_path)?;
    let ledger = load_side(Side::Ledger, &ledger_path)?;

    let result = Reconciler::new(config)
        .run(&bank, &ledger)
        .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.stats;
    eprintln!(
        "{} match groups - {}/{} bank and {}/{} ledger items matched ({:.1}% match rate)",
        result.matches.len(),
        s.matched_bank_count,
        s.total_bank,
        s.matched_ledger_count,
        s.total_ledger,
        s.match_rate,
    );

    if s.unmatched_bank_count > 0 || s.unmatched_ledger_count > 0 {
        return Err(cli_err(
            EXIT_UNMATCHED,
            format!(
                "{} bank and {} ledger items unmatched",
                s.unmatched_bank_count, s.unmatched_ledger_count
            ),
        ));
    }

    Ok(())
}

fn cmd_validate_config(config_path: PathBuf) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(&config_path)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;

    match MatchConfig::from_toml(&raw) {
        Ok(config) => {
            eprintln!(
                "valid: tolerance {}c/{}c, windows {}/{}/{} days, text threshold {}, depth {}",
                config.amount_tolerance_cents,
                config.amount_tolerance_loose_cents,
                config.date_window_strict,
                config.date_window_loose,
                config.date_window_reference,
                config.fuzzy_text_threshold,
                config.max_combination_depth,
            );
            Ok(())
        }
        Err(e) => Err(cli_err(EXIT_INVALID_CONFIG, e.to_string())),
    }
}
