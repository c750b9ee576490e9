//! goss-nagios CLI
//!
//! Entry point for the `goss-nagios` command-line tool.

use clap::{Parser, Subcommand};
use goss_nagios::config::{ConfigError, EffectiveConfig};
use goss_nagios::feed::Feed;
use goss_nagios::nagios::{self, Report, GLOBAL_OPTIONS, VALID_OPTIONS};
use goss_nagios::signal::SignalHandler;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, warn};

/// Exit code for failures of the tool itself (bad config, unreadable input)
const EXIT_OPERATIONAL: i32 = 1;

#[derive(Parser)]
#[command(name = "goss-nagios")]
#[command(about = "Nagios-compatible reporter for goss results", version)]
struct Cli {
    /// Log level for stderr diagnostics (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate results and print a Nagios status line
    Report {
        /// NDJSON results file (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Spec file the results were produced from; only its base name is shown
        #[arg(long, short = 'g')]
        spec_file: Option<String>,

        /// Format options (comma-separated, e.g., "perfdata,verbose")
        #[arg(long, short = 'o', value_delimiter = ',')]
        format_options: Option<Vec<String>>,

        /// Path to a TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration and the layers it came from
    Config {
        /// Spec file override
        #[arg(long, short = 'g')]
        spec_file: Option<String>,

        /// Format options override (comma-separated)
        #[arg(long, short = 'o', value_delimiter = ',')]
        format_options: Option<Vec<String>>,

        /// Path to a TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// List the format options the Nagios output accepts
    Options {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let code = match cli.command {
        Commands::Report {
            input,
            spec_file,
            format_options,
            config,
        } => run_report(input, spec_file, format_options, config),
        Commands::Config {
            spec_file,
            format_options,
            config,
        } => run_config(spec_file, format_options, config),
        Commands::Options { json } => run_options(json),
    };

    process::exit(code);
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn run_report(
    input: Option<PathBuf>,
    spec_file: Option<String>,
    format_options: Option<Vec<String>>,
    config_path: Option<PathBuf>,
) -> i32 {
    let config = match build_config(config_path.as_deref(), spec_file, format_options)
        .and_then(|effective| effective.output_config())
    {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return EXIT_OPERATIONAL;
        }
    };

    let reader = match open_input(input.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            error!("Error opening input: {}", e);
            return EXIT_OPERATIONAL;
        }
    };

    let signals = SignalHandler::new();
    if let Err(e) = signals.install() {
        warn!("Could not install signal handler: {}", e);
    }

    let options = config.format();
    let (batches, feed) = Feed::spawn(reader, config.feed.channel_capacity, signals.state()).into_parts();
    let aggregate = nagios::aggregate(batches, &options);

    match feed.join() {
        Ok(stats) => debug!(?stats, "feed joined"),
        Err(e) => {
            error!("Error reading results: {}", e);
            return EXIT_OPERATIONAL;
        }
    }

    let report = Report::render(&config.spec_file, &aggregate, &options);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = report.write_to(&mut out).and_then(|()| out.flush()) {
        error!("Error writing report: {}", e);
        return EXIT_OPERATIONAL;
    }

    report.exit_code()
}

fn build_config(
    config_path: Option<&Path>,
    spec_file: Option<String>,
    format_options: Option<Vec<String>>,
) -> Result<EffectiveConfig, ConfigError> {
    let mut overrides = serde_json::Map::new();
    if let Some(spec_file) = spec_file {
        overrides.insert("spec_file".to_string(), spec_file.into());
    }
    if let Some(options) = format_options {
        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        overrides.insert("format_options".to_string(), options.into());
    }
    let cli = (!overrides.is_empty()).then(|| serde_json::Value::Object(overrides));

    EffectiveConfig::build(config_path, cli)
}

fn run_config(
    spec_file: Option<String>,
    format_options: Option<Vec<String>>,
    config_path: Option<PathBuf>,
) -> i32 {
    let effective = match build_config(config_path.as_deref(), spec_file, format_options) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return EXIT_OPERATIONAL;
        }
    };

    match effective.to_json() {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            error!("Error serializing config: {}", e);
            EXIT_OPERATIONAL
        }
    }
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead + Send>> {
    match path {
        Some(p) if p != Path::new("-") => Ok(Box::new(BufReader::new(File::open(p)?))),
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn run_options(json: bool) -> i32 {
    if json {
        let output = serde_json::json!({
            "valid": VALID_OPTIONS,
            "global": GLOBAL_OPTIONS,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                error!("Error serializing output: {}", e);
                return EXIT_OPERATIONAL;
            }
        }
    } else {
        for name in VALID_OPTIONS {
            println!("{}", name);
        }
        for name in GLOBAL_OPTIONS {
            println!("{} (global)", name);
        }
    }
    0
}
