//! Sensor Hub CLI
//!
//! Feeds protocol lines from stdin, a file or a serial port into the sensor
//! registry and prints aggregate readings.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use sensor_hub::{
    config::Config,
    core::{ProcessSummary, ValuePolicy},
    ingest::Ingestor,
    source::{parse_line, LineSource},
    SensorKind, VERSION,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensor-hub")]
#[command(version = VERSION)]
#[command(about = "Sensor registry fed by KIND;ID;VALUE lines", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest lines until the input ends or Ctrl+C
    Ingest(IngestArgs),

    /// Parse a single protocol line and show its fields
    Parse {
        /// Line such as "T;T-001;25.6"
        line: String,
    },

    /// Show configuration
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        write_default: bool,
    },

    /// List available serial ports
    #[cfg(feature = "serial")]
    Ports,
}

#[derive(Args)]
struct IngestArgs {
    /// Read lines from this file instead of stdin
    #[arg(long, short, conflicts_with = "serial")]
    input: Option<PathBuf>,

    /// Read lines from the configured serial port
    #[arg(long)]
    serial: bool,

    /// Serial port override
    #[arg(long, requires = "serial")]
    port: Option<String>,

    /// Baud rate override
    #[arg(long, requires = "serial")]
    baud: Option<u32>,

    /// Process all sensors every N lines (0 disables)
    #[arg(long)]
    process_every: Option<u64>,

    /// Reject values that are not clean numbers instead of reading them as zero
    #[arg(long)]
    strict: bool,

    /// Print summaries as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Ingest(args) => cmd_ingest(args),
        Commands::Parse { line } => cmd_parse(&line),
        Commands::Config { write_default } => cmd_config(write_default),
        #[cfg(feature = "serial")]
        Commands::Ports => cmd_ports(),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_ingest(args: IngestArgs) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load configuration, using defaults");
        Config::default()
    });
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(every) = args.process_every {
        config.process_every = every;
    }
    if args.strict {
        config.value_policy = ValuePolicy::Strict;
    }

    let mut source = LineSource::new();
    if args.serial {
        start_serial(&mut source, &config)?;
    } else if let Some(path) = &args.input {
        let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
        source.start(BufReader::new(file))?;
    } else {
        source.start(BufReader::new(std::io::stdin()))?;
    }

    let mut ingestor = Ingestor::from_config(&config);

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(Arc::clone(&running))?;

    let receiver = source.receiver().clone();
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => {
                if line.is_empty() {
                    continue;
                }
                tracing::debug!(%line, "received line");

                if let Ok(outcome) = ingestor.handle_line(&line) {
                    if outcome.created && !args.json {
                        println!("Sensor {} ({}) created", outcome.id, outcome.kind);
                    }
                }

                if let Some(summaries) = ingestor.due_summaries() {
                    print_summaries(&summaries, args.json)?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    source.stop();

    let summaries = ingestor.process_all();
    print_summaries(&summaries, args.json)?;

    let sensors = ingestor.registry().list_all();
    if args.json {
        let report = serde_json::json!({
            "sensors": sensors,
            "stats": ingestor.log().stats(),
        });
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!();
        println!("Registered sensors:");
        for sensor in &sensors {
            println!("  {sensor}");
        }
        println!();
        println!("{}", ingestor.log().summary());
    }

    Ok(())
}

#[cfg(feature = "serial")]
fn start_serial(source: &mut LineSource, config: &Config) -> anyhow::Result<()> {
    let reader = sensor_hub::source::open_serial(&config.serial)
        .with_context(|| format!("could not open serial port {}", config.serial.port))?;
    source.start(reader)?;
    Ok(())
}

#[cfg(not(feature = "serial"))]
fn start_serial(_source: &mut LineSource, _config: &Config) -> anyhow::Result<()> {
    bail!("--serial requires sensor-hub to be built with the `serial` feature")
}

fn print_summaries(summaries: &[ProcessSummary], json: bool) -> anyhow::Result<()> {
    if json {
        for summary in summaries {
            println!("{}", serde_json::to_string(summary)?);
        }
        return Ok(());
    }

    println!("--- Processing {} sensor(s) ---", summaries.len());
    for summary in summaries {
        println!("  {summary}");
    }
    Ok(())
}

fn cmd_parse(line: &str) -> anyhow::Result<()> {
    let parsed = parse_line(line)?;
    let kind = match SensorKind::from_code(parsed.kind) {
        Ok(kind) => kind.to_string(),
        Err(e) => format!("invalid ({e})"),
    };

    println!("Kind:  {} ({kind})", parsed.kind);
    println!("ID:    {:?}", parsed.id);
    println!("Value: {:?}", parsed.value);
    Ok(())
}

fn cmd_config(write_default: bool) -> anyhow::Result<()> {
    let path = Config::config_path();

    if write_default {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        Config::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = Config::load()?;
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(feature = "serial")]
fn cmd_ports() -> anyhow::Result<()> {
    let ports = sensor_hub::source::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("could not install Ctrl+C handler")
}
