use anyhow::Result;
use clap::Parser;
use startstop::{ScriptRunner, StartStopConfig, Step};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "startstop")]
#[command(about = "Drive a guarded worker through start/stop transitions")]
#[command(version)]
#[command(long_about = "Runs a demo worker whose start and stop logic is arbitrated by a \
run-once lifecycle guard. Each scripted step (start, stop, release) is applied in order and \
its outcome printed, showing which transitions the guard granted and the resulting state.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "startstop.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Steps to run instead of the configured script
    #[arg(short, long = "step", value_name = "STEP", help = "Step to run: start, stop or release (repeatable)")]
    steps: Vec<Step>,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without running the script")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    let config = load_config(&args)?;

    info!("Starting startstop v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded successfully from: {}", args.config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let steps = if args.steps.is_empty() {
        config.script.steps.clone()
    } else {
        args.steps.clone()
    };

    let mut runner = ScriptRunner::from_config(&config.service);
    let outcomes = runner.run(&steps);

    let mut failed = false;
    for outcome in &outcomes {
        println!("{}", outcome);
        failed |= outcome.error.is_some();
    }

    println!(
        "final state: {} (start hook ran {}x, stop hook ran {}x)",
        runner.state(),
        runner.stats().start_calls(),
        runner.stats().stop_calls()
    );

    // Let an unreleased worker go through teardown before exiting
    drop(runner);

    if failed {
        error!("One or more steps failed");
        std::process::exit(1);
    }

    Ok(())
}

/// Load configuration and install logging, also when loading fails
fn load_config(args: &Args) -> Result<StartStopConfig> {
    match StartStopConfig::load_from_file(&args.config) {
        Ok(config) => {
            init_logging(args, &config)?;
            Ok(config)
        }
        Err(e) => {
            // No config to take logging settings from, fall back to defaults
            init_logging(args, &StartStopConfig::default())?;
            error!("Failed to load configuration from {}: {}", args.config, e);
            Err(e.into())
        }
    }
}

fn init_logging(args: &Args, config: &StartStopConfig) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };

    // Create environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("startstop={}", log_level)));

    let format = args
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());

    let fmt_layer = match format {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        other => {
            eprintln!("Warning: Unknown log format '{}', using default", other);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# startstop configuration file");
    println!("# Every key is optional; STARTSTOP_<SECTION>__<KEY> environment variables override it");
    println!();
    print!("{}", StartStopConfig::default().to_toml()?);
    Ok(())
}
