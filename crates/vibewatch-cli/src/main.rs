//! CLI for vibewatch: live vibration classification and session verdicts.

mod commands;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vibewatch")]
#[command(about = "vibewatch: classify appliance vibration and judge each session")]
#[command(version = vibewatch_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the threshold table for a speed level
    Ranges {
        /// Speed level: 1 or 2
        #[arg(long)]
        level: Option<String>,

        /// JSON config file (speed_level, poll_interval_ms, ranges)
        #[arg(long)]
        config: Option<String>,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a single reading
    Classify {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        #[arg(allow_hyphen_values = true)]
        z: f64,

        /// Speed level: 1 or 2
        #[arg(long)]
        level: Option<String>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Run a collection session and print its verdict
    Monitor {
        /// Speed level: 1 or 2
        #[arg(long)]
        level: Option<String>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,

        /// Poll interval (e.g. "3s", "2500ms"); overrides the config
        #[arg(long)]
        interval: Option<String>,

        /// Stop automatically after this long (e.g. "30s", "5m"); default: until Ctrl+C
        #[arg(long)]
        duration: Option<String>,

        /// Run exactly N ticks back to back instead of polling on a timer
        #[arg(long)]
        ticks: Option<u64>,

        /// Replay readings from a JSON array of {x, y, z} instead of simulating
        #[arg(long)]
        replay: Option<String>,

        /// Seed for the simulated sensor and model
        #[arg(long)]
        seed: Option<u64>,

        /// Share of simulated readings drawn from the failure ranges (0.0-1.0)
        #[arg(long, default_value = "0.2")]
        anomaly_rate: f64,

        /// Do not attach the simulated prediction model
        #[arg(long)]
        no_model: bool,

        /// Write the session report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Start the HTTP API over a simulated sensor
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Speed level: 1 or 2
        #[arg(long)]
        level: Option<String>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,

        /// Poll interval; overrides the config
        #[arg(long)]
        interval: Option<String>,

        /// Start a session as soon as the server is up
        #[arg(long)]
        autostart: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ranges {
            level,
            config,
            json,
        } => commands::ranges::run(config.as_deref(), level.as_deref(), json),
        Commands::Classify {
            x,
            y,
            z,
            level,
            config,
        } => commands::classify::run(x, y, z, config.as_deref(), level.as_deref()),
        Commands::Monitor {
            level,
            config,
            interval,
            duration,
            ticks,
            replay,
            seed,
            anomaly_rate,
            no_model,
            output,
        } => commands::monitor::run(commands::monitor::MonitorCommandConfig {
            config_path: config.as_deref(),
            level: level.as_deref(),
            interval: interval.as_deref(),
            duration: duration.as_deref(),
            ticks,
            replay_path: replay.as_deref(),
            seed,
            anomaly_rate,
            attach_model: !no_model,
            output_path: output.as_deref(),
        }),
        Commands::Server {
            port,
            host,
            level,
            config,
            interval,
            autostart,
        } => commands::server::run(
            &host,
            port,
            config.as_deref(),
            level.as_deref(),
            interval.as_deref(),
            autostart,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
