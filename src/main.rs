//! Binary entrypoint for the micbridge CLI.
//!
//! Commands:
//! - `start` - run the monitor for the configured room
//! - `init` - create a starter `config.toml`
//! - `probe --address <host> [-n <count>] [--timeout <s>]` - dial a receiver
//!   and dump raw framed status messages
//!
//! See the library crate docs for module-level details: `micbridge::`.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use micbridge::config::Config;
use micbridge::lookup::HttpDeviceLookup;
use micbridge::monitor::Monitor;
use micbridge::publishing::HttpPublisher;
use micbridge::receiver::ReceiverConnection;

#[derive(Parser)]
#[command(name = "micbridge")]
#[command(about = "Bridges a wireless-microphone receiver's status protocol into published events")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the room monitor
    Start {
        /// Override the configured building identifier
        #[arg(long)]
        building: Option<String>,

        /// Override the configured room identifier
        #[arg(long)]
        room: Option<String>,
    },
    /// Initialize a new configuration file
    Init,
    /// Dial a receiver and dump raw framed status messages
    Probe {
        /// Receiver address (host or host:port)
        #[arg(short, long)]
        address: String,

        /// Number of messages to read before exiting
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Seconds to wait for the dial
        #[arg(short, long, default_value_t = 3)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { building, room } => {
            let mut config = Config::load(&cli.config).await?;
            if let Some(building) = building {
                config.service.building = building;
            }
            if let Some(room) = room {
                config.service.room = room;
            }
            config.validate()?;

            info!("Starting micbridge v{}", env!("CARGO_PKG_VERSION"));
            let lookup = Arc::new(HttpDeviceLookup::new(
                &config.lookup.base_url,
                config.lookup.timeout(),
            )?);
            let publisher = Arc::new(HttpPublisher::new(
                &config.publishing.event_url,
                &config.publishing.error_url,
                config.publishing.timeout(),
            )?);

            Monitor::new(&config, lookup, publisher).run().await
        }
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote starter configuration to {}", cli.config);
            println!("Edit the [service] section for your building and room, then run: micbridge start");
            Ok(())
        }
        Commands::Probe {
            address,
            count,
            timeout,
        } => {
            let mut connection =
                ReceiverConnection::dial(&address, Duration::from_secs(timeout)).await?;
            eprintln!("connected to {}; reading {} messages", connection.peer(), count);
            for _ in 0..count {
                let message = connection.read_message().await?;
                println!("{}", message);
            }
            Ok(())
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();

    // CLI verbosity overrides the configured base level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let mutex = std::sync::Arc::new(std::sync::Mutex::new(f));

            // When stdout is a terminal, mirror the file log to the console.
            // Under a process supervisor stdout is redirected and the file
            // is the single copy.
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }

    let _ = builder.try_init();
}
