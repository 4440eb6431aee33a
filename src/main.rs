//! Attendance Relay - Main Server

use anyhow::Result;
use attendance_relay::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "attendance-relay")]
#[command(about = "Real-time change notification server for the attendance service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the notification server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Root directory for uploaded photos
        #[arg(long)]
        upload_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,attendance_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port, upload_dir } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(upload_dir) = upload_dir {
                config.upload_dir = upload_dir;
            }
            attendance_relay::start_server(config).await
        }
    }
}
