use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docrag::cli::{
    run_ask, run_chat, run_index, run_index_clear, run_index_status, run_init, run_search, Args,
    Command,
};
use docrag::Config;

fn init_telemetry(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so command output on stdout stays machine-readable.
    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_telemetry(&args);

    let config = Config::from_env()?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        data_folder = %config.data_folder.display(),
        index = %config.index_path().display(),
        "docrag starting"
    );

    match args.command {
        Some(Command::Init) => run_init(&config),
        Some(Command::Index { clear }) => run_index(&config, clear).await,
        Some(Command::Status) => run_index_status(&config).await,
        Some(Command::Clear) => run_index_clear(&config).await,
        Some(Command::Search { query, k, json }) => run_search(&config, &query, k, json).await,
        Some(Command::Ask { question, k }) => run_ask(&config, &question, k).await,
        Some(Command::Chat { rebuild }) => run_chat(&config, rebuild).await,
        None => run_chat(&config, false).await,
    }
}
