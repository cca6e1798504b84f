use clap::Parser;
use mock_api_server::config::{self, AppState, Overrides};
use mock_api_server::{logger, server};
use std::sync::Arc;

/// HTTP test double serving static files and programmable mocks
#[derive(Debug, Parser)]
#[command(name = "mock_api_server", version)]
struct Cli {
    /// Config file path without extension
    #[arg(long, default_value = "config")]
    config: String,

    /// Address to bind to
    #[arg(long)]
    host: Option<String>,

    /// TCP port to bind to
    #[arg(long)]
    port: Option<u16>,

    /// Static root directory
    #[arg(long)]
    root: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        host: cli.host,
        port: cli.port,
        root: cli.root,
    };
    let cfg = config::Config::load_from(&cli.config, &overrides)?;
    logger::init(&cfg)?;

    // Single-threaded unless workers are configured
    let runtime = match cfg.server.workers {
        Some(workers) => tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()?,
        None => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?,
    };

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg));

    logger::log_server_start(&addr, &cfg);
    server::start_signal_handler(Arc::clone(&state.shutdown));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await?;
    Ok(())
}
