use clap::Parser;
use mealpool_core::{AccountId, DEFAULT_DAILY_LIMIT, SECONDS_PER_DAY};
use mealpool_service::{build_router, ServiceConfig, ServiceState};
use std::net::SocketAddr;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mealpoold", version, about = "Meal funding pool REST service")]
struct Cli {
    /// Socket address to bind, e.g. 127.0.0.1:8092
    #[arg(long, default_value = "127.0.0.1:8092")]
    listen: SocketAddr,
    /// Identity that owns the pool's admin surface.
    #[arg(long, default_value = "owner", env = "MEALPOOL_OWNER")]
    owner: String,
    /// Per-recipient daily cap in minor units.
    #[arg(long, default_value_t = DEFAULT_DAILY_LIMIT, env = "MEALPOOL_DAILY_LIMIT")]
    daily_limit: u64,
    /// Epoch day length in seconds.
    #[arg(long, default_value_t = SECONDS_PER_DAY, env = "MEALPOOL_DAY_LENGTH_SECS")]
    day_length_secs: u64,
    /// Run with a manually advanced day clock (for local simulation).
    #[arg(long, default_value_t = false)]
    manual_clock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mealpool_service=info,info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig {
        owner: AccountId::new(cli.owner),
        daily_limit: cli.daily_limit,
        day_length_secs: cli.day_length_secs,
        manual_clock: cli.manual_clock,
    };
    let state = ServiceState::bootstrap(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("mealpool-service listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
