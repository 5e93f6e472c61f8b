use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

mod api;
mod context;
mod server;
mod ws;

#[derive(Parser, Debug, Clone)]
#[command(name = "ytlive")]
#[command(author, version, about = "YouTube live-stream aggregation backend (WebSub push + fallback polling)")]
pub struct Args {
    /// Address the HTTP server binds to
    #[arg(long, env = "YTLIVE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://postgres@localhost:5432/ytlive")]
    pub database_url: String,

    /// Redis connection URL for the live-status cache.
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Server-side YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY")]
    pub youtube_api_key: String,

    /// Public URL the hub calls back; must route to /websub/callback
    #[arg(long, env = "WEBSUB_CALLBACK_URL")]
    pub callback_url: String,

    #[arg(long, env = "WEBSUB_HUB_URL", default_value = ytlive_core::config::DEFAULT_HUB_URL)]
    pub hub_url: String,

    /// Shared secret the hub signs pushed bodies with
    #[arg(long, env = "WEBSUB_SECRET", default_value = "")]
    pub websub_secret: String,

    #[arg(long, env = "WEBSUB_LEASE_SECONDS", default_value_t = ytlive_core::config::DEFAULT_LEASE_SECONDS)]
    pub lease_seconds: u64,

    #[arg(long, env = "YOUTUBE_DAILY_QUOTA", default_value_t = ytlive_core::config::DEFAULT_DAILY_QUOTA)]
    pub daily_quota: i64,

    /// Seconds between fallback sweeps
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 900)]
    pub poll_interval_secs: u64,

    /// Max channels checked per sweep
    #[arg(long, env = "POLL_BATCH_SIZE", default_value_t = 10)]
    pub poll_batch_size: i64,

    /// Pause between two channel checks within a sweep
    #[arg(long, env = "POLL_DELAY_SECS", default_value_t = 2)]
    pub poll_delay_secs: u64,

    /// Timeout for every outbound HTTP request
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "WEBHOOK_QUEUE_CAPACITY", default_value_t = 1024)]
    pub webhook_queue_capacity: usize,

    #[arg(long, env = "LEASE_RENEWAL_INTERVAL_SECS", default_value_t = 3600)]
    pub lease_renewal_interval_secs: u64,

    /// Renew leases expiring within this many seconds
    #[arg(long, env = "LEASE_RENEW_AHEAD_SECS", default_value_t = 86_400)]
    pub lease_renew_ahead_secs: u64,
}

fn init_tracing() {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("log bridge already installed: {e}");
    }
    let filter = EnvFilter::from_default_env()
        .add_directive("ytlive=info".parse().unwrap_or_default())
        .add_directive("ytlive_core=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments pass plain env vars.
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "ytlive starting. bind={}, callback={}, hub={}",
        args.bind_addr, args.callback_url, args.hub_url
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
