//! RSS Courier — Binary Entrypoint
//! One scheduled invocation: fetch feeds, plan, dispatch, persist, exit.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rss_courier::{runner, HttpFeedFetcher, RunConfig, TelegramNotifier};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RunConfig::from_env()?;
    let fetcher = HttpFeedFetcher::new(&cfg.user_agent, cfg.request_timeout)?;
    let notifier = TelegramNotifier::new(
        cfg.bot_token.clone(),
        cfg.chat_id.clone(),
        cfg.request_timeout,
    )?
    .with_link_preview_disabled(cfg.disable_link_preview);

    runner::run_once(&cfg, &fetcher, &notifier).await?;
    Ok(())
}
