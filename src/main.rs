mod analyzer;
mod board;
mod config;
mod fetcher;
mod market;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod utils;

use analyzer::AnalyzerImpl;
use board::SignalBoard;
use config::{AppConfig, CoinConfig, load_config};
use fetcher::{ReqwestTransport, ResilientFetcher, Transport};
use model::{PricePosition, SignalError, SignalReport};
use pipeline::SignalPipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use futures::future::join_all;

/// How long Ctrl-C waits for in-flight cycles before aborting them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    // Load configuration from file (first argument, default config.json)
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", path, e);
            return;
        }
    };

    let transport = match ReqwestTransport::new(config.request_timeout()) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };
    let policy = match config.retry_policy() {
        Ok(p) => p,
        Err(e) => {
            error!("Invalid retry policy: {}", e);
            return;
        }
    };

    let pipeline = Arc::new(SignalPipeline::new(
        ResilientFetcher::new(transport, policy),
        AnalyzerImpl::new(config.ema_periods.clone()),
        config.api_base_url.clone(),
        config.vs_currency.clone(),
        config.timeframe,
    ));
    let board = Arc::new(SignalBoard::new());

    info!(
        coins = config.coins.len(),
        timeframe = pipeline.timeframe().as_str(),
        vs_currency = %config.vs_currency,
        max_retries = pipeline.retry_policy().max_retries(),
        initial_backoff_ms = pipeline.retry_policy().initial_backoff().as_millis() as u64,
        "Starting EMA signal monitor, refreshing every {}s",
        config.refresh_interval_seconds
    );

    // The first tick fires immediately. Cycles run as tasks so a slow one
    // (long backoff) never delays the next tick; the board sorts out overlaps.
    let mut ticker = interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = JoinSet::new();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("Timer triggered.");
                cycles.spawn(run_cycle(pipeline.clone(), board.clone(), config.clone()));
            }
            Some(done) = cycles.join_next(), if !cycles.is_empty() => {
                if let Err(e) = done {
                    error!("Refresh cycle failed: {}", e);
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested.");
                break;
            }
        }
    }

    let aborted = drain_cycles(&mut cycles, SHUTDOWN_GRACE).await;
    info!(aborted, "Exiting.");
}

/// Waits up to `grace` for in-flight cycles, then aborts the rest.
/// Returns how many cycles were aborted.
async fn drain_cycles(cycles: &mut JoinSet<()>, grace: Duration) -> usize {
    if cycles.is_empty() {
        return 0;
    }
    info!("Waiting up to {}s for {} in-flight cycles...", grace.as_secs(), cycles.len());

    let drained = timeout(grace, async {
        while let Some(done) = cycles.join_next().await {
            if let Err(e) = done {
                error!("Refresh cycle failed: {}", e);
            }
        }
    })
    .await;
    if drained.is_ok() {
        return 0;
    }

    let pending = cycles.len();
    warn!("Aborting {} unfinished cycles", pending);
    cycles.shutdown().await;
    pending
}

/// Processes every configured coin concurrently.
async fn run_cycle<T: Transport>(
    pipeline: Arc<SignalPipeline<T>>,
    board: Arc<SignalBoard>,
    config: Arc<AppConfig>,
) {
    let tasks: Vec<_> = config
        .coins
        .iter()
        .map(|coin| process_coin(coin, &pipeline, &board))
        .collect();
    join_all(tasks).await;
    debug!("Cycle finished, {} coins on the board", board.len().await);

    // Summaries come from the board, so an overlapping cycle that already
    // published something newer wins over this cycle's own result.
    for coin in &config.coins {
        match board.latest(&coin.id).await {
            Some(report) => log_report(coin, &report),
            None => info!("{}: no signal yet", coin.label()),
        }
    }
}

/// Runs the pipeline for one coin and publishes the report to the board.
///
/// Only successful reports take part in last-writer-wins. A failed newer
/// invocation publishes nothing, so an older invocation that succeeds later
/// still lands on the board.
async fn process_coin<T: Transport>(
    coin: &CoinConfig,
    pipeline: &SignalPipeline<T>,
    board: &SignalBoard,
) {
    let ticket = board.issue();
    info!("Fetching {}...", coin.label());

    let report = match pipeline.run(&coin.id).await {
        Ok(report) => report,
        Err(SignalError::Fetch(e)) if e.status() == Some(429) => {
            warn!("{}: rate limit exceeded, will retry on the next refresh", coin.label());
            return;
        }
        Err(SignalError::Fetch(e)) if e.status() == Some(404) => {
            warn!("{}: coin '{}' not found by the market API", coin.label(), coin.id);
            return;
        }
        Err(e) => {
            warn!("{}: {}", coin.label(), e);
            return;
        }
    };

    if !board.publish(ticket, report).await {
        debug!("{}: result superseded by a newer refresh", coin.label());
    }
}

fn log_report(coin: &CoinConfig, report: &SignalReport) {
    info!(
        "{} {:.4} | {} ({:.0}% bullish, {} above / {} below of {} EMAs)",
        coin.label(),
        report.current_price,
        report.tally.label,
        report.tally.bullish_percentage,
        report.tally.bullish,
        report.tally.bearish,
        report.emas.len()
    );

    for (period, position) in &report.positions {
        let ema = report.emas.get(*period).flatten();
        match (position, ema) {
            (PricePosition::Unknown, _) | (_, None) => {
                info!("  EMA{:<4} n/a (not enough data)", period);
            }
            (position, Some(value)) => {
                info!("  EMA{:<4} {:.4} price {:?}", period, value, position);
            }
        }
    }

    match serde_json::to_string(report) {
        Ok(json) => debug!(report = %json, "signal report"),
        Err(e) => warn!("Failed to serialize report: {}", e),
    }
}
