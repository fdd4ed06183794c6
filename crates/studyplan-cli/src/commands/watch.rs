//! Long-running scheduled reset check.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use studyplan_core::{CheckOutcome, Clock, Config, ResetEngine, ResetStateStore};
use tracing::{info, warn};

use super::{open_engine, CliResult};

pub fn run() -> CliResult {
    let config = Config::load()?;
    let engine = Arc::new(open_engine()?);
    let period = Duration::from_secs(config.reset.check_interval_secs.max(1));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        info!(period_secs = period.as_secs(), "watching for day rollover");
        let ticks = watch_until(engine, period, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C, running until killed: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await?;
        info!(ticks, "stopping");
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

/// Run the scheduled check every `period` until `shutdown` completes.
/// The first check runs immediately. Returns the number of checks run.
pub async fn watch_until<S, C, F>(
    engine: Arc<ResetEngine<S, C>>,
    period: Duration,
    shutdown: F,
) -> CliResult<u64>
where
    S: ResetStateStore + Send + 'static,
    C: Clock + 'static,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    let mut ticks = 0;
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick(Arc::clone(&engine)).await?;
                ticks += 1;
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(ticks)
}

/// One scheduled check, off the async workers since store writes block.
pub async fn tick<S, C>(engine: Arc<ResetEngine<S, C>>) -> CliResult<CheckOutcome>
where
    S: ResetStateStore + Send + 'static,
    C: Clock + 'static,
{
    let outcome =
        tokio::task::spawn_blocking(move || engine.check_and_perform_auto_reset()).await?;
    if let CheckOutcome::Reset { outcome } = &outcome {
        println!("{}", serde_json::to_string(outcome)?);
    }
    Ok(outcome)
}
