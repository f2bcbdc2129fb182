use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::librelink::GlucoseFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Updated,
    Failed,
    Skipped,
}

/// 执行一轮轮询，上一轮未结束时直接跳过
pub async fn run_cycle(fetcher: &GlucoseFetcher) -> CycleOutcome {
    let store = fetcher.store();
    let Some(_guard) = store.try_begin_cycle() else {
        warn!("Previous glucose refresh still running, skipping this tick");
        store.record_skip().await;
        return CycleOutcome::Skipped;
    };

    match fetcher.refresh().await {
        Ok(reading) => {
            store.record_success().await;
            if let Some(uploader) = fetcher.uploader() {
                match uploader.upload(&reading).await {
                    Ok(()) => store.record_upload(None).await,
                    Err(e) => {
                        warn!("Nightscout upload failed: {}", e);
                        store.record_upload(Some(e.to_string())).await;
                    }
                }
            }
            CycleOutcome::Updated
        }
        Err(e) => {
            warn!("Glucose refresh failed: {}", e);
            store.record_failure(e.to_string()).await;
            CycleOutcome::Failed
        }
    }
}

/// 启动定时轮询，第一轮立即执行
pub fn spawn(fetcher: GlucoseFetcher, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Polling glucose data every {:?}", period);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                run_cycle(&fetcher).await;
            });
        }
    })
}
