mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{Behavior, MockVendor, fetcher, start_vendor, vendor_config};
use glucose_relay::config::NightscoutConfig;
use glucose_relay::nightscout::NightscoutUploader;
use glucose_relay::scheduler::{CycleOutcome, run_cycle};
use glucose_relay::utils::nightscout_secret_hash;

fn uploader(base: &str) -> NightscoutUploader {
    NightscoutUploader::new(&NightscoutConfig {
        url: base.to_string(),
        api_secret: "ns-secret".into(),
        request_timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn successful_cycle_posts_sgv_entry_with_hashed_secret() {
    let (vendor, base) = start_vendor(Behavior::default()).await;
    let (fetcher, store) = fetcher(vendor_config(&base));
    let fetcher = fetcher.with_uploader(uploader(&base));

    assert_eq!(run_cycle(&fetcher).await, CycleOutcome::Updated);

    let entries = vendor.entries();
    assert_eq!(entries.len(), 1);
    let (secret, body) = &entries[0];
    assert_eq!(secret.as_deref(), Some(nightscout_secret_hash("ns-secret").as_str()));
    assert_eq!(body["type"], "sgv");
    assert_eq!(body["sgv"], 110);
    assert_eq!(body["direction"], "Flat");
    let measured = Utc.with_ymd_and_hms(2024, 11, 18, 17, 40, 12).unwrap();
    assert_eq!(body["date"], measured.timestamp_millis());

    let status = store.status().await;
    assert!(status.last_upload_at.is_some());
    assert!(status.last_upload_error.is_none());
}

#[tokio::test]
async fn upload_failure_leaves_cached_reading_untouched() {
    let (vendor, base) = start_vendor(Behavior {
        nightscout_status: StatusCode::UNAUTHORIZED,
        ..Default::default()
    })
    .await;
    let (fetcher, store) = fetcher(vendor_config(&base));
    let fetcher = fetcher.with_uploader(uploader(&base));

    assert_eq!(run_cycle(&fetcher).await, CycleOutcome::Updated);

    assert_eq!(vendor.entries().len(), 1);
    assert_eq!(store.latest().await.unwrap().value, 110.0);
    let status = store.status().await;
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_error.is_none());
    assert!(status.last_upload_at.is_none());
    assert!(status.last_upload_error.unwrap().contains("401"));
}

#[tokio::test]
async fn failed_fetch_uploads_nothing() {
    let (vendor, base) = start_vendor(Behavior {
        patients: Vec::new(),
        ..Default::default()
    })
    .await;
    let (fetcher, store) = fetcher(vendor_config(&base));
    let fetcher = fetcher.with_uploader(uploader(&base));

    assert_eq!(run_cycle(&fetcher).await, CycleOutcome::Failed);

    assert!(vendor.entries().is_empty());
    assert!(store.status().await.last_upload_at.is_none());
}

#[tokio::test]
async fn cycles_without_uploader_never_reach_nightscout() {
    let (vendor, base) = start_vendor(Behavior::default()).await;
    let (fetcher, _store) = fetcher(vendor_config(&base));

    assert_eq!(run_cycle(&fetcher).await, CycleOutcome::Updated);

    assert!(fetcher.uploader().is_none());
    assert!(vendor.entries().is_empty());
    assert_eq!(MockVendor::hits(&vendor.graph_hits), 1);
}
