//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

mod common;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use advocate::telemetry;
use advocate::{Advocate, FreeTierConfig, FreeTierLimiter, GuidancePipeline, GuidanceRequest};

use common::{ScriptedProvider, models, quota};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for a name whose labels include `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn pipeline(provider: &std::sync::Arc<ScriptedProvider>) -> GuidancePipeline {
    Advocate::builder()
        .credentials(["key-1", "key-2"])
        .models(models())
        .provider(provider.clone())
        .build()
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn miss_then_hit_records_cache_and_request_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let provider = ScriptedProvider::answering();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let pipeline = pipeline(&provider);
                let request = GuidanceRequest::new("Employer withheld final salary");
                pipeline.answer(&request).await.unwrap();
                pipeline.answer(&request).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 2);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "source", "cache"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::PROVIDER_ATTEMPTS_TOTAL, "outcome", "ok"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn exhaustion_records_rotations() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let provider = ScriptedProvider::failing(quota);

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let pipeline = pipeline(&provider);
                let request = GuidanceRequest::new("Bank charged hidden fees");
                pipeline.answer(&request).await.unwrap_err();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::CREDENTIAL_ROTATIONS_TOTAL,
            "reason",
            "quota_exhausted"
        ),
        2
    );
    assert_eq!(counter_total(&snapshot, telemetry::PROVIDERS_EXHAUSTED_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "error"),
        1
    );
}

#[test]
fn free_tier_rejection_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let limiter = FreeTierLimiter::in_memory(FreeTierConfig {
            daily_limit: 1,
            ..FreeTierConfig::default()
        });
        limiter.record_success("device-1").unwrap();
        assert!(limiter.check("device-1").is_err());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(&snapshot, telemetry::FREE_TIER_REJECTIONS_TOTAL),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let provider = ScriptedProvider::answering();
    let pipeline = pipeline(&provider);
    pipeline
        .answer(&GuidanceRequest::new("Consumer court filing"))
        .await
        .unwrap();
}
