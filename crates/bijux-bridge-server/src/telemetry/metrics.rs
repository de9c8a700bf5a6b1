// SPDX-License-Identifier: Apache-2.0

use crate::coordinator::{GatewayError, LegacyStoreOutcome, NewStoreOutcome, StoreSide};
use bijux_bridge_model::Source;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const METRIC_SUBSYSTEM: &str = "bridge";
pub const METRIC_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Default)]
pub struct GatewayMetrics {
    pub lookups_new_db: AtomicU64,
    pub lookups_legacy_db: AtomicU64,
    pub lookups_not_found: AtomicU64,
    pub lookups_new_unavailable: AtomicU64,
    pub lookups_legacy_unavailable: AtomicU64,
    pub creates_written: AtomicU64,
    pub creates_rejected: AtomicU64,
    pub creates_new_failed: AtomicU64,
    pub creates_legacy_failed: AtomicU64,
    pub creates_legacy_cancelled: AtomicU64,
    pub creates_cancelled: AtomicU64,
    pub stats_failures: AtomicU64,
    request_counts: Mutex<BTreeMap<(String, u16), u64>>,
    request_latency_ns: Mutex<BTreeMap<String, (u64, u128)>>,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl GatewayMetrics {
    pub fn observe_lookup(&self, result: Result<Source, &GatewayError>) {
        match result {
            Ok(Source::NewDb) => bump(&self.lookups_new_db),
            Ok(Source::LegacyDb) => bump(&self.lookups_legacy_db),
            Err(GatewayError::NotFound(_)) => bump(&self.lookups_not_found),
            Err(GatewayError::UpstreamUnavailable {
                side: StoreSide::New,
                ..
            }) => bump(&self.lookups_new_unavailable),
            Err(GatewayError::UpstreamUnavailable {
                side: StoreSide::Legacy,
                ..
            }) => bump(&self.lookups_legacy_unavailable),
            Err(_) => {}
        }
    }

    pub fn observe_create(&self, result: Result<(), &GatewayError>) {
        match result {
            Ok(()) => bump(&self.creates_written),
            Err(GatewayError::Validation(_)) => bump(&self.creates_rejected),
            Err(GatewayError::Cancelled) => bump(&self.creates_cancelled),
            Err(GatewayError::PartialFailure(p)) => match (&p.new_store, &p.legacy_store) {
                (NewStoreOutcome::Failed(_), _) => bump(&self.creates_new_failed),
                (_, LegacyStoreOutcome::Cancelled) => bump(&self.creates_legacy_cancelled),
                _ => bump(&self.creates_legacy_failed),
            },
            Err(_) => {}
        }
    }

    pub async fn observe_request(&self, route: &str, status: u16, latency: Duration) {
        *self
            .request_counts
            .lock()
            .await
            .entry((route.to_string(), status))
            .or_insert(0) += 1;
        let mut latency_map = self.request_latency_ns.lock().await;
        let entry = latency_map.entry(route.to_string()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += latency.as_nanos();
    }

    /// Prometheus text exposition of every counter.
    pub async fn render(&self) -> String {
        let labels = format!("subsystem=\"{METRIC_SUBSYSTEM}\",version=\"{METRIC_VERSION}\"");
        let mut body = String::new();
        for (source, counter) in [
            ("new_db", &self.lookups_new_db),
            ("legacy_db", &self.lookups_legacy_db),
        ] {
            let _ = writeln!(
                body,
                "bijux_bridge_lookups_total{{{labels},outcome=\"hit\",source=\"{source}\"}} {}",
                counter.load(Ordering::Relaxed)
            );
        }
        for (outcome, counter) in [
            ("not_found", &self.lookups_not_found),
            ("new_unavailable", &self.lookups_new_unavailable),
            ("legacy_unavailable", &self.lookups_legacy_unavailable),
        ] {
            let _ = writeln!(
                body,
                "bijux_bridge_lookups_total{{{labels},outcome=\"{outcome}\",source=\"none\"}} {}",
                counter.load(Ordering::Relaxed)
            );
        }
        for (outcome, counter) in [
            ("written", &self.creates_written),
            ("validation_failed", &self.creates_rejected),
            ("new_failed", &self.creates_new_failed),
            ("legacy_failed", &self.creates_legacy_failed),
            ("legacy_cancelled", &self.creates_legacy_cancelled),
            ("cancelled", &self.creates_cancelled),
        ] {
            let _ = writeln!(
                body,
                "bijux_bridge_dual_writes_total{{{labels},outcome=\"{outcome}\"}} {}",
                counter.load(Ordering::Relaxed)
            );
        }
        let _ = writeln!(
            body,
            "bijux_bridge_stats_failures_total{{{labels}}} {}",
            self.stats_failures.load(Ordering::Relaxed)
        );
        for ((route, status), count) in self.request_counts.lock().await.iter() {
            let _ = writeln!(
                body,
                "bijux_bridge_http_requests_total{{{labels},route=\"{route}\",status=\"{status}\"}} {count}"
            );
        }
        for (route, (count, sum_ns)) in self.request_latency_ns.lock().await.iter() {
            let sum_seconds = *sum_ns as f64 / 1_000_000_000.0;
            let _ = writeln!(
                body,
                "bijux_bridge_http_request_duration_seconds_sum{{{labels},route=\"{route}\"}} {sum_seconds:.9}"
            );
            let _ = writeln!(
                body,
                "bijux_bridge_http_request_duration_seconds_count{{{labels},route=\"{route}\"}} {count}"
            );
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::PartialFailure;
    use crate::store::StoreError;
    use bijux_bridge_model::CustomerId;

    #[tokio::test]
    async fn render_reports_outcome_counters() {
        let m = GatewayMetrics::default();
        m.observe_lookup(Ok(Source::LegacyDb));
        m.observe_lookup(Err(&GatewayError::NotFound(CustomerId::from_sequence(1))));
        m.observe_create(Err(&GatewayError::PartialFailure(PartialFailure {
            new_store: NewStoreOutcome::Committed(CustomerId::from_sequence(2)),
            legacy_store: LegacyStoreOutcome::Failed(StoreError::unavailable("down")),
        })));
        m.observe_request("/api/customer/:id", 200, Duration::from_millis(3))
            .await;

        let body = m.render().await;
        assert!(body.contains("outcome=\"hit\",source=\"legacy_db\"} 1"));
        assert!(body.contains("outcome=\"not_found\",source=\"none\"} 1"));
        assert!(body.contains("bijux_bridge_dual_writes_total{subsystem=\"bridge\""));
        assert!(body.contains("outcome=\"legacy_failed\"} 1"));
        assert!(body.contains("route=\"/api/customer/:id\",status=\"200\"} 1"));
    }
}
