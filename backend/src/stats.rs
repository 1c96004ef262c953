use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::RiskCategory;

/// Process-lifetime counters. Nothing about individual predictions is kept.
#[derive(Debug)]
pub struct ServiceStats {
    started_at: chrono::DateTime<chrono::Utc>,
    requests: AtomicU64,
    rejected: AtomicU64,
    low: AtomicU64,
    moderate: AtomicU64,
    high: AtomicU64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub started_at: String,
    pub uptime_secs: i64,
    pub requests: u64,
    pub rejected: u64,
    pub predictions: u64,
    pub low: u64,
    pub moderate: u64,
    pub high: u64,
}

impl Default for ServiceStats {
    fn default() -> Self {
        ServiceStats {
            started_at: chrono::Utc::now(),
            requests: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            low: AtomicU64::new(0),
            moderate: AtomicU64::new(0),
            high: AtomicU64::new(0),
        }
    }
}

impl ServiceStats {
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self, category: RiskCategory) {
        let counter = match category {
            RiskCategory::Low => &self.low,
            RiskCategory::Moderate => &self.moderate,
            RiskCategory::High => &self.high,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let low = self.low.load(Ordering::Relaxed);
        let moderate = self.moderate.load(Ordering::Relaxed);
        let high = self.high.load(Ordering::Relaxed);
        StatsSnapshot {
            started_at: self.started_at.to_rfc3339(),
            uptime_secs: (chrono::Utc::now() - self.started_at).num_seconds(),
            requests: self.requests.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            predictions: low + moderate + high,
            low,
            moderate,
            high,
        }
    }
}
