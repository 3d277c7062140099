//! Health reporting types
//!
//! The shapes here form the external health-endpoint contract, so they all
//! serialize; latency is rendered in milliseconds.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Overall health verdict for the cache connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The probe succeeded
    Healthy,
    /// The probe failed or timed out against a supposedly live handle
    Unhealthy,
    /// No live handle; nothing was probed
    Disconnected,
}

/// Result of a direct health probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Health verdict
    pub status: HealthStatus,

    /// Measured probe round-trip, when a probe was issued
    #[serde(
        rename = "latency_ms",
        serialize_with = "serialize_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub latency: Option<Duration>,

    /// Probe failure detail, when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Store-reported metrics, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreInfo>,
}

impl HealthReport {
    /// Report for a manager with no live handle
    pub fn disconnected() -> Self {
        Self {
            status: HealthStatus::Disconnected,
            latency: None,
            error: None,
            store: None,
        }
    }

    /// Report for a successful probe
    pub fn healthy(latency: Duration, store: Option<StoreInfo>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency: Some(latency),
            error: None,
            store,
        }
    }

    /// Report for a failed probe
    pub fn unhealthy(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency: Some(latency),
            error: Some(error.into()),
            store: None,
        }
    }
}

/// Metrics reported by the store's stats call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreInfo {
    /// Server version string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Server uptime in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,

    /// Currently connected clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_clients: Option<u64>,

    /// Memory used by the store, in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_memory_bytes: Option<u64>,

    /// Keyspace hits since server start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyspace_hits: Option<u64>,

    /// Keyspace misses since server start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyspace_misses: Option<u64>,
}

impl StoreInfo {
    /// Keyspace hit ratio (0.0 to 1.0), when the store reports both counters
    pub fn hit_ratio(&self) -> Option<f64> {
        let hits = self.keyspace_hits?;
        let misses = self.keyspace_misses?;
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some(hits as f64 / total as f64)
        }
    }
}

fn serialize_millis<S: Serializer>(
    latency: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match latency {
        Some(d) => serializer.serialize_f64(d.as_secs_f64() * 1000.0),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Disconnected).unwrap(),
            "\"disconnected\""
        );
    }

    #[test]
    fn test_disconnected_report_shape() {
        let report = HealthReport::disconnected();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"status": "disconnected"}));
    }

    #[test]
    fn test_healthy_report_renders_latency_ms() {
        let report = HealthReport::healthy(Duration::from_millis(12), None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["latency_ms"], 12.0);
    }

    #[test]
    fn test_unhealthy_report_carries_error() {
        let report = HealthReport::unhealthy(Duration::from_millis(3), "probe timed out");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "probe timed out");
    }

    #[test]
    fn test_hit_ratio() {
        let info = StoreInfo {
            keyspace_hits: Some(80),
            keyspace_misses: Some(20),
            ..Default::default()
        };
        assert!((info.hit_ratio().unwrap() - 0.8).abs() < f64::EPSILON);

        assert_eq!(StoreInfo::default().hit_ratio(), None);
    }
}
