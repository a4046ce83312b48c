use super::*;

#[test]
fn healthy_serializes_to_status_healthy() {
    let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[test]
fn degraded_is_not_healthy() {
    assert!(!HealthStatus::Degraded.is_healthy());
}

#[test]
fn metrics_health_summary_omits_absent_error() {
    let summary = MetricsHealthSummary { last_sweep_at_ms: 10, last_error: None };
    let json = serde_json::to_value(&summary).unwrap();
    assert!(json.get("last_error").is_none());
}
