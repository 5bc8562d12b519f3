//! # Telemetry Observers End to End
//!
//! The logging and metrics observers attached to a hub that a simulated
//! connection publishes into.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prometheus::Registry;

    use driver_events::events::{CommandStartedEvent, ConnectionClosedEvent};
    use driver_events::{DeliveryPolicy, EventHub, EventPublisher, HubConfig};
    use driver_telemetry::{encode_metrics, observe, TelemetryConfig, FAILED, STARTED, SUCCEEDED};

    use crate::fixtures::{journal, FailingListener, FakeConnection, StartRecorder};

    #[test]
    fn test_metrics_follow_connection_activity() {
        let hub = EventHub::new();
        let registry = Registry::new();
        let metrics = observe(&TelemetryConfig::default(), &hub, &registry).unwrap();

        let mut conn = FakeConnection::open(&hub, 1).unwrap();
        conn.run("find", None).unwrap();
        conn.run("find", None).unwrap();
        conn.run("aggregate", Some("operation exceeded time limit")).unwrap();
        assert_eq!(metrics.open_connections(), 1);
        conn.close().unwrap();

        assert_eq!(metrics.commands(STARTED), 3);
        assert_eq!(metrics.commands(SUCCEEDED), 2);
        assert_eq!(metrics.commands(FAILED), 1);
        assert_eq!(metrics.open_connections(), 0);

        let text = encode_metrics(&registry).unwrap();
        assert!(text.contains(r#"driver_commands_total{outcome="succeeded"} 2"#));
        assert!(text.contains("driver_connections_open 0"));
    }

    #[test]
    fn test_observers_share_hub_with_application_listeners() {
        let hub = EventHub::new();
        let journal = journal();
        hub.subscribe(Arc::new(StartRecorder {
            tag: "app",
            journal: Arc::clone(&journal),
        }))
        .unwrap();
        let registry = Registry::new();
        let metrics = observe(&TelemetryConfig::default(), &hub, &registry).unwrap();

        let mut conn = FakeConnection::open(&hub, 1).unwrap();
        conn.run("count", None).unwrap();

        assert_eq!(hub.listener_count::<CommandStartedEvent>(), 3);
        assert_eq!(hub.listener_count::<ConnectionClosedEvent>(), 2);
        assert_eq!(*journal.lock(), vec!["app:started:count"]);
        assert_eq!(metrics.commands(STARTED), 1);
    }

    #[test]
    fn test_isolation_keeps_metrics_accurate_despite_failing_listener() {
        let hub = EventHub::with_config(
            HubConfig::default().with_delivery(DeliveryPolicy::Isolate),
        );
        hub.subscribe(Arc::new(FailingListener)).unwrap();
        let registry = Registry::new();
        let metrics = observe(&TelemetryConfig::default(), &hub, &registry).unwrap();

        let mut conn = FakeConnection::open(&hub, 1).unwrap();
        assert!(conn.run("find", None).is_err());

        // The failing listener ran first, yet the metrics listener still saw the start.
        assert_eq!(metrics.commands(STARTED), 1);
        assert_eq!(hub.events_published(), 2);
    }
}
