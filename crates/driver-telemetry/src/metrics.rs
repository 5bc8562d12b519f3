//! Prometheus metrics fed by driver events.
//!
//! All metrics follow the naming convention: `driver_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: commands and heartbeats by outcome
//! - **Gauge**: connections currently open
//! - **Histogram**: command and heartbeat round trip times
//!
//! Metrics live in a caller-supplied [`Registry`], so two clients in one
//! process never share counters.

use std::fmt;

use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use driver_events::events::{
    CommandFailedEvent, CommandStartedEvent, CommandSucceededEvent, ConnectionClosedEvent,
    ConnectionOpenedEvent, ServerHeartbeatFailedEvent, ServerHeartbeatStartedEvent,
    ServerHeartbeatSucceededEvent,
};
use driver_events::{Interests, Listener, Subscriber};

use crate::TelemetryError;

/// Outcome label for commands and heartbeats that began.
pub const STARTED: &str = "started";
/// Outcome label for commands and heartbeats that succeeded.
pub const SUCCEEDED: &str = "succeeded";
/// Outcome label for commands and heartbeats that failed.
pub const FAILED: &str = "failed";

/// Listener that records driver activity as Prometheus metrics.
#[derive(Clone)]
pub struct DriverMetrics {
    commands: IntCounterVec,
    command_duration: HistogramVec,
    heartbeats: IntCounterVec,
    heartbeat_duration: HistogramVec,
    open_connections: IntGauge,
}

impl DriverMetrics {
    /// Create the metrics and register them with `registry`.
    pub fn register(registry: &Registry) -> Result<Self, TelemetryError> {
        let metrics = Self::new().map_err(|e| TelemetryError::Metrics(e.to_string()))?;

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.commands.clone()),
            Box::new(metrics.command_duration.clone()),
            Box::new(metrics.heartbeats.clone()),
            Box::new(metrics.heartbeat_duration.clone()),
            Box::new(metrics.open_connections.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        }

        Ok(metrics)
    }

    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            commands: IntCounterVec::new(
                Opts::new("driver_commands_total", "Commands by outcome"),
                &["outcome"],
            )?,
            command_duration: HistogramVec::new(
                HistogramOpts::new(
                    "driver_command_duration_seconds",
                    "Command round trip time",
                )
                .buckets(exponential_buckets(0.0005, 2.0, 16)?),
                &["outcome"],
            )?,
            heartbeats: IntCounterVec::new(
                Opts::new("driver_heartbeats_total", "Server heartbeats by outcome"),
                &["outcome"],
            )?,
            heartbeat_duration: HistogramVec::new(
                HistogramOpts::new(
                    "driver_heartbeat_duration_seconds",
                    "Server heartbeat round trip time",
                )
                .buckets(exponential_buckets(0.001, 2.0, 14)?),
                &["outcome"],
            )?,
            open_connections: IntGauge::new(
                "driver_connections_open",
                "Connections currently open",
            )?,
        })
    }

    /// Number of commands recorded with the given outcome.
    pub fn commands(&self, outcome: &str) -> u64 {
        self.commands.with_label_values(&[outcome]).get()
    }

    /// Number of heartbeats recorded with the given outcome.
    pub fn heartbeats(&self, outcome: &str) -> u64 {
        self.heartbeats.with_label_values(&[outcome]).get()
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> i64 {
        self.open_connections.get()
    }
}

impl fmt::Debug for DriverMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverMetrics")
            .field("commands_started", &self.commands(STARTED))
            .field("commands_failed", &self.commands(FAILED))
            .field("open_connections", &self.open_connections())
            .finish_non_exhaustive()
    }
}

impl Listener<CommandStartedEvent> for DriverMetrics {
    fn apply(&self, _: &CommandStartedEvent) -> anyhow::Result<()> {
        self.commands.with_label_values(&[STARTED]).inc();
        Ok(())
    }
}

impl Listener<CommandSucceededEvent> for DriverMetrics {
    fn apply(&self, event: &CommandSucceededEvent) -> anyhow::Result<()> {
        self.commands.with_label_values(&[SUCCEEDED]).inc();
        self.command_duration
            .with_label_values(&[SUCCEEDED])
            .observe(event.duration.as_secs_f64());
        Ok(())
    }
}

impl Listener<CommandFailedEvent> for DriverMetrics {
    fn apply(&self, event: &CommandFailedEvent) -> anyhow::Result<()> {
        self.commands.with_label_values(&[FAILED]).inc();
        self.command_duration
            .with_label_values(&[FAILED])
            .observe(event.duration.as_secs_f64());
        Ok(())
    }
}

impl Listener<ServerHeartbeatStartedEvent> for DriverMetrics {
    fn apply(&self, _: &ServerHeartbeatStartedEvent) -> anyhow::Result<()> {
        self.heartbeats.with_label_values(&[STARTED]).inc();
        Ok(())
    }
}

impl Listener<ServerHeartbeatSucceededEvent> for DriverMetrics {
    fn apply(&self, event: &ServerHeartbeatSucceededEvent) -> anyhow::Result<()> {
        self.heartbeats.with_label_values(&[SUCCEEDED]).inc();
        self.heartbeat_duration
            .with_label_values(&[SUCCEEDED])
            .observe(event.duration.as_secs_f64());
        Ok(())
    }
}

impl Listener<ServerHeartbeatFailedEvent> for DriverMetrics {
    fn apply(&self, event: &ServerHeartbeatFailedEvent) -> anyhow::Result<()> {
        self.heartbeats.with_label_values(&[FAILED]).inc();
        self.heartbeat_duration
            .with_label_values(&[FAILED])
            .observe(event.duration.as_secs_f64());
        Ok(())
    }
}

impl Listener<ConnectionOpenedEvent> for DriverMetrics {
    fn apply(&self, _: &ConnectionOpenedEvent) -> anyhow::Result<()> {
        self.open_connections.inc();
        Ok(())
    }
}

impl Listener<ConnectionClosedEvent> for DriverMetrics {
    fn apply(&self, _: &ConnectionClosedEvent) -> anyhow::Result<()> {
        self.open_connections.dec();
        Ok(())
    }
}

impl Subscriber for DriverMetrics {
    fn interests(interests: &mut Interests<Self>) {
        interests
            .listen::<CommandStartedEvent>()
            .listen::<CommandSucceededEvent>()
            .listen::<CommandFailedEvent>()
            .listen::<ServerHeartbeatStartedEvent>()
            .listen::<ServerHeartbeatSucceededEvent>()
            .listen::<ServerHeartbeatFailedEvent>()
            .listen::<ConnectionOpenedEvent>()
            .listen::<ConnectionClosedEvent>();
    }

    fn name(&self) -> &'static str {
        "driver-metrics"
    }
}

/// Encode all metrics in `registry` as Prometheus text format.
pub fn encode_metrics(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
