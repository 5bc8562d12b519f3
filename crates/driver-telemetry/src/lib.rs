//! # Driver Telemetry
//!
//! Ready-made observers for the driver's [`EventHub`](driver_events::EventHub).
//!
//! ## Components
//!
//! - [`init_logging`]: global `tracing` subscriber (pretty or JSON)
//! - [`EventLogger`]: logs every driver event
//! - [`DriverMetrics`]: Prometheus counters, gauges and histograms
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use driver_events::EventHub;
//! use driver_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let registry = prometheus::Registry::new();
//! let hub = EventHub::new();
//! init_telemetry(&config, &hub, &registry).expect("Failed to init telemetry");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `driver` | Service name in log records |
//! | `DRIVER_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `DRIVER_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `DRIVER_JSON_LOGS` | `false` | JSON log lines (default on in containers) |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, EventLogger};
pub use metrics::{encode_metrics, DriverMetrics, FAILED, STARTED, SUCCEEDED};

use std::sync::Arc;

use driver_events::{EventHub, HubError};
use prometheus::Registry;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    Metrics(String),

    #[error("Failed to subscribe telemetry listener: {0}")]
    Subscribe(#[from] HubError),
}

/// Attach the event logger and metrics to `hub` without touching the global
/// `tracing` subscriber.
///
/// Returns the metrics handle so callers can read values directly.
pub fn observe(
    config: &TelemetryConfig,
    hub: &EventHub,
    registry: &Registry,
) -> Result<Arc<DriverMetrics>, TelemetryError> {
    let metrics = Arc::new(DriverMetrics::register(registry)?);

    hub.subscribe(Arc::new(EventLogger::new(config)))?;
    hub.subscribe(Arc::clone(&metrics))?;

    tracing::debug!(service = %config.service_name, "Telemetry listeners attached");
    Ok(metrics)
}

/// Install logging, then attach the event logger and metrics to `hub`.
pub fn init_telemetry(
    config: &TelemetryConfig,
    hub: &EventHub,
    registry: &Registry,
) -> Result<Arc<DriverMetrics>, TelemetryError> {
    init_logging(config)?;
    let metrics = observe(config, hub, registry)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(metrics)
}
