//! Structured logging for driver events.
//!
//! [`init_logging`] installs the global `tracing` subscriber. [`EventLogger`]
//! turns driver events into log records with consistent fields:
//! - `service`: Service name from [`TelemetryConfig`]
//! - `connection` / `server`: Where the event happened
//! - `command`, `request_id`, `duration_ms`: Command monitoring fields
//!
//! Failures log at `warn`, state changes at `info`, the rest at `debug`.

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use driver_events::events::{
    CommandFailedEvent, CommandStartedEvent, CommandSucceededEvent, ConnectionClosedEvent,
    ConnectionOpenedEvent, ServerHeartbeatFailedEvent, ServerHeartbeatStartedEvent,
    ServerHeartbeatSucceededEvent,
};
use driver_events::{Interests, Listener, Subscriber};

use crate::{TelemetryConfig, TelemetryError};

/// Build the level filter for `config`.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global `tracing` subscriber.
///
/// JSON output for containers/production, human-readable output otherwise.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);

    let result = match (config.console_output, config.json_logs) {
        (false, _) => registry.try_init(),
        (true, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        (true, false) => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

/// Listener that logs every driver event through `tracing`.
#[derive(Debug, Clone)]
pub struct EventLogger {
    service: String,
}

impl EventLogger {
    /// Create a logger tagging records with the configured service name.
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            service: config.service_name.clone(),
        }
    }
}

impl Listener<CommandStartedEvent> for EventLogger {
    fn apply(&self, event: &CommandStartedEvent) -> anyhow::Result<()> {
        debug!(
            service = %self.service,
            connection = %event.connection_id,
            request_id = event.request_id,
            database = %event.database_name,
            command = %event.command_name,
            "Command started"
        );
        Ok(())
    }
}

impl Listener<CommandSucceededEvent> for EventLogger {
    fn apply(&self, event: &CommandSucceededEvent) -> anyhow::Result<()> {
        debug!(
            service = %self.service,
            connection = %event.connection_id,
            request_id = event.request_id,
            command = %event.command_name,
            duration_ms = event.duration.as_millis() as u64,
            "Command succeeded"
        );
        Ok(())
    }
}

impl Listener<CommandFailedEvent> for EventLogger {
    fn apply(&self, event: &CommandFailedEvent) -> anyhow::Result<()> {
        warn!(
            service = %self.service,
            connection = %event.connection_id,
            request_id = event.request_id,
            command = %event.command_name,
            duration_ms = event.duration.as_millis() as u64,
            failure = %event.failure,
            "Command failed"
        );
        Ok(())
    }
}

impl Listener<ServerHeartbeatStartedEvent> for EventLogger {
    fn apply(&self, event: &ServerHeartbeatStartedEvent) -> anyhow::Result<()> {
        debug!(service = %self.service, server = %event.server, "Heartbeat started");
        Ok(())
    }
}

impl Listener<ServerHeartbeatSucceededEvent> for EventLogger {
    fn apply(&self, event: &ServerHeartbeatSucceededEvent) -> anyhow::Result<()> {
        debug!(
            service = %self.service,
            server = %event.server,
            duration_ms = event.duration.as_millis() as u64,
            "Heartbeat succeeded"
        );
        Ok(())
    }
}

impl Listener<ServerHeartbeatFailedEvent> for EventLogger {
    fn apply(&self, event: &ServerHeartbeatFailedEvent) -> anyhow::Result<()> {
        warn!(
            service = %self.service,
            server = %event.server,
            duration_ms = event.duration.as_millis() as u64,
            failure = %event.failure,
            "Heartbeat failed"
        );
        Ok(())
    }
}

impl Listener<ConnectionOpenedEvent> for EventLogger {
    fn apply(&self, event: &ConnectionOpenedEvent) -> anyhow::Result<()> {
        info!(service = %self.service, connection = %event.connection_id, "Connection opened");
        Ok(())
    }
}

impl Listener<ConnectionClosedEvent> for EventLogger {
    fn apply(&self, event: &ConnectionClosedEvent) -> anyhow::Result<()> {
        info!(
            service = %self.service,
            connection = %event.connection_id,
            reason = ?event.reason,
            "Connection closed"
        );
        Ok(())
    }
}

impl Subscriber for EventLogger {
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
        "event-logger"
    }
}
