//! # Driver Events
//!
//! Lifecycle events emitted by the driver. Each event is its own type, so a
//! listener registers for exactly the occurrences it cares about.
//!
//! The hub does not look inside these values; they are listed here so
//! producers and listeners agree on one catalog.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Address of a server in the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    /// Host name or IP.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ServerAddress {
    /// Default server port.
    pub const DEFAULT_PORT: u16 = 27017;

    /// Create an address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new("localhost", Self::DEFAULT_PORT)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Identifies one connection to one server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId {
    /// The server the connection is open to.
    pub server: ServerAddress,
    /// Client-side sequence number of the connection.
    pub local_value: u64,
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.server, self.local_value)
    }
}

// =============================================================================
// COMMAND MONITORING
// =============================================================================

/// A command was sent to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStartedEvent {
    /// Connection the command was sent on.
    pub connection_id: ConnectionId,
    /// Wire request id.
    pub request_id: i32,
    /// Target database.
    pub database_name: String,
    /// First key of the command document (e.g. `find`, `insert`).
    pub command_name: String,
}

/// A command completed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSucceededEvent {
    /// Connection the command was sent on.
    pub connection_id: ConnectionId,
    /// Wire request id.
    pub request_id: i32,
    /// Command name.
    pub command_name: String,
    /// Round trip time.
    pub duration: Duration,
}

/// A command failed, either on the server or in transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailedEvent {
    /// Connection the command was sent on.
    pub connection_id: ConnectionId,
    /// Wire request id.
    pub request_id: i32,
    /// Command name.
    pub command_name: String,
    /// Description of the failure.
    pub failure: String,
    /// Time until the failure was observed.
    pub duration: Duration,
}

// =============================================================================
// SERVER MONITORING
// =============================================================================

/// A heartbeat check against a server began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHeartbeatStartedEvent {
    pub server: ServerAddress,
}

/// A heartbeat check succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHeartbeatSucceededEvent {
    pub server: ServerAddress,
    pub duration: Duration,
}

/// A heartbeat check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHeartbeatFailedEvent {
    pub server: ServerAddress,
    pub failure: String,
    pub duration: Duration,
}

// =============================================================================
// CONNECTIONS
// =============================================================================

/// A connection was established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOpenedEvent {
    pub connection_id: ConnectionId,
}

/// A connection was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionClosedEvent {
    pub connection_id: ConnectionId,
    /// Why the connection was closed.
    pub reason: ConnectionClosedReason,
}

/// Why a connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionClosedReason {
    /// The pool was cleared or shut down.
    PoolClosed,
    /// The connection sat idle past its limit.
    Idle,
    /// A network or protocol error occurred.
    Error,
}
