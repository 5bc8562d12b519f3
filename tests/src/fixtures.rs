//! # Test Fixtures
//!
//! A stand-in producer that emits events the way a connection would, and a
//! listener that records what it saw.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use driver_events::events::{
    CommandFailedEvent, CommandStartedEvent, CommandSucceededEvent, ConnectionClosedEvent,
    ConnectionClosedReason, ConnectionId, ConnectionOpenedEvent, ServerAddress,
};
use driver_events::{listens_to, EventPublisher, HubError, Listener};

/// Simulated connection that reports its activity through a publisher.
pub struct FakeConnection<'a, P> {
    publisher: &'a P,
    id: ConnectionId,
    next_request_id: i32,
}

impl<'a, P: EventPublisher> FakeConnection<'a, P> {
    /// Open a connection and publish `ConnectionOpenedEvent`.
    pub fn open(publisher: &'a P, local_value: u64) -> Result<Self, HubError> {
        let id = ConnectionId {
            server: ServerAddress::default(),
            local_value,
        };
        publisher.publish(ConnectionOpenedEvent {
            connection_id: id.clone(),
        })?;
        Ok(Self {
            publisher,
            id,
            next_request_id: 1,
        })
    }

    /// Run a command; `failure` makes it fail with that message.
    pub fn run(&mut self, command_name: &str, failure: Option<&str>) -> Result<(), HubError> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        self.publisher.publish(CommandStartedEvent {
            connection_id: self.id.clone(),
            request_id,
            database_name: "app".to_string(),
            command_name: command_name.to_string(),
        })?;

        match failure {
            None => self.publisher.publish(CommandSucceededEvent {
                connection_id: self.id.clone(),
                request_id,
                command_name: command_name.to_string(),
                duration: Duration::from_millis(3),
            })?,
            Some(failure) => self.publisher.publish(CommandFailedEvent {
                connection_id: self.id.clone(),
                request_id,
                command_name: command_name.to_string(),
                failure: failure.to_string(),
                duration: Duration::from_millis(8),
            })?,
        };
        Ok(())
    }

    /// Close the connection and publish `ConnectionClosedEvent`.
    pub fn close(self) -> Result<(), HubError> {
        self.publisher.publish(ConnectionClosedEvent {
            connection_id: self.id,
            reason: ConnectionClosedReason::PoolClosed,
        })?;
        Ok(())
    }
}

/// Shared, ordered record of deliveries.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Create an empty journal.
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Records `<tag>:started:<command>` for command starts.
pub struct StartRecorder {
    pub tag: &'static str,
    pub journal: Journal,
}

impl Listener<CommandStartedEvent> for StartRecorder {
    fn apply(&self, event: &CommandStartedEvent) -> anyhow::Result<()> {
        self.journal
            .lock()
            .push(format!("{}:started:{}", self.tag, event.command_name));
        Ok(())
    }
}

listens_to!(StartRecorder => CommandStartedEvent);

/// Records command starts and successes.
pub struct CommandRecorder {
    pub tag: &'static str,
    pub journal: Journal,
}

impl Listener<CommandStartedEvent> for CommandRecorder {
    fn apply(&self, event: &CommandStartedEvent) -> anyhow::Result<()> {
        self.journal
            .lock()
            .push(format!("{}:started:{}", self.tag, event.command_name));
        Ok(())
    }
}

impl Listener<CommandSucceededEvent> for CommandRecorder {
    fn apply(&self, event: &CommandSucceededEvent) -> anyhow::Result<()> {
        self.journal
            .lock()
            .push(format!("{}:succeeded:{}", self.tag, event.command_name));
        Ok(())
    }
}

listens_to!(CommandRecorder => CommandStartedEvent, CommandSucceededEvent);

/// Fails on every command start.
pub struct FailingListener;

impl Listener<CommandStartedEvent> for FailingListener {
    fn apply(&self, event: &CommandStartedEvent) -> anyhow::Result<()> {
        anyhow::bail!("audit sink unavailable for request {}", event.request_id)
    }
}

listens_to!(FailingListener => CommandStartedEvent);
