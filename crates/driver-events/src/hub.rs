//! # Event Hub
//!
//! Keeps a dispatch sequence per event type and delivers published events
//! synchronously, in registration order, on the publisher's thread.
//!
//! ```text
//!   producer ── publish(CommandStarted) ──► EventHub
//!                                             │ TypeId::of::<CommandStarted>()
//!                                             ▼
//!                                   [ L1, L2, L3 ] (snapshot, lock released)
//!                                             │
//!                                             ├──► L1.apply(&event)
//!                                             ├──► L2.apply(&event)
//!                                             └──► L3.apply(&event)
//! ```
//!
//! Dispatch sequences are immutable snapshots. `subscribe` builds new ones and
//! swaps them in under the write lock; `publish` clones the current snapshot
//! under the read lock and releases it before calling any listener. A
//! listener may therefore publish or subscribe from inside `apply`.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::config::{DeliveryPolicy, DuplicatePolicy, HubConfig};
use crate::error::{HandlerFailure, HubError};
use crate::listener::{FnListener, Handler, Interests, Subscriber};

/// Trait for publishing events.
///
/// Producers take `&impl EventPublisher` so they stay independent of how
/// events are observed.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every listener registered for exactly type `E`.
    ///
    /// Returns the number of listeners invoked. Publishing an event nobody
    /// listens to is not an error.
    ///
    /// # Errors
    ///
    /// Fails when a listener fails. Under [`DeliveryPolicy::FailFast`] the
    /// first failure is returned and later listeners are skipped; under
    /// [`DeliveryPolicy::Isolate`] all listeners run and failures are
    /// aggregated. Producers that treat monitoring as non-fatal must ignore
    /// this error deliberately.
    fn publish<E: 'static>(&self, event: E) -> Result<usize, HubError>;

    /// Get the total number of publish calls.
    fn events_published(&self) -> u64;
}

/// In-process event hub.
///
/// Each client owns its own hub; there is no process-wide instance. The hub
/// keeps an `Arc` to every subscriber for as long as the hub lives, since
/// there is no unsubscribe.
pub struct EventHub {
    /// Dispatch sequence per event type.
    registry: RwLock<HashMap<TypeId, Arc<[Handler]>>>,

    /// Delivery and duplicate handling.
    config: HubConfig,

    /// Total publish calls.
    events_published: AtomicU64,
}

impl EventHub {
    /// Create a hub with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with the given configuration.
    #[must_use]
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            config,
            events_published: AtomicU64::new(0),
        }
    }

    /// Get the hub configuration.
    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Subscribe to every event type `S` declares.
    ///
    /// The subscriber is appended once to the dispatch sequence of each
    /// declared type. All sequences are updated together, so a concurrent
    /// publish sees either none or all of the new registrations.
    ///
    /// # Errors
    ///
    /// - [`HubError::InvalidSubscriber`] if `S` declares no event type.
    /// - [`HubError::DuplicateSubscriber`] if this instance is already
    ///   registered and duplicates are rejected.
    ///
    /// The registry is unchanged on error.
    pub fn subscribe<S: Subscriber>(&self, subscriber: Arc<S>) -> Result<(), HubError> {
        let name = subscriber.name();
        let interests = Interests::<S>::of();
        if interests.is_empty() {
            warn!(subscriber = name, "Subscriber declares no event types");
            return Err(HubError::InvalidSubscriber { subscriber: name });
        }

        let identity = Arc::as_ptr(&subscriber) as usize;
        let handlers: Vec<(TypeId, Handler)> = interests
            .bindings()
            .iter()
            .map(|binding| {
                let handler = Handler {
                    listener: name,
                    identity,
                    dispatch: binding.bind(Arc::clone(&subscriber)),
                };
                (binding.event_type, handler)
            })
            .collect();

        {
            let mut registry = self.registry.write();

            if self.config.duplicates == DuplicatePolicy::Reject {
                let registered = handlers.iter().any(|(event_type, _)| {
                    registry
                        .get(event_type)
                        .is_some_and(|sequence| sequence.iter().any(|h| h.identity == identity))
                });
                if registered {
                    return Err(HubError::DuplicateSubscriber { subscriber: name });
                }
            }

            for (event_type, handler) in handlers {
                let mut sequence = registry
                    .get(&event_type)
                    .map(|sequence| sequence.to_vec())
                    .unwrap_or_default();
                sequence.push(handler);
                registry.insert(event_type, sequence.into());
            }
        }

        debug!(
            subscriber = name,
            events = ?interests.event_names().collect::<Vec<_>>(),
            "Subscriber registered"
        );
        Ok(())
    }

    /// Subscribe a closure to events of type `E`.
    ///
    /// # Errors
    ///
    /// Never fails under [`DuplicatePolicy::Allow`]; each call creates a new
    /// subscriber, so it is never a duplicate either.
    pub fn subscribe_fn<E, F>(&self, name: &'static str, handler: F) -> Result<(), HubError>
    where
        E: 'static,
        F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnListener::new(name, handler)))
    }

    /// Number of listeners registered for events of type `E`.
    #[must_use]
    pub fn listener_count<E: 'static>(&self) -> usize {
        self.registry
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, |sequence| sequence.len())
    }

    /// Number of event types with at least one listener.
    #[must_use]
    pub fn event_types(&self) -> usize {
        self.registry.read().len()
    }

    fn sequence_for(&self, event_type: TypeId) -> Option<Arc<[Handler]>> {
        self.registry.read().get(&event_type).cloned()
    }

    fn deliver_fail_fast(
        &self,
        sequence: &[Handler],
        payload: &dyn Any,
        event: &'static str,
    ) -> Result<(), HubError> {
        for (delivered, handler) in sequence.iter().enumerate() {
            if let Err(err) = (handler.dispatch)(payload) {
                debug!(
                    event,
                    listener = handler.listener,
                    delivered,
                    skipped = sequence.len() - delivered - 1,
                    "Listener failed, stopping delivery"
                );
                return Err(failure(handler, event, err).into());
            }
        }
        Ok(())
    }

    fn deliver_isolated(
        &self,
        sequence: &[Handler],
        payload: &dyn Any,
        event: &'static str,
    ) -> Result<(), HubError> {
        let failures: Vec<HandlerFailure> = sequence
            .iter()
            .filter_map(|handler| {
                let err = (handler.dispatch)(payload).err()?;
                warn!(event, listener = handler.listener, error = %err, "Listener failed");
                Some(failure(handler, event, err))
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(HubError::HandlerFailures {
                event,
                attempted: sequence.len(),
                failures,
            })
        }
    }
}

impl EventPublisher for EventHub {
    fn publish<E: 'static>(&self, event: E) -> Result<usize, HubError> {
        let event_name = type_name::<E>();

        self.events_published.fetch_add(1, Ordering::Relaxed);

        let Some(sequence) = self.sequence_for(TypeId::of::<E>()) else {
            trace!(event = event_name, "Event published with no listeners");
            return Ok(0);
        };

        let payload: &dyn Any = &event;
        match self.config.delivery {
            DeliveryPolicy::FailFast => self.deliver_fail_fast(&sequence, payload, event_name)?,
            DeliveryPolicy::Isolate => self.deliver_isolated(&sequence, payload, event_name)?,
        }

        trace!(event = event_name, listeners = sequence.len(), "Event delivered");
        Ok(sequence.len())
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("config", &self.config)
            .field("event_types", &self.event_types())
            .field("events_published", &self.events_published())
            .finish()
    }
}

fn failure(handler: &Handler, event: &'static str, err: anyhow::Error) -> HandlerFailure {
    HandlerFailure {
        listener: handler.listener,
        event,
        source: err.into(),
    }
}
