//! # Driver Events - Typed Event Hub
//!
//! Lets the driver report what it is doing (commands, heartbeats,
//! connections) to any number of observers without knowing who they are.
//!
//! ## Model
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────────────┐
//! │  Producer    │                    │ Observer                 │
//! │ (pool, conn, │   publish(E)       │ impl Listener<E1>        │
//! │  monitor)    │ ──────┐            │ impl Listener<E2>        │
//! └──────────────┘       │            └──────────────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  EventHub    │ ─────────┘
//!                  │ TypeId → [L] │  subscribe(Arc<Observer>)
//!                  └──────────────┘
//! ```
//!
//! - Dispatch is keyed by the exact event type; nothing else is matched.
//! - Delivery is synchronous, on the publisher's thread, in registration order.
//! - A listener error reaches the publisher (see [`DeliveryPolicy`]).
//! - Subscriptions last as long as the hub.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use driver_events::{listens_to, EventHub, EventPublisher, Listener};
//! use driver_events::events::{CommandFailedEvent, CommandStartedEvent};
//!
//! struct Monitor;
//!
//! impl Listener<CommandStartedEvent> for Monitor {
//!     fn apply(&self, event: &CommandStartedEvent) -> anyhow::Result<()> {
//!         println!("started {}", event.command_name);
//!         Ok(())
//!     }
//! }
//!
//! impl Listener<CommandFailedEvent> for Monitor {
//!     fn apply(&self, event: &CommandFailedEvent) -> anyhow::Result<()> {
//!         println!("failed {}: {}", event.command_name, event.failure);
//!         Ok(())
//!     }
//! }
//!
//! listens_to!(Monitor => CommandStartedEvent, CommandFailedEvent);
//!
//! let hub = EventHub::new();
//! hub.subscribe(Arc::new(Monitor)).unwrap();
//! assert_eq!(hub.listener_count::<CommandStartedEvent>(), 1);
//! assert_eq!(hub.publish(42_u32).unwrap(), 0);
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod error;
pub mod events;
pub mod hub;
pub mod listener;

// Re-export main types
pub use config::{DeliveryPolicy, DuplicatePolicy, HubConfig};
pub use error::{BoxError, ConfigError, HandlerFailure, HubError};
pub use hub::{EventHub, EventPublisher};
pub use listener::{FnListener, Interests, Listener, Subscriber};
