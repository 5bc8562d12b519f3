//! # Listener Contracts
//!
//! A listener handles one event type through [`Listener<E>`]. A single object
//! may implement `Listener<E>` for many unrelated `E`; its [`Subscriber`]
//! implementation names them so the hub can register all of them at once.
//!
//! ```text
//!   struct Monitor;                        Subscriber::interests
//!   impl Listener<CommandStarted>   ──┐    ┌──────────────────────────┐
//!   impl Listener<CommandFailed>    ──┼──► │ listen::<CommandStarted> │ ──► EventHub::subscribe
//!   impl Listener<HeartbeatFailed>  ──┘    │ listen::<CommandFailed>  │
//!                                          │ listen::<HeartbeatFailed>│
//!                                          └──────────────────────────┘
//! ```
//!
//! `Interests::listen::<E>()` only compiles when the subscriber implements
//! `Listener<E>`, so a subscriber can never declare an event it cannot handle.
//! The [`listens_to!`](crate::listens_to) macro writes the `Subscriber` impl.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Handler contract for events of type `E`.
///
/// Called synchronously on the publisher's thread. Returning an error makes
/// the publish call fail (see [`DeliveryPolicy`](crate::DeliveryPolicy)), so
/// listeners that must never disturb the driver should swallow their own
/// errors.
pub trait Listener<E: 'static>: Send + Sync + 'static {
    /// Handle one event.
    fn apply(&self, event: &E) -> anyhow::Result<()>;
}

/// An object that declares which event types it listens to.
pub trait Subscriber: Sized + Send + Sync + 'static {
    /// Declare every event type this subscriber handles.
    fn interests(interests: &mut Interests<Self>);

    /// Name used in logs and errors.
    ///
    /// The default is `type_name::<Self>()`; override it for something shorter.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Type-erased dispatch bound to one subscriber and one event type.
pub(crate) type DispatchFn = dyn Fn(&dyn Any) -> anyhow::Result<()> + Send + Sync;

/// One entry of a dispatch sequence.
#[derive(Clone)]
pub(crate) struct Handler {
    pub(crate) listener: &'static str,
    /// Address of the subscriber allocation, used to detect duplicates.
    pub(crate) identity: usize,
    pub(crate) dispatch: Arc<DispatchFn>,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("listener", &self.listener)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// A declared interest, not yet bound to a subscriber instance.
pub(crate) struct Binding<S> {
    pub(crate) event_type: TypeId,
    pub(crate) event_name: &'static str,
    bind: fn(Arc<S>) -> Arc<DispatchFn>,
}

impl<S> Binding<S> {
    pub(crate) fn bind(&self, subscriber: Arc<S>) -> Arc<DispatchFn> {
        (self.bind)(subscriber)
    }
}

/// The set of event types a [`Subscriber`] declares.
pub struct Interests<S> {
    bindings: Vec<Binding<S>>,
}

impl<S: Subscriber> Interests<S> {
    /// Collect the declared interests of `S`.
    pub(crate) fn of() -> Self {
        let mut interests = Self {
            bindings: Vec::new(),
        };
        S::interests(&mut interests);
        interests
    }

    /// Declare interest in events of type `E`.
    ///
    /// Declaring the same type twice has no further effect.
    pub fn listen<E: 'static>(&mut self) -> &mut Self
    where
        S: Listener<E>,
    {
        let event_type = TypeId::of::<E>();
        if !self.bindings.iter().any(|b| b.event_type == event_type) {
            self.bindings.push(Binding {
                event_type,
                event_name: type_name::<E>(),
                bind: bind::<S, E>,
            });
        }
        self
    }

    /// Number of distinct event types declared.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if no event type was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Type names of the declared events, in declaration order.
    pub fn event_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.iter().map(|b| b.event_name)
    }

    pub(crate) fn bindings(&self) -> &[Binding<S>] {
        &self.bindings
    }
}

fn bind<S, E>(subscriber: Arc<S>) -> Arc<DispatchFn>
where
    S: Listener<E>,
    E: 'static,
{
    Arc::new(move |event: &dyn Any| match event.downcast_ref::<E>() {
        Some(event) => subscriber.apply(event),
        // Sequences are keyed by TypeId, so this arm is unreachable.
        None => Ok(()),
    })
}

/// A closure registered as a single-interest subscriber.
///
/// Built by [`EventHub::subscribe_fn`](crate::EventHub::subscribe_fn).
pub struct FnListener<E, F> {
    name: &'static str,
    handler: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    E: 'static,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    /// Wrap a closure under the given name.
    pub fn new(name: &'static str, handler: F) -> Self {
        Self {
            name,
            handler,
            _event: PhantomData,
        }
    }
}

impl<E, F> Listener<E> for FnListener<E, F>
where
    E: 'static,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn apply(&self, event: &E) -> anyhow::Result<()> {
        (self.handler)(event)
    }
}

impl<E, F> Subscriber for FnListener<E, F>
where
    E: 'static,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn interests(interests: &mut Interests<Self>) {
        interests.listen::<E>();
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Implement [`Subscriber`] for a type by listing the events it listens to.
///
/// Each listed event must have a matching `Listener` impl.
///
/// ```
/// use driver_events::{listens_to, Listener};
///
/// struct Started;
/// struct Finished;
/// struct Monitor;
///
/// impl Listener<Started> for Monitor {
///     fn apply(&self, _: &Started) -> anyhow::Result<()> { Ok(()) }
/// }
/// impl Listener<Finished> for Monitor {
///     fn apply(&self, _: &Finished) -> anyhow::Result<()> { Ok(()) }
/// }
///
/// listens_to!(Monitor => Started, Finished);
/// ```
///
/// A type that listens to nothing can still implement `Subscriber` by hand;
/// the hub rejects it at subscribe time.
#[macro_export]
macro_rules! listens_to {
    ($subscriber:ty => $($event:ty),+ $(,)?) => {
        impl $crate::Subscriber for $subscriber {
            fn interests(interests: &mut $crate::Interests<Self>) {
                $(interests.listen::<$event>();)+
            }
        }
    };
}
