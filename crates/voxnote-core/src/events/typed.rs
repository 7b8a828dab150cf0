use crate::events::{EventBus, ListenerId, bus::Listener};

use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

/// One named event in a catalog.
///
/// Implemented by uninhabited marker types, normally generated with
/// [`event_catalog!`](crate::event_catalog).
pub trait Event: 'static {
    /// Marker type of the catalog this event belongs to.
    type Catalog;
    /// Payload handed to subscribers.
    type Payload: Send + Sync + 'static;
    /// Name the event is keyed under on the underlying bus.
    const NAME: &'static str;
}

/// Handle returned by [`TypedEvents::subscribe`], used to withdraw it.
pub struct Subscription<E: Event> {
    id: ListenerId,
    _event: PhantomData<fn() -> E>,
}

impl<E: Event> Subscription<E> {
    /// Name of the subscribed event.
    pub fn event_name(&self) -> &'static str {
        E::NAME
    }
}

impl<E: Event> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Event> Copy for Subscription<E> {}

impl<E: Event> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &E::NAME)
            .field("id", &self.id)
            .finish()
    }
}

/// Statically typed view over an [`EventBus`] for the catalog `C`.
///
/// Only events whose [`Event::Catalog`] is `C` can be subscribed or emitted,
/// and a callback's argument type must match the event's payload. Delivery
/// itself is still keyed by name on the dynamic bus.
pub struct TypedEvents<C> {
    bus: EventBus,
    _catalog: PhantomData<fn() -> C>,
}

impl<C> TypedEvents<C> {
    /// Creates a channel with no subscribers.
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
            _catalog: PhantomData,
        }
    }

    /// Registers `callback` for `E`.
    pub fn subscribe<E, F>(&self, callback: F) -> Subscription<E>
    where
        E: Event<Catalog = C>,
        F: Fn(&E::Payload) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(move |payload: &dyn Any| {
            if let Some(payload) = payload.downcast_ref::<E::Payload>() {
                callback(payload);
            }
        });

        Subscription {
            id: self.bus.on(E::NAME, listener),
            _event: PhantomData,
        }
    }

    /// Withdraws a subscription. No-op if it was already withdrawn.
    pub fn unsubscribe<E>(&self, subscription: &Subscription<E>)
    where
        E: Event<Catalog = C>,
    {
        self.bus.off(E::NAME, subscription.id);
    }

    /// Synchronously delivers `payload` to every subscriber of `E`.
    pub fn emit<E>(&self, payload: &E::Payload)
    where
        E: Event<Catalog = C>,
    {
        self.bus.trigger(E::NAME, payload);
    }

    /// Number of live subscriptions for `E`.
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: Event<Catalog = C>,
    {
        self.bus.listener_count(E::NAME)
    }
}

impl<C> Default for TypedEvents<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TypedEvents<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedEvents").field("bus", &self.bus).finish()
    }
}
