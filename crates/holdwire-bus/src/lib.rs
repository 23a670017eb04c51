//! Type-keyed publish/subscribe bus.
//!
//! The bus is the sole decoupling mechanism between the transport client,
//! the gesture machine, and the session controller: each component only
//! imports the message types it produces or consumes, never the other
//! components.
//!
//! One logical channel exists per message type. Channels are created lazily
//! on first use and live as long as the bus. The bus is an explicit value
//! handed to each component at construction time, not a process-wide
//! singleton; cloning it is cheap and clones share the same channels.
//!
//! # Delivery contract
//!
//! [`MessageBus::publish`] fans out sequentially: each subscriber is awaited
//! to completion before the next runs, in subscription order. Delivery
//! iterates a snapshot of the subscriber list, so a handler may subscribe or
//! unsubscribe (itself or another) mid-delivery without corrupting the
//! in-flight iteration. There is no backpressure: a slow handler slows the
//! publish that triggered it.
//!
//! A handler failure stops that delivery and surfaces from `publish`;
//! subscriber bookkeeping is unaffected. Producers treat a failed delivery
//! as fire-and-forget with a logged failure, never as a reason to abort
//! their own logic.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::BoxFuture;
use thiserror::Error;

/// Result type returned by bus subscribers.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Errors surfaced by [`MessageBus::publish`].
#[derive(Debug, Error)]
pub enum BusError {
    /// A subscriber returned an error; delivery stopped at that subscriber.
    #[error("subscriber failed during delivery")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Handle identifying one subscription, returned by [`MessageBus::subscribe`].
///
/// Unsubscribing by handle replaces the original design's removal by handler
/// identity, which is not observable for closures. Registering the same
/// closure twice yields two handles and two invocations per publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<M> = Arc<dyn Fn(M) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Ordered subscriber list for exactly one message type.
struct Channel<M> {
    subscribers: Vec<(SubscriptionId, Handler<M>)>,
}

impl<M> Channel<M> {
    fn new() -> Self {
        Self { subscribers: Vec::new() }
    }
}

#[derive(Default)]
struct Registry {
    channels: HashMap<TypeId, Box<dyn Any + Send>>,
    next_id: u64,
}

impl Registry {
    fn channel_mut<M: Send + 'static>(&mut self) -> &mut Channel<M> {
        let entry = self
            .channels
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Channel::<M>::new()));
        // The map is keyed by M's TypeId, so the stored box is always a
        // Channel<M>. A stale entry of another type cannot exist.
        #[allow(clippy::unwrap_used)]
        entry.downcast_mut::<Channel<M>>().unwrap()
    }
}

/// Generic publish/subscribe channel registry, keyed by message type.
#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Arc<Mutex<Registry>>,
}

impl MessageBus {
    /// Create an empty bus with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` on the channel for message type `M`.
    ///
    /// Handlers run in subscription order. Duplicate registration is
    /// permitted and results in multiple invocations.
    pub fn subscribe<M, F, Fut>(&self, handler: F) -> SubscriptionId
    where
        M: Clone + Send + Sync + 'static,
        F: Fn(M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: Handler<M> = Arc::new(move |msg| Box::pin(handler(msg)));
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.channel_mut::<M>().subscribers.push((id, handler));
        id
    }

    /// Remove the subscription identified by `id` from the channel for `M`.
    ///
    /// A no-op if the subscription is absent or was already removed. An
    /// in-flight publish keeps delivering to its snapshot; removal takes
    /// effect for subsequent publishes.
    pub fn unsubscribe<M: Send + 'static>(&self, id: SubscriptionId) {
        let mut registry = self.registry();
        registry.channel_mut::<M>().subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Deliver `message` to every handler currently registered for its type.
    ///
    /// Completes once all handlers have run, or at the first handler that
    /// fails. Publishing with no subscribers is a successful no-op.
    pub async fn publish<M>(&self, message: M) -> Result<(), BusError>
    where
        M: Clone + Send + Sync + 'static,
    {
        let snapshot: Vec<Handler<M>> = {
            let mut registry = self.registry();
            registry
                .channel_mut::<M>()
                .subscribers
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in snapshot {
            handler(message.clone()).await.map_err(BusError::Handler)?;
        }
        Ok(())
    }

    /// Discard all channels and their subscribers.
    ///
    /// Test and teardown only; live components keep dangling subscriptions
    /// otherwise.
    pub fn flush(&self) {
        self.registry().channels.clear();
    }
}
