use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::trace;

use crate::event::SubscriptionId;

/// Handler stored by a channel. Payloads are passed by reference; use `()`
/// for channels without a payload and tuples for several arguments.
pub type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct ChannelInner<A> {
    handlers: Vec<(SubscriptionId, Handler<A>)>,
    next_id: SubscriptionId,
}

impl<A> ChannelInner<A> {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let len_before = self.handlers.len();
        self.handlers.retain(|(h_id, _)| *h_id != id);
        self.handlers.len() < len_before
    }
}

fn lock_inner<A>(inner: &Mutex<ChannelInner<A>>) -> MutexGuard<'_, ChannelInner<A>> {
    // A panicking handler never runs under this lock, so the list is intact.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Synchronous multi-subscriber event channel.
///
/// Clones share the same subscriber list. The internal lock is released
/// before any handler runs, so handlers may freely subscribe, unsubscribe,
/// clear or re-trigger the channel they were invoked from.
pub struct EventChannel<A> {
    name: &'static str,
    inner: Arc<Mutex<ChannelInner<A>>>,
}

impl<A> Clone for EventChannel<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

// Manual Debug implementation, handlers are opaque
impl<A> fmt::Debug for EventChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<A> EventChannel<A> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        lock_inner(&self.inner).handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: 'static> EventChannel<A> {
    /// Create an empty channel. The name only shows up in logs and `Debug`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(ChannelInner {
                handlers: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Append a handler to the end of the dispatch order.
    pub fn subscribe<F>(&self, handler: F) -> Subscription<A>
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut inner = lock_inner(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.push((id, Arc::new(handler)));
        Subscription {
            id,
            channel: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscription. Returns `false` if it was already gone or
    /// belongs to another channel.
    pub fn unsubscribe(&self, subscription: &Subscription<A>) -> bool {
        if !subscription.channel.ptr_eq(&Arc::downgrade(&self.inner)) {
            return false;
        }
        lock_inner(&self.inner).remove(subscription.id)
    }

    /// Invoke every handler subscribed at the moment of the call, in
    /// subscription order. Returns the number of handlers invoked.
    pub fn trigger(&self, args: &A) -> usize {
        let snapshot: Vec<Handler<A>> = lock_inner(&self.inner)
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        Self::dispatch(self.name, snapshot, args)
    }

    /// Clear the channel and invoke the handlers that were subscribed.
    ///
    /// Anything subscribed while those handlers run survives, which lets a
    /// final notification start the next cycle of subscriptions.
    pub fn take_and_trigger(&self, args: &A) -> usize {
        let taken: Vec<Handler<A>> = lock_inner(&self.inner)
            .handlers
            .drain(..)
            .map(|(_, handler)| handler)
            .collect();
        Self::dispatch(self.name, taken, args)
    }

    /// Remove every subscription without invoking anything.
    pub fn clear(&self) {
        lock_inner(&self.inner).handlers.clear();
    }

    fn dispatch(name: &'static str, handlers: Vec<Handler<A>>, args: &A) -> usize {
        trace!("Dispatching '{}' to {} handler(s)", name, handlers.len());
        for handler in &handlers {
            handler(args);
        }
        handlers.len()
    }
}

impl<A: 'static> Default for EventChannel<A> {
    fn default() -> Self {
        Self::new("anonymous")
    }
}

/// Handle to one subscription on an [`EventChannel`].
///
/// Dropping it does not unsubscribe; call [`Subscription::cancel`] or
/// [`EventChannel::unsubscribe`].
pub struct Subscription<A> {
    id: SubscriptionId,
    channel: Weak<Mutex<ChannelInner<A>>>,
}

impl<A> Subscription<A> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribe. Idempotent, and a no-op once the channel is gone.
    pub fn cancel(&self) -> bool {
        match self.channel.upgrade() {
            Some(inner) => lock_inner(&inner).remove(self.id),
            None => false,
        }
    }

    /// Whether the handler is still subscribed.
    pub fn is_active(&self) -> bool {
        match self.channel.upgrade() {
            Some(inner) => lock_inner(&inner).handlers.iter().any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

impl<A> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}
