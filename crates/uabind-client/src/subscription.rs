// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data change subscriptions.
//!
//! A [`SubscriptionHandle`] owns its callback through a dispatcher that is
//! registered with the engine as a [`DataChangeSink`]. The dispatcher decodes
//! each notification into exactly one [`DataValue`] and hands it to the
//! callback. Nothing is retained globally: once the handle is unsubscribed or
//! dropped, the dispatcher discards late notifications and the engine is told
//! to delete the subscription.
//!
//! # Example
//!
//! ```rust,ignore
//! let (callback, mut rx) = ChannelCallback::with_channel();
//! let handle = client.subscribe(&[NodeId::numeric(1, 1001)], callback).await?;
//!
//! while let Some(notification) = rx.recv().await {
//!     println!("{} = {:?}", notification.node_id, notification.value);
//! }
//! handle.unsubscribe().await?;
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uabind_core::wire::WireDataValue;
use uabind_core::{
    CodecRegistry, ConversionOptions, DataValue, NodeId, SubscriptionError, UaError, UaResult,
    Value,
};

use crate::engine::{ClientEngine, ConnectionId, DataChangeSink, SubscriptionId};

// =============================================================================
// DataChangeNotification
// =============================================================================

/// A decoded data change.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChangeNotification {
    /// Connection the notification arrived on.
    pub connection: ConnectionId,
    /// Subscription that produced it.
    pub subscription_id: SubscriptionId,
    /// Monitored node address as reported by the engine.
    pub node_id: String,
    /// The decoded value.
    pub value: DataValue,
    /// Per-subscription sequence number, starting at 1.
    pub sequence_number: u64,
}

impl DataChangeNotification {
    /// Renders the payload as a host value.
    pub fn host_value(&self, options: &ConversionOptions) -> Value {
        self.value.to_host(options)
    }
}

// =============================================================================
// SubscriptionCallback
// =============================================================================

/// Receiver of data change notifications.
///
/// Both methods run on engine-owned threads and must return quickly.
pub trait SubscriptionCallback: Send + Sync {
    /// Called for each successfully decoded notification.
    fn on_data_change(&self, notification: DataChangeNotification);

    /// Called when a notification could not be decoded.
    fn on_error(&self, _node_id: &str, _error: UaError) {
        // Default: no-op
    }
}

/// Forwards notifications into an unbounded tokio channel.
pub struct ChannelCallback {
    sender: mpsc::UnboundedSender<DataChangeNotification>,
}

impl ChannelCallback {
    /// Creates a callback over an existing sender.
    pub fn new(sender: mpsc::UnboundedSender<DataChangeNotification>) -> Self {
        Self { sender }
    }

    /// Creates a callback together with its receiver.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<DataChangeNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SubscriptionCallback for ChannelCallback {
    fn on_data_change(&self, notification: DataChangeNotification) {
        // Receiver gone is not an error for the engine
        let _ = self.sender.send(notification);
    }
}

/// Fans notifications out to any number of broadcast receivers.
pub struct BroadcastCallback {
    sender: broadcast::Sender<DataChangeNotification>,
}

impl BroadcastCallback {
    /// Creates a broadcast callback with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to receive notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DataChangeNotification> {
        self.sender.subscribe()
    }
}

impl SubscriptionCallback for BroadcastCallback {
    fn on_data_change(&self, notification: DataChangeNotification) {
        let _ = self.sender.send(notification);
    }
}

/// Adapts a closure into a callback. Decode errors are logged.
pub struct FnCallback<F> {
    func: F,
}

impl<F> FnCallback<F>
where
    F: Fn(DataChangeNotification) + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> SubscriptionCallback for FnCallback<F>
where
    F: Fn(DataChangeNotification) + Send + Sync,
{
    fn on_data_change(&self, notification: DataChangeNotification) {
        (self.func)(notification)
    }

    fn on_error(&self, node_id: &str, error: UaError) {
        warn!(node_id = %node_id, error = %error, "Dropping undecodable notification");
    }
}

// =============================================================================
// SubscriptionStats
// =============================================================================

/// Counters for one subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionStats {
    /// Notifications delivered to `on_data_change`.
    pub notifications: u64,
    /// Notifications routed to `on_error`.
    pub decode_errors: u64,
    /// Notifications discarded before the id was bound, after the handle closed,
    /// or lost to a panicking callback.
    pub dropped: u64,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Decodes engine notifications and forwards them to a callback.
pub(crate) struct Dispatcher {
    callback: Arc<dyn SubscriptionCallback>,
    registry: Arc<CodecRegistry>,
    options: ConversionOptions,
    subscription_id: AtomicU32,
    bound: AtomicBool,
    active: AtomicBool,
    sequence: AtomicU64,
    notifications: AtomicU64,
    decode_errors: AtomicU64,
    dropped: AtomicU64,
}

impl Dispatcher {
    pub(crate) fn new(
        callback: Arc<dyn SubscriptionCallback>,
        registry: Arc<CodecRegistry>,
        options: ConversionOptions,
    ) -> Arc<Self> {
        Arc::new(Self {
            callback,
            registry,
            options,
            subscription_id: AtomicU32::new(0),
            bound: AtomicBool::new(false),
            active: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        })
    }

    /// Records the engine-assigned id once creation succeeded.
    ///
    /// Notifications that arrive before this are dropped, so every delivered
    /// notification carries the engine's id.
    pub(crate) fn bind(&self, id: SubscriptionId) {
        self.subscription_id.store(id.0, Ordering::Release);
        self.bound.store(true, Ordering::Release);
    }

    fn bound_id(&self) -> Option<SubscriptionId> {
        if self.bound.load(Ordering::Acquire) {
            Some(SubscriptionId(self.subscription_id.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// Returns a sink the engine can call from its own threads.
    pub(crate) fn sink(self: &Arc<Self>) -> DataChangeSink {
        let dispatcher = Arc::clone(self);
        Arc::new(move |connection, node_id, wire| dispatcher.dispatch(connection, node_id, wire))
    }

    /// Stops delivery. Returns `false` if already stopped.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn stats(&self) -> SubscriptionStats {
        SubscriptionStats {
            notifications: self.notifications.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn dispatch(&self, connection: ConnectionId, node_id: &str, wire: &WireDataValue) {
        if !self.is_active() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Some(subscription_id) = self.bound_id() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(node_id = %node_id, "Notification before subscription id was bound");
            return;
        };

        // Engine threads must not unwind.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            match DataValue::from_wire_with(&self.registry, wire, &self.options) {
                Ok(value) => {
                    let sequence_number = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
                    self.callback.on_data_change(DataChangeNotification {
                        connection,
                        subscription_id,
                        node_id: node_id.to_string(),
                        value,
                        sequence_number,
                    });
                    self.notifications.fetch_add(1, Ordering::Relaxed);
                }
                Err(error) => {
                    self.decode_errors.fetch_add(1, Ordering::Relaxed);
                    error.log("subscription notification");
                    self.callback.on_error(node_id, error);
                }
            }
        }));

        if outcome.is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                subscription_id = %subscription_id,
                node_id = %node_id,
                "Subscription callback panicked"
            );
        }
    }
}

// =============================================================================
// SubscriptionHandle
// =============================================================================

/// Handle to an active subscription.
///
/// Dropping the handle stops delivery and, inside a tokio runtime, deletes
/// the subscription on the engine in the background. Call
/// [`SubscriptionHandle::unsubscribe`] to observe the outcome.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    connection: ConnectionId,
    nodes: Vec<NodeId>,
    engine: Arc<dyn ClientEngine>,
    dispatcher: Arc<Dispatcher>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        id: SubscriptionId,
        connection: ConnectionId,
        nodes: Vec<NodeId>,
        engine: Arc<dyn ClientEngine>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            id,
            connection,
            nodes,
            engine,
            dispatcher,
        }
    }

    /// Returns the engine-assigned subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the connection the subscription lives on.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Returns the monitored nodes.
    pub fn monitored_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns `true` until the handle is unsubscribed.
    pub fn is_active(&self) -> bool {
        self.dispatcher.is_active()
    }

    /// Returns delivery counters.
    pub fn stats(&self) -> SubscriptionStats {
        self.dispatcher.stats()
    }

    /// Stops delivery and deletes the subscription on the engine.
    ///
    /// A second call fails with [`SubscriptionError::Closed`].
    pub async fn unsubscribe(&self) -> UaResult<()> {
        if !self.dispatcher.deactivate() {
            return Err(SubscriptionError::Closed { id: self.id.0 }.into());
        }

        self.engine
            .delete_subscription(self.connection, self.id)
            .await
            .map_err(|e| {
                e.log("delete subscription");
                e
            })?;

        info!(
            subscription_id = %self.id,
            connection = %self.connection,
            notifications = self.dispatcher.stats().notifications,
            "Subscription deleted"
        );
        Ok(())
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if !self.dispatcher.deactivate() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(subscription_id = %self.id, "Handle dropped outside a runtime");
            return;
        };

        let engine = Arc::clone(&self.engine);
        let (connection, id) = (self.connection, self.id);
        runtime.spawn(async move {
            if let Err(e) = engine.delete_subscription(connection, id).await {
                e.log("delete dropped subscription");
            }
        });
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("connection", &self.connection)
            .field("nodes", &self.nodes.len())
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
