// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! High-level client over a [`ClientEngine`].
//!
//! Every request is encoded through the codec chain before it reaches the
//! engine, and every result is decoded the same way on the way back. Codec
//! failures surface as [`UaError::Conversion`] before the engine is called;
//! engine failures surface as [`UaError::Engine`].

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};
use uabind_core::wire::{WireBrowseRequest, WireReadValue, WireWriteValue};
use uabind_core::{
    ArrayShape, BrowseRequest, BrowseResult, BuiltinType, CallMethodRequest, CallMethodResult,
    CodecRegistry, DataValue, EngineError, NodeId, ReadValue, StatusCode, SubscriptionError,
    UaError, UaResult, Value, WriteValue,
};

use crate::config::ClientConfig;
use crate::engine::{ClientEngine, ConnectionId};
use crate::subscription::{Dispatcher, SubscriptionCallback, SubscriptionHandle};

// =============================================================================
// ClientStats
// =============================================================================

/// Request counters for a client.
#[derive(Debug)]
pub struct ClientStats {
    reads: AtomicU64,
    writes: AtomicU64,
    browses: AtomicU64,
    calls: AtomicU64,
    subscriptions: AtomicU64,
    errors: AtomicU64,
    total_response_time_us: AtomicU64,
    connections: AtomicU64,
}

impl ClientStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            browses: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            subscriptions: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            connections: AtomicU64::new(0),
        }
    }

    fn add_time(&self, duration: Duration) {
        self.total_response_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Records a read batch.
    pub fn record_read(&self, duration: Duration) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Records a write batch.
    pub fn record_write(&self, duration: Duration) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Records a browse batch.
    pub fn record_browse(&self, duration: Duration) {
        self.browses.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Records a method call.
    pub fn record_call(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Records a created subscription.
    pub fn record_subscription(&self) {
        self.subscriptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an error.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a connection.
    pub fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of requests that completed.
    pub fn total_requests(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
            + self.writes.load(Ordering::Relaxed)
            + self.browses.load(Ordering::Relaxed)
            + self.calls.load(Ordering::Relaxed)
    }

    /// Returns the average response time over completed requests.
    pub fn average_response_time(&self) -> Duration {
        let total = self.total_requests();
        if total == 0 {
            return Duration::ZERO;
        }
        let total_us = self.total_response_time_us.load(Ordering::Relaxed);
        Duration::from_micros(total_us / total)
    }

    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            browses: self.browses.load(Ordering::Relaxed),
            calls: self.calls.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
            average_response_time_us: self.average_response_time().as_micros() as u64,
        }
    }

    /// Resets all statistics.
    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.browses.store(0, Ordering::Relaxed);
        self.calls.store(0, Ordering::Relaxed);
        self.subscriptions.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.total_response_time_us.store(0, Ordering::Relaxed);
        self.connections.store(0, Ordering::Relaxed);
    }
}

impl Default for ClientStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of [`ClientStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientStatsSnapshot {
    /// Read batches.
    pub reads: u64,
    /// Write batches.
    pub writes: u64,
    /// Browse batches.
    pub browses: u64,
    /// Method calls.
    pub calls: u64,
    /// Subscriptions created.
    pub subscriptions: u64,
    /// Failed operations.
    pub errors: u64,
    /// Successful connects.
    pub connections: u64,
    /// Average response time in microseconds.
    pub average_response_time_us: u64,
}

// =============================================================================
// UaClient
// =============================================================================

/// OPC UA client running typed requests through an engine.
///
/// # Example
///
/// ```rust,ignore
/// let client = UaClient::new(engine, ClientConfig::new("opc.tcp://localhost:4840"));
/// client.connect().await?;
///
/// let value = client.read_value(&NodeId::numeric(1, 1001)).await?;
/// client
///     .write_value(&NodeId::numeric(1, 1002), BuiltinType::Double, ArrayShape::SingleValue, &Value::Float(21.5))
///     .await?;
/// ```
pub struct UaClient<E: ClientEngine + 'static> {
    engine: Arc<E>,
    config: ClientConfig,
    registry: Arc<CodecRegistry>,
    connection: RwLock<Option<ConnectionId>>,
    stats: ClientStats,
}

impl<E: ClientEngine + 'static> UaClient<E> {
    /// Creates a client with the built-in codecs.
    pub fn new(engine: E, config: ClientConfig) -> Self {
        Self::from_arc(Arc::new(engine), config)
    }

    /// Creates a client over a shared engine.
    pub fn from_arc(engine: Arc<E>, config: ClientConfig) -> Self {
        Self {
            engine,
            config,
            registry: Arc::new(CodecRegistry::with_builtin_codecs()),
            connection: RwLock::new(None),
            stats: ClientStats::new(),
        }
    }

    /// Replaces the codec registry.
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Returns the engine.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the codec registry.
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Returns the request counters.
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Opens the connection. Connecting twice returns the existing handle.
    pub async fn connect(&self) -> UaResult<ConnectionId> {
        if let Some(id) = *self.connection.read() {
            debug!(connection = %id, "Already connected");
            return Ok(id);
        }

        self.config.validate()?;

        let timeout = self.config.connect_timeout;
        let result = match tokio::time::timeout(timeout, self.engine.connect(&self.config)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout {
                operation: "connect",
                duration: timeout,
            }
            .into()),
        };
        let id = result.map_err(|e| self.fail("connect", e))?;

        *self.connection.write() = Some(id);
        self.stats.record_connection();
        info!(
            endpoint = %self.config.endpoint,
            connection = %id,
            engine = self.engine.name(),
            security_mode = %self.config.security_mode,
            "Connected"
        );
        Ok(id)
    }

    /// Closes the connection. Does nothing when not connected.
    pub async fn disconnect(&self) -> UaResult<()> {
        let Some(id) = *self.connection.read() else {
            return Ok(());
        };

        // The handle stays open until the engine has released it.
        self.engine
            .disconnect(id)
            .await
            .map_err(|e| self.fail("disconnect", e))?;
        {
            let mut slot = self.connection.write();
            if *slot == Some(id) {
                *slot = None;
            }
        }
        info!(endpoint = %self.config.endpoint, connection = %id, "Disconnected");
        Ok(())
    }

    /// Returns `true` while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.read().is_some()
    }

    /// Returns the open connection handle.
    pub fn connection_id(&self) -> UaResult<ConnectionId> {
        (*self.connection.read()).ok_or_else(UaError::not_connected)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Reads a batch of attributes. Results line up with `requests`.
    pub async fn read(&self, requests: &[ReadValue]) -> UaResult<Vec<DataValue>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.connection_id()?;
        let start = Instant::now();

        let wire: Vec<WireReadValue> = requests.iter().map(ReadValue::to_wire).collect();
        let results = self
            .execute("read", self.engine.read(connection, &wire))
            .await
            .and_then(|results| expect_count("read", requests.len(), results))
            .map_err(|e| self.fail("read", e))?;

        let values = results
            .iter()
            .map(|w| DataValue::from_wire_with(&self.registry, w, &self.config.conversion))
            .collect::<UaResult<Vec<_>>>()
            .map_err(|e| self.fail("read decode", e))?;

        self.stats.record_read(start.elapsed());
        debug!(
            connection = %connection,
            count = values.len(),
            first_node = %requests[0].node_id,
            "Read completed"
        );
        Ok(values)
    }

    /// Reads the Value attribute of one node.
    pub async fn read_value(&self, node_id: &NodeId) -> UaResult<DataValue> {
        let mut values = self.read(&[ReadValue::new(node_id.clone())]).await?;
        values
            .pop()
            .ok_or_else(|| EngineError::protocol("read returned no result").into())
    }

    /// Reads one node and renders it as a host value.
    pub async fn read_host(&self, node_id: &NodeId) -> UaResult<Value> {
        let value = self.read_value(node_id).await?;
        Ok(value.to_host(&self.config.conversion))
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Writes a batch of values and returns one status per request.
    pub async fn write(&self, requests: &[WriteValue]) -> UaResult<Vec<StatusCode>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.connection_id()?;
        let start = Instant::now();

        let wire = requests
            .iter()
            .map(|r| r.to_wire_with(&self.registry))
            .collect::<UaResult<Vec<WireWriteValue>>>()
            .map_err(|e| self.fail("write encode", e))?;

        let statuses = self
            .execute("write", self.engine.write(connection, &wire))
            .await
            .and_then(|statuses| expect_count("write", requests.len(), statuses))
            .map_err(|e| self.fail("write", e))?;

        self.stats.record_write(start.elapsed());
        debug!(
            connection = %connection,
            count = statuses.len(),
            failed = statuses.iter().filter(|s| !s.is_good()).count(),
            "Write completed"
        );
        Ok(statuses)
    }

    /// Writes an untyped host value, checked against the declared type and shape.
    pub async fn write_value(
        &self,
        node_id: &NodeId,
        builtin_type: BuiltinType,
        shape: ArrayShape,
        value: &Value,
    ) -> UaResult<StatusCode> {
        let request = WriteValue::from_host(node_id.clone(), builtin_type, shape, value)
            .map_err(|e| self.fail("write encode", e))?;
        let mut statuses = self.write(&[request]).await?;
        statuses
            .pop()
            .ok_or_else(|| EngineError::protocol("write returned no status").into())
    }

    // =========================================================================
    // Browse / Call
    // =========================================================================

    /// Browses a batch of nodes.
    pub async fn browse(&self, requests: &[BrowseRequest]) -> UaResult<Vec<BrowseResult>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.connection_id()?;
        let start = Instant::now();

        let wire: Vec<WireBrowseRequest> = requests.iter().map(BrowseRequest::to_wire).collect();
        let results = self
            .execute("browse", self.engine.browse(connection, &wire))
            .await
            .and_then(|results| expect_count("browse", requests.len(), results))
            .map_err(|e| self.fail("browse", e))?;

        let results = results
            .iter()
            .map(BrowseResult::from_wire)
            .collect::<UaResult<Vec<_>>>()
            .map_err(|e| self.fail("browse decode", e))?;

        self.stats.record_browse(start.elapsed());
        debug!(
            connection = %connection,
            count = results.len(),
            references = results.iter().map(|r| r.references.len()).sum::<usize>(),
            "Browse completed"
        );
        Ok(results)
    }

    /// Calls a method.
    pub async fn call_method(&self, request: &CallMethodRequest) -> UaResult<CallMethodResult> {
        let connection = self.connection_id()?;
        let start = Instant::now();

        let wire = request
            .to_wire_with(&self.registry)
            .map_err(|e| self.fail("call encode", e))?;
        let result = self
            .execute("call", self.engine.call_method(connection, &wire))
            .await
            .and_then(|result| {
                CallMethodResult::from_wire_with(&self.registry, &result, &self.config.conversion)
            })
            .map_err(|e| self.fail("call", e))?;

        self.stats.record_call(start.elapsed());
        debug!(
            connection = %connection,
            method = %request.method_node_id,
            status = %result.status,
            outputs = result.output_params.len(),
            "Method call completed"
        );
        Ok(result)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Monitors `nodes` and delivers their changes to `callback`.
    pub async fn subscribe(
        &self,
        nodes: &[NodeId],
        callback: impl SubscriptionCallback + 'static,
    ) -> UaResult<SubscriptionHandle> {
        if nodes.is_empty() {
            return Err(SubscriptionError::creation_failed("no nodes to monitor").into());
        }
        let connection = self.connection_id()?;

        let dispatcher = Dispatcher::new(
            Arc::new(callback),
            Arc::clone(&self.registry),
            self.config.conversion,
        );
        let id = self
            .execute(
                "create_subscription",
                self.engine.create_subscription(connection, dispatcher.sink()),
            )
            .await
            .map_err(|e| self.fail("create subscription", e))?;
        dispatcher.bind(id);

        let node_ids: Vec<String> = nodes.iter().map(ToString::to_string).collect();
        let added = self
            .execute(
                "add_monitored_items",
                self.engine.add_monitored_items(connection, id, &node_ids),
            )
            .await;
        if let Err(e) = added {
            dispatcher.deactivate();
            if let Err(cleanup) = self.engine.delete_subscription(connection, id).await {
                cleanup.log("delete subscription after failed monitor");
            }
            return Err(self.fail("add monitored items", e));
        }

        self.stats.record_subscription();
        info!(
            connection = %connection,
            subscription_id = %id,
            nodes = node_ids.len(),
            "Subscription created"
        );

        let engine: Arc<dyn ClientEngine> = self.engine.clone();
        Ok(SubscriptionHandle::new(
            id,
            connection,
            nodes.to_vec(),
            engine,
            dispatcher,
        ))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn execute<T, F>(&self, operation: &'static str, request: F) -> UaResult<T>
    where
        F: Future<Output = UaResult<T>>,
    {
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout {
                operation,
                duration: timeout,
            }
            .into()),
        }
    }

    fn fail(&self, context: &str, error: UaError) -> UaError {
        self.stats.record_error();
        error.log(context);
        error
    }
}

impl<E: ClientEngine + 'static> std::fmt::Debug for UaClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UaClient")
            .field("endpoint", &self.config.endpoint)
            .field("engine", &self.engine.name())
            .field("connection", &*self.connection.read())
            .field("codecs", &self.registry.len())
            .finish()
    }
}

fn expect_count<T>(operation: &str, expected: usize, results: Vec<T>) -> UaResult<Vec<T>> {
    if results.len() != expected {
        return Err(EngineError::protocol(format!(
            "{} returned {} results for {} requests",
            operation,
            results.len(),
            expected
        ))
        .into());
    }
    Ok(results)
}

// =============================================================================
// Tests
// =============================================================================
