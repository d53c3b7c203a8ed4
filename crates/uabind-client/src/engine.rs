// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Boundary to the external protocol engine.
//!
//! The engine owns the network session, security and encoding. This crate
//! only hands it wire-form requests and reads back wire-form results over a
//! numeric connection handle.
//!
//! # Threading
//!
//! Data change notifications arrive on engine-owned threads through a
//! [`DataChangeSink`]. A sink must not block and must never unwind.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uabind_core::wire::{
    WireBrowseRequest, WireBrowseResult, WireCallMethodRequest, WireCallMethodResult,
    WireDataValue, WireReadValue, WireWriteValue,
};
use uabind_core::{StatusCode, UaResult};

use crate::config::ClientConfig;

// =============================================================================
// Handles
// =============================================================================

/// Engine-assigned connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Engine-assigned subscription handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Callback the engine invokes for each data change.
///
/// Arguments are the connection, the monitored node address and the new
/// value in wire form. The value is borrowed for the duration of the call.
pub type DataChangeSink = Arc<dyn Fn(ConnectionId, &str, &WireDataValue) + Send + Sync>;

// =============================================================================
// ClientEngine
// =============================================================================

/// An external OPC UA protocol engine.
///
/// Implementations report transport and service failures as
/// [`uabind_core::EngineError`]. Result vectors must line up one-to-one with
/// the request slice.
#[async_trait]
pub trait ClientEngine: Send + Sync {
    /// Opens a connection to the configured endpoint.
    async fn connect(&self, config: &ClientConfig) -> UaResult<ConnectionId>;

    /// Closes a connection and every subscription on it.
    async fn disconnect(&self, connection: ConnectionId) -> UaResult<()>;

    /// Reads attribute values.
    async fn read(
        &self,
        connection: ConnectionId,
        requests: &[WireReadValue],
    ) -> UaResult<Vec<WireDataValue>>;

    /// Writes attribute values and returns one status per request.
    async fn write(
        &self,
        connection: ConnectionId,
        requests: &[WireWriteValue],
    ) -> UaResult<Vec<StatusCode>>;

    /// Browses references of the given nodes.
    async fn browse(
        &self,
        connection: ConnectionId,
        requests: &[WireBrowseRequest],
    ) -> UaResult<Vec<WireBrowseResult>>;

    /// Invokes a method on an object node.
    async fn call_method(
        &self,
        connection: ConnectionId,
        request: &WireCallMethodRequest,
    ) -> UaResult<WireCallMethodResult>;

    /// Creates a subscription whose notifications are delivered to `sink`.
    async fn create_subscription(
        &self,
        connection: ConnectionId,
        sink: DataChangeSink,
    ) -> UaResult<SubscriptionId>;

    /// Adds monitored items to a subscription.
    async fn add_monitored_items(
        &self,
        connection: ConnectionId,
        subscription: SubscriptionId,
        node_ids: &[String],
    ) -> UaResult<()>;

    /// Deletes a subscription and drops its sink.
    async fn delete_subscription(
        &self,
        connection: ConnectionId,
        subscription: SubscriptionId,
    ) -> UaResult<()>;

    /// Returns the engine name for logging.
    fn name(&self) -> &str {
        "engine"
    }
}
