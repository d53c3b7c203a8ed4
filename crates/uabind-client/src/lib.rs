// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client access layer over an external protocol engine.
//!
//! The engine (a native stack or a test double) implements [`ClientEngine`]
//! and speaks only the wire form from [`uabind_core::wire`]. [`UaClient`]
//! runs every request and result through the codec chain so callers work
//! with typed [`uabind_core::Variant`] and [`uabind_core::DataValue`] values.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       UaClient                         │
//! │  read / write / browse / call_method / subscribe       │
//! ├──────────────────────────┬─────────────────────────────┤
//! │  uabind_core codecs      │  SubscriptionHandle         │
//! │  (Variant, DataValue)    │  (Dispatcher -> callback)   │
//! ├──────────────────────────┴─────────────────────────────┤
//! │              ClientEngine (wire form only)             │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use uabind_client::{ChannelCallback, ClientConfig, UaClient};
//! use uabind_core::NodeId;
//!
//! let config = ClientConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//! let client = UaClient::new(engine, config);
//! client.connect().await?;
//!
//! let temperature = client.read_host(&"ns=2;s=Boiler.Temp".parse()?).await?;
//!
//! let (callback, mut rx) = ChannelCallback::with_channel();
//! let handle = client.subscribe(&[NodeId::numeric(2, 1001)], callback).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod engine;
pub mod logging;
pub mod subscription;

pub use client::{ClientStats, ClientStatsSnapshot, UaClient};
pub use config::{
    load_config, load_config_str, ClientConfig, ClientConfigBuilder, ConfigFormat, SecurityMode,
    SecurityPolicy, UserIdentity,
};
pub use engine::{ClientEngine, ConnectionId, DataChangeSink, SubscriptionId};
pub use logging::{init_logging, LogFormat};
pub use subscription::{
    BroadcastCallback, ChannelCallback, DataChangeNotification, FnCallback, SubscriptionCallback,
    SubscriptionHandle, SubscriptionStats,
};
