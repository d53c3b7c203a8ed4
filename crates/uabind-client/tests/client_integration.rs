// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client Integration Tests
//!
//! These tests drive [`UaClient`] against `MockEngine`, an in-memory
//! [`ClientEngine`] that stores wire values by node address and delivers
//! subscription notifications from its own threads, like a native engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p uabind-client --test client_integration
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uabind_client::{
    ChannelCallback, ClientConfig, ClientEngine, ConnectionId, DataChangeSink, FnCallback,
    SubscriptionId, UaClient,
};
use uabind_core::wire::{
    WireBrowseRequest, WireBrowseResult, WireBrowseResultReference, WireCallMethodRequest,
    WireCallMethodResult, WireDataValue, WireReadValue, WireScalar, WireVariant,
    WireVariantValue, WireWriteValue,
};
use uabind_core::{
    ArrayShape, ArrayValue, AttributeId, BrowseRequest, BuiltinType, CallMethodRequest,
    ConversionError, ConversionOptions, DataValue, EngineError, NodeClass, NodeId, ReadValue,
    ScalarValue, StatusCode, SubscriptionError, UaError, UaResult, Value, Variant,
    WideIntegerMode, WriteValue,
};

// =============================================================================
// MockEngine
// =============================================================================

#[derive(Default)]
struct MockEngine {
    nodes: Mutex<HashMap<String, WireDataValue>>,
    connected: AtomicBool,
    refuse_connect: AtomicBool,
    fail_disconnect: AtomicBool,
    connects: AtomicU32,
    fail_monitoring: AtomicBool,
    drop_last_result: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
    next_subscription: AtomicU32,
    sinks: Mutex<HashMap<u32, (DataChangeSink, Vec<String>)>>,
    deleted: Mutex<Vec<u32>>,
}

impl MockEngine {
    fn with_node(self, node_id: &str, value: Variant) -> Self {
        let wire = DataValue::from(value).to_wire().unwrap();
        self.nodes.lock().insert(node_id.to_string(), wire);
        self
    }

    fn stored(&self, node_id: &str) -> Option<WireDataValue> {
        self.nodes.lock().get(node_id).cloned()
    }

    /// Delivers a change from an engine-owned thread.
    fn notify(&self, node_id: &str, wire: WireDataValue) {
        let targets: Vec<DataChangeSink> = self
            .sinks
            .lock()
            .values()
            .filter(|(_, nodes)| nodes.iter().any(|n| n == node_id))
            .map(|(sink, _)| Arc::clone(sink))
            .collect();

        let node_id = node_id.to_string();
        thread::spawn(move || {
            for sink in targets {
                sink(ConnectionId(1), &node_id, &wire);
            }
        })
        .join()
        .unwrap();
    }

    fn check_connected(&self, connection: ConnectionId) -> UaResult<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(EngineError::NotConnected.into());
        }
        if connection != ConnectionId(1) {
            return Err(EngineError::UnknownConnection { id: connection.0 }.into());
        }
        Ok(())
    }

    fn missing_value() -> WireDataValue {
        // Engines leave the payload uninitialized on failure
        WireDataValue {
            value: WireVariant {
                built_in_type_id: BuiltinType::Double.id(),
                array_type: 0,
                value: WireVariantValue::Scalar(WireScalar::Opaque(vec![0xCD; 16])),
            },
            status: StatusCode::BAD_NODE_ID_UNKNOWN,
            ..WireDataValue::default()
        }
    }
}

#[async_trait]
impl ClientEngine for MockEngine {
    async fn connect(&self, config: &ClientConfig) -> UaResult<ConnectionId> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(EngineError::connection_refused(&config.endpoint).into());
        }
        self.connected.store(true, Ordering::SeqCst);
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(ConnectionId(1))
    }

    async fn disconnect(&self, connection: ConnectionId) -> UaResult<()> {
        self.check_connected(connection)?;
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(EngineError::request_failed("disconnect", StatusCode::BAD).into());
        }
        self.connected.store(false, Ordering::SeqCst);
        self.sinks.lock().clear();
        Ok(())
    }

    async fn read(
        &self,
        connection: ConnectionId,
        requests: &[WireReadValue],
    ) -> UaResult<Vec<WireDataValue>> {
        self.check_connected(connection)?;
        let delay = *self.read_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let nodes = self.nodes.lock();
        let mut results: Vec<WireDataValue> = requests
            .iter()
            .map(|r| {
                if r.attribute_id != AttributeId::Value.value() {
                    return WireDataValue {
                        status: StatusCode::BAD_ATTRIBUTE_ID_INVALID,
                        ..WireDataValue::default()
                    };
                }
                nodes
                    .get(&r.node_id)
                    .cloned()
                    .unwrap_or_else(MockEngine::missing_value)
            })
            .collect();

        if self.drop_last_result.load(Ordering::SeqCst) {
            results.pop();
        }
        Ok(results)
    }

    async fn write(
        &self,
        connection: ConnectionId,
        requests: &[WireWriteValue],
    ) -> UaResult<Vec<StatusCode>> {
        self.check_connected(connection)?;
        let mut nodes = self.nodes.lock();
        Ok(requests
            .iter()
            .map(|r| match nodes.get_mut(&r.node_id) {
                None => StatusCode::BAD_NODE_ID_UNKNOWN,
                Some(current)
                    if current.value.built_in_type_id != r.value.value.built_in_type_id =>
                {
                    StatusCode::BAD_TYPE_MISMATCH
                }
                Some(current) => {
                    *current = r.value.clone();
                    StatusCode::GOOD
                }
            })
            .collect())
    }

    async fn browse(
        &self,
        connection: ConnectionId,
        requests: &[WireBrowseRequest],
    ) -> UaResult<Vec<WireBrowseResult>> {
        self.check_connected(connection)?;
        let nodes = self.nodes.lock();
        Ok(requests
            .iter()
            .map(|r| {
                let mut children: Vec<&String> = nodes.keys().collect();
                children.sort();
                let references: Vec<WireBrowseResultReference> = children
                    .into_iter()
                    .map(|child| WireBrowseResultReference {
                        reference_type_id: r.reference_type_id.clone(),
                        is_forward: true,
                        node_id: Some(child.clone()),
                        browse_name: Some(child.clone()),
                        display_name: None,
                        node_class: NodeClass::Variable.value(),
                    })
                    .collect();
                WireBrowseResult {
                    status: StatusCode::GOOD,
                    nb_of_references: references.len() as i32,
                    references,
                }
            })
            .collect())
    }

    async fn call_method(
        &self,
        connection: ConnectionId,
        request: &WireCallMethodRequest,
    ) -> UaResult<WireCallMethodResult> {
        self.check_connected(connection)?;
        if request.method_node_id == "ns=1;s=Broken" {
            return Ok(WireCallMethodResult {
                status: StatusCode::BAD_INTERNAL_ERROR,
                nb_of_output_params: 3,
                output_params: Vec::new(),
            });
        }
        // Echo
        Ok(WireCallMethodResult {
            status: StatusCode::GOOD,
            nb_of_output_params: request.nb_of_input_params(),
            output_params: request.input_params().to_vec(),
        })
    }

    async fn create_subscription(
        &self,
        connection: ConnectionId,
        sink: DataChangeSink,
    ) -> UaResult<SubscriptionId> {
        self.check_connected(connection)?;
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst) + 1;
        self.sinks.lock().insert(id, (sink, Vec::new()));
        Ok(SubscriptionId(id))
    }

    async fn add_monitored_items(
        &self,
        connection: ConnectionId,
        subscription: SubscriptionId,
        node_ids: &[String],
    ) -> UaResult<()> {
        self.check_connected(connection)?;
        if self.fail_monitoring.load(Ordering::SeqCst) {
            return Err(EngineError::request_failed("add_monitored_items", StatusCode::BAD).into());
        }
        match self.sinks.lock().get_mut(&subscription.0) {
            Some((_, nodes)) => {
                nodes.extend(node_ids.iter().cloned());
                Ok(())
            }
            None => Err(EngineError::protocol("unknown subscription").into()),
        }
    }

    async fn delete_subscription(
        &self,
        connection: ConnectionId,
        subscription: SubscriptionId,
    ) -> UaResult<()> {
        self.check_connected(connection)?;
        self.sinks.lock().remove(&subscription.0);
        self.deleted.lock().push(subscription.0);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Helpers
// =============================================================================

const ENDPOINT: &str = "opc.tcp://localhost:4840";

fn plant_engine() -> MockEngine {
    MockEngine::default()
        .with_node("ns=1;s=Boiler.Temp", Variant::Scalar(ScalarValue::Double(71.25)))
        .with_node("ns=1;i=1001", Variant::Scalar(ScalarValue::Int32(-7)))
        .with_node(
            "ns=1;s=Counters",
            Variant::Array(ArrayValue::UInt64(vec![1, 9_007_199_254_740_993])),
        )
        .with_node(
            "ns=1;s=Name",
            Variant::Scalar(ScalarValue::String("Line 3".into())),
        )
}

async fn connected(engine: MockEngine) -> UaClient<MockEngine> {
    let client = UaClient::new(engine, ClientConfig::new(ENDPOINT));
    client.connect().await.unwrap();
    client
}

fn node(s: &str) -> NodeId {
    s.parse().unwrap()
}

fn double_change(value: f64) -> WireDataValue {
    DataValue::from(Variant::Scalar(ScalarValue::Double(value)))
        .to_wire()
        .unwrap()
}

// =============================================================================
// Connection
// =============================================================================

#[tokio::test]
async fn test_connect_and_disconnect() {
    let client = UaClient::new(MockEngine::default(), ClientConfig::new(ENDPOINT));
    assert!(!client.is_connected());

    let id = client.connect().await.unwrap();
    assert_eq!(id, ConnectionId(1));
    assert_eq!(client.connect().await.unwrap(), id);
    assert_eq!(client.stats().snapshot().connections, 1);

    client.disconnect().await.unwrap();
    assert!(!client.is_connected());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_connect_refused() {
    let engine = MockEngine::default();
    engine.refuse_connect.store(true, Ordering::SeqCst);
    let client = UaClient::new(engine, ClientConfig::new(ENDPOINT));

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, UaError::Engine(EngineError::ConnectionRefused { .. })));
    assert!(err.is_retryable());
    assert_eq!(client.stats().snapshot().errors, 1);
}

#[tokio::test]
async fn test_failed_disconnect_keeps_connection() {
    let client = connected(MockEngine::default()).await;
    client.engine().fail_disconnect.store(true, Ordering::SeqCst);

    let err = client.disconnect().await.unwrap_err();
    assert!(matches!(err, UaError::Engine(EngineError::RequestFailed { .. })));
    assert!(client.is_connected());
    assert_eq!(client.connection_id().unwrap(), ConnectionId(1));

    // Reconnecting reuses the open handle instead of opening a second one.
    assert_eq!(client.connect().await.unwrap(), ConnectionId(1));
    assert_eq!(client.engine().connects.load(Ordering::SeqCst), 1);

    client.engine().fail_disconnect.store(false, Ordering::SeqCst);
    client.disconnect().await.unwrap();
    assert!(!client.is_connected());
    assert!(!client.engine().connected.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_connect_rejects_invalid_config() {
    let client = UaClient::new(MockEngine::default(), ClientConfig::new("localhost:4840"));
    assert!(matches!(client.connect().await, Err(UaError::Configuration(_))));
    assert!(!client.engine().connected.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_requests_require_connection() {
    let client = UaClient::new(plant_engine(), ClientConfig::new(ENDPOINT));
    let err = client.read_value(&node("ns=1;i=1001")).await.unwrap_err();
    assert!(matches!(err, UaError::Engine(EngineError::NotConnected)));
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn test_read_batch() {
    let client = connected(plant_engine()).await;

    let values = client
        .read(&[
            ReadValue::parse("ns=1;s=Boiler.Temp").unwrap(),
            ReadValue::parse("ns=1;i=1001").unwrap(),
            ReadValue::parse("ns=1;s=Name").unwrap(),
        ])
        .await
        .unwrap();

    assert_eq!(values.len(), 3);
    assert_eq!(values[0].value, Some(Variant::Scalar(ScalarValue::Double(71.25))));
    assert_eq!(values[1].value, Some(Variant::Scalar(ScalarValue::Int32(-7))));
    assert_eq!(
        values[2].value,
        Some(Variant::Scalar(ScalarValue::String("Line 3".into())))
    );
    assert_eq!(client.stats().snapshot().reads, 1);
}

#[tokio::test]
async fn test_read_empty_batch_skips_engine() {
    let client = UaClient::new(plant_engine(), ClientConfig::new(ENDPOINT));
    assert!(client.read(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_unknown_node_is_gated() {
    let client = connected(plant_engine()).await;

    let value = client.read_value(&node("ns=1;s=Missing")).await.unwrap();
    assert_eq!(value.status, StatusCode::BAD_NODE_ID_UNKNOWN);
    assert!(value.value.is_none());
    assert_eq!(value.to_host(&ConversionOptions::default()), Value::Null);
}

#[tokio::test]
async fn test_read_unknown_node_ungated_fails_cleanly() {
    let config = ClientConfig::builder()
        .endpoint(ENDPOINT)
        .conversion(ConversionOptions::default().with_status_gating(false))
        .build()
        .unwrap();
    let client = UaClient::new(plant_engine(), config);
    client.connect().await.unwrap();

    let err = client.read_value(&node("ns=1;s=Missing")).await.unwrap_err();
    assert!(matches!(
        err,
        UaError::Conversion(ConversionError::PayloadMismatch { .. })
    ));
    assert_eq!(client.stats().snapshot().errors, 1);
}

#[tokio::test]
async fn test_read_non_value_attribute() {
    let client = connected(plant_engine()).await;
    let request = ReadValue::new(node("ns=1;i=1001")).with_attribute(AttributeId::DisplayName);

    let values = client.read(&[request]).await.unwrap();
    assert_eq!(values[0].status, StatusCode::BAD_ATTRIBUTE_ID_INVALID);
}

#[tokio::test]
async fn test_read_host_wide_integers() {
    let client = connected(plant_engine()).await;
    let host = client.read_host(&node("ns=1;s=Counters")).await.unwrap();
    assert_eq!(
        host,
        Value::Array(vec![Value::UInt(1), Value::Text("9007199254740993".into())])
    );

    let config = ClientConfig::builder()
        .endpoint(ENDPOINT)
        .conversion(ConversionOptions::default().with_wide_integers(WideIntegerMode::Text))
        .build()
        .unwrap();
    let client = UaClient::new(plant_engine(), config);
    client.connect().await.unwrap();
    let host = client.read_host(&node("ns=1;s=Counters")).await.unwrap();
    assert_eq!(
        host,
        Value::Array(vec![Value::Text("1".into()), Value::Text("9007199254740993".into())])
    );
}

#[tokio::test]
async fn test_read_result_count_mismatch() {
    let engine = plant_engine();
    engine.drop_last_result.store(true, Ordering::SeqCst);
    let client = connected(engine).await;

    let err = client
        .read(&[ReadValue::new(node("ns=1;i=1001"))])
        .await
        .unwrap_err();
    assert!(matches!(err, UaError::Engine(EngineError::Protocol { .. })));
}

#[tokio::test]
async fn test_read_timeout() {
    let engine = plant_engine();
    *engine.read_delay.lock() = Some(Duration::from_millis(500));
    let config = ClientConfig::builder()
        .endpoint(ENDPOINT)
        .request_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let client = UaClient::new(engine, config);
    client.connect().await.unwrap();

    let err = client.read_value(&node("ns=1;i=1001")).await.unwrap_err();
    assert!(matches!(
        err,
        UaError::Engine(EngineError::Timeout { operation: "read", .. })
    ));
}

// =============================================================================
// Write
// =============================================================================

#[tokio::test]
async fn test_write_then_read_back() {
    let client = connected(plant_engine()).await;

    let status = client
        .write_value(
            &node("ns=1;s=Boiler.Temp"),
            BuiltinType::Double,
            ArrayShape::SingleValue,
            &Value::Float(80.5),
        )
        .await
        .unwrap();
    assert!(status.is_good());

    let host = client.read_host(&node("ns=1;s=Boiler.Temp")).await.unwrap();
    assert_eq!(host, Value::Float(80.5));
}

#[tokio::test]
async fn test_write_wide_integer_text() {
    let client = connected(plant_engine()).await;

    let status = client
        .write_value(
            &node("ns=1;s=Counters"),
            BuiltinType::UInt64,
            ArrayShape::Array,
            &Value::Array(vec![Value::Text("4256896097".into()), Value::UInt(2)]),
        )
        .await
        .unwrap();
    assert!(status.is_good());

    let stored = client.engine().stored("ns=1;s=Counters").unwrap();
    let decoded = DataValue::from_wire(&stored).unwrap();
    assert_eq!(
        decoded.value,
        Some(Variant::Array(ArrayValue::UInt64(vec![4_256_896_097, 2])))
    );
}

#[tokio::test]
async fn test_write_statuses_per_request() {
    let client = connected(plant_engine()).await;

    let statuses = client
        .write(&[
            WriteValue::new(
                node("ns=1;i=1001"),
                DataValue::from(Variant::Scalar(ScalarValue::Int32(12))),
            ),
            WriteValue::new(
                node("ns=1;i=1001"),
                DataValue::from(Variant::Scalar(ScalarValue::Boolean(true))),
            ),
            WriteValue::new(
                node("ns=1;i=4040"),
                DataValue::from(Variant::Scalar(ScalarValue::Int32(1))),
            ),
        ])
        .await
        .unwrap();

    assert_eq!(
        statuses,
        vec![
            StatusCode::GOOD,
            StatusCode::BAD_TYPE_MISMATCH,
            StatusCode::BAD_NODE_ID_UNKNOWN
        ]
    );
}

#[tokio::test]
async fn test_write_unsupported_type_never_reaches_engine() {
    let client = connected(plant_engine()).await;

    let err = client
        .write_value(
            &node("ns=1;s=Name"),
            BuiltinType::Guid,
            ArrayShape::SingleValue,
            &Value::Text("0000".into()),
        )
        .await
        .unwrap_err();
    assert!(err.is_unsupported_type());

    let err = client
        .write_value(
            &node("ns=1;s=Name"),
            BuiltinType::Int32,
            ArrayShape::Matrix,
            &Value::Array(vec![]),
        )
        .await
        .unwrap_err();
    assert!(err.is_unsupported_shape());

    let err = client
        .write_value(
            &node("ns=1;s=Name"),
            BuiltinType::String,
            ArrayShape::SingleValue,
            &Value::Int(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UaError::Conversion(ConversionError::TypeMismatch { .. })
    ));

    let stored = client.engine().stored("ns=1;s=Name").unwrap();
    assert_eq!(
        DataValue::from_wire(&stored).unwrap().value,
        Some(Variant::Scalar(ScalarValue::String("Line 3".into())))
    );
    assert_eq!(client.stats().snapshot().writes, 0);
}

// =============================================================================
// Browse / Call
// =============================================================================

#[tokio::test]
async fn test_browse() {
    let client = connected(plant_engine()).await;

    let results = client
        .browse(&[BrowseRequest::parse("i=85").unwrap()])
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let references = &results[0].references;
    assert_eq!(references.len(), 4);
    assert_eq!(references[0].node_id.as_deref(), Some("ns=1;i=1001"));
    assert_eq!(references[0].node_class, Some(NodeClass::Variable));
    assert!(references[0].display_name.is_none());
}

#[tokio::test]
async fn test_call_method_echo() {
    let client = connected(plant_engine()).await;

    let request = CallMethodRequest::new(node("ns=1;s=Pump"), node("ns=1;s=Echo"))
        .with_input(Variant::Scalar(ScalarValue::UInt16(9)))
        .with_input(Variant::Array(ArrayValue::String(vec!["a".into(), "".into()])));

    let result = client.call_method(&request).await.unwrap();
    assert!(result.status.is_good());
    assert_eq!(result.output_params, request.input_params);
}

#[tokio::test]
async fn test_call_method_failure_gates_outputs() {
    let client = connected(plant_engine()).await;

    let request = CallMethodRequest::new(node("ns=1;s=Pump"), node("ns=1;s=Broken"));
    let result = client.call_method(&request).await.unwrap();
    assert_eq!(result.status, StatusCode::BAD_INTERNAL_ERROR);
    assert!(result.output_params.is_empty());
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscription_delivers_decoded_values() {
    let client = connected(plant_engine()).await;
    let (callback, mut rx) = ChannelCallback::with_channel();

    let handle = client
        .subscribe(&[node("ns=1;s=Boiler.Temp")], callback)
        .await
        .unwrap();
    assert!(handle.is_active());
    assert_eq!(handle.monitored_nodes().len(), 1);

    client.engine().notify("ns=1;s=Boiler.Temp", double_change(72.0));
    client.engine().notify("ns=1;i=1001", double_change(1.0));
    client.engine().notify("ns=1;s=Boiler.Temp", double_change(73.5));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.subscription_id, handle.id());
    assert_eq!(first.node_id, "ns=1;s=Boiler.Temp");
    assert_eq!(first.host_value(&ConversionOptions::default()), Value::Float(72.0));

    let second = rx.recv().await.unwrap();
    assert_eq!(second.sequence_number, 2);
    assert_eq!(second.host_value(&ConversionOptions::default()), Value::Float(73.5));

    assert_eq!(handle.stats().notifications, 2);
    assert_eq!(client.stats().snapshot().subscriptions, 1);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let client = connected(plant_engine()).await;
    let received = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&received);

    let handle = client
        .subscribe(
            &[node("ns=1;i=1001")],
            FnCallback::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await
        .unwrap();

    client.engine().notify("ns=1;i=1001", double_change(1.0));
    handle.unsubscribe().await.unwrap();
    client.engine().notify("ns=1;i=1001", double_change(2.0));

    assert_eq!(received.load(Ordering::SeqCst), 1);
    assert!(!handle.is_active());
    assert_eq!(*client.engine().deleted.lock(), vec![handle.id().0]);

    let err = handle.unsubscribe().await.unwrap_err();
    assert!(matches!(
        err,
        UaError::Subscription(SubscriptionError::Closed { .. })
    ));
}

#[tokio::test]
async fn test_decode_error_reaches_on_error() {
    let client = connected(plant_engine()).await;
    let (callback, mut rx) = ChannelCallback::with_channel();
    let handle = client
        .subscribe(&[node("ns=1;i=1001")], callback)
        .await
        .unwrap();

    let mut garbage = double_change(0.0);
    garbage.value.value = WireVariantValue::Scalar(WireScalar::Opaque(vec![1]));
    client.engine().notify("ns=1;i=1001", garbage);
    client.engine().notify("ns=1;i=1001", double_change(3.0));

    let delivered = rx.recv().await.unwrap();
    assert_eq!(delivered.host_value(&ConversionOptions::default()), Value::Float(3.0));
    assert_eq!(handle.stats().decode_errors, 1);
    assert_eq!(handle.stats().notifications, 1);
}

#[tokio::test]
async fn test_dropped_handle_deletes_subscription() {
    let client = connected(plant_engine()).await;
    let (callback, _rx) = ChannelCallback::with_channel();
    let handle = client
        .subscribe(&[node("ns=1;i=1001")], callback)
        .await
        .unwrap();
    let id = handle.id().0;

    drop(handle);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(*client.engine().deleted.lock(), vec![id]);
    assert!(client.engine().sinks.lock().is_empty());
}

#[tokio::test]
async fn test_failed_monitoring_cleans_up() {
    let engine = plant_engine();
    engine.fail_monitoring.store(true, Ordering::SeqCst);
    let client = connected(engine).await;
    let (callback, _rx) = ChannelCallback::with_channel();

    let err = client
        .subscribe(&[node("ns=1;i=1001")], callback)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UaError::Engine(EngineError::RequestFailed { .. })
    ));
    assert!(client.engine().sinks.lock().is_empty());
    assert_eq!(client.engine().deleted.lock().len(), 1);
}

#[tokio::test]
async fn test_subscribe_without_nodes() {
    let client = connected(plant_engine()).await;
    let (callback, _rx) = ChannelCallback::with_channel();
    let err = client.subscribe(&[], callback).await.unwrap_err();
    assert!(matches!(
        err,
        UaError::Subscription(SubscriptionError::CreationFailed { .. })
    ));
}
