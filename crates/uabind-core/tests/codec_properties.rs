// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Codec property tests.
//!
//! Exercises the public codec chain (host value, Variant, DataValue, wire)
//! end to end without an engine.
//!
//! ```bash
//! cargo test -p uabind-core --test codec_properties
//! ```

use uabind_core::codec::{self, Direction};
use uabind_core::wire::{
    WireArray, WireArrayContent, WireDataValue, WireIdentifier, WireLocalizedText, WireNodeId,
    WireScalar, WireString, WireVariant, WireVariantValue,
};
use uabind_core::{
    ArrayShape, ArrayValue, BuiltinType, ConversionError, ConversionOptions, DataValue,
    ScalarValue, StatusCode, UaError, Value, Variant, WideIntegerMode,
};

// =============================================================================
// Helpers
// =============================================================================

fn text_options() -> ConversionOptions {
    ConversionOptions::default().with_wide_integers(WideIntegerMode::Text)
}

fn host_round_trip(builtin: BuiltinType, shape: ArrayShape, host: &Value) -> Value {
    let variant = Variant::from_host(builtin, shape, host).expect("encode host value");
    let wire = variant.to_wire().expect("encode wire");
    assert_eq!(wire.built_in_type_id, builtin.id());
    assert_eq!(wire.array_type, shape.id());
    Variant::from_wire(&wire)
        .expect("decode wire")
        .to_host(&ConversionOptions::default())
}

fn wire_scalar(builtin: BuiltinType, value: WireScalar) -> WireVariant {
    WireVariant {
        built_in_type_id: builtin.id(),
        array_type: ArrayShape::SingleValue.id(),
        value: WireVariantValue::Scalar(value),
    }
}

const UNSUPPORTED: [BuiltinType; 8] = [
    BuiltinType::DateTime,
    BuiltinType::Guid,
    BuiltinType::ExpandedNodeId,
    BuiltinType::StatusCode,
    BuiltinType::ExtensionObject,
    BuiltinType::DataValue,
    BuiltinType::Variant,
    BuiltinType::DiagnosticInfo,
];

// =============================================================================
// Round-trip Law
// =============================================================================

#[test]
fn test_scalar_round_trip_every_supported_type() {
    let cases = [
        (BuiltinType::Boolean, Value::Bool(true)),
        (BuiltinType::SByte, Value::Int(-128)),
        (BuiltinType::Byte, Value::UInt(255)),
        (BuiltinType::Int16, Value::Int(-32768)),
        (BuiltinType::UInt16, Value::UInt(65535)),
        (BuiltinType::Int32, Value::Int(i64::from(i32::MIN))),
        (BuiltinType::UInt32, Value::UInt(u64::from(u32::MAX))),
        (BuiltinType::Int64, Value::Int(-42)),
        (BuiltinType::UInt64, Value::UInt(42)),
        (BuiltinType::Float, Value::Float(0.1f32 as f64)),
        (BuiltinType::Double, Value::Float(std::f64::consts::PI)),
        (BuiltinType::String, Value::Text("String_030".into())),
        (BuiltinType::ByteString, Value::Text("bytes".into())),
        (BuiltinType::XmlElement, Value::Text("<a/>".into())),
    ];

    for (builtin, host) in cases {
        assert_eq!(
            host_round_trip(builtin, ArrayShape::SingleValue, &host),
            host,
            "{builtin}"
        );
    }
}

#[test]
fn test_array_round_trip_every_supported_type() {
    for builtin in BuiltinType::ALL.into_iter().filter(|t| t.array_supported()) {
        let element = match builtin {
            BuiltinType::Boolean => Value::Bool(false),
            BuiltinType::SByte | BuiltinType::Int16 | BuiltinType::Int32 | BuiltinType::Int64 => {
                Value::Int(-7)
            }
            BuiltinType::Float | BuiltinType::Double => Value::Float(2.5),
            t if t.is_text() => Value::Text("x".into()),
            _ => Value::UInt(7),
        };
        let host = Value::Array(vec![element.clone(), element]);
        assert_eq!(host_round_trip(builtin, ArrayShape::Array, &host), host, "{builtin}");
    }
}

#[test]
fn test_float_bits_preserved() {
    for bits in [0x7FC0_0001u32, 0x8000_0000, 0x0000_0001] {
        let wire = Variant::Scalar(ScalarValue::Float(f32::from_bits(bits)))
            .to_wire()
            .unwrap();
        match Variant::from_wire(&wire).unwrap() {
            Variant::Scalar(ScalarValue::Float(v)) => assert_eq!(v.to_bits(), bits),
            other => panic!("unexpected {:?}", other),
        }
    }
}

// =============================================================================
// Length Invariant
// =============================================================================

#[test]
fn test_array_length_matches_element_count() {
    for count in [0usize, 1, 17] {
        let values: Vec<String> = (0..count).map(|i| format!("item-{i}")).collect();
        let wire = codec::encode_array(BuiltinType::String, &ArrayValue::String(values)).unwrap();
        assert_eq!(wire.length() as usize, count);
        assert_eq!(wire.content().len(), count);

        let ints = codec::encode_array(BuiltinType::UInt16, &ArrayValue::UInt16(vec![3; count])).unwrap();
        assert_eq!(ints.length() as usize, count);
    }
}

// =============================================================================
// String Termination Invariant
// =============================================================================

#[test]
fn test_text_buffers_terminated() {
    for builtin in [BuiltinType::String, BuiltinType::ByteString, BuiltinType::XmlElement] {
        for text in ["", "K", "a longer value"] {
            let variant = Variant::from_host(builtin, ArrayShape::SingleValue, &Value::from(text)).unwrap();
            let wire = variant.to_wire().unwrap();
            let WireVariantValue::Scalar(scalar) = &wire.value else {
                panic!("scalar expected");
            };
            let s = match scalar {
                WireScalar::String(s) | WireScalar::ByteString(s) | WireScalar::XmlElement(s) => s,
                other => panic!("unexpected branch {}", other.branch_name()),
            };
            assert_eq!(s.length() as usize, text.len());
            let bytes = s.as_bytes().unwrap();
            assert_eq!(bytes.len(), text.len() + 1);
            assert_eq!(*bytes.last().unwrap(), 0);
        }
    }
}

// =============================================================================
// Unsupported-type Rejection
// =============================================================================

#[test]
fn test_unsupported_types_raise_unsupported_type() {
    for builtin in UNSUPPORTED {
        let decoded = Variant::from_wire(&wire_scalar(builtin, WireScalar::Opaque(vec![1, 2, 3])));
        assert!(
            matches!(
                &decoded,
                Err(UaError::Conversion(ConversionError::UnsupportedType {
                    direction: Direction::Decode,
                    shape: ArrayShape::SingleValue,
                    ..
                }))
            ),
            "{builtin}: {decoded:?}"
        );

        let array_wire = WireVariant {
            built_in_type_id: builtin.id(),
            array_type: ArrayShape::Array.id(),
            value: WireVariantValue::Array(WireArray::from_raw(2, WireArrayContent::Opaque(vec![0; 8]))),
        };
        assert!(Variant::from_wire(&array_wire).unwrap_err().is_unsupported_type(), "{builtin}");

        for shape in [ArrayShape::SingleValue, ArrayShape::Array] {
            let host = match shape {
                ArrayShape::Array => Value::Array(vec![Value::Int(0)]),
                _ => Value::Int(0),
            };
            let encoded = Variant::from_host(builtin, shape, &host);
            assert!(
                matches!(
                    &encoded,
                    Err(UaError::Conversion(ConversionError::UnsupportedType {
                        direction: Direction::Encode,
                        ..
                    }))
                ),
                "{builtin} {shape}: {encoded:?}"
            );
        }

        assert!(codec::encode_scalar(builtin, &ScalarValue::Boolean(true))
            .unwrap_err()
            .is_unsupported_type());
    }
}

#[test]
fn test_structured_types_encode_and_array_rejected() {
    for builtin in [BuiltinType::NodeId, BuiltinType::QualifiedName, BuiltinType::LocalizedText] {
        assert!(Variant::from_host(builtin, ArrayShape::SingleValue, &Value::from("ns=1;i=1"))
            .unwrap_err()
            .is_unsupported_type());
        assert!(Variant::from_host(builtin, ArrayShape::Array, &Value::Array(Vec::new()))
            .unwrap_err()
            .is_unsupported_type());
    }

    let decoded = Variant::Scalar(ScalarValue::NodeId(None)).to_wire();
    assert!(decoded.unwrap_err().is_unsupported_type());
}

// =============================================================================
// NodeId Formatting
// =============================================================================

#[test]
fn test_node_id_decode_formatting() {
    let numeric = wire_scalar(
        BuiltinType::NodeId,
        WireScalar::NodeId(Some(Box::new(WireNodeId {
            namespace: 1,
            identifier: WireIdentifier::Numeric(1004),
        }))),
    );
    let string = wire_scalar(
        BuiltinType::NodeId,
        WireScalar::NodeId(Some(Box::new(WireNodeId {
            namespace: 1,
            identifier: WireIdentifier::String(WireString::from_text("String_030")),
        }))),
    );
    let options = ConversionOptions::default();

    assert_eq!(
        Variant::from_wire(&numeric).unwrap().to_host(&options),
        Value::Text("ns=1;i=1004".into())
    );
    assert_eq!(
        Variant::from_wire(&string).unwrap().to_host(&options),
        Value::Text("ns=1;s=String_030".into())
    );
}

// =============================================================================
// Status Gating
// =============================================================================

#[test]
fn test_bad_status_with_garbage_payload() {
    let garbage = WireDataValue {
        value: WireVariant {
            built_in_type_id: BuiltinType::UInt64.id(),
            array_type: ArrayShape::Array.id(),
            value: WireVariantValue::Array(WireArray::from_raw(
                i32::MAX,
                WireArrayContent::Opaque(vec![0xCD; 3]),
            )),
        },
        status: StatusCode::BAD_NOT_READABLE,
        source_timestamp: 1,
        server_timestamp: 2,
        ..WireDataValue::default()
    };

    let decoded = DataValue::from_wire(&garbage).unwrap();
    assert_eq!(decoded.value, None);
    assert_eq!(decoded.status, StatusCode::BAD_NOT_READABLE);
    assert_eq!((decoded.source_timestamp, decoded.server_timestamp), (1, 2));
    assert_eq!(decoded.to_host(&ConversionOptions::default()), Value::Null);
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_scenario_boolean_array() {
    let host = Value::from(vec![false, true, false, true, false]);
    let variant = Variant::from_host(BuiltinType::Boolean, ArrayShape::Array, &host).unwrap();

    let wire = DataValue::from(variant).to_wire().unwrap();
    let decoded = DataValue::from_wire(&wire).unwrap();

    let variant = decoded.value.as_ref().unwrap();
    assert_eq!(variant.shape(), ArrayShape::Array);
    assert_eq!(
        variant,
        &Variant::Array(ArrayValue::Boolean(vec![false, true, false, true, false]))
    );
    assert_eq!(decoded.to_host(&ConversionOptions::default()), host);
}

#[test]
fn test_scenario_uint64_text_array() {
    let host = Value::Array(vec![Value::Text("4256896097".into())]);
    let variant = Variant::from_host(BuiltinType::UInt64, ArrayShape::Array, &host).unwrap();
    assert_eq!(variant, Variant::Array(ArrayValue::UInt64(vec![4_256_896_097])));

    let wire = variant.to_wire().unwrap();
    let decoded = Variant::from_wire(&wire).unwrap();
    assert_eq!(decoded.to_host(&text_options()), host);

    // Values inside the safe integer range come back numeric by default.
    assert_eq!(
        decoded.to_host(&ConversionOptions::default()),
        Value::Array(vec![Value::UInt(4_256_896_097)])
    );
}

#[test]
fn test_scenario_localized_text_without_locale() {
    let wire = wire_scalar(
        BuiltinType::LocalizedText,
        WireScalar::LocalizedText(Some(Box::new(WireLocalizedText {
            default_locale: WireString::null(),
            default_text: WireString::from_text("hello"),
        }))),
    );
    assert_eq!(
        Variant::from_wire(&wire)
            .unwrap()
            .to_host(&ConversionOptions::default()),
        Value::Text("LANG=not_defined;TEXT=hello".into())
    );
}

#[test]
fn test_wide_values_beyond_safe_range_render_as_text() {
    let variant = Variant::Array(ArrayValue::Int64(vec![1, i64::MAX]));
    let wire = variant.to_wire().unwrap();
    assert_eq!(
        Variant::from_wire(&wire)
            .unwrap()
            .to_host(&ConversionOptions::default()),
        Value::Array(vec![Value::Int(1), Value::Text(i64::MAX.to_string())])
    );
}
