// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Decode-only codecs for NodeId, QualifiedName and LocalizedText scalars.
//!
//! A null pointer decodes to "no value" (`None`), never to a default.

use super::{payload_mismatch, BuiltinCodec};
use crate::error::{ConversionError, UaResult};
use crate::types::{BuiltinType, LocalizedText, NodeId, NodeIdentifier, QualifiedName};
use crate::variant::ScalarValue;
use crate::wire::{WireIdentifier, WireNodeId, WireScalar, WireString};

/// Converts a wire NodeId. Guid and ByteString identifiers are rejected.
pub fn node_id_from_wire(wire: &WireNodeId) -> UaResult<NodeId> {
    match &wire.identifier {
        WireIdentifier::Numeric(v) => Ok(NodeId::numeric(wire.namespace, *v)),
        WireIdentifier::String(s) => {
            Ok(NodeId::string(wire.namespace, s.read_text().unwrap_or_default()))
        }
        other @ (WireIdentifier::Guid(_) | WireIdentifier::ByteString(_)) => {
            Err(ConversionError::UnsupportedIdentifier { kind: other.kind() }.into())
        }
    }
}

/// Builds the wire form of a NodeId.
pub fn node_id_to_wire(node: &NodeId) -> WireNodeId {
    let identifier = match &node.identifier {
        NodeIdentifier::Numeric(v) => WireIdentifier::Numeric(*v),
        NodeIdentifier::String(s) => WireIdentifier::String(WireString::from_text(s)),
    };
    WireNodeId {
        namespace: node.namespace_index,
        identifier,
    }
}

/// Codec for NodeId scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeIdCodec;

impl BuiltinCodec for NodeIdCodec {
    fn builtin_type(&self) -> BuiltinType {
        BuiltinType::NodeId
    }

    fn name(&self) -> &'static str {
        "NodeIdCodec"
    }

    fn decode_scalar(&self, wire: &WireScalar) -> UaResult<ScalarValue> {
        match wire {
            WireScalar::NodeId(None) => Ok(ScalarValue::NodeId(None)),
            WireScalar::NodeId(Some(node)) => Ok(ScalarValue::NodeId(Some(node_id_from_wire(node)?))),
            other => Err(payload_mismatch(BuiltinType::NodeId, other.branch_name())),
        }
    }
}

/// Codec for QualifiedName scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedNameCodec;

impl BuiltinCodec for QualifiedNameCodec {
    fn builtin_type(&self) -> BuiltinType {
        BuiltinType::QualifiedName
    }

    fn name(&self) -> &'static str {
        "QualifiedNameCodec"
    }

    fn decode_scalar(&self, wire: &WireScalar) -> UaResult<ScalarValue> {
        match wire {
            WireScalar::QualifiedName(None) => Ok(ScalarValue::QualifiedName(None)),
            WireScalar::QualifiedName(Some(qn)) => Ok(ScalarValue::QualifiedName(Some(
                QualifiedName::new(qn.namespace_index, qn.name.read_text().unwrap_or_default()),
            ))),
            other => Err(payload_mismatch(BuiltinType::QualifiedName, other.branch_name())),
        }
    }
}

/// Codec for LocalizedText scalars. A null locale stays absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalizedTextCodec;

impl BuiltinCodec for LocalizedTextCodec {
    fn builtin_type(&self) -> BuiltinType {
        BuiltinType::LocalizedText
    }

    fn name(&self) -> &'static str {
        "LocalizedTextCodec"
    }

    fn decode_scalar(&self, wire: &WireScalar) -> UaResult<ScalarValue> {
        match wire {
            WireScalar::LocalizedText(None) => Ok(ScalarValue::LocalizedText(None)),
            WireScalar::LocalizedText(Some(lt)) => Ok(ScalarValue::LocalizedText(Some(
                LocalizedText::new(
                    lt.default_locale.read_text(),
                    lt.default_text.read_text().unwrap_or_default(),
                ),
            ))),
            other => Err(payload_mismatch(BuiltinType::LocalizedText, other.branch_name())),
        }
    }
}
