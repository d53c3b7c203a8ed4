// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request and result adapters.
//!
//! Each structure is built fresh per request, converted once, and dropped.
//! Node addresses are typed [`NodeId`]s, so every address that reaches the
//! wire follows the `ns=<n>;{i|s}=<id>` grammar. Absent optional strings go
//! to the wire as `None`, never as empty strings.
//!
//! ```
//! use uabind_core::request::ReadValue;
//!
//! let wire = ReadValue::parse("ns=1;i=1004")?.to_wire();
//! assert_eq!(wire.node_id, "ns=1;i=1004");
//! assert_eq!(wire.attribute_id, 13);
//! assert_eq!(wire.index_range, None);
//! # Ok::<(), uabind_core::error::UaError>(())
//! ```

use crate::codec::{self, take_declared, CodecRegistry};
use crate::data_value::DataValue;
use crate::error::UaResult;
use crate::types::{ArrayShape, AttributeId, BrowseDirection, BuiltinType, NodeClass, NodeId, StatusCode};
use crate::value::{ConversionOptions, Value};
use crate::variant::Variant;
use crate::wire::{
    WireBrowseRequest, WireBrowseResult, WireBrowseResultReference, WireCallMethodRequest,
    WireCallMethodResult, WireReadValue, WireWriteValue,
};

fn present(range: &Option<String>) -> Option<String> {
    range.as_ref().filter(|r| !r.is_empty()).cloned()
}

// =============================================================================
// ReadValue
// =============================================================================

/// One attribute to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadValue {
    /// Node to read.
    pub node_id: NodeId,
    /// Attribute, `Value` by default.
    pub attribute_id: AttributeId,
    /// Optional index range.
    pub index_range: Option<String>,
}

impl ReadValue {
    /// Reads the Value attribute of a node.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            attribute_id: AttributeId::Value,
            index_range: None,
        }
    }

    /// Parses the node address.
    pub fn parse(node_id: &str) -> UaResult<Self> {
        NodeId::parse(node_id).map(Self::new)
    }

    /// Sets the attribute.
    #[inline]
    pub fn with_attribute(mut self, attribute_id: AttributeId) -> Self {
        self.attribute_id = attribute_id;
        self
    }

    /// Sets the index range.
    #[inline]
    pub fn with_index_range(mut self, range: impl Into<String>) -> Self {
        self.index_range = Some(range.into());
        self
    }

    /// Builds the wire form.
    pub fn to_wire(&self) -> WireReadValue {
        WireReadValue {
            node_id: self.node_id.to_string(),
            attribute_id: self.attribute_id.value(),
            index_range: present(&self.index_range),
        }
    }
}

// =============================================================================
// WriteValue
// =============================================================================

/// One value to write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteValue {
    /// Node to write.
    pub node_id: NodeId,
    /// Optional index range.
    pub index_range: Option<String>,
    /// Value to write.
    pub value: DataValue,
}

impl WriteValue {
    /// Creates a write of `value` to the node's Value attribute.
    pub fn new(node_id: NodeId, value: DataValue) -> Self {
        Self {
            node_id,
            index_range: None,
            value,
        }
    }

    /// Creates a write from an untyped host value, checked against the
    /// declared type and shape.
    pub fn from_host(
        node_id: NodeId,
        builtin_type: BuiltinType,
        shape: ArrayShape,
        value: &Value,
    ) -> UaResult<Self> {
        let variant = Variant::from_host(builtin_type, shape, value)?;
        Ok(Self::new(node_id, DataValue::from(variant)))
    }

    /// Sets the index range.
    #[inline]
    pub fn with_index_range(mut self, range: impl Into<String>) -> Self {
        self.index_range = Some(range.into());
        self
    }

    /// Builds the wire form with the default registry.
    pub fn to_wire(&self) -> UaResult<WireWriteValue> {
        self.to_wire_with(codec::default_registry())
    }

    /// Builds the wire form with the given registry.
    pub fn to_wire_with(&self, registry: &CodecRegistry) -> UaResult<WireWriteValue> {
        Ok(WireWriteValue {
            node_id: self.node_id.to_string(),
            index_range: present(&self.index_range),
            value: self.value.to_wire_with(registry)?,
        })
    }
}

// =============================================================================
// Browse
// =============================================================================

/// One node to browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    /// Node to browse.
    pub node_id: NodeId,
    /// Reference direction.
    pub direction: BrowseDirection,
    /// Reference type filter, all types when `None`.
    pub reference_type_id: Option<NodeId>,
    /// Include subtypes of the reference type.
    pub include_subtypes: bool,
}

impl BrowseRequest {
    /// Browses forward references of every type.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            direction: BrowseDirection::Forward,
            reference_type_id: None,
            include_subtypes: true,
        }
    }

    /// Parses the node address.
    pub fn parse(node_id: &str) -> UaResult<Self> {
        NodeId::parse(node_id).map(Self::new)
    }

    /// Sets the direction.
    #[inline]
    pub fn with_direction(mut self, direction: BrowseDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Restricts the reference type.
    #[inline]
    pub fn with_reference_type(mut self, reference_type_id: NodeId, include_subtypes: bool) -> Self {
        self.reference_type_id = Some(reference_type_id);
        self.include_subtypes = include_subtypes;
        self
    }

    /// Builds the wire form.
    pub fn to_wire(&self) -> WireBrowseRequest {
        WireBrowseRequest {
            node_id: self.node_id.to_string(),
            direction: self.direction.value(),
            reference_type_id: self.reference_type_id.as_ref().map(NodeId::to_string),
            include_subtypes: self.include_subtypes,
        }
    }
}

/// One reference returned by a browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResultReference {
    /// Reference type.
    pub reference_type_id: Option<String>,
    /// Forward reference flag.
    pub is_forward: bool,
    /// Target node in expanded form.
    pub node_id: Option<String>,
    /// Browse name.
    pub browse_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Node class, `None` when unspecified.
    pub node_class: Option<NodeClass>,
}

impl BrowseResultReference {
    /// Copies a wire reference.
    pub fn from_wire(wire: &WireBrowseResultReference) -> Self {
        Self {
            reference_type_id: wire.reference_type_id.clone(),
            is_forward: wire.is_forward,
            node_id: wire.node_id.clone(),
            browse_name: wire.browse_name.clone(),
            display_name: wire.display_name.clone(),
            node_class: NodeClass::from_value(wire.node_class),
        }
    }
}

/// Result of browsing one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseResult {
    /// Status code.
    pub status: StatusCode,
    /// References, in engine order.
    pub references: Vec<BrowseResultReference>,
}

impl BrowseResult {
    /// Copies the status and exactly `nb_of_references` references.
    pub fn from_wire(wire: &WireBrowseResult) -> UaResult<Self> {
        let references = take_declared(wire.nb_of_references, &wire.references)?
            .iter()
            .map(BrowseResultReference::from_wire)
            .collect();
        Ok(Self {
            status: wire.status,
            references,
        })
    }
}

// =============================================================================
// Call
// =============================================================================

/// One method call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallMethodRequest {
    /// Object owning the method.
    pub object_node_id: NodeId,
    /// Method node.
    pub method_node_id: NodeId,
    /// Input arguments.
    pub input_params: Vec<Variant>,
}

impl CallMethodRequest {
    /// Creates a call without arguments.
    pub fn new(object_node_id: NodeId, method_node_id: NodeId) -> Self {
        Self {
            object_node_id,
            method_node_id,
            input_params: Vec::new(),
        }
    }

    /// Appends an input argument.
    #[inline]
    pub fn with_input(mut self, param: Variant) -> Self {
        self.input_params.push(param);
        self
    }

    /// Builds the wire form with the default registry.
    pub fn to_wire(&self) -> UaResult<WireCallMethodRequest> {
        self.to_wire_with(codec::default_registry())
    }

    /// Builds the wire form with the given registry.
    pub fn to_wire_with(&self, registry: &CodecRegistry) -> UaResult<WireCallMethodRequest> {
        let params = self
            .input_params
            .iter()
            .map(|p| p.to_wire_with(registry))
            .collect::<UaResult<Vec<_>>>()?;
        WireCallMethodRequest::new(
            self.object_node_id.to_string(),
            self.method_node_id.to_string(),
            params,
        )
    }
}

/// Result of a method call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallMethodResult {
    /// Status code.
    pub status: StatusCode,
    /// Output arguments. Empty when the call failed and decode was gated.
    pub output_params: Vec<Variant>,
}

impl CallMethodResult {
    /// Decodes with the default registry and default options.
    pub fn from_wire(wire: &WireCallMethodResult) -> UaResult<Self> {
        Self::from_wire_with(codec::default_registry(), wire, &ConversionOptions::default())
    }

    /// Decodes exactly `nb_of_output_params` outputs.
    pub fn from_wire_with(
        registry: &CodecRegistry,
        wire: &WireCallMethodResult,
        options: &ConversionOptions,
    ) -> UaResult<Self> {
        if !wire.status.is_good() && options.gate_payload_on_status {
            tracing::warn!(status = %wire.status, "Skipping output decode for failed call");
            return Ok(Self {
                status: wire.status,
                output_params: Vec::new(),
            });
        }

        let output_params = take_declared(wire.nb_of_output_params, &wire.output_params)?
            .iter()
            .map(|p| Variant::from_wire_with(registry, p))
            .collect::<UaResult<Vec<_>>>()?;
        Ok(Self {
            status: wire.status,
            output_params,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
