// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wire form: owned structures mirroring the fixed layout exchanged with the
//! external protocol engine.
//!
//! Two layout rules are enforced by construction:
//!
//! - A [`WireString`] built here owns a buffer of `length + 1` bytes whose last
//!   byte is the `0` terminator.
//! - A [`WireArray`] computes its length field from its content. Only
//!   [`WireArray::from_raw`], used for engine-supplied data, accepts a
//!   length that may disagree with the buffer.
//!
//! ```
//! use uabind_core::wire::{WireArray, WireArrayContent, WireString};
//!
//! let s = WireString::from_text("abc");
//! assert_eq!(s.length(), 3);
//! assert_eq!(s.as_bytes(), Some(&b"abc\0"[..]));
//!
//! let array = WireArray::new(WireArrayContent::Int32(vec![1, 2])).unwrap();
//! assert_eq!(array.length(), 2);
//! ```

use crate::error::{ConversionError, UaResult};
use crate::types::{BuiltinType, StatusCode};

// =============================================================================
// WireString
// =============================================================================

/// Length-prefixed, terminator-carrying byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireString {
    length: i32,
    data: Option<Box<[u8]>>,
}

impl WireString {
    /// Creates the null string (length -1, no buffer).
    pub const fn null() -> Self {
        Self {
            length: -1,
            data: None,
        }
    }

    /// Encodes text into a fresh `length + 1` byte buffer.
    ///
    /// Text longer than `i32::MAX` bytes is truncated to fit the length field.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Encodes raw bytes into a fresh `length + 1` byte buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let length = i32::try_from(bytes.len()).unwrap_or(i32::MAX);
        let logical = &bytes[..length as usize];

        let mut buffer = Vec::with_capacity(logical.len() + 1);
        buffer.extend_from_slice(logical);
        buffer.push(0);

        Self {
            length,
            data: Some(buffer.into_boxed_slice()),
        }
    }

    /// Wraps an engine-supplied buffer without normalizing it.
    pub fn from_raw(length: i32, data: Option<Box<[u8]>>) -> Self {
        Self { length, data }
    }

    /// Returns the logical length field.
    #[inline]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Returns `true` if there is no buffer.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Returns the whole buffer, terminator included.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Reads the text up to the first terminator, bounded by the buffer.
    ///
    /// Returns `None` for the null string. Invalid UTF-8 is replaced.
    pub fn read_text(&self) -> Option<String> {
        let data = self.data.as_deref()?;
        let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
        Some(String::from_utf8_lossy(&data[..end]).into_owned())
    }
}

// =============================================================================
// Structured Scalars
// =============================================================================

/// Identifier union of a wire NodeId.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireIdentifier {
    /// Numeric identifier.
    Numeric(u32),
    /// String identifier.
    String(WireString),
    /// GUID identifier, raw 16 bytes.
    Guid([u8; 16]),
    /// Opaque identifier.
    ByteString(WireString),
}

impl WireIdentifier {
    /// Returns the identifier kind name.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "Numeric",
            Self::String(_) => "String",
            Self::Guid(_) => "Guid",
            Self::ByteString(_) => "ByteString",
        }
    }
}

/// Wire NodeId.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireNodeId {
    /// Namespace index.
    pub namespace: u16,
    /// Identifier union.
    pub identifier: WireIdentifier,
}

/// Wire QualifiedName.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireQualifiedName {
    /// Namespace index.
    pub namespace_index: u16,
    /// Name.
    pub name: WireString,
}

/// Wire LocalizedText.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLocalizedText {
    /// Locale, null when absent.
    pub default_locale: WireString,
    /// Text.
    pub default_text: WireString,
}

// =============================================================================
// WireScalar
// =============================================================================

/// The scalar branch of the Variant union.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WireScalar {
    /// No branch populated.
    #[default]
    Empty,
    /// Boolean.
    Boolean(bool),
    /// SByte.
    SByte(i8),
    /// Byte.
    Byte(u8),
    /// Int16.
    Int16(i16),
    /// UInt16.
    UInt16(u16),
    /// Int32.
    Int32(i32),
    /// UInt32.
    UInt32(u32),
    /// Int64.
    Int64(i64),
    /// UInt64.
    UInt64(u64),
    /// Float.
    Float(f32),
    /// Double.
    Double(f64),
    /// String.
    String(WireString),
    /// ByteString.
    ByteString(WireString),
    /// XmlElement.
    XmlElement(WireString),
    /// NodeId pointer, `None` when null.
    NodeId(Option<Box<WireNodeId>>),
    /// QualifiedName pointer, `None` when null.
    QualifiedName(Option<Box<WireQualifiedName>>),
    /// LocalizedText pointer, `None` when null.
    LocalizedText(Option<Box<WireLocalizedText>>),
    /// Bytes of a branch this layer never interprets.
    Opaque(Vec<u8>),
}

impl WireScalar {
    /// Returns the branch name for diagnostics.
    pub const fn branch_name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::ByteString(_) => "ByteString",
            Self::XmlElement(_) => "XmlElement",
            Self::NodeId(_) => "NodeId",
            Self::QualifiedName(_) => "QualifiedName",
            Self::LocalizedText(_) => "LocalizedText",
            Self::Opaque(_) => "Opaque",
        }
    }
}

// =============================================================================
// WireArray
// =============================================================================

/// Element buffer of a wire array.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WireArrayContent {
    /// No buffer.
    #[default]
    Empty,
    /// Boolean elements.
    Boolean(Vec<bool>),
    /// SByte elements.
    SByte(Vec<i8>),
    /// Byte elements.
    Byte(Vec<u8>),
    /// Int16 elements.
    Int16(Vec<i16>),
    /// UInt16 elements.
    UInt16(Vec<u16>),
    /// Int32 elements.
    Int32(Vec<i32>),
    /// UInt32 elements.
    UInt32(Vec<u32>),
    /// Int64 elements.
    Int64(Vec<i64>),
    /// UInt64 elements.
    UInt64(Vec<u64>),
    /// Float elements.
    Float(Vec<f32>),
    /// Double elements.
    Double(Vec<f64>),
    /// String elements, each with its own buffer.
    String(Vec<WireString>),
    /// ByteString elements, each with its own buffer.
    ByteString(Vec<WireString>),
    /// XmlElement elements, each with its own buffer.
    XmlElement(Vec<WireString>),
    /// Elements of a kind this layer never interprets.
    Opaque(Vec<u8>),
}

impl WireArrayContent {
    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty | Self::Opaque(_) => 0,
            Self::Boolean(v) => v.len(),
            Self::SByte(v) => v.len(),
            Self::Byte(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::String(v) | Self::ByteString(v) | Self::XmlElement(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the branch name for diagnostics.
    pub const fn branch_name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Boolean(_) => "Boolean[]",
            Self::SByte(_) => "SByte[]",
            Self::Byte(_) => "Byte[]",
            Self::Int16(_) => "Int16[]",
            Self::UInt16(_) => "UInt16[]",
            Self::Int32(_) => "Int32[]",
            Self::UInt32(_) => "UInt32[]",
            Self::Int64(_) => "Int64[]",
            Self::UInt64(_) => "UInt64[]",
            Self::Float(_) => "Float[]",
            Self::Double(_) => "Double[]",
            Self::String(_) => "String[]",
            Self::ByteString(_) => "ByteString[]",
            Self::XmlElement(_) => "XmlElement[]",
            Self::Opaque(_) => "Opaque[]",
        }
    }
}

/// Length-prefixed array of one builtin type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireArray {
    length: i32,
    content: WireArrayContent,
}

impl WireArray {
    /// Builds an array whose length field equals the element count.
    pub fn new(content: WireArrayContent) -> UaResult<Self> {
        let length = i32::try_from(content.len()).map_err(|_| {
            ConversionError::value_out_of_range(
                format!("{} elements", content.len()),
                BuiltinType::Int32,
            )
        })?;
        Ok(Self { length, content })
    }

    /// Wraps engine-supplied data. The length field is trusted only as far as
    /// the decoder bounds-checks it against the content.
    pub fn from_raw(length: i32, content: WireArrayContent) -> Self {
        Self { length, content }
    }

    /// Returns the length field.
    #[inline]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Returns the element buffer.
    #[inline]
    pub fn content(&self) -> &WireArrayContent {
        &self.content
    }
}

// =============================================================================
// WireVariant / WireDataValue
// =============================================================================

/// Payload union of a wire Variant.
#[derive(Debug, Clone, PartialEq)]
pub enum WireVariantValue {
    /// SingleValue payload.
    Scalar(WireScalar),
    /// Array payload.
    Array(WireArray),
}

impl Default for WireVariantValue {
    fn default() -> Self {
        Self::Scalar(WireScalar::Empty)
    }
}

/// Wire Variant: type tag, shape tag and payload union.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireVariant {
    /// Builtin type tag.
    pub built_in_type_id: u32,
    /// Shape tag.
    pub array_type: i32,
    /// Payload.
    pub value: WireVariantValue,
}

/// Wire DataValue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireDataValue {
    /// Payload.
    pub value: WireVariant,
    /// Status code, zero on success.
    pub status: StatusCode,
    /// Source timestamp in 100 ns ticks.
    pub source_timestamp: i64,
    /// Server timestamp in 100 ns ticks.
    pub server_timestamp: i64,
    /// Source picoseconds.
    pub source_picoseconds: u16,
    /// Server picoseconds.
    pub server_picoseconds: u16,
}

// =============================================================================
// Request Wire Forms
// =============================================================================

/// Wire ReadValue. Absent strings are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireReadValue {
    /// Node address.
    pub node_id: String,
    /// Attribute id.
    pub attribute_id: u32,
    /// Index range.
    pub index_range: Option<String>,
}

/// Wire WriteValue.
#[derive(Debug, Clone, PartialEq)]
pub struct WireWriteValue {
    /// Node address.
    pub node_id: String,
    /// Index range.
    pub index_range: Option<String>,
    /// Value to write.
    pub value: WireDataValue,
}

/// Wire BrowseRequest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBrowseRequest {
    /// Node address.
    pub node_id: String,
    /// Browse direction value.
    pub direction: u32,
    /// Reference type filter.
    pub reference_type_id: Option<String>,
    /// Include reference subtypes.
    pub include_subtypes: bool,
}

/// Wire reference descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireBrowseResultReference {
    /// Reference type.
    pub reference_type_id: Option<String>,
    /// Forward reference flag.
    pub is_forward: bool,
    /// Target node, expanded form.
    pub node_id: Option<String>,
    /// Browse name.
    pub browse_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Node class bit value.
    pub node_class: u32,
}

/// Wire BrowseResult.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireBrowseResult {
    /// Status code.
    pub status: StatusCode,
    /// Declared reference count.
    pub nb_of_references: i32,
    /// Reference buffer.
    pub references: Vec<WireBrowseResultReference>,
}

/// Wire CallMethodRequest.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCallMethodRequest {
    /// Object node address.
    pub object_node_id: String,
    /// Method node address.
    pub method_node_id: String,
    nb_of_input_params: i32,
    input_params: Vec<WireVariant>,
}

impl WireCallMethodRequest {
    /// Builds a request whose parameter count equals `input_params.len()`.
    pub fn new(
        object_node_id: String,
        method_node_id: String,
        input_params: Vec<WireVariant>,
    ) -> UaResult<Self> {
        let nb_of_input_params = i32::try_from(input_params.len()).map_err(|_| {
            ConversionError::value_out_of_range(
                format!("{} parameters", input_params.len()),
                BuiltinType::Int32,
            )
        })?;
        Ok(Self {
            object_node_id,
            method_node_id,
            nb_of_input_params,
            input_params,
        })
    }

    /// Returns the parameter count field.
    pub fn nb_of_input_params(&self) -> i32 {
        self.nb_of_input_params
    }

    /// Returns the input parameters.
    pub fn input_params(&self) -> &[WireVariant] {
        &self.input_params
    }
}

/// Wire CallMethodResult.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireCallMethodResult {
    /// Status code.
    pub status: StatusCode,
    /// Declared output count.
    pub nb_of_output_params: i32,
    /// Output buffer.
    pub output_params: Vec<WireVariant>,
}

// =============================================================================
// Tests
// =============================================================================
