// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Protocol-level types shared by the codec and the client.
//!
//! - **BuiltinType**: the closed set of 26 scalar kinds with capability queries
//! - **ArrayShape**: SingleValue / Array / Matrix
//! - **NodeId**: numeric and string node addresses in `ns=<n>;{i|s}=<id>` form
//! - **QualifiedName / LocalizedText**: structured text kinds
//! - **StatusCode**: 32-bit status with severity bits
//! - **AttributeId / NodeClass / BrowseDirection**: request parameters
//! - **DateTimeTicks**: 100 ns ticks since 1601-01-01 UTC
//!
//! # Examples
//!
//! ```
//! use uabind_core::types::{BuiltinType, NodeId};
//!
//! let node: NodeId = "ns=1;s=String_030".parse().unwrap();
//! assert_eq!(node.to_string(), "ns=1;s=String_030");
//!
//! assert!(BuiltinType::UInt64.array_supported());
//! assert!(!BuiltinType::DateTime.scalar_decode_supported());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NodeIdError, UaError};

// =============================================================================
// BuiltinType
// =============================================================================

/// The builtin value kinds of the wire protocol, ids 0 to 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum BuiltinType {
    /// No value.
    Null = 0,
    /// Boolean.
    Boolean = 1,
    /// Signed 8-bit integer.
    SByte = 2,
    /// Unsigned 8-bit integer.
    Byte = 3,
    /// Signed 16-bit integer.
    Int16 = 4,
    /// Unsigned 16-bit integer.
    UInt16 = 5,
    /// Signed 32-bit integer.
    Int32 = 6,
    /// Unsigned 32-bit integer.
    UInt32 = 7,
    /// Signed 64-bit integer.
    Int64 = 8,
    /// Unsigned 64-bit integer.
    UInt64 = 9,
    /// 32-bit float.
    Float = 10,
    /// 64-bit float.
    Double = 11,
    /// Text string.
    String = 12,
    /// Date and time.
    DateTime = 13,
    /// GUID.
    Guid = 14,
    /// Byte string.
    ByteString = 15,
    /// XML element.
    XmlElement = 16,
    /// Node identifier.
    NodeId = 17,
    /// Expanded node identifier.
    ExpandedNodeId = 18,
    /// Status code.
    StatusCode = 19,
    /// Qualified name.
    QualifiedName = 20,
    /// Localized text.
    LocalizedText = 21,
    /// Extension object.
    ExtensionObject = 22,
    /// Nested data value.
    DataValue = 23,
    /// Nested variant.
    Variant = 24,
    /// Diagnostic info.
    DiagnosticInfo = 25,
}

impl BuiltinType {
    /// Every builtin type in id order.
    pub const ALL: [BuiltinType; 26] = [
        Self::Null,
        Self::Boolean,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::String,
        Self::DateTime,
        Self::Guid,
        Self::ByteString,
        Self::XmlElement,
        Self::NodeId,
        Self::ExpandedNodeId,
        Self::StatusCode,
        Self::QualifiedName,
        Self::LocalizedText,
        Self::ExtensionObject,
        Self::DataValue,
        Self::Variant,
        Self::DiagnosticInfo,
    ];

    /// Returns the wire type id.
    #[inline]
    pub const fn id(&self) -> u32 {
        *self as u32
    }

    /// Looks up a builtin type by wire id.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Returns the protocol name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::XmlElement => "XmlElement",
            Self::NodeId => "NodeId",
            Self::ExpandedNodeId => "ExpandedNodeId",
            Self::StatusCode => "StatusCode",
            Self::QualifiedName => "QualifiedName",
            Self::LocalizedText => "LocalizedText",
            Self::ExtensionObject => "ExtensionObject",
            Self::DataValue => "DataValue",
            Self::Variant => "Variant",
            Self::DiagnosticInfo => "DiagnosticInfo",
        }
    }

    /// Returns `true` for the fixed-width numeric and boolean kinds.
    pub const fn is_fixed_width(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }

    /// Returns `true` for the length-prefixed text kinds.
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::String | Self::ByteString | Self::XmlElement)
    }

    /// Returns `true` for the 64-bit integer kinds that may exceed a host's
    /// safe integer range.
    pub const fn is_wide_integer(&self) -> bool {
        matches!(self, Self::Int64 | Self::UInt64)
    }

    /// Returns `true` if a scalar of this type can be decoded.
    pub const fn scalar_decode_supported(&self) -> bool {
        self.is_fixed_width()
            || self.is_text()
            || matches!(self, Self::NodeId | Self::QualifiedName | Self::LocalizedText)
    }

    /// Returns `true` if a scalar of this type can be encoded.
    pub const fn scalar_encode_supported(&self) -> bool {
        self.is_fixed_width() || self.is_text()
    }

    /// Returns `true` if arrays of this type can be decoded and encoded.
    pub const fn array_supported(&self) -> bool {
        self.is_fixed_width() || self.is_text()
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown builtin type: {}", s))
    }
}

// =============================================================================
// ArrayShape
// =============================================================================

/// Shape tag of a Variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ArrayShape {
    /// One scalar value.
    #[default]
    SingleValue = 0,
    /// One-dimensional homogeneous array.
    Array = 1,
    /// Multi-dimensional array. No codec path exists.
    Matrix = 2,
}

impl ArrayShape {
    /// Returns the wire shape id.
    #[inline]
    pub const fn id(&self) -> i32 {
        *self as i32
    }

    /// Looks up a shape by wire id.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::SingleValue),
            1 => Some(Self::Array),
            2 => Some(Self::Matrix),
            _ => None,
        }
    }

    /// Returns the lowercase label used in messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SingleValue => "scalar",
            Self::Array => "array",
            Self::Matrix => "matrix",
        }
    }
}

impl fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// NodeId
// =============================================================================

/// Node address: a namespace index plus a numeric or string identifier.
///
/// Always formats as `ns=<namespace>;i=<number>` or `ns=<namespace>;s=<text>`.
///
/// # Examples
///
/// ```
/// use uabind_core::types::NodeId;
///
/// assert_eq!(NodeId::numeric(1, 1004).to_string(), "ns=1;i=1004");
///
/// let parsed: NodeId = "i=85".parse().unwrap();
/// assert_eq!(parsed, NodeId::numeric(0, 85));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index.
    pub namespace_index: u16,

    /// The identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Returns the numeric identifier, if any.
    pub fn as_numeric(&self) -> Option<u32> {
        match self.identifier {
            NodeIdentifier::Numeric(v) => Some(v),
            NodeIdentifier::String(_) => None,
        }
    }

    /// Returns the string identifier, if any.
    pub fn as_string(&self) -> Option<&str> {
        match &self.identifier {
            NodeIdentifier::String(v) => Some(v),
            NodeIdentifier::Numeric(_) => None,
        }
    }

    /// Parses a node address, reporting failures as [`UaError`].
    pub fn parse(s: &str) -> Result<Self, UaError> {
        s.parse::<Self>().map_err(UaError::from)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};{}", self.namespace_index, self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    /// Accepts `ns=<n>;i=<n>`, `ns=<n>;s=<text>`, and the namespace 0
    /// shorthands `i=<n>` / `s=<text>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let (namespace_index, identifier_part) = match trimmed.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, id) = rest
                    .split_once(';')
                    .ok_or_else(|| NodeIdError::malformed(s, "Missing identifier after namespace"))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| NodeIdError::malformed(s, "Invalid namespace index"))?;
                (ns, id)
            }
            None => (0, trimmed),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id
                .parse()
                .map_err(|_| NodeIdError::malformed(s, "Invalid numeric identifier"))?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            if id.is_empty() {
                return Err(NodeIdError::malformed(s, "Empty string identifier"));
            }
            NodeIdentifier::String(id.to_string())
        } else {
            return Err(NodeIdError::malformed(
                s,
                "Unknown identifier type. Expected i= or s=",
            ));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

/// Node identifier kinds exchanged with the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier.
    Numeric(u32),
    /// String identifier.
    String(String),
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
        }
    }
}

// =============================================================================
// QualifiedName / LocalizedText
// =============================================================================

/// A namespace-qualified name. Formats as `ns=<namespace>;s=<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Namespace index.
    pub namespace_index: u16,
    /// The name.
    pub name: String,
}

impl QualifiedName {
    /// Creates a new qualified name.
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};s={}", self.namespace_index, self.name)
    }
}

/// Locale placeholder used when a localized text carries no locale.
pub const LOCALE_NOT_DEFINED: &str = "not_defined";

/// Text with an optional locale. Formats as `LANG=<locale>;TEXT=<text>`.
///
/// ```
/// use uabind_core::types::LocalizedText;
///
/// assert_eq!(LocalizedText::new(None, "hello").to_string(), "LANG=not_defined;TEXT=hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Locale, absent when the wire value carries none.
    pub locale: Option<String>,
    /// The text.
    pub text: String,
}

impl LocalizedText {
    /// Creates a new localized text.
    pub fn new(locale: Option<String>, text: impl Into<String>) -> Self {
        Self {
            locale,
            text: text.into(),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LANG={};TEXT={}",
            self.locale.as_deref().unwrap_or(LOCALE_NOT_DEFINED),
            self.text
        )
    }
}

// =============================================================================
// StatusCode
// =============================================================================

/// 32-bit protocol status code. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u32);

impl StatusCode {
    /// Success.
    pub const GOOD: Self = Self(0);
    /// Generic uncertain.
    pub const UNCERTAIN: Self = Self(0x4000_0000);
    /// Generic failure.
    pub const BAD: Self = Self(0x8000_0000);
    /// Unexpected error.
    pub const BAD_UNEXPECTED_ERROR: Self = Self(0x8001_0000);
    /// Internal error.
    pub const BAD_INTERNAL_ERROR: Self = Self(0x8002_0000);
    /// Operation timed out.
    pub const BAD_TIMEOUT: Self = Self(0x800A_0000);
    /// Node id not known to the server.
    pub const BAD_NODE_ID_UNKNOWN: Self = Self(0x8034_0000);
    /// Attribute not valid for the node.
    pub const BAD_ATTRIBUTE_ID_INVALID: Self = Self(0x8035_0000);
    /// Attribute not readable.
    pub const BAD_NOT_READABLE: Self = Self(0x803A_0000);
    /// Attribute not writable.
    pub const BAD_NOT_WRITABLE: Self = Self(0x803B_0000);
    /// Value does not match the node's data type.
    pub const BAD_TYPE_MISMATCH: Self = Self(0x8074_0000);

    /// Returns the raw code.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the code is exactly zero.
    #[inline]
    pub const fn is_good(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the severity bits are uncertain.
    #[inline]
    pub const fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// Returns `true` if the severity bit is bad.
    #[inline]
    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Returns the well-known name, if any.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::GOOD => "Good",
            Self::UNCERTAIN => "Uncertain",
            Self::BAD => "Bad",
            Self::BAD_UNEXPECTED_ERROR => "BadUnexpectedError",
            Self::BAD_INTERNAL_ERROR => "BadInternalError",
            Self::BAD_TIMEOUT => "BadTimeout",
            Self::BAD_NODE_ID_UNKNOWN => "BadNodeIdUnknown",
            Self::BAD_ATTRIBUTE_ID_INVALID => "BadAttributeIdInvalid",
            Self::BAD_NOT_READABLE => "BadNotReadable",
            Self::BAD_NOT_WRITABLE => "BadNotWritable",
            Self::BAD_TYPE_MISMATCH => "BadTypeMismatch",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u32> for StatusCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08X})", name, self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

// =============================================================================
// BrowseDirection
// =============================================================================

/// Browse direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrowseDirection {
    /// Forward references.
    #[default]
    Forward,
    /// Inverse references.
    Inverse,
    /// Both directions.
    Both,
}

impl BrowseDirection {
    /// Returns the protocol value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Forward => 0,
            Self::Inverse => 1,
            Self::Both => 2,
        }
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// Node class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Object node.
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    /// Returns the protocol bit mask value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Object => 1,
            Self::Variable => 2,
            Self::Method => 4,
            Self::ObjectType => 8,
            Self::VariableType => 16,
            Self::ReferenceType => 32,
            Self::DataType => 64,
            Self::View => 128,
        }
    }

    /// Creates from the protocol value. Zero (unspecified) yields `None`.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Object),
            2 => Some(Self::Variable),
            4 => Some(Self::Method),
            8 => Some(Self::ObjectType),
            16 => Some(Self::VariableType),
            32 => Some(Self::ReferenceType),
            64 => Some(Self::DataType),
            128 => Some(Self::View),
            _ => None,
        }
    }
}

// =============================================================================
// AttributeId
// =============================================================================

/// Attribute ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeId {
    /// Node ID attribute.
    NodeId,
    /// Node class attribute.
    NodeClass,
    /// Browse name attribute.
    BrowseName,
    /// Display name attribute.
    DisplayName,
    /// Description attribute.
    Description,
    /// Write mask attribute.
    WriteMask,
    /// User write mask attribute.
    UserWriteMask,
    /// Is abstract attribute.
    IsAbstract,
    /// Symmetric attribute.
    Symmetric,
    /// Inverse name attribute.
    InverseName,
    /// Contains no loops attribute.
    ContainsNoLoops,
    /// Event notifier attribute.
    EventNotifier,
    /// Value attribute.
    #[default]
    Value,
    /// Data type attribute.
    DataType,
    /// Value rank attribute.
    ValueRank,
    /// Array dimensions attribute.
    ArrayDimensions,
    /// Access level attribute.
    AccessLevel,
    /// User access level attribute.
    UserAccessLevel,
    /// Minimum sampling interval attribute.
    MinimumSamplingInterval,
    /// Historizing attribute.
    Historizing,
    /// Executable attribute.
    Executable,
    /// User executable attribute.
    UserExecutable,
}

impl AttributeId {
    const ORDERED: [AttributeId; 22] = [
        Self::NodeId,
        Self::NodeClass,
        Self::BrowseName,
        Self::DisplayName,
        Self::Description,
        Self::WriteMask,
        Self::UserWriteMask,
        Self::IsAbstract,
        Self::Symmetric,
        Self::InverseName,
        Self::ContainsNoLoops,
        Self::EventNotifier,
        Self::Value,
        Self::DataType,
        Self::ValueRank,
        Self::ArrayDimensions,
        Self::AccessLevel,
        Self::UserAccessLevel,
        Self::MinimumSamplingInterval,
        Self::Historizing,
        Self::Executable,
        Self::UserExecutable,
    ];

    /// Returns the protocol value (1 to 22).
    pub fn value(&self) -> u32 {
        Self::ORDERED
            .iter()
            .position(|a| a == self)
            .map_or(0, |index| index as u32 + 1)
    }

    /// Creates from the protocol value.
    pub fn from_value(value: u32) -> Option<Self> {
        value
            .checked_sub(1)
            .and_then(|index| Self::ORDERED.get(index as usize))
            .copied()
    }
}

// =============================================================================
// DateTimeTicks
// =============================================================================

/// Conversions between protocol timestamps and `chrono` times.
///
/// Protocol timestamps count 100 ns ticks since 1601-01-01 UTC. Zero means
/// "no timestamp".
pub struct DateTimeTicks;

impl DateTimeTicks {
    /// Ticks between 1601-01-01 and 1970-01-01.
    pub const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

    const TICKS_PER_SECOND: i64 = 10_000_000;

    /// Converts ticks to a UTC time. Zero and out-of-range values yield `None`.
    pub fn to_datetime(ticks: i64) -> Option<DateTime<Utc>> {
        if ticks == 0 {
            return None;
        }
        let unix = ticks.checked_sub(Self::UNIX_EPOCH_TICKS)?;
        let seconds = unix.div_euclid(Self::TICKS_PER_SECOND);
        let nanos = (unix.rem_euclid(Self::TICKS_PER_SECOND) * 100) as u32;
        Utc.timestamp_opt(seconds, nanos).single()
    }

    /// Converts a UTC time to ticks, truncating below 100 ns.
    pub fn from_datetime(time: DateTime<Utc>) -> i64 {
        time.timestamp()
            .saturating_mul(Self::TICKS_PER_SECOND)
            .saturating_add(i64::from(time.timestamp_subsec_nanos() / 100))
            .saturating_add(Self::UNIX_EPOCH_TICKS)
    }

    /// Returns the current time in ticks.
    pub fn now() -> i64 {
        Self::from_datetime(Utc::now())
    }
}

// =============================================================================
// Tests
// =============================================================================
