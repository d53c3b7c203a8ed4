// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed Variant: one value of one builtin type in scalar or array shape.
//!
//! Each arm of [`ScalarValue`] and [`ArrayValue`] fixes the Rust payload for
//! its builtin type, so a Variant can never carry a payload that disagrees
//! with its tags. The array length is the `Vec` length and is recomputed at
//! every encode.
//!
//! Untyped host values go through [`Variant::from_host`], which checks the
//! value's kind against the declared type at runtime.
//!
//! ```
//! use uabind_core::types::{ArrayShape, BuiltinType};
//! use uabind_core::value::{ConversionOptions, Value};
//! use uabind_core::variant::Variant;
//!
//! let host = Value::from(vec![false, true, false]);
//! let variant = Variant::from_host(BuiltinType::Boolean, ArrayShape::Array, &host)?;
//!
//! let wire = variant.to_wire()?;
//! let decoded = Variant::from_wire(&wire)?;
//! assert_eq!(decoded.shape(), ArrayShape::Array);
//! assert_eq!(decoded.to_host(&ConversionOptions::default()), host);
//! # Ok::<(), uabind_core::error::UaError>(())
//! ```

use crate::codec::{self, CodecRegistry, Direction};
use crate::error::{ConversionError, UaError, UaResult};
use crate::types::{ArrayShape, BuiltinType, LocalizedText, NodeId, QualifiedName};
use crate::value::{ConversionOptions, Value};
use crate::wire::{WireScalar, WireVariant, WireVariantValue};

// =============================================================================
// ScalarValue
// =============================================================================

/// One scalar of a supported builtin type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
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
    String(String),
    /// ByteString, as decoded text.
    ByteString(String),
    /// XmlElement.
    XmlElement(String),
    /// NodeId, `None` when the wire pointer was null.
    NodeId(Option<NodeId>),
    /// QualifiedName, `None` when the wire pointer was null.
    QualifiedName(Option<QualifiedName>),
    /// LocalizedText, `None` when the wire pointer was null.
    LocalizedText(Option<LocalizedText>),
}

impl ScalarValue {
    /// Returns the builtin type of this arm.
    pub const fn builtin_type(&self) -> BuiltinType {
        match self {
            Self::Boolean(_) => BuiltinType::Boolean,
            Self::SByte(_) => BuiltinType::SByte,
            Self::Byte(_) => BuiltinType::Byte,
            Self::Int16(_) => BuiltinType::Int16,
            Self::UInt16(_) => BuiltinType::UInt16,
            Self::Int32(_) => BuiltinType::Int32,
            Self::UInt32(_) => BuiltinType::UInt32,
            Self::Int64(_) => BuiltinType::Int64,
            Self::UInt64(_) => BuiltinType::UInt64,
            Self::Float(_) => BuiltinType::Float,
            Self::Double(_) => BuiltinType::Double,
            Self::String(_) => BuiltinType::String,
            Self::ByteString(_) => BuiltinType::ByteString,
            Self::XmlElement(_) => BuiltinType::XmlElement,
            Self::NodeId(_) => BuiltinType::NodeId,
            Self::QualifiedName(_) => BuiltinType::QualifiedName,
            Self::LocalizedText(_) => BuiltinType::LocalizedText,
        }
    }

    /// Builds a scalar of `builtin_type` from a host value.
    ///
    /// Fails with `UnsupportedType` when the type has no scalar encoder,
    /// `TypeMismatch` when the host kind is wrong, and `ValueOutOfRange` when
    /// a number does not fit the target width.
    pub fn from_host(builtin_type: BuiltinType, value: &Value) -> UaResult<Self> {
        let scalar = match builtin_type {
            BuiltinType::Boolean => Self::Boolean(host_bool(value)?),
            BuiltinType::SByte => Self::SByte(host_int(builtin_type, value)?),
            BuiltinType::Byte => Self::Byte(host_int(builtin_type, value)?),
            BuiltinType::Int16 => Self::Int16(host_int(builtin_type, value)?),
            BuiltinType::UInt16 => Self::UInt16(host_int(builtin_type, value)?),
            BuiltinType::Int32 => Self::Int32(host_int(builtin_type, value)?),
            BuiltinType::UInt32 => Self::UInt32(host_int(builtin_type, value)?),
            BuiltinType::Int64 => Self::Int64(host_wide(builtin_type, value)?),
            BuiltinType::UInt64 => Self::UInt64(host_wide(builtin_type, value)?),
            BuiltinType::Float => Self::Float(host_f32(value)?),
            BuiltinType::Double => Self::Double(host_f64(value)?),
            BuiltinType::String => Self::String(host_text(value)?),
            BuiltinType::ByteString => Self::ByteString(host_text(value)?),
            BuiltinType::XmlElement => Self::XmlElement(host_text(value)?),
            other => {
                return Err(codec::unsupported(other, Direction::Encode, ArrayShape::SingleValue))
            }
        };
        Ok(scalar)
    }

    /// Renders this scalar as a host value.
    pub fn to_host(&self, options: &ConversionOptions) -> Value {
        match self {
            Self::Boolean(v) => Value::Bool(*v),
            Self::SByte(v) => Value::Int(i64::from(*v)),
            Self::Byte(v) => Value::UInt(u64::from(*v)),
            Self::Int16(v) => Value::Int(i64::from(*v)),
            Self::UInt16(v) => Value::UInt(u64::from(*v)),
            Self::Int32(v) => Value::Int(i64::from(*v)),
            Self::UInt32(v) => Value::UInt(u64::from(*v)),
            Self::Int64(v) => options.wide_integers.render_i64(*v),
            Self::UInt64(v) => options.wide_integers.render_u64(*v),
            Self::Float(v) => Value::Float(f64::from(*v)),
            Self::Double(v) => Value::Float(*v),
            Self::String(v) | Self::ByteString(v) | Self::XmlElement(v) => Value::Text(v.clone()),
            Self::NodeId(v) => v.as_ref().map_or(Value::Null, |n| Value::Text(n.to_string())),
            Self::QualifiedName(v) => v.as_ref().map_or(Value::Null, |n| Value::Text(n.to_string())),
            Self::LocalizedText(v) => v.as_ref().map_or(Value::Null, |t| Value::Text(t.to_string())),
        }
    }
}

// =============================================================================
// ArrayValue
// =============================================================================

/// A homogeneous sequence of a supported builtin type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
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
    /// String elements.
    String(Vec<String>),
    /// ByteString elements.
    ByteString(Vec<String>),
    /// XmlElement elements.
    XmlElement(Vec<String>),
}

impl ArrayValue {
    /// Returns the element builtin type.
    pub const fn builtin_type(&self) -> BuiltinType {
        match self {
            Self::Boolean(_) => BuiltinType::Boolean,
            Self::SByte(_) => BuiltinType::SByte,
            Self::Byte(_) => BuiltinType::Byte,
            Self::Int16(_) => BuiltinType::Int16,
            Self::UInt16(_) => BuiltinType::UInt16,
            Self::Int32(_) => BuiltinType::Int32,
            Self::UInt32(_) => BuiltinType::UInt32,
            Self::Int64(_) => BuiltinType::Int64,
            Self::UInt64(_) => BuiltinType::UInt64,
            Self::Float(_) => BuiltinType::Float,
            Self::Double(_) => BuiltinType::Double,
            Self::String(_) => BuiltinType::String,
            Self::ByteString(_) => BuiltinType::ByteString,
            Self::XmlElement(_) => BuiltinType::XmlElement,
        }
    }

    /// Returns the element count.
    pub fn len(&self) -> usize {
        match self {
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

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds an array of `builtin_type` from host elements. One bad element
    /// fails the whole array.
    pub fn from_host(builtin_type: BuiltinType, items: &[Value]) -> UaResult<Self> {
        let array = match builtin_type {
            BuiltinType::Boolean => Self::Boolean(collect(items, host_bool)?),
            BuiltinType::SByte => Self::SByte(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::Byte => Self::Byte(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::Int16 => Self::Int16(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::UInt16 => Self::UInt16(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::Int32 => Self::Int32(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::UInt32 => Self::UInt32(collect(items, |v| host_int(builtin_type, v))?),
            BuiltinType::Int64 => Self::Int64(collect(items, |v| host_wide(builtin_type, v))?),
            BuiltinType::UInt64 => Self::UInt64(collect(items, |v| host_wide(builtin_type, v))?),
            BuiltinType::Float => Self::Float(collect(items, host_f32)?),
            BuiltinType::Double => Self::Double(collect(items, host_f64)?),
            BuiltinType::String => Self::String(collect(items, host_text)?),
            BuiltinType::ByteString => Self::ByteString(collect(items, host_text)?),
            BuiltinType::XmlElement => Self::XmlElement(collect(items, host_text)?),
            other => return Err(codec::unsupported(other, Direction::Encode, ArrayShape::Array)),
        };
        Ok(array)
    }

    /// Renders the elements as a host array.
    pub fn to_host(&self, options: &ConversionOptions) -> Value {
        let mode = options.wide_integers;
        let items: Vec<Value> = match self {
            Self::Boolean(v) => v.iter().map(|x| Value::Bool(*x)).collect(),
            Self::SByte(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::Byte(v) => v.iter().map(|x| Value::UInt(u64::from(*x))).collect(),
            Self::Int16(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::UInt16(v) => v.iter().map(|x| Value::UInt(u64::from(*x))).collect(),
            Self::Int32(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::UInt32(v) => v.iter().map(|x| Value::UInt(u64::from(*x))).collect(),
            Self::Int64(v) => v.iter().map(|x| mode.render_i64(*x)).collect(),
            Self::UInt64(v) => v.iter().map(|x| mode.render_u64(*x)).collect(),
            Self::Float(v) => v.iter().map(|x| Value::Float(f64::from(*x))).collect(),
            Self::Double(v) => v.iter().map(|x| Value::Float(*x)).collect(),
            Self::String(v) | Self::ByteString(v) | Self::XmlElement(v) => {
                v.iter().cloned().map(Value::Text).collect()
            }
        };
        Value::Array(items)
    }
}

// =============================================================================
// Variant
// =============================================================================

/// A typed value of one builtin type in scalar or array shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// Builtin type Null.
    #[default]
    Null,
    /// SingleValue shape.
    Scalar(ScalarValue),
    /// Array shape.
    Array(ArrayValue),
}

impl Variant {
    /// Returns the builtin type tag.
    pub const fn builtin_type(&self) -> BuiltinType {
        match self {
            Self::Null => BuiltinType::Null,
            Self::Scalar(s) => s.builtin_type(),
            Self::Array(a) => a.builtin_type(),
        }
    }

    /// Returns the shape tag.
    pub const fn shape(&self) -> ArrayShape {
        match self {
            Self::Null | Self::Scalar(_) => ArrayShape::SingleValue,
            Self::Array(_) => ArrayShape::Array,
        }
    }

    /// Returns `true` for the Null variant.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    // =========================================================================
    // Host Conversion
    // =========================================================================

    /// Builds a variant from a host value and declared tags.
    pub fn from_host(builtin_type: BuiltinType, shape: ArrayShape, value: &Value) -> UaResult<Self> {
        match shape {
            ArrayShape::Matrix => Err(ConversionError::unsupported_shape(shape).into()),
            _ if builtin_type == BuiltinType::Null => match value {
                Value::Null => Ok(Self::Null),
                other => Err(UaError::type_mismatch("null", other.kind_name())),
            },
            ArrayShape::SingleValue => ScalarValue::from_host(builtin_type, value).map(Self::Scalar),
            ArrayShape::Array => {
                if !builtin_type.array_supported() {
                    return Err(codec::unsupported(builtin_type, Direction::Encode, shape));
                }
                match value {
                    Value::Array(items) => ArrayValue::from_host(builtin_type, items).map(Self::Array),
                    other => Err(UaError::type_mismatch("array", other.kind_name())),
                }
            }
        }
    }

    /// Renders this variant as a host value.
    pub fn to_host(&self, options: &ConversionOptions) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(s) => s.to_host(options),
            Self::Array(a) => a.to_host(options),
        }
    }

    // =========================================================================
    // Wire Conversion
    // =========================================================================

    /// Decodes a wire variant with the default registry.
    pub fn from_wire(wire: &WireVariant) -> UaResult<Self> {
        Self::from_wire_with(codec::default_registry(), wire)
    }

    /// Decodes a wire variant with the given registry.
    pub fn from_wire_with(registry: &CodecRegistry, wire: &WireVariant) -> UaResult<Self> {
        let builtin_type = BuiltinType::from_id(wire.built_in_type_id)
            .ok_or(ConversionError::UnknownTypeId { id: wire.built_in_type_id })?;
        let shape = ArrayShape::from_id(wire.array_type)
            .ok_or(ConversionError::UnknownShapeId { id: wire.array_type })?;

        if shape == ArrayShape::Matrix {
            return Err(ConversionError::unsupported_shape(shape).into());
        }
        if builtin_type == BuiltinType::Null {
            return Ok(Self::Null);
        }

        match (shape, &wire.value) {
            (ArrayShape::SingleValue, WireVariantValue::Scalar(scalar)) => {
                registry.decode_scalar(builtin_type, scalar).map(Self::Scalar)
            }
            (ArrayShape::Array, WireVariantValue::Array(array)) => {
                registry.decode_array(builtin_type, array).map(Self::Array)
            }
            (_, WireVariantValue::Scalar(_)) => {
                Err(ConversionError::payload_mismatch(builtin_type, "scalar").into())
            }
            (_, WireVariantValue::Array(_)) => {
                Err(ConversionError::payload_mismatch(builtin_type, "array").into())
            }
        }
    }

    /// Encodes with the default registry.
    pub fn to_wire(&self) -> UaResult<WireVariant> {
        self.to_wire_with(codec::default_registry())
    }

    /// Encodes with the given registry.
    pub fn to_wire_with(&self, registry: &CodecRegistry) -> UaResult<WireVariant> {
        let builtin_type = self.builtin_type();
        let value = match self {
            Self::Null => WireVariantValue::Scalar(WireScalar::Empty),
            Self::Scalar(s) => WireVariantValue::Scalar(registry.encode_scalar(builtin_type, s)?),
            Self::Array(a) => WireVariantValue::Array(registry.encode_array(builtin_type, a)?),
        };
        Ok(WireVariant {
            built_in_type_id: builtin_type.id(),
            array_type: self.shape().id(),
            value,
        })
    }
}

impl From<ScalarValue> for Variant {
    fn from(value: ScalarValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<ArrayValue> for Variant {
    fn from(value: ArrayValue) -> Self {
        Self::Array(value)
    }
}

// =============================================================================
// Host Value Checks
// =============================================================================

fn collect<T>(items: &[Value], convert: impl Fn(&Value) -> UaResult<T>) -> UaResult<Vec<T>> {
    items.iter().map(convert).collect()
}

fn host_bool(value: &Value) -> UaResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| UaError::type_mismatch("bool", value.kind_name()))
}

fn host_f64(value: &Value) -> UaResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| UaError::type_mismatch("number", value.kind_name()))
}

/// Finite doubles beyond the `f32` range are rejected rather than rounded to infinity.
fn host_f32(value: &Value) -> UaResult<f32> {
    let wide = host_f64(value)?;
    let narrow = wide as f32;
    if wide.is_finite() && narrow.is_infinite() {
        return Err(ConversionError::value_out_of_range(value, BuiltinType::Float).into());
    }
    Ok(narrow)
}

fn host_text(value: &Value) -> UaResult<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| UaError::type_mismatch("text", value.kind_name()))
}

/// Narrow integers accept only numeric host values.
fn host_int<T>(target: BuiltinType, value: &Value) -> UaResult<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let converted = match value {
        Value::Int(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
        Value::UInt(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
        other => return Err(UaError::type_mismatch("integer", other.kind_name())),
    };
    converted.ok_or_else(|| ConversionError::value_out_of_range(value, target).into())
}

/// 64-bit integers also accept decimal text.
fn host_wide<T>(target: BuiltinType, value: &Value) -> UaResult<T>
where
    T: TryFrom<i64> + TryFrom<u64> + std::str::FromStr,
{
    match value {
        Value::Text(text) => text.trim().parse::<T>().map_err(|_| {
            ConversionError::invalid_value(target, format!("'{}' is not a decimal integer", text))
                .into()
        }),
        other => host_int(target, other),
    }
}

// =============================================================================
// Tests
// =============================================================================
