// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scalar and array codecs between typed values and the wire union.
//!
//! Each builtin type has at most one [`BuiltinCodec`] in a [`CodecRegistry`].
//! A codec overrides only the directions and shapes it supports; the default
//! trait methods raise `UnsupportedType` for the rest, and a type with no
//! registered codec raises the same error from the registry.
//!
//! | Types | Scalar decode | Scalar encode | Array |
//! |-------|---------------|---------------|-------|
//! | Boolean .. Double | yes | yes | yes |
//! | String, ByteString, XmlElement | yes | yes | yes |
//! | NodeId, QualifiedName, LocalizedText | yes | no | no |
//! | everything else | no | no | no |
//!
//! # Examples
//!
//! ```
//! use uabind_core::codec;
//! use uabind_core::types::BuiltinType;
//! use uabind_core::variant::ArrayValue;
//!
//! let wire = codec::encode_array(BuiltinType::Boolean, &ArrayValue::Boolean(vec![true, false]))?;
//! assert_eq!(wire.length(), 2);
//!
//! let decoded = codec::decode_array(BuiltinType::Boolean, &wire)?;
//! assert_eq!(decoded, ArrayValue::Boolean(vec![true, false]));
//! # Ok::<(), uabind_core::error::UaError>(())
//! ```

mod numeric;
mod registry;
mod structured;
mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, UaResult};
use crate::types::{ArrayShape, BuiltinType};
use crate::variant::{ArrayValue, ScalarValue};
use crate::wire::{WireArray, WireScalar};

pub use numeric::{
    BooleanCodec, ByteCodec, DoubleCodec, FloatCodec, Int16Codec, Int32Codec, Int64Codec,
    SByteCodec, UInt16Codec, UInt32Codec, UInt64Codec,
};
pub use registry::{default_registry, CodecRegistry};
pub use structured::{
    node_id_from_wire, node_id_to_wire, LocalizedTextCodec, NodeIdCodec, QualifiedNameCodec,
};
pub use text::{ByteStringCodec, StringCodec, XmlElementCodec};

// =============================================================================
// Direction
// =============================================================================

/// Codec direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Wire form to typed value.
    Decode,
    /// Typed value to wire form.
    Encode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => f.write_str("decode"),
            Self::Encode => f.write_str("encode"),
        }
    }
}

// =============================================================================
// BuiltinCodec Trait
// =============================================================================

/// Converts values of one builtin type between typed and wire form.
///
/// Implementations must be stateless: decode and encode may run concurrently
/// from engine notification threads.
pub trait BuiltinCodec: Send + Sync {
    /// The builtin type this codec handles.
    fn builtin_type(&self) -> BuiltinType;

    /// Codec name for logging.
    fn name(&self) -> &'static str;

    /// Decodes one scalar from its union branch.
    fn decode_scalar(&self, _wire: &WireScalar) -> UaResult<ScalarValue> {
        Err(unsupported(self.builtin_type(), Direction::Decode, ArrayShape::SingleValue))
    }

    /// Encodes one scalar into a fresh union branch.
    fn encode_scalar(&self, _value: &ScalarValue) -> UaResult<WireScalar> {
        Err(unsupported(self.builtin_type(), Direction::Encode, ArrayShape::SingleValue))
    }

    /// Decodes exactly `wire.length()` elements.
    fn decode_array(&self, _wire: &WireArray) -> UaResult<ArrayValue> {
        Err(unsupported(self.builtin_type(), Direction::Decode, ArrayShape::Array))
    }

    /// Encodes a sequence into a fresh array whose length is the element count.
    fn encode_array(&self, _value: &ArrayValue) -> UaResult<WireArray> {
        Err(unsupported(self.builtin_type(), Direction::Encode, ArrayShape::Array))
    }
}

// =============================================================================
// Default Registry Shortcuts
// =============================================================================

/// Decodes a scalar with the default registry.
pub fn decode_scalar(builtin_type: BuiltinType, wire: &WireScalar) -> UaResult<ScalarValue> {
    default_registry().decode_scalar(builtin_type, wire)
}

/// Encodes a scalar with the default registry.
pub fn encode_scalar(builtin_type: BuiltinType, value: &ScalarValue) -> UaResult<WireScalar> {
    default_registry().encode_scalar(builtin_type, value)
}

/// Decodes an array with the default registry.
pub fn decode_array(builtin_type: BuiltinType, wire: &WireArray) -> UaResult<ArrayValue> {
    default_registry().decode_array(builtin_type, wire)
}

/// Encodes an array with the default registry.
pub fn encode_array(builtin_type: BuiltinType, value: &ArrayValue) -> UaResult<WireArray> {
    default_registry().encode_array(builtin_type, value)
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) fn unsupported(
    builtin_type: BuiltinType,
    direction: Direction,
    shape: ArrayShape,
) -> crate::error::UaError {
    ConversionError::unsupported_type(builtin_type, direction, shape).into()
}

pub(crate) fn payload_mismatch(builtin_type: BuiltinType, found: &'static str) -> crate::error::UaError {
    ConversionError::payload_mismatch(builtin_type, found).into()
}

pub(crate) fn arm_mismatch(builtin_type: BuiltinType, actual: BuiltinType) -> crate::error::UaError {
    ConversionError::type_mismatch(builtin_type.name(), actual.name()).into()
}

/// Bounds the element buffer by the declared length. A length of zero or
/// less reads nothing.
pub(crate) fn take_declared<T>(declared: i32, items: &[T]) -> UaResult<&[T]> {
    if declared <= 0 {
        return Ok(&[]);
    }
    let count = declared as usize;
    items.get(..count).ok_or_else(|| {
        ConversionError::TruncatedArray {
            declared,
            available: items.len(),
        }
        .into()
    })
}

// =============================================================================
// Tests
// =============================================================================
