// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Lookup table of codecs keyed by builtin type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{
    unsupported, BooleanCodec, BuiltinCodec, ByteCodec, ByteStringCodec, Direction, DoubleCodec,
    FloatCodec, Int16Codec, Int32Codec, Int64Codec, LocalizedTextCodec, NodeIdCodec,
    QualifiedNameCodec, SByteCodec, StringCodec, UInt16Codec, UInt32Codec, UInt64Codec,
    XmlElementCodec,
};
use crate::error::UaResult;
use crate::types::{ArrayShape, BuiltinType};
use crate::variant::{ArrayValue, ScalarValue};
use crate::wire::{WireArray, WireScalar};

static DEFAULT_REGISTRY: Lazy<CodecRegistry> = Lazy::new(CodecRegistry::with_builtin_codecs);

/// Returns the process-wide registry holding the built-in codecs.
pub fn default_registry() -> &'static CodecRegistry {
    &DEFAULT_REGISTRY
}

// =============================================================================
// CodecRegistry
// =============================================================================

/// Registry of codecs, one per builtin type.
///
/// # Examples
///
/// ```
/// use uabind_core::codec::CodecRegistry;
/// use uabind_core::types::BuiltinType;
///
/// let registry = CodecRegistry::with_builtin_codecs();
/// assert!(registry.contains(BuiltinType::LocalizedText));
/// assert!(!registry.contains(BuiltinType::DateTime));
/// ```
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<BuiltinType, Arc<dyn BuiltinCodec>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Creates a registry with every built-in codec registered.
    pub fn with_builtin_codecs() -> Self {
        let mut registry = Self::new();

        // Fixed-width kinds
        registry.register(Arc::new(BooleanCodec));
        registry.register(Arc::new(SByteCodec));
        registry.register(Arc::new(ByteCodec));
        registry.register(Arc::new(Int16Codec));
        registry.register(Arc::new(UInt16Codec));
        registry.register(Arc::new(Int32Codec));
        registry.register(Arc::new(UInt32Codec));
        registry.register(Arc::new(Int64Codec));
        registry.register(Arc::new(UInt64Codec));
        registry.register(Arc::new(FloatCodec));
        registry.register(Arc::new(DoubleCodec));

        // Text kinds
        registry.register(Arc::new(StringCodec));
        registry.register(Arc::new(ByteStringCodec));
        registry.register(Arc::new(XmlElementCodec));

        // Structured kinds, decode only
        registry.register(Arc::new(NodeIdCodec));
        registry.register(Arc::new(QualifiedNameCodec));
        registry.register(Arc::new(LocalizedTextCodec));

        registry
    }

    /// Registers a codec, replacing and returning any previous codec for the
    /// same builtin type.
    pub fn register(&mut self, codec: Arc<dyn BuiltinCodec>) -> Option<Arc<dyn BuiltinCodec>> {
        let builtin_type = codec.builtin_type();
        tracing::trace!(codec = codec.name(), builtin_type = %builtin_type, "Registering codec");
        self.codecs.insert(builtin_type, codec)
    }

    /// Returns the codec for a builtin type.
    pub fn get_codec(&self, builtin_type: BuiltinType) -> Option<&Arc<dyn BuiltinCodec>> {
        self.codecs.get(&builtin_type)
    }

    /// Returns `true` if a codec is registered for the type.
    pub fn contains(&self, builtin_type: BuiltinType) -> bool {
        self.codecs.contains_key(&builtin_type)
    }

    /// Returns the number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns `true` if no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Returns the registered types in id order.
    pub fn registered_types(&self) -> Vec<BuiltinType> {
        let mut types: Vec<_> = self.codecs.keys().copied().collect();
        types.sort();
        types
    }

    fn lookup(
        &self,
        builtin_type: BuiltinType,
        direction: Direction,
        shape: ArrayShape,
    ) -> UaResult<&Arc<dyn BuiltinCodec>> {
        self.codecs
            .get(&builtin_type)
            .ok_or_else(|| unsupported(builtin_type, direction, shape))
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Decodes one scalar of `builtin_type`.
    pub fn decode_scalar(&self, builtin_type: BuiltinType, wire: &WireScalar) -> UaResult<ScalarValue> {
        self.lookup(builtin_type, Direction::Decode, ArrayShape::SingleValue)?
            .decode_scalar(wire)
    }

    /// Encodes one scalar as `builtin_type`.
    pub fn encode_scalar(&self, builtin_type: BuiltinType, value: &ScalarValue) -> UaResult<WireScalar> {
        self.lookup(builtin_type, Direction::Encode, ArrayShape::SingleValue)?
            .encode_scalar(value)
    }

    /// Decodes an array of `builtin_type`.
    pub fn decode_array(&self, builtin_type: BuiltinType, wire: &WireArray) -> UaResult<ArrayValue> {
        self.lookup(builtin_type, Direction::Decode, ArrayShape::Array)?
            .decode_array(wire)
    }

    /// Encodes an array as `builtin_type`.
    pub fn encode_array(&self, builtin_type: BuiltinType, value: &ArrayValue) -> UaResult<WireArray> {
        self.lookup(builtin_type, Direction::Encode, ArrayShape::Array)?
            .encode_array(value)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtin_codecs()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codec_count", &self.codecs.len())
            .field("types", &self.registered_types())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
