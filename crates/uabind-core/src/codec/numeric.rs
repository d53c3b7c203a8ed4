// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Codecs for the fixed-width kinds, Boolean through Double.

use super::{arm_mismatch, payload_mismatch, take_declared, BuiltinCodec};
use crate::error::UaResult;
use crate::types::BuiltinType;
use crate::variant::{ArrayValue, ScalarValue};
use crate::wire::{WireArray, WireArrayContent, WireScalar};

// The builtin type name doubles as the arm name in every union involved.
macro_rules! impl_fixed_width_codec {
    ($codec:ident, $kind:ident) => {
        #[doc = concat!("Codec for ", stringify!($kind), " scalars and arrays.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $codec;

        impl BuiltinCodec for $codec {
            fn builtin_type(&self) -> BuiltinType {
                BuiltinType::$kind
            }

            fn name(&self) -> &'static str {
                stringify!($codec)
            }

            fn decode_scalar(&self, wire: &WireScalar) -> UaResult<ScalarValue> {
                match wire {
                    WireScalar::$kind(v) => Ok(ScalarValue::$kind(*v)),
                    other => Err(payload_mismatch(BuiltinType::$kind, other.branch_name())),
                }
            }

            fn encode_scalar(&self, value: &ScalarValue) -> UaResult<WireScalar> {
                match value {
                    ScalarValue::$kind(v) => Ok(WireScalar::$kind(*v)),
                    other => Err(arm_mismatch(BuiltinType::$kind, other.builtin_type())),
                }
            }

            fn decode_array(&self, wire: &WireArray) -> UaResult<ArrayValue> {
                if wire.length() <= 0 {
                    return Ok(ArrayValue::$kind(Vec::new()));
                }
                match wire.content() {
                    WireArrayContent::$kind(items) => {
                        Ok(ArrayValue::$kind(take_declared(wire.length(), items)?.to_vec()))
                    }
                    other => Err(payload_mismatch(BuiltinType::$kind, other.branch_name())),
                }
            }

            fn encode_array(&self, value: &ArrayValue) -> UaResult<WireArray> {
                match value {
                    ArrayValue::$kind(items) => WireArray::new(WireArrayContent::$kind(items.clone())),
                    other => Err(arm_mismatch(BuiltinType::$kind, other.builtin_type())),
                }
            }
        }
    };
}

impl_fixed_width_codec!(BooleanCodec, Boolean);
impl_fixed_width_codec!(SByteCodec, SByte);
impl_fixed_width_codec!(ByteCodec, Byte);
impl_fixed_width_codec!(Int16Codec, Int16);
impl_fixed_width_codec!(UInt16Codec, UInt16);
impl_fixed_width_codec!(Int32Codec, Int32);
impl_fixed_width_codec!(UInt32Codec, UInt32);
impl_fixed_width_codec!(Int64Codec, Int64);
impl_fixed_width_codec!(UInt64Codec, UInt64);
impl_fixed_width_codec!(FloatCodec, Float);
impl_fixed_width_codec!(DoubleCodec, Double);
