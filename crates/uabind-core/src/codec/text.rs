// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Codecs for the length-prefixed text kinds.
//!
//! Every encoded element gets its own `length + 1` byte buffer ending in the
//! terminator. A null wire string decodes to empty text.

use super::{arm_mismatch, payload_mismatch, take_declared, BuiltinCodec};
use crate::error::UaResult;
use crate::types::BuiltinType;
use crate::variant::{ArrayValue, ScalarValue};
use crate::wire::{WireArray, WireArrayContent, WireScalar, WireString};

fn read_or_empty(wire: &WireString) -> String {
    wire.read_text().unwrap_or_default()
}

macro_rules! impl_text_codec {
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
                    WireScalar::$kind(s) => Ok(ScalarValue::$kind(read_or_empty(s))),
                    other => Err(payload_mismatch(BuiltinType::$kind, other.branch_name())),
                }
            }

            fn encode_scalar(&self, value: &ScalarValue) -> UaResult<WireScalar> {
                match value {
                    ScalarValue::$kind(s) => Ok(WireScalar::$kind(WireString::from_text(s))),
                    other => Err(arm_mismatch(BuiltinType::$kind, other.builtin_type())),
                }
            }

            fn decode_array(&self, wire: &WireArray) -> UaResult<ArrayValue> {
                if wire.length() <= 0 {
                    return Ok(ArrayValue::$kind(Vec::new()));
                }
                match wire.content() {
                    WireArrayContent::$kind(items) => {
                        let items = take_declared(wire.length(), items)?;
                        Ok(ArrayValue::$kind(items.iter().map(read_or_empty).collect()))
                    }
                    other => Err(payload_mismatch(BuiltinType::$kind, other.branch_name())),
                }
            }

            fn encode_array(&self, value: &ArrayValue) -> UaResult<WireArray> {
                match value {
                    ArrayValue::$kind(items) => WireArray::new(WireArrayContent::$kind(
                        items.iter().map(|s| WireString::from_text(s)).collect(),
                    )),
                    other => Err(arm_mismatch(BuiltinType::$kind, other.builtin_type())),
                }
            }
        }
    };
}

impl_text_codec!(StringCodec, String);
impl_text_codec!(ByteStringCodec, ByteString);
impl_text_codec!(XmlElementCodec, XmlElement);
