// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! DataValue: a Variant with a status code and two timestamp pairs.
//!
//! Decoding always copies the status and timestamps. When the status is
//! nonzero and [`ConversionOptions::gate_payload_on_status`] is set (the
//! default), the payload is left undecoded because the engine may not have
//! initialized it.
//!
//! ```
//! use uabind_core::data_value::DataValue;
//! use uabind_core::types::StatusCode;
//! use uabind_core::wire::{WireDataValue, WireScalar, WireVariant, WireVariantValue};
//!
//! let wire = WireDataValue {
//!     value: WireVariant {
//!         built_in_type_id: 1,
//!         array_type: 0,
//!         value: WireVariantValue::Scalar(WireScalar::Opaque(vec![0xDE, 0xAD])),
//!     },
//!     status: StatusCode::BAD_NOT_READABLE,
//!     ..WireDataValue::default()
//! };
//!
//! let decoded = DataValue::from_wire(&wire)?;
//! assert_eq!(decoded.status, StatusCode::BAD_NOT_READABLE);
//! assert!(decoded.value.is_none());
//! # Ok::<(), uabind_core::error::UaError>(())
//! ```

use chrono::{DateTime, Utc};

use crate::codec::{self, CodecRegistry};
use crate::error::UaResult;
use crate::types::{DateTimeTicks, StatusCode};
use crate::value::{ConversionOptions, Value};
use crate::variant::Variant;
use crate::wire::{WireDataValue, WireVariant};

/// A Variant with quality and timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The payload. `None` when never set or when decode was gated off.
    pub value: Option<Variant>,
    /// Status code, zero on success.
    pub status: StatusCode,
    /// Source timestamp in 100 ns ticks since 1601.
    pub source_timestamp: i64,
    /// Server timestamp in 100 ns ticks since 1601.
    pub server_timestamp: i64,
    /// Source picoseconds.
    pub source_picoseconds: u16,
    /// Server picoseconds.
    pub server_picoseconds: u16,
}

impl DataValue {
    /// Creates an empty DataValue: no payload, good status, zero timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload.
    #[inline]
    pub fn with_value(mut self, value: Variant) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the status code.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the source timestamp.
    #[inline]
    pub fn with_source_time(mut self, time: DateTime<Utc>) -> Self {
        self.source_timestamp = DateTimeTicks::from_datetime(time);
        self
    }

    /// Returns `true` if the status is zero.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }

    /// Returns the source timestamp, if set.
    pub fn source_time(&self) -> Option<DateTime<Utc>> {
        DateTimeTicks::to_datetime(self.source_timestamp)
    }

    /// Returns the server timestamp, if set.
    pub fn server_time(&self) -> Option<DateTime<Utc>> {
        DateTimeTicks::to_datetime(self.server_timestamp)
    }

    /// Renders the payload as a host value. A missing payload renders `Null`.
    pub fn to_host(&self, options: &ConversionOptions) -> Value {
        self.value
            .as_ref()
            .map_or(Value::Null, |variant| variant.to_host(options))
    }

    // =========================================================================
    // Wire Conversion
    // =========================================================================

    /// Decodes with the default registry and default options.
    pub fn from_wire(wire: &WireDataValue) -> UaResult<Self> {
        Self::from_wire_with(codec::default_registry(), wire, &ConversionOptions::default())
    }

    /// Decodes with the given registry and options.
    pub fn from_wire_with(
        registry: &CodecRegistry,
        wire: &WireDataValue,
        options: &ConversionOptions,
    ) -> UaResult<Self> {
        let value = if !wire.status.is_good() && options.gate_payload_on_status {
            tracing::warn!(
                status = %wire.status,
                builtin_type_id = wire.value.built_in_type_id,
                "Skipping payload decode for non-good status"
            );
            None
        } else {
            Some(Variant::from_wire_with(registry, &wire.value)?)
        };

        Ok(Self {
            value,
            status: wire.status,
            source_timestamp: wire.source_timestamp,
            server_timestamp: wire.server_timestamp,
            source_picoseconds: wire.source_picoseconds,
            server_picoseconds: wire.server_picoseconds,
        })
    }

    /// Encodes with the default registry.
    pub fn to_wire(&self) -> UaResult<WireDataValue> {
        self.to_wire_with(codec::default_registry())
    }

    /// Encodes with the given registry. A missing payload encodes as Null.
    pub fn to_wire_with(&self, registry: &CodecRegistry) -> UaResult<WireDataValue> {
        let value = match &self.value {
            Some(variant) => variant.to_wire_with(registry)?,
            None => WireVariant::default(),
        };

        Ok(WireDataValue {
            value,
            status: self.status,
            source_timestamp: self.source_timestamp,
            server_timestamp: self.server_timestamp,
            source_picoseconds: self.source_picoseconds,
            server_picoseconds: self.server_picoseconds,
        })
    }
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        Self::new().with_value(value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConversionError, UaError};
    use crate::types::BuiltinType;
    use crate::variant::{ArrayValue, ScalarValue};
    use crate::wire::{WireScalar, WireVariantValue};
    use chrono::TimeZone;

    fn garbage_wire(status: StatusCode) -> WireDataValue {
        WireDataValue {
            value: WireVariant {
                built_in_type_id: BuiltinType::String.id(),
                array_type: 0,
                value: WireVariantValue::Scalar(WireScalar::Opaque(vec![0xAB; 32])),
            },
            status,
            source_timestamp: 133_000_000_000_000_000,
            server_timestamp: 133_000_000_000_000_001,
            source_picoseconds: 7,
            server_picoseconds: 9,
        }
    }

    #[test]
    fn test_new_is_empty() {
        let dv = DataValue::new();
        assert!(dv.value.is_none());
        assert!(dv.is_good());
        assert_eq!(dv.source_time(), None);
        assert_eq!(dv.to_host(&ConversionOptions::default()), Value::Null);
    }

    #[test]
    fn test_status_gating_skips_payload() {
        let decoded = DataValue::from_wire(&garbage_wire(StatusCode::BAD_NODE_ID_UNKNOWN)).unwrap();
        assert!(decoded.value.is_none());
        assert_eq!(decoded.status, StatusCode::BAD_NODE_ID_UNKNOWN);
        assert_eq!(decoded.source_timestamp, 133_000_000_000_000_000);
        assert_eq!(decoded.server_timestamp, 133_000_000_000_000_001);
        assert_eq!(decoded.source_picoseconds, 7);
        assert_eq!(decoded.server_picoseconds, 9);
    }

    #[test]
    fn test_ungated_garbage_is_defined_error() {
        let options = ConversionOptions::default().with_status_gating(false);
        let result = DataValue::from_wire_with(
            codec::default_registry(),
            &garbage_wire(StatusCode::BAD),
            &options,
        );
        assert!(matches!(
            result,
            Err(UaError::Conversion(ConversionError::PayloadMismatch { found: "Opaque", .. }))
        ));
    }

    #[test]
    fn test_round_trip_with_timestamps() {
        let time = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let original = DataValue::from(Variant::Array(ArrayValue::Float(vec![1.5, -2.25])))
            .with_source_time(time);

        let wire = original.to_wire().unwrap();
        let decoded = DataValue::from_wire(&wire).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.source_time(), Some(time));
    }

    #[test]
    fn test_extreme_engine_timestamps() {
        let mut wire = garbage_wire(StatusCode::BAD);
        wire.source_timestamp = i64::MIN + 5;
        wire.server_timestamp = i64::MIN;

        let decoded = DataValue::from_wire(&wire).unwrap();
        assert_eq!(decoded.source_timestamp, i64::MIN + 5);
        assert_eq!(decoded.source_time(), None);
        assert_eq!(decoded.server_time(), None);
    }

    #[test]
    fn test_empty_encodes_null_variant() {
        let wire = DataValue::new().to_wire().unwrap();
        assert_eq!(wire.value.built_in_type_id, 0);
        assert_eq!(DataValue::from_wire(&wire).unwrap().value, Some(Variant::Null));
    }

    #[test]
    fn test_uncertain_status_is_gated() {
        let mut wire = DataValue::from(Variant::Scalar(ScalarValue::Int32(5)))
            .to_wire()
            .unwrap();
        wire.status = StatusCode::UNCERTAIN;
        assert!(DataValue::from_wire(&wire).unwrap().value.is_none());
    }
}
