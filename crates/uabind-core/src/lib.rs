// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed value codec for an OPC UA client access layer.
//!
//! This crate converts between host values and the fixed-layout, type-tagged
//! wire form exchanged with an external protocol engine. It performs no I/O;
//! every operation is a synchronous transform that allocates fresh output.
//!
//! # Layers
//!
//! ```text
//! request   ReadValue / WriteValue / BrowseRequest / CallMethodRequest
//!    │
//! data_value  DataValue (status + timestamps, payload gated on status)
//!    │
//! variant   Variant::{Null, Scalar, Array}
//!    │
//! codec     BuiltinCodec per builtin type, looked up in a CodecRegistry
//!    │
//! wire      WireVariant / WireString / WireArray
//! ```
//!
//! # Error Handling
//!
//! ```text
//! UaError
//! ├── Conversion    - Codec failures (UnsupportedType, UnsupportedShape, ...)
//! ├── NodeId        - Malformed node addresses
//! ├── Engine        - Failures reported by the engine
//! ├── Subscription  - Subscription handle misuse
//! └── Configuration - Invalid settings
//! ```
//!
//! # Example
//!
//! ```
//! use uabind_core::{ArrayShape, BuiltinType, DataValue, Value, Variant, WideIntegerMode};
//! use uabind_core::value::ConversionOptions;
//!
//! let host = Value::Array(vec![Value::Text("4256896097".into())]);
//! let variant = Variant::from_host(BuiltinType::UInt64, ArrayShape::Array, &host)?;
//!
//! let wire = DataValue::from(variant).to_wire()?;
//! let decoded = DataValue::from_wire(&wire)?;
//!
//! let options = ConversionOptions::default().with_wide_integers(WideIntegerMode::Text);
//! assert_eq!(decoded.to_host(&options), host);
//! # Ok::<(), uabind_core::UaError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod data_value;
pub mod error;
pub mod request;
pub mod types;
pub mod value;
pub mod variant;
pub mod wire;

// Re-export commonly used types
pub use error::{
    ConfigurationError, ConversionError, EngineError, ErrorCode, ErrorSeverity, NodeIdError,
    SubscriptionError, UaError, UaResult,
};

pub use types::{
    ArrayShape, AttributeId, BrowseDirection, BuiltinType, DateTimeTicks, LocalizedText, NodeClass,
    NodeId, NodeIdentifier, QualifiedName, StatusCode,
};

pub use codec::{BuiltinCodec, CodecRegistry, Direction};
pub use data_value::DataValue;
pub use request::{
    BrowseRequest, BrowseResult, BrowseResultReference, CallMethodRequest, CallMethodResult,
    ReadValue, WriteValue,
};
pub use value::{ConversionOptions, Value, WideIntegerMode};
pub use variant::{ArrayValue, ScalarValue, Variant};
