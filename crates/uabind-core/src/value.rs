// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Host form: the dynamic values application code hands to and receives from
//! the codec.
//!
//! [`Value`] serializes untagged, so a decoded read renders as plain JSON:
//!
//! ```
//! use uabind_core::value::Value;
//!
//! let value = Value::Array(vec![Value::Bool(true), Value::Text("4256896097".into())]);
//! assert_eq!(serde_json::to_string(&value).unwrap(), r#"[true,"4256896097"]"#);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Value
// =============================================================================

/// Largest integer a double-precision host can hold exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// A dynamic host value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Text, including 64-bit integers rendered as decimal strings.
    Text(String),
    /// Homogeneous sequence.
    Array(Vec<Value>),
}

impl Value {
    /// Returns the kind name used in type mismatch errors.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
        }
    }

    /// Returns `true` if this is `Null`.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64` when it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `u64` when it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f64` for any numeric kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the elements, if this is `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_for_value {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v.into())
            }
        }
    };
}

impl_from_for_value!(Bool, bool);
impl_from_for_value!(Int, i8);
impl_from_for_value!(Int, i16);
impl_from_for_value!(Int, i32);
impl_from_for_value!(Int, i64);
impl_from_for_value!(UInt, u8);
impl_from_for_value!(UInt, u16);
impl_from_for_value!(UInt, u32);
impl_from_for_value!(UInt, u64);
impl_from_for_value!(Float, f32);
impl_from_for_value!(Float, f64);
impl_from_for_value!(Text, String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// WideIntegerMode
// =============================================================================

/// How Int64 and UInt64 render in host form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WideIntegerMode {
    /// Numeric within the safe integer range, decimal text outside it.
    #[default]
    Auto,
    /// Always decimal text.
    Text,
    /// Always numeric.
    Number,
}

impl WideIntegerMode {
    /// Renders a signed 64-bit value.
    pub fn render_i64(self, v: i64) -> Value {
        match self {
            Self::Number => Value::Int(v),
            Self::Text => Value::Text(v.to_string()),
            Self::Auto if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&v) => Value::Int(v),
            Self::Auto => Value::Text(v.to_string()),
        }
    }

    /// Renders an unsigned 64-bit value.
    pub fn render_u64(self, v: u64) -> Value {
        match self {
            Self::Number => Value::UInt(v),
            Self::Text => Value::Text(v.to_string()),
            Self::Auto if v <= MAX_SAFE_INTEGER as u64 => Value::UInt(v),
            Self::Auto => Value::Text(v.to_string()),
        }
    }
}

// =============================================================================
// ConversionOptions
// =============================================================================

/// Options controlling host rendering and DataValue decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Rendering of Int64 / UInt64 values.
    pub wide_integers: WideIntegerMode,

    /// Skip payload decode when a DataValue's status is nonzero.
    pub gate_payload_on_status: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            wide_integers: WideIntegerMode::Auto,
            gate_payload_on_status: true,
        }
    }
}

impl ConversionOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wide integer rendering mode.
    #[inline]
    pub fn with_wide_integers(mut self, mode: WideIntegerMode) -> Self {
        self.wide_integers = mode;
        self
    }

    /// Enables or disables status gating.
    #[inline]
    pub fn with_status_gating(mut self, enable: bool) -> Self {
        self.gate_payload_on_status = enable;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
