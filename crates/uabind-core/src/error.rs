// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the uabind client access layer.
//!
//! ```text
//! UaError
//! ├── Conversion    - Variant / DataValue codec failures
//! ├── NodeId        - Malformed node address strings
//! ├── Engine        - Failures reported by the external protocol engine
//! ├── Subscription  - Subscription handle misuse
//! └── Configuration - Invalid settings or unreadable config files
//! ```
//!
//! Codec failures are raised at the offending scalar or array conversion and
//! are never retried. Engine failures carry the engine's own status code and
//! stay distinct from codec failures so callers can tell a rejected request
//! from a value this layer could not convert.
//!
//! # Examples
//!
//! ```
//! use uabind_core::error::{ConversionError, UaError};
//! use uabind_core::codec::Direction;
//! use uabind_core::types::{ArrayShape, BuiltinType};
//!
//! let error = UaError::conversion(ConversionError::unsupported_type(
//!     BuiltinType::DateTime,
//!     Direction::Decode,
//!     ArrayShape::SingleValue,
//! ));
//!
//! assert!(error.is_unsupported_type());
//! assert!(!error.is_retryable());
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::codec::Direction;
use crate::types::{ArrayShape, BuiltinType, StatusCode};

// =============================================================================
// UaError - Main Error Type
// =============================================================================

/// The main error type for uabind operations.
#[derive(Debug, Error)]
pub enum UaError {
    /// Value codec errors.
    #[error("{0}")]
    Conversion(#[from] ConversionError),

    /// Node address parsing errors.
    #[error("{0}")]
    NodeId(#[from] NodeIdError),

    /// Errors reported by the external engine.
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Subscription errors.
    #[error("{0}")]
    Subscription(#[from] SubscriptionError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl UaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a conversion error.
    #[inline]
    pub fn conversion(error: ConversionError) -> Self {
        Self::Conversion(error)
    }

    /// Creates a node id error.
    #[inline]
    pub fn node_id(error: NodeIdError) -> Self {
        Self::NodeId(error)
    }

    /// Creates an engine error.
    #[inline]
    pub fn engine(error: EngineError) -> Self {
        Self::Engine(error)
    }

    /// Creates a subscription error.
    #[inline]
    pub fn subscription(error: SubscriptionError) -> Self {
        Self::Subscription(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Engine(EngineError::NotConnected)
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Conversion(ConversionError::type_mismatch(expected, actual))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if this is an `UnsupportedType` codec error.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, Self::Conversion(ConversionError::UnsupportedType { .. }))
    }

    /// Returns `true` if this is an `UnsupportedShape` codec error.
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::Conversion(ConversionError::UnsupportedShape { .. }))
    }

    /// Returns `true` if this error is retryable.
    ///
    /// Codec errors are pure transforms and never succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_retryable(),
            Self::Conversion(_)
            | Self::NodeId(_)
            | Self::Subscription(_)
            | Self::Configuration(_) => false,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(e) => e.severity(),
            Self::Conversion(_) | Self::NodeId(_) => ErrorSeverity::Error,
            Self::Subscription(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Conversion(_) => "conversion",
            Self::NodeId(_) => "node_id",
            Self::Engine(_) => "engine",
            Self::Subscription(_) => "subscription",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Engine(e) => e.error_code(),
            Self::NodeId(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::Subscription(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Conversion(e) => e.recovery_hints(),
            Self::NodeId(_) => vec![
                "Use the 'ns=<index>;i=<number>' or 'ns=<index>;s=<name>' form",
            ],
            Self::Engine(e) => e.recovery_hints(),
            Self::Subscription(_) => vec!["Create a new subscription handle"],
            Self::Configuration(_) => vec!["Check the configuration file and environment overrides"],
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConversionError
// =============================================================================

/// Errors raised by the Variant / DataValue codec.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    /// A builtin type known to the registry but without a codec for the
    /// requested direction and shape.
    #[error("{builtin_type} is not supported for {shape} {direction}")]
    UnsupportedType {
        /// The builtin type.
        builtin_type: BuiltinType,
        /// Decode or encode.
        direction: Direction,
        /// Scalar or array.
        shape: ArrayShape,
    },

    /// An array shape with no codec path (Matrix).
    #[error("Unsupported variant array shape: {shape}")]
    UnsupportedShape {
        /// The shape.
        shape: ArrayShape,
    },

    /// A wire type tag outside the builtin type range.
    #[error("Variant type with id {id} is not managed")]
    UnknownTypeId {
        /// The raw type tag.
        id: u32,
    },

    /// A wire shape tag outside the known shapes.
    #[error("Variant array type with id {id} is not managed")]
    UnknownShapeId {
        /// The raw shape tag.
        id: i32,
    },

    /// Host value kind does not match the declared builtin type.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected kind.
        expected: String,
        /// Actual kind.
        actual: String,
    },

    /// Host value does not fit the target width.
    #[error("Value {value} out of range for {target}")]
    ValueOutOfRange {
        /// The offending value.
        value: String,
        /// Target builtin type.
        target: BuiltinType,
    },

    /// Host value has the right kind but cannot be interpreted.
    #[error("Invalid value for {target}: {message}")]
    InvalidValue {
        /// Target builtin type.
        target: BuiltinType,
        /// Error message.
        message: String,
    },

    /// The wire union holds a branch other than the one the tag selects.
    #[error("Wire payload for {builtin_type} holds a {found} branch")]
    PayloadMismatch {
        /// Builtin type selected by the tag.
        builtin_type: BuiltinType,
        /// Branch actually present.
        found: &'static str,
    },

    /// The wire length field exceeds the element buffer.
    #[error("Array declares {declared} elements but only {available} are present")]
    TruncatedArray {
        /// Declared element count.
        declared: i32,
        /// Elements in the buffer.
        available: usize,
    },

    /// A NodeId identifier kind this layer does not decode.
    #[error("NodeId identifier type {kind} not supported")]
    UnsupportedIdentifier {
        /// Identifier kind name.
        kind: &'static str,
    },
}

impl ConversionError {
    /// Creates an unsupported type error.
    pub fn unsupported_type(builtin_type: BuiltinType, direction: Direction, shape: ArrayShape) -> Self {
        Self::UnsupportedType {
            builtin_type,
            direction,
            shape,
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported_shape(shape: ArrayShape) -> Self {
        Self::UnsupportedShape { shape }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a value out of range error.
    pub fn value_out_of_range(value: impl fmt::Display, target: BuiltinType) -> Self {
        Self::ValueOutOfRange {
            value: value.to_string(),
            target,
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(target: BuiltinType, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            target,
            message: message.into(),
        }
    }

    /// Creates a payload mismatch error.
    pub fn payload_mismatch(builtin_type: BuiltinType, found: &'static str) -> Self {
        Self::PayloadMismatch { builtin_type, found }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedType { .. } => ErrorCode::new(3, 1),
            Self::UnsupportedShape { .. } => ErrorCode::new(3, 2),
            Self::UnknownTypeId { .. } => ErrorCode::new(3, 3),
            Self::UnknownShapeId { .. } => ErrorCode::new(3, 4),
            Self::TypeMismatch { .. } => ErrorCode::new(3, 5),
            Self::ValueOutOfRange { .. } => ErrorCode::new(3, 6),
            Self::InvalidValue { .. } => ErrorCode::new(3, 7),
            Self::PayloadMismatch { .. } => ErrorCode::new(3, 8),
            Self::TruncatedArray { .. } => ErrorCode::new(3, 9),
            Self::UnsupportedIdentifier { .. } => ErrorCode::new(3, 10),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::UnsupportedType { .. } | Self::UnsupportedShape { .. } => vec![
                "This builtin type or shape has no codec in the requested direction",
                "Read the attribute as a supported type or skip the node",
            ],
            Self::UnknownTypeId { .. } | Self::UnknownShapeId { .. } => vec![
                "The engine returned a tag outside the protocol range",
            ],
            Self::TypeMismatch { .. } | Self::ValueOutOfRange { .. } | Self::InvalidValue { .. } => vec![
                "Check the host value against the node's declared data type",
            ],
            Self::PayloadMismatch { .. } | Self::TruncatedArray { .. } => vec![
                "The engine produced an inconsistent wire value",
                "Check the status code before trusting the payload",
            ],
            Self::UnsupportedIdentifier { .. } => vec![
                "Only numeric and string node identifiers are decoded",
            ],
        }
    }
}

// =============================================================================
// NodeIdError
// =============================================================================

/// Errors raised when parsing node address strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeIdError {
    /// The string does not follow `ns=<n>;{i=<n>|s=<text>}`.
    #[error("Invalid node ID format: '{input}' - {reason}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl NodeIdError {
    /// Creates a malformed node id error.
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Malformed { .. } => ErrorCode::new(2, 1),
        }
    }
}

// =============================================================================
// EngineError
// =============================================================================

/// Failures reported by the external protocol engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not reach the endpoint.
    #[error("Connection refused to '{endpoint}'")]
    ConnectionRefused {
        /// Endpoint URL.
        endpoint: String,
    },

    /// No connection is open.
    #[error("Not connected to OPC UA server")]
    NotConnected,

    /// The connection handle is not known to the engine.
    #[error("Unknown connection handle {id}")]
    UnknownConnection {
        /// Raw connection handle.
        id: u32,
    },

    /// The engine rejected a request with a status code.
    #[error("{operation} rejected by engine with status {status}")]
    RequestFailed {
        /// The operation name.
        operation: &'static str,
        /// Engine status code.
        status: StatusCode,
    },

    /// The engine did not answer in time.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        /// The operation name.
        operation: &'static str,
        /// Elapsed time.
        duration: Duration,
    },

    /// The engine returned a response that does not match the request.
    #[error("Engine protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },
}

impl EngineError {
    /// Creates a connection refused error.
    pub fn connection_refused(endpoint: impl Into<String>) -> Self {
        Self::ConnectionRefused {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a request failed error.
    pub fn request_failed(operation: &'static str, status: StatusCode) -> Self {
        Self::RequestFailed { operation, status }
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns `true` if the request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused { .. } | Self::NotConnected | Self::Timeout { .. }
        )
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotConnected | Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::ConnectionRefused { .. } | Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::UnknownConnection { .. } | Self::Protocol { .. } => ErrorSeverity::Critical,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConnectionRefused { .. } => ErrorCode::new(1, 1),
            Self::NotConnected => ErrorCode::new(1, 2),
            Self::UnknownConnection { .. } => ErrorCode::new(1, 3),
            Self::RequestFailed { .. } => ErrorCode::new(1, 4),
            Self::Timeout { .. } => ErrorCode::new(1, 5),
            Self::Protocol { .. } => ErrorCode::new(1, 6),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ConnectionRefused { .. } => vec![
                "Verify the OPC UA server is running",
                "Check the endpoint URL and firewall settings",
            ],
            Self::NotConnected | Self::UnknownConnection { .. } => {
                vec!["Call connect() before issuing requests"]
            }
            Self::RequestFailed { .. } => vec![
                "Inspect the status code for the rejection reason",
            ],
            Self::Timeout { .. } => vec!["Increase the request timeout"],
            Self::Protocol { .. } => vec!["Report the engine response as a defect"],
        }
    }
}

// =============================================================================
// SubscriptionError
// =============================================================================

/// Subscription handle errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The engine refused to create the subscription.
    #[error("Failed to create subscription: {message}")]
    CreationFailed {
        /// Error message.
        message: String,
    },

    /// The subscription handle was already closed.
    #[error("Subscription {id} is closed")]
    Closed {
        /// Subscription id.
        id: u32,
    },
}

impl SubscriptionError {
    /// Creates a creation failed error.
    pub fn creation_failed(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::CreationFailed { .. } => ErrorCode::new(4, 1),
            Self::Closed { .. } => ErrorCode::new(4, 2),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid endpoint URL.
    #[error("Invalid endpoint URL: '{url}' - {reason}")]
    InvalidEndpoint {
        /// The invalid URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// Missing required field.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// The missing field.
        field: String,
    },

    /// Invalid timeout value.
    #[error("Invalid timeout: {duration:?} ({reason})")]
    InvalidTimeout {
        /// The invalid duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Invalid security configuration.
    #[error("Invalid security configuration: {message}")]
    InvalidSecurity {
        /// Error message.
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {message}")]
    Load {
        /// File path.
        path: String,
        /// Error message.
        message: String,
    },

    /// The file extension does not name a supported format.
    #[error("Unsupported configuration format: '{path}'")]
    UnsupportedFormat {
        /// File path.
        path: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Creates an invalid timeout error.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// Creates an invalid security error.
    pub fn invalid_security(message: impl Into<String>) -> Self {
        Self::InvalidSecurity {
            message: message.into(),
        }
    }

    /// Creates a load error.
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidEndpoint { .. } => ErrorCode::new(5, 1),
            Self::MissingField { .. } => ErrorCode::new(5, 2),
            Self::InvalidTimeout { .. } => ErrorCode::new(5, 3),
            Self::InvalidSecurity { .. } => ErrorCode::new(5, 4),
            Self::Load { .. } => ErrorCode::new(5, 5),
            Self::UnsupportedFormat { .. } => ErrorCode::new(5, 6),
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code.
///
/// Format: `UA-XXYY` where XX is the category and YY the specific error.
///
/// Categories:
/// - 1: Engine
/// - 2: NodeId
/// - 3: Conversion
/// - 4: Subscription
/// - 5: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-5).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with UaError.
pub type UaResult<T> = Result<T, UaError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let error = ConversionError::unsupported_type(
            BuiltinType::Guid,
            Direction::Encode,
            ArrayShape::Array,
        );
        let message = error.to_string();
        assert!(message.contains("Guid"));
        assert!(message.contains("encode"));
    }

    #[test]
    fn test_conversion_errors_not_retryable() {
        let error = UaError::conversion(ConversionError::unsupported_shape(ArrayShape::Matrix));
        assert!(error.is_unsupported_shape());
        assert!(!error.is_retryable());
        assert_eq!(error.category(), "conversion");
    }

    #[test]
    fn test_engine_error_retryable() {
        assert!(UaError::not_connected().is_retryable());
        let rejected = EngineError::request_failed("read", StatusCode::BAD);
        assert!(!rejected.is_retryable());
        assert!(rejected.to_string().contains("read"));
    }

    #[test]
    fn test_error_code() {
        let code = ErrorCode::new(3, 1);
        assert_eq!(code.to_string(), "UA-0301");
        assert_eq!(code.as_u16(), 0x0301);

        let error = UaError::type_mismatch("Boolean", "text");
        assert_eq!(error.error_code(), ErrorCode::new(3, 5));
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(ErrorSeverity::Warning.to_tracing_level(), Level::WARN);
        assert_eq!(
            UaError::configuration(ConfigurationError::missing_field("endpoint")).severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_recovery_hints() {
        let error = UaError::engine(EngineError::connection_refused("opc.tcp://localhost:4841"));
        assert!(error.recovery_hints().iter().any(|h| h.contains("running")));
    }
}
