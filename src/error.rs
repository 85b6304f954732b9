//! Error types for the Govee hygrometer bridge
//!
//! Failures are typed so the host platform can tell a transient outage
//! (treat the device as not responding) from a permanent misconfiguration
//! that has to be surfaced to the operator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, GoveeError>;

/// Error types for Govee API and bridge operations
#[derive(Error, Debug)]
pub enum GoveeError {
    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// The vendor rejected the API key
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No usable reading could be produced for a device
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(String),

    /// A discovery cycle is already running
    #[error("Discovery already in progress")]
    DiscoveryInProgress,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Vendor service returned a 5xx
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Structured error code for machine-readable error handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Connection errors (1000-1099)
    ConnectionTimeout,
    ConnectionLost,

    // Authentication errors (1100-1199)
    InvalidCredentials,

    // Configuration errors (1200-1299)
    ConfigurationInvalid,

    // Device errors (1300-1399)
    DeviceOffline,

    // Data errors (1400-1499)
    ParsingFailed,
    InvalidInput,

    // Resource errors (1500-1599)
    RateLimitExceeded,

    // Service errors (1600-1699)
    ServiceUnavailable,
    ExternalServiceError,

    // Internal errors (1900-1999)
    UnexpectedState,
}

impl ErrorCode {
    /// Get numeric error code
    pub fn as_number(&self) -> u32 {
        match self {
            ErrorCode::ConnectionTimeout => 1001,
            ErrorCode::ConnectionLost => 1003,

            ErrorCode::InvalidCredentials => 1101,

            ErrorCode::ConfigurationInvalid => 1202,

            ErrorCode::DeviceOffline => 1302,

            ErrorCode::ParsingFailed => 1401,
            ErrorCode::InvalidInput => 1402,

            ErrorCode::RateLimitExceeded => 1502,

            ErrorCode::ServiceUnavailable => 1601,
            ErrorCode::ExternalServiceError => 1603,

            ErrorCode::UnexpectedState => 1903,
        }
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        match self.as_number() {
            1000..=1099 => "connection",
            1100..=1199 => "authentication",
            1200..=1299 => "configuration",
            1300..=1399 => "device",
            1400..=1499 => "data",
            1500..=1599 => "resource",
            1600..=1699 => "service",
            1900..=1999 => "internal",
            _ => "unknown",
        }
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Low severity - information only
    Info,
    /// Medium severity - warning condition
    Warning,
    /// High severity - error condition
    Error,
    /// Critical severity - immediate attention required
    Critical,
}

/// Where and while doing what an error happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    /// Create new error context
    pub fn new(code: ErrorCode, component: &str, operation: &str) -> Self {
        Self {
            code,
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Add metadata to error context
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl GoveeError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a device unreachable error
    pub fn device_unreachable<S: Into<String>>(msg: S) -> Self {
        Self::DeviceUnreachable(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limit<S: Into<String>>(msg: S) -> Self {
        Self::RateLimit(msg.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map a non-success HTTP status from the vendor API to an error
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let msg = format!("HTTP error {status}: {body}");
        match status.as_u16() {
            401 => Self::authentication(msg),
            403 => Self::authentication("Access denied"),
            404 => Self::config(format!("Endpoint not found, check the base URL: {msg}")),
            429 => Self::rate_limit(msg),
            400..=499 => Self::invalid_input(msg),
            500..=599 => Self::service_unavailable(msg),
            _ => Self::malformed(msg),
        }
    }

    /// Map GoveeError to structured error code
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            GoveeError::Connection(_) => ErrorCode::ConnectionLost,
            GoveeError::Authentication(_) => ErrorCode::InvalidCredentials,
            GoveeError::Http(_) => ErrorCode::ExternalServiceError,
            GoveeError::Config(_) => ErrorCode::ConfigurationInvalid,
            GoveeError::Timeout(_) => ErrorCode::ConnectionTimeout,
            GoveeError::MalformedResponse(_) => ErrorCode::ParsingFailed,
            GoveeError::DeviceUnreachable(_) => ErrorCode::DeviceOffline,
            GoveeError::DiscoveryInProgress => ErrorCode::UnexpectedState,
            GoveeError::RateLimit(_) => ErrorCode::RateLimitExceeded,
            GoveeError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            GoveeError::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GoveeError::Authentication(_) => ErrorSeverity::Critical,
            GoveeError::Config(_) => ErrorSeverity::Error,
            GoveeError::Connection(_) | GoveeError::ServiceUnavailable(_) => ErrorSeverity::Warning,
            GoveeError::Timeout(_) | GoveeError::DeviceUnreachable(_) => ErrorSeverity::Warning,
            GoveeError::DiscoveryInProgress => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Transient failure: the call may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        match self {
            GoveeError::Connection(_)
            | GoveeError::Timeout(_)
            | GoveeError::RateLimit(_)
            | GoveeError::ServiceUnavailable(_) => true,
            GoveeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Misconfiguration that needs operator action, never a device outage
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GoveeError::Authentication(_) | GoveeError::Config(_) | GoveeError::InvalidInput(_)
        )
    }

    /// Check if error indicates authentication issue
    pub fn is_auth_error(&self) -> bool {
        matches!(self, GoveeError::Authentication(_))
    }

    /// Rebuild an equivalent error for callers that shared one in-flight
    /// request. Source errors such as `reqwest::Error` are not `Clone`, so
    /// they are carried over by message with their classification intact.
    pub fn replicate(&self) -> Self {
        match self {
            GoveeError::Connection(m) => GoveeError::Connection(m.clone()),
            GoveeError::Authentication(m) => GoveeError::Authentication(m.clone()),
            GoveeError::Config(m) => GoveeError::Config(m.clone()),
            GoveeError::Timeout(m) => GoveeError::Timeout(m.clone()),
            GoveeError::MalformedResponse(m) => GoveeError::MalformedResponse(m.clone()),
            GoveeError::DeviceUnreachable(m) => GoveeError::DeviceUnreachable(m.clone()),
            GoveeError::DiscoveryInProgress => GoveeError::DiscoveryInProgress,
            GoveeError::RateLimit(m) => GoveeError::RateLimit(m.clone()),
            GoveeError::ServiceUnavailable(m) => GoveeError::ServiceUnavailable(m.clone()),
            GoveeError::InvalidInput(m) => GoveeError::InvalidInput(m.clone()),
            GoveeError::Http(e) if e.is_timeout() => GoveeError::Timeout(e.to_string()),
            GoveeError::Http(e) => GoveeError::Connection(e.to_string()),
        }
    }

    /// Get a production-safe error message that doesn't expose sensitive information
    pub fn sanitized_message(&self) -> String {
        match self {
            GoveeError::Authentication(_) => "Authentication failed".to_string(),
            GoveeError::Connection(_) => "Network connection issue".to_string(),
            GoveeError::Timeout(_) => "Operation timed out".to_string(),
            GoveeError::Http(_) => "HTTP request failed".to_string(),
            GoveeError::Config(_) => "Configuration error".to_string(),
            GoveeError::MalformedResponse(_) => "Data parsing error".to_string(),
            GoveeError::DeviceUnreachable(_) => "Device not responding".to_string(),
            GoveeError::DiscoveryInProgress => "Discovery already in progress".to_string(),
            GoveeError::RateLimit(_) => "Rate limit exceeded".to_string(),
            GoveeError::ServiceUnavailable(_) => "Service temporarily unavailable".to_string(),
            GoveeError::InvalidInput(_) => "Invalid input provided".to_string(),
        }
    }
}

/// Error logging utilities
pub struct ErrorReporter;

impl ErrorReporter {
    /// Log an error at a level derived from its severity
    pub fn log_error(error: &GoveeError, context: Option<ErrorContext>) {
        let code = error.to_error_code();
        let context = context.unwrap_or_else(|| ErrorContext::new(code.clone(), "unknown", "unknown"));
        let metadata = serde_json::Value::Object(context.metadata.into_iter().collect());

        match error.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(
                    error_code = code.as_number(),
                    category = code.category(),
                    component = %context.component,
                    operation = %context.operation,
                    retryable = error.is_retryable(),
                    %metadata,
                    "{}",
                    error
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error_code = code.as_number(),
                    category = code.category(),
                    component = %context.component,
                    operation = %context.operation,
                    retryable = error.is_retryable(),
                    %metadata,
                    "{}",
                    error
                );
            }
            ErrorSeverity::Info => {
                tracing::info!(
                    error_code = code.as_number(),
                    component = %context.component,
                    operation = %context.operation,
                    "{}",
                    error
                );
            }
        }
    }
}

/// Macro for easy structured error logging
#[macro_export]
macro_rules! log_structured_error {
    ($error:expr, $component:expr, $operation:expr) => {
        $crate::error::ErrorReporter::log_error(
            &$error,
            Some($crate::error::ErrorContext::new(
                $error.to_error_code(),
                $component,
                $operation,
            )),
        )
    };
    ($error:expr, $component:expr, $operation:expr, $($key:expr => $value:expr),+) => {
        $crate::error::ErrorReporter::log_error(
            &$error,
            Some(
                $crate::error::ErrorContext::new($error.to_error_code(), $component, $operation)
                    $(.with_metadata($key, $value))+,
            ),
        )
    };
}
