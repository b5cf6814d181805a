//! Error types for the flagctl CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 5=service, ...)
//! - Recovery hints pointing at the flag or environment that exists
//! - Structured JSON output for piped / non-TTY consumers
//!
//! User cancellation is modelled as an error variant but exits 0: declining
//! the confirmation prompt is not a failure.

use thiserror::Error;

/// Result type alias for flagctl operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Cancellation (exit 0)
    Cancelled,

    // Not Found (exit 3)
    FlagNotFound,
    EnvironmentNotFound,
    StatusNotFound,

    // Validation (exit 4)
    InvalidPercentages,
    InvalidPattern,
    InsufficientVariations,
    RequiredField,
    InvalidArgument,

    // Remote service (exit 5)
    ServiceError,

    // Transport (exit 6)
    ConnectionError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::FlagNotFound => "FLAG_NOT_FOUND",
            Self::EnvironmentNotFound => "ENVIRONMENT_NOT_FOUND",
            Self::StatusNotFound => "STATUS_NOT_FOUND",
            Self::InvalidPercentages => "INVALID_PERCENTAGES",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InsufficientVariations => "INSUFFICIENT_VARIATIONS",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ServiceError => "SERVICE_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (0-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            Self::InternalError => 1,
            Self::FlagNotFound | Self::EnvironmentNotFound | Self::StatusNotFound => 3,
            Self::InvalidPercentages
            | Self::InvalidPattern
            | Self::InsufficientVariations
            | Self::RequiredField
            | Self::InvalidArgument => 4,
            Self::ServiceError => 5,
            Self::ConnectionError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying with corrected input can succeed.
    ///
    /// True for validation errors; false for not-found, transport,
    /// or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidPercentages
                | Self::InvalidPattern
                | Self::RequiredField
                | Self::InvalidArgument
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in flagctl operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cancelled")]
    Cancelled,

    #[error("Flag not found: {key}")]
    FlagNotFound { key: String },

    #[error("Environment not found: {key}")]
    EnvironmentNotFound {
        key: String,
        /// Environment keys that do exist on the flag, for hint display.
        available: Vec<String>,
    },

    #[error("No status recorded for flag: {key}")]
    StatusNotFound { key: String },

    #[error("Percentages must sum to 100, got {}", p0 + p1)]
    InvalidPercentages { p0: u32, p1: u32 },

    #[error("Invalid endpoint pattern: {pattern}")]
    InvalidPattern { pattern: String },

    #[error("Flag has {found} variation(s); a rollout rule needs at least 2")]
    InsufficientVariations { found: usize },

    #[error("Required: {0}")]
    RequiredField(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Cancelled => ErrorCode::Cancelled,
            Self::FlagNotFound { .. } => ErrorCode::FlagNotFound,
            Self::EnvironmentNotFound { .. } => ErrorCode::EnvironmentNotFound,
            Self::StatusNotFound { .. } => ErrorCode::StatusNotFound,
            Self::InvalidPercentages { .. } => ErrorCode::InvalidPercentages,
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::InsufficientVariations { .. } => ErrorCode::InsufficientVariations,
            Self::RequiredField(_) => ErrorCode::RequiredField,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Service { .. } => ErrorCode::ServiceError,
            Self::Connection(_) => ErrorCode::ConnectionError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::FlagNotFound { key } => Some(format!(
                "No flag with key '{key}' in this project. Check the key and --project."
            )),

            Self::EnvironmentNotFound { available, .. } => {
                if available.is_empty() {
                    None
                } else {
                    Some(format!("Available environments: {}", available.join(", ")))
                }
            }

            Self::InvalidPercentages { .. } => {
                Some("Pass two integers summing to 100, e.g. --percentages 80,20".to_string())
            }

            Self::InvalidPattern { .. } => Some(
                "Pattern must be an HTTP method followed by a path, e.g. \"GET /api/v1/users\""
                    .to_string(),
            ),

            Self::InsufficientVariations { .. } => Some(
                "Percentage rollouts split traffic between two variations. \
                 Add variations to the flag first."
                    .to_string(),
            ),

            Self::Config(msg) if msg.contains("API key") => {
                Some("Set FLAGCTL_API_KEY to a service access token.".to_string())
            }

            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
