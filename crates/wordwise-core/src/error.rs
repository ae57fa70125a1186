//! Error types for wordwise operations.
//!
//! Every failure surfaced by the scheduler carries a stable [`ErrorCode`] so
//! callers (the web layer, the CLI) can map it to their own wire format
//! without parsing messages.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for wordwise operations.
pub type WordwiseResult<T> = Result<T, WordwiseError>;

/// Main error type for all wordwise operations.
#[derive(Error, Debug)]
pub enum WordwiseError {
    /// Rating outside the 1..=4 scale. Rejected before any state is touched.
    #[error("Invalid rating: {rating} (expected 1, 2, 3 or 4)")]
    InvalidRating { rating: String, code: ErrorCode },

    /// Review or lookup for an item the catalog does not know.
    #[error("Item not found: '{item_key}'")]
    ItemNotFound { item_key: String, code: ErrorCode },

    /// Storage failed; any in-flight transaction has been rolled back.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A computation produced a value the model cannot represent.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Review (REV_xxx)
    RevInvalidRating,

    // Catalog (ITEM_xxx)
    ItemNotFound,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,
    DbCorruptRecord,

    // Configuration
    Configuration,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RevInvalidRating => "REV_001",
            ErrorCode::ItemNotFound => "ITEM_001",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::DbCorruptRecord => "DB_003",
            ErrorCode::Configuration => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl WordwiseError {
    /// Create an invalid rating error.
    pub fn invalid_rating(rating: impl ToString) -> Self {
        Self::InvalidRating {
            rating: rating.to_string(),
            code: ErrorCode::RevInvalidRating,
        }
    }

    /// Create an item not found error.
    pub fn item_not_found(item_key: impl Into<String>) -> Self {
        Self::ItemNotFound {
            item_key: item_key.into(),
            code: ErrorCode::ItemNotFound,
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a persistence error for a row that cannot be decoded.
    pub fn corrupt_record(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbCorruptRecord,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
        }
    }

    /// Create a validation error naming the offending field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.clone());
        Self::Validation {
            message: format!("'{}' must not be empty", field),
            code: ErrorCode::ValMissingField,
            details,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRating { code, .. } => *code,
            Self::ItemNotFound { code, .. } => *code,
            Self::Persistence { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::Configuration,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the error was caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRating { .. } | Self::ItemNotFound { .. } | Self::Validation { .. }
        )
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidRating { .. } => {
                Some("Use 1 (again), 2 (hard), 3 (good) or 4 (easy)")
            }
            Self::ItemNotFound { .. } => Some("Add the item to the catalog before reviewing it"),
            Self::Persistence { .. } => Some("The stored state is unchanged; retry the operation"),
            Self::Configuration(_) => Some("Check the scheduler parameters in your config file"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for WordwiseError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
