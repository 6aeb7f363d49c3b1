use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("A listing with unit name '{unit_name}' already exists")]
    DuplicateUnitName { unit_name: String },

    #[error("A listing with unit number {unit_number} already exists")]
    DuplicateUnitNumber { unit_number: i64 },

    #[error("Listing not found: {id}")]
    NotFound { id: String },

    #[error("Invalid listing field '{field}': {reason}")]
    InvalidListing { field: String, reason: String },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Unexpected stored data: {message}")]
    CorruptRecord { message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API responded with {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Conflict,
    NotFound,
    Validation,
    Persistence,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ListingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ListingError::DuplicateUnitName { .. } | ListingError::DuplicateUnitNumber { .. } => {
                ErrorCategory::Conflict
            }
            ListingError::NotFound { .. } => ErrorCategory::NotFound,
            ListingError::InvalidListing { .. } | ListingError::MalformedRequest { .. } => {
                ErrorCategory::Validation
            }
            ListingError::Database(_) | ListingError::CorruptRecord { .. } => {
                ErrorCategory::Persistence
            }
            ListingError::Request(_) | ListingError::Api { .. } => ErrorCategory::Network,
            ListingError::ConfigError { .. }
            | ListingError::MissingConfigError { .. }
            | ListingError::InvalidConfigValueError { .. }
            | ListingError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ListingError::IoError(_) | ListingError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conflict | ErrorCategory::NotFound | ErrorCategory::Validation => {
                ErrorSeverity::Low
            }
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Persistence | ErrorCategory::System => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Stable machine-readable code carried in failure bodies.
    pub fn code(&self) -> &str {
        match self {
            ListingError::DuplicateUnitName { .. } => "DUPLICATE_UNIT_NAME",
            ListingError::DuplicateUnitNumber { .. } => "DUPLICATE_UNIT_NUMBER",
            ListingError::NotFound { .. } => "NOT_FOUND",
            ListingError::InvalidListing { .. } => "INVALID_LISTING",
            ListingError::MalformedRequest { .. } => "BAD_REQUEST",
            ListingError::Api { code, .. } => code.as_str(),
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a caller. Persistence and system details stay in the logs.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Conflict | ErrorCategory::NotFound | ErrorCategory::Validation => {
                self.to_string()
            }
            ErrorCategory::Persistence | ErrorCategory::System => {
                "Internal error while processing the listing request".to_string()
            }
            ErrorCategory::Network => match self {
                ListingError::Api { message, .. } => message.clone(),
                _ => "Could not reach the listing service".to_string(),
            },
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ListingError::DuplicateUnitName { .. } => "Choose a unit name that is not in use",
            ListingError::DuplicateUnitNumber { .. } => "Choose a unit number that is not in use",
            ListingError::NotFound { .. } => "Check the listing id; it may have been deleted",
            ListingError::InvalidListing { .. } | ListingError::MalformedRequest { .. } => {
                "Fix the request payload and try again"
            }
            ListingError::Database(_) | ListingError::CorruptRecord { .. } => {
                "Check database connectivity and the server logs"
            }
            ListingError::Request(_) => "Check that the listing service is running and reachable",
            ListingError::Api { .. } => "Inspect the API response and retry if appropriate",
            ListingError::MissingConfigError { .. } => {
                "Pass the value on the command line, in the config file, or via MONGODB_URI"
            }
            ListingError::ConfigError { .. }
            | ListingError::InvalidConfigValueError { .. }
            | ListingError::ConfigValidationError { .. } => {
                "Review the configuration file and command-line flags"
            }
            ListingError::IoError(_) | ListingError::SerializationError(_) => {
                "Check file permissions and input formats"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_are_low_severity() {
        let err = ListingError::DuplicateUnitName {
            unit_name: "A-1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.code(), "DUPLICATE_UNIT_NAME");
    }

    #[test]
    fn test_persistence_errors_hide_details() {
        let err = ListingError::CorruptRecord {
            message: "updatedAt out of range".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.user_friendly_message().contains("updatedAt"));
    }

    #[test]
    fn test_missing_config_is_critical() {
        let err = ListingError::MissingConfigError {
            field: "database.url".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("MONGODB_URI"));
    }
}
