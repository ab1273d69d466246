use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportaError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unknown formatter '{name}' for field '{field}'")]
    UnknownFormatter { name: String, field: String },

    #[error("Field '{name}' is declared more than once")]
    DuplicateField { name: String },

    #[error("Unknown field '{name}'")]
    UnknownField { name: String },

    #[error("Source responded with status {status}: {endpoint}")]
    SourceStatusError { endpoint: String, status: u16 },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportaError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportaError::ApiError(_) | ImportaError::SourceStatusError { .. } => {
                ErrorSeverity::Medium
            }
            ImportaError::CsvError(_)
            | ImportaError::SerializationError(_)
            | ImportaError::ProcessingError { .. } => ErrorSeverity::High,
            ImportaError::UnknownFormatter { .. }
            | ImportaError::DuplicateField { .. }
            | ImportaError::UnknownField { .. }
            | ImportaError::ConfigValidationError { .. }
            | ImportaError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ImportaError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportaError::ApiError(_) | ImportaError::SourceStatusError { .. } => {
                format!("Could not fetch input records: {}", self)
            }
            ImportaError::CsvError(_) => format!("Input file is not valid CSV: {}", self),
            ImportaError::SerializationError(e) => format!("Malformed JSON: {}", e),
            ImportaError::UnknownFormatter { .. } | ImportaError::DuplicateField { .. } => {
                format!("Schema definition is broken: {}", self)
            }
            ImportaError::IoError(e) => format!("File system error: {}", e),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportaError::ApiError(_) | ImportaError::SourceStatusError { .. } => {
                "Check that the input URL is reachable and returns a JSON array of objects"
            }
            ImportaError::CsvError(_) => "Make sure the first row of the CSV is a header row",
            ImportaError::SerializationError(_) => {
                "Check that the source returns well-formed JSON"
            }
            ImportaError::UnknownFormatter { .. } => {
                "Use one of: raw, string, date, phone, integer, float, boolean"
            }
            ImportaError::DuplicateField { .. } => "Remove the repeated [[fields]] entry",
            ImportaError::IoError(_) => "Check file paths and permissions",
            ImportaError::ConfigValidationError { .. }
            | ImportaError::InvalidConfigValueError { .. } => {
                "Review the command line arguments and schema file"
            }
            _ => "Re-run with --verbose for more details",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportaError>;
