use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    /// 唯一會穿過 aggregator 邊界的錯誤
    #[error("Directory unavailable for {municipality}: {reason}")]
    DirectoryUnavailable {
        municipality: String,
        reason: String,
    },

    #[error("Municipality not found: {query}")]
    MunicipalityNotFound { query: String },

    #[error("Invalid region code: {value}")]
    InvalidRegion { value: String },

    #[error("Invalid postal code: {value}")]
    InvalidPostalCode { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Input,
    Upstream,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Http(_) => ErrorCategory::Network,
            AppError::Io(_) | AppError::Csv(_) | AppError::Zip(_) | AppError::Serialization(_) => {
                ErrorCategory::Output
            }
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AppError::DirectoryUnavailable { .. } => ErrorCategory::Upstream,
            AppError::MunicipalityNotFound { .. }
            | AppError::InvalidRegion { .. }
            | AppError::InvalidPostalCode { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the directory and postal services are reachable",
            ErrorCategory::Upstream => {
                "The directory service did not return a roster; try again later"
            }
            ErrorCategory::Configuration => "Review the command line flags and the TOML config",
            ErrorCategory::Input => "Use a valid 2-letter UF and a municipality from the list",
            ErrorCategory::Output => "Check that the output path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::DirectoryUnavailable { municipality, .. } => {
                format!("Could not obtain the facility list for {}", municipality)
            }
            AppError::MunicipalityNotFound { query } => {
                format!("No municipality matches '{}'", query)
            }
            AppError::InvalidRegion { value } => {
                format!("'{}' is not a valid UF (use 2 letters, e.g. AM, SP)", value)
            }
            AppError::Http(_) => "A remote service could not be reached".to_string(),
            other => other.to_string(),
        }
    }

    /// 依嚴重程度決定的進程退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
