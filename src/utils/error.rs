use crate::core::steps::WorkflowStep;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {message}")]
    ApiStatusError {
        status: u16,
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("No authenticated session")]
    NotAuthenticated,

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: WorkflowStep,
        #[source]
        source: Box<BookingError>,
    },
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Configuration,
    Validation,
    Authentication,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BookingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 把錯誤標記為某個工作流程步驟的失敗
    pub fn at_step(self, step: WorkflowStep) -> Self {
        match self {
            // 已經標記過的錯誤保持原本的步驟
            BookingError::StepFailed { .. } => self,
            other => BookingError::StepFailed {
                step,
                source: Box::new(other),
            },
        }
    }

    /// 失敗的步驟（若有）
    pub fn failed_step(&self) -> Option<WorkflowStep> {
        match self {
            BookingError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// 去掉步驟標記後的根本錯誤
    pub fn root(&self) -> &BookingError {
        match self {
            BookingError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            BookingError::HttpError(_) => ErrorCategory::Network,
            BookingError::ApiStatusError { status, .. } if *status == 401 || *status == 419 => {
                ErrorCategory::Authentication
            }
            BookingError::ApiStatusError { .. } => ErrorCategory::Remote,
            BookingError::ConfigError { .. }
            | BookingError::InvalidConfigValueError { .. }
            | BookingError::ConfigValidationError { .. }
            | BookingError::UrlError(_) => ErrorCategory::Configuration,
            BookingError::ValidationError { .. } => ErrorCategory::Validation,
            BookingError::NotAuthenticated => ErrorCategory::Authentication,
            BookingError::IoError(_) | BookingError::SerializationError(_) => {
                ErrorCategory::Internal
            }
            BookingError::StepFailed { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Authentication => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 伺服器回傳的驗證訊息（Laravel `errors` 欄位），依欄位排序攤平
    pub fn field_messages(&self) -> Vec<String> {
        match self.root() {
            BookingError::ApiStatusError { field_errors, .. } => {
                field_errors.values().flatten().cloned().collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root() {
            BookingError::HttpError(_) => {
                "No se pudo conectar con el servidor de PeluPet".to_string()
            }
            BookingError::ApiStatusError { message, .. } if !message.is_empty() => {
                message.clone()
            }
            BookingError::ApiStatusError { status, .. } => {
                format!("El servidor respondió con un error ({})", status)
            }
            BookingError::ValidationError { message, .. } => message.clone(),
            BookingError::NotAuthenticated => "Debes iniciar sesión primero".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the API is reachable and PELUPET_API_URL is correct",
            ErrorCategory::Remote => "Review the submitted data and resubmit the whole form",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Validation => "Correct the highlighted field and try again",
            ErrorCategory::Authentication => "Log in again with `pelupet login`",
            ErrorCategory::Internal => "Re-run with --verbose and inspect the logs",
        }
    }
}
