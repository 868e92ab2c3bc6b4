use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("missing environment value for: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("error while requesting {url:?}: {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad status while requesting {url:?}: {status}")]
    BadStatusError { url: String, status: u16 },

    #[error("couldn't parse duration: {magnitude} {unit}")]
    UnrecognizedUnitError { magnitude: u64, unit: String },

    #[error("error while parsing number {text:?}: {source}")]
    InvalidMagnitudeError {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("age '{magnitude} {unit}' does not fit in a duration")]
    AgeOverflowError { magnitude: u64, unit: String },

    #[error("error sending mail: {message}")]
    NotifyError { message: String },

    #[error("{failed} of {attempted} checks failed in the last cycle")]
    CycleFailedError { failed: usize, attempted: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Parsing,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::MissingConfigError { .. } | WatchError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            WatchError::FetchError { .. } | WatchError::BadStatusError { .. } => {
                ErrorCategory::Network
            }
            WatchError::UnrecognizedUnitError { .. }
            | WatchError::InvalidMagnitudeError { .. }
            | WatchError::AgeOverflowError { .. } => ErrorCategory::Parsing,
            WatchError::NotifyError { .. } | WatchError::CycleFailedError { .. } => {
                ErrorCategory::Delivery
            }
        }
    }

    /// 決定錯誤嚴重程度，binary 依此決定退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Parsing => ErrorSeverity::Medium,
            ErrorCategory::Delivery => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Network and parse failures clear up on their own by the next cycle.
    pub fn is_transient(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            WatchError::MissingConfigError { field } => {
                format!("Set the {} environment variable (or pass the matching flag)", field)
            }
            WatchError::InvalidConfigValueError { field, .. } => {
                format!("Check the value given for {}", field)
            }
            WatchError::FetchError { .. } | WatchError::BadStatusError { .. } => {
                "The listing page will be requested again on the next cycle".to_string()
            }
            WatchError::UnrecognizedUnitError { .. }
            | WatchError::InvalidMagnitudeError { .. }
            | WatchError::AgeOverflowError { .. } => {
                "The listing markup may have changed; review the age phrase format".to_string()
            }
            WatchError::NotifyError { .. } => {
                "Verify SMTP_SERVER, SMTP_PORT and the SMTP credentials".to_string()
            }
            WatchError::CycleFailedError { .. } => "See the log above for each failure".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            WatchError::MissingConfigError { field } => {
                format!("Required setting {} is not configured", field)
            }
            WatchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            WatchError::FetchError { url, .. } | WatchError::BadStatusError { url, .. } => {
                format!("Could not load {}", url)
            }
            WatchError::UnrecognizedUnitError { unit, .. } => {
                format!("Found an age with an unknown unit '{}'", unit)
            }
            WatchError::NotifyError { .. } => "An alert email could not be delivered".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
