use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributionErrorCode {
    Unavailable,
    InvalidTrigger,
    Registration,
}

impl AttributionErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionErrorCode::Unavailable => "attribution/unavailable",
            AttributionErrorCode::InvalidTrigger => "attribution/invalid-trigger",
            AttributionErrorCode::Registration => "attribution/registration-failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributionError {
    pub code: AttributionErrorCode,
    message: String,
}

impl AttributionError {
    pub fn new(code: AttributionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for AttributionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AttributionError {}

pub type AttributionResult<T> = Result<T, AttributionError>;

pub fn unavailable(message: impl Into<String>) -> AttributionError {
    AttributionError::new(AttributionErrorCode::Unavailable, message)
}

pub fn invalid_trigger(message: impl Into<String>) -> AttributionError {
    AttributionError::new(AttributionErrorCode::InvalidTrigger, message)
}

pub fn registration_failed(message: impl Into<String>) -> AttributionError {
    AttributionError::new(AttributionErrorCode::Registration, message)
}
