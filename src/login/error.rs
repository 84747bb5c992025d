use std::fmt;

pub type LoginResult<T> = Result<T, LoginError>;

/// Error codes the dialog endpoint reports when the user backs out of the flow.
pub const ACCESS_DENIED_ERRORS: &[&str] = &["access_denied", "OAuthAccessDeniedException"];
pub const CANCELLED_ERROR_CODE: i32 = 4201;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// A custom redirect URI could not be handed to the external URL launcher.
    ExternalLaunch { url: String, message: String },
    /// The redirect carried an error returned by the dialog endpoint.
    Protocol {
        code: Option<i32>,
        error_type: Option<String>,
        message: Option<String>,
    },
    /// The dialog failed to load a page.
    DialogLoad {
        code: i32,
        description: String,
        failing_url: String,
    },
    InvalidUri(String),
    /// A caller-supplied PKCE code verifier violates RFC 7636.
    InvalidCodeVerifier(String),
    Persistence(String),
}

impl LoginError {
    pub fn external_launch(url: impl Into<String>, message: impl Into<String>) -> Self {
        LoginError::ExternalLaunch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns the URL attached to the failure, if the error carries one.
    pub fn failing_url(&self) -> Option<&str> {
        match self {
            LoginError::ExternalLaunch { url, .. } => Some(url),
            LoginError::DialogLoad { failing_url, .. } => Some(failing_url),
            _ => None,
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::ExternalLaunch { url, message } => {
                write!(f, "{message} (url: {url})")
            }
            LoginError::Protocol {
                code,
                error_type,
                message,
            } => {
                let kind = error_type.as_deref().unwrap_or("unknown_error");
                let message = message.as_deref().unwrap_or("no error message");
                match code {
                    Some(code) => write!(f, "Dialog error {kind} ({code}): {message}"),
                    None => write!(f, "Dialog error {kind}: {message}"),
                }
            }
            LoginError::DialogLoad {
                code,
                description,
                failing_url,
            } => write!(
                f,
                "Dialog failed to load {failing_url} ({code}): {description}"
            ),
            LoginError::InvalidUri(message) => write!(f, "Invalid URI: {message}"),
            LoginError::InvalidCodeVerifier(message) => {
                write!(f, "Invalid PKCE code verifier: {message}")
            }
            LoginError::Persistence(message) => write!(f, "Persistence error: {message}"),
        }
    }
}

impl std::error::Error for LoginError {}

/// Failure reported by a [`crate::login::UrlLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    NoHandler,
    MalformedUrl(String),
    Rejected(String),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::NoHandler => write!(f, "no application can handle the URL"),
            LaunchError::MalformedUrl(message) => write!(f, "malformed URL: {message}"),
            LaunchError::Rejected(message) => write!(f, "platform rejected the launch: {message}"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<url::ParseError> for LoginError {
    fn from(error: url::ParseError) -> Self {
        LoginError::InvalidUri(error.to_string())
    }
}

impl From<serde_json::Error> for LoginError {
    fn from(error: serde_json::Error) -> Self {
        LoginError::Persistence(error.to_string())
    }
}
