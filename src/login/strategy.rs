use url::form_urlencoded;
use url::Url;

use crate::login::constants::*;
use crate::login::error::{LoginError, ACCESS_DENIED_ERRORS, CANCELLED_ERROR_CODE};
use crate::login::types::{LoginOutcome, ResponseBundle};

/// How a dialog interprets navigations that hit its redirect URL.
///
/// Selected once when the dialog is built and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectStrategy {
    /// Parse the redirect as a token or error response inside the dialog.
    Standard,
    /// Hand matching URLs to the external URL launcher instead of parsing them.
    CustomLaunch(String),
}

impl RedirectStrategy {
    pub fn select(custom_redirect_uri: Option<&str>) -> Self {
        match custom_redirect_uri {
            Some(uri) if !uri.trim().is_empty() => RedirectStrategy::CustomLaunch(uri.to_string()),
            _ => RedirectStrategy::Standard,
        }
    }

    /// Whether `url` must be forwarded to the external launcher. An empty
    /// prefix never matches.
    pub fn intercepts(&self, url: &str) -> bool {
        match self {
            RedirectStrategy::Standard => false,
            RedirectStrategy::CustomLaunch(prefix) => !prefix.is_empty() && url.starts_with(prefix.as_str()),
        }
    }

    pub fn custom_prefix(&self) -> Option<&str> {
        match self {
            RedirectStrategy::Standard => None,
            RedirectStrategy::CustomLaunch(prefix) => Some(prefix),
        }
    }
}

/// Extracts the key/value pairs of a redirect URL. Fragment values win over
/// query values with the same key. Unparseable URLs yield an empty bundle.
pub fn parse_redirect_url(url: &str) -> ResponseBundle {
    let mut bundle = ResponseBundle::new();
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::debug!("ignoring unparseable redirect url: {err}");
            return bundle;
        }
    };
    for (key, value) in parsed.query_pairs() {
        bundle.insert(key.into_owned(), value.into_owned());
    }
    if let Some(fragment) = parsed.fragment() {
        for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
            bundle.insert(key.into_owned(), value.into_owned());
        }
    }
    bundle
}

/// Turns a parsed redirect bundle into the dialog's terminal outcome.
pub fn classify_response(bundle: ResponseBundle) -> LoginOutcome {
    let error = bundle
        .get(RESPONSE_ERROR)
        .or_else(|| bundle.get(RESPONSE_ERROR_TYPE))
        .map(str::to_string);
    let message = bundle
        .get(RESPONSE_ERROR_MSG)
        .or_else(|| bundle.get(RESPONSE_ERROR_MESSAGE))
        .or_else(|| bundle.get(RESPONSE_ERROR_DESCRIPTION))
        .map(str::to_string);
    let code = bundle
        .get(RESPONSE_ERROR_CODE)
        .and_then(|raw| raw.parse::<i32>().ok());

    let has_error = error.as_deref().is_some_and(|value| !value.is_empty());
    let has_message = message.as_deref().is_some_and(|value| !value.is_empty());
    if !has_error && !has_message && code.is_none() {
        return LoginOutcome::Success(bundle);
    }

    let denied = error
        .as_deref()
        .is_some_and(|value| ACCESS_DENIED_ERRORS.contains(&value));
    if denied || code == Some(CANCELLED_ERROR_CODE) {
        return LoginOutcome::Cancelled;
    }

    LoginOutcome::Error(LoginError::Protocol {
        code,
        error_type: error,
        message,
    })
}
