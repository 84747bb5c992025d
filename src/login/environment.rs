//! SDK-wide environment facts used while building dialogs, and the default
//! settings loader that backs them.

use std::env;
use std::fs;

use serde::Deserialize;

use crate::login::error::{LoginError, LoginResult};

pub const DEFAULTS_ENV: &str = "SOCIAL_LOGIN_SDK_DEFAULTS";
pub const DEFAULTS_PATH_ENV: &str = "SOCIAL_LOGIN_SDK_DEFAULTS_PATH";

pub const DEFAULT_GRAPH_API_VERSION: &str = "v16.0";
pub const DEFAULT_FACEBOOK_DOMAIN: &str = "facebook.com";
pub const DEFAULT_INSTAGRAM_DOMAIN: &str = "instagram.com";

/// Lookups that would otherwise go through process-wide SDK singletons.
pub trait SdkEnvironment: Send + Sync {
    fn application_id(&self) -> &str;
    fn sdk_version(&self) -> &str;
    fn graph_api_version(&self) -> &str;
    fn facebook_domain(&self) -> &str;
    fn instagram_domain(&self) -> &str;
    /// Device-class check selecting the ChromeOS redirect URI.
    fn is_chrome_os(&self) -> bool;
    fn auto_log_app_events_enabled(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdkSettings {
    pub application_id: String,
    pub sdk_version: String,
    pub graph_api_version: String,
    pub facebook_domain: String,
    pub instagram_domain: String,
    /// Device codename as reported by the platform build info.
    pub device: Option<String>,
    /// Overrides the device-name based ChromeOS detection.
    pub chrome_os: Option<bool>,
    pub auto_log_app_events_enabled: bool,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            graph_api_version: DEFAULT_GRAPH_API_VERSION.to_string(),
            facebook_domain: DEFAULT_FACEBOOK_DOMAIN.to_string(),
            instagram_domain: DEFAULT_INSTAGRAM_DOMAIN.to_string(),
            device: None,
            chrome_os: None,
            auto_log_app_events_enabled: true,
        }
    }
}

impl SdkSettings {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            ..Default::default()
        }
    }

    /// Loads settings from `SOCIAL_LOGIN_SDK_DEFAULTS` (inline JSON) or from the
    /// JSON file named by `SOCIAL_LOGIN_SDK_DEFAULTS_PATH`. Falls back to the
    /// built-in defaults when neither is set.
    pub fn from_env() -> LoginResult<Self> {
        if let Ok(raw) = env::var(DEFAULTS_ENV) {
            return Self::from_json_str(&raw);
        }
        if let Ok(path) = env::var(DEFAULTS_PATH_ENV) {
            let contents = fs::read_to_string(&path).map_err(|err| {
                LoginError::Persistence(format!("failed to read SDK defaults from {path}: {err}"))
            })?;
            return Self::from_json_str(&contents);
        }
        Ok(Self::default())
    }

    pub fn from_json_str(raw: &str) -> LoginResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl SdkEnvironment for SdkSettings {
    fn application_id(&self) -> &str {
        &self.application_id
    }

    fn sdk_version(&self) -> &str {
        &self.sdk_version
    }

    fn graph_api_version(&self) -> &str {
        &self.graph_api_version
    }

    fn facebook_domain(&self) -> &str {
        &self.facebook_domain
    }

    fn instagram_domain(&self) -> &str {
        &self.instagram_domain
    }

    fn is_chrome_os(&self) -> bool {
        match self.chrome_os {
            Some(forced) => forced,
            None => self.device.as_deref().is_some_and(is_chrome_os_device),
        }
    }

    fn auto_log_app_events_enabled(&self) -> bool {
        self.auto_log_app_events_enabled
    }
}

/// Android apps running on ChromeOS report a `*_cheets` or `cheets_*` device.
pub fn is_chrome_os_device(device: &str) -> bool {
    let suffixed = device
        .strip_suffix("_cheets")
        .is_some_and(|name| !name.is_empty());
    let prefixed = device
        .strip_prefix("cheets_")
        .is_some_and(|name| !name.is_empty());
    suffixed || prefixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_json_with_defaults() {
        let settings =
            SdkSettings::from_json_str(r#"{"applicationId":"1234","graphApiVersion":"v18.0"}"#)
                .unwrap();
        assert_eq!(settings.application_id(), "1234");
        assert_eq!(settings.graph_api_version(), "v18.0");
        assert_eq!(settings.facebook_domain(), DEFAULT_FACEBOOK_DOMAIN);
        assert!(settings.auto_log_app_events_enabled());
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = SdkSettings::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, LoginError::Persistence(_)));
    }

    #[test]
    fn detects_chrome_os_device_names() {
        assert!(is_chrome_os_device("caroline_cheets"));
        assert!(is_chrome_os_device("cheets_arm"));
        assert!(!is_chrome_os_device("cheets_"));
        assert!(!is_chrome_os_device("pixel"));

        let mut settings = SdkSettings::new("1");
        settings.device = Some("eve_cheets".into());
        assert!(settings.is_chrome_os());
        settings.chrome_os = Some(false);
        assert!(!settings.is_chrome_os());
    }
}
