use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::login::constants::*;
use crate::login::error::LoginError;
use crate::login::pkce::PkcePair;

/// How the login flow is allowed to authenticate the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginBehavior {
    #[default]
    NativeWithFallback,
    NativeOnly,
    KatanaOnly,
    WebOnly,
    WebViewOnly,
    DialogOnly,
    DeviceAuth,
}

impl LoginBehavior {
    /// Name sent in the `login_behavior` dialog parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginBehavior::NativeWithFallback => "NATIVE_WITH_FALLBACK",
            LoginBehavior::NativeOnly => "NATIVE_ONLY",
            LoginBehavior::KatanaOnly => "KATANA_ONLY",
            LoginBehavior::WebOnly => "WEB_ONLY",
            LoginBehavior::WebViewOnly => "WEB_VIEW_ONLY",
            LoginBehavior::DialogOnly => "DIALOG_ONLY",
            LoginBehavior::DeviceAuth => "DEVICE_AUTH",
        }
    }

    /// Whether this behavior permits the embedded web view dialog. Controllers
    /// consult it when picking which login handler to try.
    pub fn allows_web_view_auth(&self) -> bool {
        matches!(
            self,
            LoginBehavior::NativeWithFallback
                | LoginBehavior::WebOnly
                | LoginBehavior::WebViewOnly
                | LoginBehavior::DialogOnly
        )
    }
}

impl fmt::Display for LoginBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The app the user is signing in to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginTargetApp {
    #[default]
    Facebook,
    Instagram,
}

impl LoginTargetApp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginTargetApp::Facebook => "facebook",
            LoginTargetApp::Instagram => "instagram",
        }
    }
}

impl fmt::Display for LoginTargetApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience that posts published on the user's behalf default to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefaultAudience {
    None,
    OnlyMe,
    #[default]
    Friends,
    Everyone,
}

impl DefaultAudience {
    pub fn native_protocol_audience(&self) -> Option<&'static str> {
        match self {
            DefaultAudience::None => None,
            DefaultAudience::OnlyMe => Some("only_me"),
            DefaultAudience::Friends => Some("friends"),
            DefaultAudience::Everyone => Some("everyone"),
        }
    }
}

/// Immutable description of a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    application_id: String,
    permissions: Vec<String>,
    login_behavior: LoginBehavior,
    default_audience: DefaultAudience,
    target_app: LoginTargetApp,
    auth_type: String,
    auth_id: String,
    is_family_login: bool,
    should_skip_account_deduplication: bool,
    custom_redirect_uri: Option<String>,
    nonce: Option<String>,
    pkce: Option<PkcePair>,
}

impl LoginRequest {
    pub fn new<I, S>(application_id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduplicated: Vec<String> = Vec::new();
        for permission in permissions.into_iter().map(Into::into) {
            if !deduplicated.contains(&permission) {
                deduplicated.push(permission);
            }
        }
        Self {
            application_id: application_id.into(),
            permissions: deduplicated,
            login_behavior: LoginBehavior::default(),
            default_audience: DefaultAudience::default(),
            target_app: LoginTargetApp::default(),
            auth_type: DEFAULT_AUTH_TYPE.to_string(),
            auth_id: generate_auth_id(),
            is_family_login: false,
            should_skip_account_deduplication: false,
            custom_redirect_uri: None,
            nonce: None,
            pkce: None,
        }
    }

    pub fn with_login_behavior(mut self, behavior: LoginBehavior) -> Self {
        self.login_behavior = behavior;
        self
    }

    pub fn with_default_audience(mut self, audience: DefaultAudience) -> Self {
        self.default_audience = audience;
        self
    }

    pub fn with_target_app(mut self, target_app: LoginTargetApp) -> Self {
        self.target_app = target_app;
        self
    }

    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = auth_type.into();
        self
    }

    pub fn with_auth_id(mut self, auth_id: impl Into<String>) -> Self {
        self.auth_id = auth_id.into();
        self
    }

    pub fn with_family_login(mut self, enabled: bool) -> Self {
        self.is_family_login = enabled;
        self
    }

    pub fn with_skip_account_deduplication(mut self, enabled: bool) -> Self {
        self.should_skip_account_deduplication = enabled;
        self
    }

    pub fn with_custom_redirect_uri(mut self, uri: Option<String>) -> Self {
        self.custom_redirect_uri = uri;
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_pkce(mut self, pkce: Option<PkcePair>) -> Self {
        self.pkce = pkce;
        self
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn login_behavior(&self) -> LoginBehavior {
        self.login_behavior
    }

    pub fn default_audience(&self) -> DefaultAudience {
        self.default_audience
    }

    pub fn target_app(&self) -> LoginTargetApp {
        self.target_app
    }

    pub fn is_instagram_login(&self) -> bool {
        self.target_app == LoginTargetApp::Instagram
    }

    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }

    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    pub fn is_family_login(&self) -> bool {
        self.is_family_login
    }

    pub fn should_skip_account_deduplication(&self) -> bool {
        self.should_skip_account_deduplication
    }

    /// Returns the custom redirect URI, treating empty and blank values as absent.
    pub fn custom_redirect_uri(&self) -> Option<&str> {
        self.custom_redirect_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    pub fn pkce(&self) -> Option<&PkcePair> {
        self.pkce.as_ref()
    }
}

fn generate_auth_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Values extracted from a redirect URL's query string and fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseBundle {
    values: BTreeMap<String, String>,
}

impl ResponseBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get(DIALOG_PARAM_ACCESS_TOKEN)
    }

    pub fn expires_in(&self) -> Option<i64> {
        self.get(RESPONSE_EXPIRES_IN)?.parse().ok()
    }

    pub fn granted_scopes(&self) -> Vec<&str> {
        split_scopes(self.get(RESPONSE_GRANTED_SCOPES))
    }

    pub fn denied_scopes(&self) -> Vec<&str> {
        split_scopes(self.get(RESPONSE_DENIED_SCOPES))
    }

    pub fn signed_request(&self) -> Option<&str> {
        self.get(RESPONSE_SIGNED_REQUEST)
    }

    pub fn graph_domain(&self) -> Option<&str> {
        self.get(RESPONSE_GRAPH_DOMAIN)
    }

    pub fn e2e(&self) -> Option<&str> {
        self.get(DIALOG_PARAM_E2E)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResponseBundle {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn split_scopes(raw: Option<&str>) -> Vec<&str> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Terminal result of one dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(ResponseBundle),
    Error(LoginError),
    Cancelled,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoginOutcome::Cancelled)
    }

    pub fn error(&self) -> Option<&LoginError> {
        match self {
            LoginOutcome::Error(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_custom_redirect_is_treated_as_absent() {
        let request = LoginRequest::new("123", ["email"]).with_custom_redirect_uri(Some("   ".into()));
        assert_eq!(request.custom_redirect_uri(), None);

        let request = LoginRequest::new("123", ["email"]).with_custom_redirect_uri(Some(String::new()));
        assert_eq!(request.custom_redirect_uri(), None);

        let request = LoginRequest::new("123", ["email"])
            .with_custom_redirect_uri(Some("myapp://redirect".into()));
        assert_eq!(request.custom_redirect_uri(), Some("myapp://redirect"));
    }

    #[test]
    fn permissions_are_deduplicated_in_order() {
        let request = LoginRequest::new("123", ["email", "public_profile", "email"]);
        assert_eq!(request.permissions(), ["email", "public_profile"]);
    }

    #[test]
    fn auth_ids_differ_between_requests() {
        let first = LoginRequest::new("123", Vec::<String>::new());
        let second = LoginRequest::new("123", Vec::<String>::new());
        assert_eq!(first.auth_id().len(), 36);
        assert_ne!(first.auth_id(), second.auth_id());
    }

    #[test]
    fn login_behavior_serializes_to_protocol_name() {
        assert_eq!(LoginBehavior::WebViewOnly.as_str(), "WEB_VIEW_ONLY");
        assert_eq!(
            serde_json::to_string(&LoginBehavior::NativeWithFallback).unwrap(),
            "\"NATIVE_WITH_FALLBACK\""
        );
        assert!(!LoginBehavior::NativeOnly.allows_web_view_auth());
    }

    #[test]
    fn bundle_exposes_scopes() {
        let bundle: ResponseBundle = [
            ("access_token", "abc"),
            ("granted_scopes", "email, public_profile"),
            ("expires_in", "5183999"),
        ]
        .into_iter()
        .collect();
        assert_eq!(bundle.access_token(), Some("abc"));
        assert_eq!(bundle.granted_scopes(), vec!["email", "public_profile"]);
        assert!(bundle.denied_scopes().is_empty());
        assert_eq!(bundle.expires_in(), Some(5_183_999));
    }
}
