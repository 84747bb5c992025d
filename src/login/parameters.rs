use std::collections::BTreeMap;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;

use crate::login::constants::*;
use crate::login::environment::SdkEnvironment;
use crate::login::pkce::PkcePair;
use crate::login::types::{LoginBehavior, LoginRequest, LoginTargetApp};

const E2E_ID_LENGTH: usize = 16;
const STATE_CHALLENGE_LENGTH: usize = 20;

/// Query parameters sent to the dialog endpoint. Entries are added or
/// overwritten but never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogParameters {
    values: BTreeMap<String, String>,
}

impl DialogParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Inserts the value only when the key is not set yet. Returns whether the
    /// value was written.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Generates the per-attempt `e2e` token.
pub fn generate_e2e() -> String {
    json!({
        "init": Utc::now().timestamp_millis(),
        "id": random_alphanumeric(E2E_ID_LENGTH),
    })
    .to_string()
}

/// Client state echoed back by the endpoint and consumed by server-side login logging.
pub fn client_state(auth_id: &str) -> String {
    json!({
        STATE_AUTH_LOGGER_ID: auth_id,
        STATE_METHOD: WEB_VIEW_METHOD_NAME,
        STATE_CHALLENGE: random_alphanumeric(STATE_CHALLENGE_LENGTH),
    })
    .to_string()
}

fn random_alphanumeric(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Parameters every web login method sends, before the dialog-specific ones.
pub fn base_parameters(request: &LoginRequest, environment: &dyn SdkEnvironment) -> DialogParameters {
    let mut parameters = DialogParameters::new();
    if !request.permissions().is_empty() {
        parameters.insert(DIALOG_PARAM_SCOPE, request.permissions().join(","));
    }
    if let Some(audience) = request.default_audience().native_protocol_audience() {
        parameters.insert(DIALOG_PARAM_DEFAULT_AUDIENCE, audience);
    }
    parameters.insert(DIALOG_PARAM_STATE, client_state(request.auth_id()));
    parameters.insert(DIALOG_PARAM_CBT, Utc::now().timestamp_millis().to_string());
    let ies = if environment.auto_log_app_events_enabled() {
        "1"
    } else {
        "0"
    };
    parameters.insert(DIALOG_PARAM_IES, ies);
    parameters
}

/// Writes the caller's custom redirect URI ahead of the dialog builder so
/// that it takes precedence over the default redirect.
pub fn merge_custom_redirect(parameters: &mut DialogParameters, request: &LoginRequest) {
    if let Some(uri) = request.custom_redirect_uri() {
        parameters.insert(DIALOG_PARAM_REDIRECT_URI, uri);
    }
}

/// Base parameters with the custom redirect merged in.
pub fn login_parameters(request: &LoginRequest, environment: &dyn SdkEnvironment) -> DialogParameters {
    let mut parameters = base_parameters(request, environment);
    merge_custom_redirect(&mut parameters, request);
    parameters
}

/// Everything the auth dialog needs, fixed before construction.
#[derive(Debug, Clone)]
pub struct AuthDialogConfig {
    pub application_id: String,
    pub parameters: DialogParameters,
    pub e2e: String,
    pub is_chrome_os: bool,
    pub target_app: LoginTargetApp,
    pub auth_type: String,
    pub login_behavior: LoginBehavior,
    pub is_family_login: bool,
    pub should_skip_dedupe: bool,
    pub custom_redirect_uri: Option<String>,
    pub pkce: Option<PkcePair>,
    pub nonce: Option<String>,
    pub theme: Option<String>,
}

impl AuthDialogConfig {
    pub fn from_request(
        request: &LoginRequest,
        parameters: DialogParameters,
        e2e: impl Into<String>,
        is_chrome_os: bool,
    ) -> Self {
        let wants_openid = request
            .permissions()
            .iter()
            .any(|permission| permission == OPENID_PERMISSION);
        Self {
            application_id: request.application_id().to_string(),
            parameters,
            e2e: e2e.into(),
            is_chrome_os,
            target_app: request.target_app(),
            auth_type: request.auth_type().to_string(),
            login_behavior: request.login_behavior(),
            is_family_login: request.is_family_login(),
            should_skip_dedupe: request.should_skip_account_deduplication(),
            custom_redirect_uri: request.custom_redirect_uri().map(str::to_string),
            pkce: request.pkce().cloned(),
            nonce: request
                .nonce()
                .filter(|_| wants_openid)
                .map(str::to_string),
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }

    pub fn default_redirect_uri(&self) -> &'static str {
        if self.is_chrome_os {
            DIALOG_REDIRECT_CHROME_OS_URI
        } else {
            DIALOG_REDIRECT_URI
        }
    }
}

/// Completes the parameter set for the OAuth dialog. A `redirect_uri` that is
/// already present is left untouched.
pub fn build_auth_dialog_parameters(config: &AuthDialogConfig) -> DialogParameters {
    let mut parameters = config.parameters.clone();
    parameters.insert_if_absent(DIALOG_PARAM_REDIRECT_URI, config.default_redirect_uri());
    parameters.insert(DIALOG_PARAM_CLIENT_ID, config.application_id.as_str());
    parameters.insert(DIALOG_PARAM_E2E, config.e2e.as_str());

    let response_type = match (config.target_app, &config.pkce) {
        (LoginTargetApp::Instagram, _) => DIALOG_RESPONSE_TYPE_TOKEN_AND_SCOPES,
        (LoginTargetApp::Facebook, Some(_)) => DIALOG_RESPONSE_TYPE_ID_TOKEN_AND_SIGNED_REQUEST,
        (LoginTargetApp::Facebook, None) => DIALOG_RESPONSE_TYPE_TOKEN_AND_SIGNED_REQUEST,
    };
    parameters.insert(DIALOG_PARAM_RESPONSE_TYPE, response_type);

    if config.target_app == LoginTargetApp::Facebook {
        if let Some(pkce) = &config.pkce {
            parameters.insert(DIALOG_PARAM_CODE_CHALLENGE, pkce.code_challenge());
            parameters.insert(DIALOG_PARAM_CODE_CHALLENGE_METHOD, pkce.method());
        }
        if let Some(nonce) = &config.nonce {
            parameters.insert(DIALOG_PARAM_NONCE, nonce.as_str());
        }
    }

    parameters.insert(DIALOG_PARAM_RETURN_SCOPES, DIALOG_RETURN_SCOPES_TRUE);
    parameters.insert(DIALOG_PARAM_AUTH_TYPE, config.auth_type.as_str());
    parameters.insert(DIALOG_PARAM_LOGIN_BEHAVIOR, config.login_behavior.as_str());
    if config.is_family_login {
        parameters.insert(DIALOG_PARAM_FX_APP, config.target_app.as_str());
    }
    if config.should_skip_dedupe {
        parameters.insert(DIALOG_PARAM_SKIP_DEDUPE, "true");
    }
    parameters
}

/// Environment facts the dialog endpoint requires on every request. These
/// overwrite earlier values for the same keys.
pub fn apply_environment_parameters(parameters: &mut DialogParameters, environment: &dyn SdkEnvironment) {
    parameters.insert(DIALOG_PARAM_DISPLAY, DIALOG_DISPLAY_TOUCH);
    parameters.insert(DIALOG_PARAM_CLIENT_ID, environment.application_id());
    parameters.insert(
        DIALOG_PARAM_SDK_VERSION,
        format!("{SDK_VERSION_PREFIX}{}", environment.sdk_version()),
    );
}
