//! Parameter names and fixed values understood by the remote dialog endpoint.

pub const OAUTH_DIALOG: &str = "oauth";
pub const DIALOG_PATH: &str = "dialog/";
pub const INSTAGRAM_OAUTH_PATH: &str = "oauth/authorize";
pub const DIALOG_AUTHORITY_PREFIX: &str = "m.";
pub const DIALOG_SCHEME: &str = "https";

pub const DIALOG_PARAM_ACCESS_TOKEN: &str = "access_token";
pub const DIALOG_PARAM_AUTH_TYPE: &str = "auth_type";
pub const DIALOG_PARAM_CBT: &str = "cbt";
pub const DIALOG_PARAM_CLIENT_ID: &str = "client_id";
pub const DIALOG_PARAM_CODE_CHALLENGE: &str = "code_challenge";
pub const DIALOG_PARAM_CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
pub const DIALOG_PARAM_DEFAULT_AUDIENCE: &str = "default_audience";
pub const DIALOG_PARAM_DISPLAY: &str = "display";
pub const DIALOG_PARAM_E2E: &str = "e2e";
pub const DIALOG_PARAM_FX_APP: &str = "fx_app";
pub const DIALOG_PARAM_IES: &str = "ies";
pub const DIALOG_PARAM_LOGIN_BEHAVIOR: &str = "login_behavior";
pub const DIALOG_PARAM_NONCE: &str = "nonce";
pub const DIALOG_PARAM_REDIRECT_URI: &str = "redirect_uri";
pub const DIALOG_PARAM_RESPONSE_TYPE: &str = "response_type";
pub const DIALOG_PARAM_RETURN_SCOPES: &str = "return_scopes";
pub const DIALOG_PARAM_SCOPE: &str = "scope";
pub const DIALOG_PARAM_SDK_VERSION: &str = "sdk";
pub const DIALOG_PARAM_SKIP_DEDUPE: &str = "skip_dedupe";
pub const DIALOG_PARAM_STATE: &str = "state";

pub const DIALOG_DISPLAY_TOUCH: &str = "touch";
pub const DIALOG_RETURN_SCOPES_TRUE: &str = "true";
pub const DIALOG_RESPONSE_TYPE_TOKEN_AND_SCOPES: &str = "token,granted_scopes";
pub const DIALOG_RESPONSE_TYPE_TOKEN_AND_SIGNED_REQUEST: &str = "token,signed_request,graph_domain";
pub const DIALOG_RESPONSE_TYPE_ID_TOKEN_AND_SIGNED_REQUEST: &str =
    "id_token,token,signed_request,graph_domain";

pub const DIALOG_REDIRECT_URI: &str = "fbconnect://success";
pub const DIALOG_REDIRECT_CHROME_OS_URI: &str = "fbconnect://chrome_os_success";
pub const DIALOG_CANCEL_URI: &str = "fbconnect://cancel";

pub const SDK_VERSION_PREFIX: &str = "android-";
pub const DEFAULT_AUTH_TYPE: &str = "rerequest";
pub const OPENID_PERMISSION: &str = "openid";

// Client state keys consumed by the login logger on the server side.
pub const STATE_AUTH_LOGGER_ID: &str = "0_auth_logger_id";
pub const STATE_METHOD: &str = "3_method";
pub const STATE_CHALLENGE: &str = "7_challenge";
pub const WEB_VIEW_METHOD_NAME: &str = "web_view";

// Keys read back from the redirect bundle.
pub const RESPONSE_ERROR: &str = "error";
pub const RESPONSE_ERROR_TYPE: &str = "error_type";
pub const RESPONSE_ERROR_MSG: &str = "error_msg";
pub const RESPONSE_ERROR_MESSAGE: &str = "error_message";
pub const RESPONSE_ERROR_DESCRIPTION: &str = "error_description";
pub const RESPONSE_ERROR_CODE: &str = "error_code";
pub const RESPONSE_EXPIRES_IN: &str = "expires_in";
pub const RESPONSE_GRANTED_SCOPES: &str = "granted_scopes";
pub const RESPONSE_DENIED_SCOPES: &str = "denied_scopes";
pub const RESPONSE_SIGNED_REQUEST: &str = "signed_request";
pub const RESPONSE_GRAPH_DOMAIN: &str = "graph_domain";
