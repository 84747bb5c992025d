//! Web view login: builds the OAuth dialog, interprets its redirects and
//! reports a single outcome per attempt to the login flow controller.

mod channel;
pub mod constants;
mod dialog;
mod environment;
mod error;
mod handler;
mod parameters;
mod pkce;
mod strategy;
mod types;

#[doc(inline)]
pub use channel::{ChannelLoginController, CompletedLogin};

#[doc(inline)]
pub use dialog::{
    authorization_uri, build_auth_dialog, CompletionListener, DialogHost, NavigationDecision,
    UrlLauncher, WebDialog, WebDialogConfig,
};

#[doc(inline)]
pub use environment::{is_chrome_os_device, SdkEnvironment, SdkSettings};

#[doc(inline)]
pub use error::{LaunchError, LoginError, LoginResult};

#[doc(inline)]
pub use handler::{AuthorizeStatus, LoginFlowController, PersistedHandlerState, WebViewLoginHandler};

#[doc(inline)]
pub use parameters::{
    apply_environment_parameters, base_parameters, build_auth_dialog_parameters, generate_e2e,
    login_parameters, merge_custom_redirect, AuthDialogConfig, DialogParameters,
};

#[doc(inline)]
pub use pkce::PkcePair;

#[doc(inline)]
pub use strategy::{classify_response, parse_redirect_url, RedirectStrategy};

#[doc(inline)]
pub use types::{
    DefaultAudience, LoginBehavior, LoginOutcome, LoginRequest, LoginTargetApp, ResponseBundle,
};
