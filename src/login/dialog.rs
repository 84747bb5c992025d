use std::fmt;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::login::constants::*;
use crate::login::environment::SdkEnvironment;
use crate::login::error::{LaunchError, LoginError, LoginResult};
use crate::login::parameters::{
    apply_environment_parameters, build_auth_dialog_parameters, AuthDialogConfig, DialogParameters,
};
use crate::login::strategy::{classify_response, parse_redirect_url, RedirectStrategy};
use crate::login::types::{LoginOutcome, LoginTargetApp, ResponseBundle};

pub type CompletionListener = Arc<dyn Fn(LoginOutcome) + Send + Sync>;

/// Platform container that displays a [`WebDialog`] and feeds its navigations
/// back through [`WebDialog::handle_navigation`].
pub trait DialogHost: Send + Sync {
    fn show(&self, dialog: &WebDialog);
    fn dismiss(&self, dialog: &WebDialog);
}

/// Opens a URL outside the dialog (browser or deep-link target).
pub trait UrlLauncher: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), LaunchError>;
}

/// What the host should do with a navigation it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// The dialog consumed the navigation; do not load it.
    Handled,
    /// Load the URL inside the dialog.
    Load,
}

/// Inputs for constructing any dialog against the dialog endpoint.
pub struct WebDialogConfig {
    pub action: String,
    pub parameters: DialogParameters,
    pub theme: Option<String>,
    pub target_app: LoginTargetApp,
    pub strategy: RedirectStrategy,
    pub listener: Option<CompletionListener>,
}

/// Handle on one live dialog. Clones share the same dialog.
#[derive(Clone)]
pub struct WebDialog {
    inner: Arc<DialogInner>,
}

struct DialogInner {
    action: String,
    url: Url,
    expected_redirect_url: String,
    strategy: RedirectStrategy,
    target_app: LoginTargetApp,
    theme: Option<String>,
    host: Arc<dyn DialogHost>,
    launcher: Arc<dyn UrlLauncher>,
    state: Mutex<DialogState>,
}

#[derive(Default)]
struct DialogState {
    listener: Option<CompletionListener>,
    listener_called: bool,
    dismissed: bool,
}

impl WebDialog {
    pub fn new(
        config: WebDialogConfig,
        host: Arc<dyn DialogHost>,
        launcher: Arc<dyn UrlLauncher>,
        environment: &dyn SdkEnvironment,
    ) -> LoginResult<Self> {
        let WebDialogConfig {
            action,
            mut parameters,
            theme,
            target_app,
            strategy,
            listener,
        } = config;

        let default_redirect = if environment.is_chrome_os() {
            DIALOG_REDIRECT_CHROME_OS_URI
        } else {
            DIALOG_REDIRECT_URI
        };
        parameters.insert_if_absent(DIALOG_PARAM_REDIRECT_URI, default_redirect);
        let expected_redirect_url = parameters
            .get(DIALOG_PARAM_REDIRECT_URI)
            .unwrap_or(default_redirect)
            .to_string();
        apply_environment_parameters(&mut parameters, environment);

        let url = authorization_uri(environment, target_app, &action, &parameters)?;
        log::debug!("built {action} dialog for {target_app} with {strategy:?} redirect handling");

        Ok(Self {
            inner: Arc::new(DialogInner {
                action,
                url,
                expected_redirect_url,
                strategy,
                target_app,
                theme,
                host,
                launcher,
                state: Mutex::new(DialogState {
                    listener,
                    ..Default::default()
                }),
            }),
        })
    }

    pub fn action(&self) -> &str {
        &self.inner.action
    }

    /// Fully parameterized authorization URL the host should load.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn expected_redirect_url(&self) -> &str {
        &self.inner.expected_redirect_url
    }

    pub fn strategy(&self) -> &RedirectStrategy {
        &self.inner.strategy
    }

    pub fn target_app(&self) -> LoginTargetApp {
        self.inner.target_app
    }

    pub fn theme(&self) -> Option<&str> {
        self.inner.theme.as_deref()
    }

    pub fn is_dismissed(&self) -> bool {
        self.inner.state.lock().unwrap().dismissed
    }

    pub fn is_completed(&self) -> bool {
        self.inner.state.lock().unwrap().listener_called
    }

    /// Returns `true` when both handles refer to the same dialog.
    pub fn ptr_eq(&self, other: &WebDialog) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn show(&self) {
        self.inner.host.show(self);
    }

    /// Routes one in-dialog navigation.
    pub fn handle_navigation(&self, url: &str) -> NavigationDecision {
        if url.starts_with(self.expected_redirect_url()) {
            let bundle = self.parse_response_uri(url);
            self.deliver(classify_response(bundle));
            return NavigationDecision::Handled;
        }
        if url.starts_with(DIALOG_CANCEL_URI) {
            self.cancel();
            return NavigationDecision::Handled;
        }
        if url.contains(DIALOG_DISPLAY_TOUCH) {
            return NavigationDecision::Load;
        }
        match self.inner.launcher.open_url(url) {
            Ok(()) => NavigationDecision::Handled,
            Err(err) => {
                log::debug!("could not open {url} outside the dialog: {err}");
                NavigationDecision::Load
            }
        }
    }

    /// Per-navigation response hook. URLs matching a custom redirect prefix
    /// are handed to the launcher and yield an empty bundle.
    pub fn parse_response_uri(&self, url: &str) -> ResponseBundle {
        if !self.inner.strategy.intercepts(url) {
            return parse_redirect_url(url);
        }
        match self.inner.launcher.open_url(url) {
            Ok(()) => {
                log::debug!("custom redirect handed off to external handler");
                self.dismiss();
            }
            Err(err) => {
                log::warn!("failed to open custom redirect URI {url}: {err}");
                self.deliver(LoginOutcome::Error(LoginError::external_launch(
                    url,
                    format!("Failed to open custom redirect URI: {err}"),
                )));
            }
        }
        ResponseBundle::new()
    }

    /// Reports a page load failure inside the dialog.
    pub fn on_load_error(&self, code: i32, description: impl Into<String>, failing_url: impl Into<String>) {
        self.deliver(LoginOutcome::Error(LoginError::DialogLoad {
            code,
            description: description.into(),
            failing_url: failing_url.into(),
        }));
    }

    /// Cancels the dialog. The listener receives `Cancelled` unless it already
    /// got an outcome.
    pub fn cancel(&self) {
        self.deliver(LoginOutcome::Cancelled);
        self.dismiss();
    }

    pub fn dismiss(&self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.dismissed {
                return;
            }
            state.dismissed = true;
        }
        self.inner.host.dismiss(self);
    }

    fn deliver(&self, outcome: LoginOutcome) {
        let listener = {
            let mut state = self.inner.state.lock().unwrap();
            if state.listener_called {
                log::debug!("dialog already completed, dropping {outcome:?}");
                return;
            }
            state.listener_called = true;
            state.listener.clone()
        };
        if let Some(listener) = listener {
            listener(outcome);
        }
        self.dismiss();
    }
}

impl fmt::Debug for WebDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDialog")
            .field("action", &self.inner.action)
            .field("url", &self.inner.url.as_str())
            .field("expected_redirect_url", &self.inner.expected_redirect_url)
            .field("strategy", &self.inner.strategy)
            .field("target_app", &self.inner.target_app)
            .finish()
    }
}

/// Builds the dialog endpoint URL. Instagram uses its own authority and a
/// fixed path; Facebook uses `{api_version}/dialog/{action}`.
pub fn authorization_uri(
    environment: &dyn SdkEnvironment,
    target_app: LoginTargetApp,
    action: &str,
    parameters: &DialogParameters,
) -> LoginResult<Url> {
    let (domain, path) = match target_app {
        LoginTargetApp::Instagram => (environment.instagram_domain(), INSTAGRAM_OAUTH_PATH.to_string()),
        LoginTargetApp::Facebook => (
            environment.facebook_domain(),
            format!("{}/{DIALOG_PATH}{action}", environment.graph_api_version()),
        ),
    };
    let mut url = Url::parse(&format!(
        "{DIALOG_SCHEME}://{DIALOG_AUTHORITY_PREFIX}{domain}/{path}"
    ))?;
    if !parameters.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in parameters.iter() {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Builds the OAuth dialog for a login attempt. The redirect strategy is
/// derived from the configured custom redirect URI.
pub fn build_auth_dialog(
    config: AuthDialogConfig,
    listener: CompletionListener,
    host: Arc<dyn DialogHost>,
    launcher: Arc<dyn UrlLauncher>,
    environment: &dyn SdkEnvironment,
) -> LoginResult<WebDialog> {
    let parameters = build_auth_dialog_parameters(&config);
    let strategy = RedirectStrategy::select(config.custom_redirect_uri.as_deref());
    WebDialog::new(
        WebDialogConfig {
            action: OAUTH_DIALOG.to_string(),
            parameters,
            theme: config.theme,
            target_app: config.target_app,
            strategy,
            listener: Some(listener),
        },
        host,
        launcher,
        environment,
    )
}
