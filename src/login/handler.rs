use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::login::constants::*;
use crate::login::dialog::{build_auth_dialog, CompletionListener, DialogHost, UrlLauncher, WebDialog};
use crate::login::environment::SdkEnvironment;
use crate::login::error::LoginResult;
use crate::login::parameters::{generate_e2e, login_parameters, AuthDialogConfig};
use crate::login::types::{LoginOutcome, LoginRequest};

/// Owner of the login attempt. Supplies the presenting surface and receives
/// the outcome of every started attempt.
pub trait LoginFlowController: Send + Sync {
    /// Surface able to host the dialog, if one is currently attached.
    fn presenting_surface(&self) -> Option<Arc<dyn DialogHost>>;

    /// Theme the host should style the dialog with.
    fn dialog_theme(&self) -> Option<String> {
        None
    }

    fn complete(&self, request: &LoginRequest, outcome: LoginOutcome);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizeStatus {
    /// The dialog is showing; the outcome arrives through the controller.
    Started,
    /// This handler cannot serve the request; try another login method.
    NotHandled,
}

/// State that survives the handler being torn down and recreated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHandlerState {
    pub e2e: Option<String>,
}

#[derive(Default)]
struct HandlerState {
    e2e: Option<String>,
    dialog: Option<WebDialog>,
    attempt: u64,
    logging_extras: BTreeMap<String, String>,
}

/// Runs the login through an embedded web view dialog.
pub struct WebViewLoginHandler {
    controller: Arc<dyn LoginFlowController>,
    launcher: Arc<dyn UrlLauncher>,
    environment: Arc<dyn SdkEnvironment>,
    state: Arc<Mutex<HandlerState>>,
}

impl WebViewLoginHandler {
    pub fn new(
        controller: Arc<dyn LoginFlowController>,
        launcher: Arc<dyn UrlLauncher>,
        environment: Arc<dyn SdkEnvironment>,
    ) -> Self {
        Self {
            controller,
            launcher,
            environment,
            state: Arc::new(Mutex::new(HandlerState::default())),
        }
    }

    /// Recreates a handler from previously persisted state.
    pub fn restore(
        persisted: PersistedHandlerState,
        controller: Arc<dyn LoginFlowController>,
        launcher: Arc<dyn UrlLauncher>,
        environment: Arc<dyn SdkEnvironment>,
    ) -> Self {
        let handler = Self::new(controller, launcher, environment);
        handler.state.lock().unwrap().e2e = persisted.e2e;
        handler
    }

    pub fn restore_from_json_str(
        data: &str,
        controller: Arc<dyn LoginFlowController>,
        launcher: Arc<dyn UrlLauncher>,
        environment: Arc<dyn SdkEnvironment>,
    ) -> LoginResult<Self> {
        let persisted: PersistedHandlerState = serde_json::from_str(data)?;
        Ok(Self::restore(persisted, controller, launcher, environment))
    }

    pub fn name_for_logging(&self) -> &'static str {
        WEB_VIEW_METHOD_NAME
    }

    pub fn e2e(&self) -> Option<String> {
        self.state.lock().unwrap().e2e.clone()
    }

    pub fn active_dialog(&self) -> Option<WebDialog> {
        self.state.lock().unwrap().dialog.clone()
    }

    pub fn logging_extras(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().logging_extras.clone()
    }

    pub fn persisted_state(&self) -> PersistedHandlerState {
        PersistedHandlerState { e2e: self.e2e() }
    }

    pub fn to_json_string(&self) -> LoginResult<String> {
        Ok(serde_json::to_string(&self.persisted_state())?)
    }

    /// Builds and shows the auth dialog for `request`.
    ///
    /// A dialog left over from an earlier attempt is dropped without being
    /// cancelled; call [`cancel`](Self::cancel) first to notify its listener.
    pub fn try_authorize(&self, request: &LoginRequest) -> LoginResult<AuthorizeStatus> {
        let parameters = login_parameters(request, self.environment.as_ref());
        let e2e = generate_e2e();
        let attempt = {
            let mut state = self.state.lock().unwrap();
            if let Some(scope) = parameters.get(DIALOG_PARAM_SCOPE) {
                state
                    .logging_extras
                    .insert(DIALOG_PARAM_SCOPE.to_string(), scope.to_string());
            }
            state
                .logging_extras
                .insert(DIALOG_PARAM_E2E.to_string(), e2e.clone());
            state.e2e = Some(e2e.clone());
            state.attempt += 1;
            state.attempt
        };

        let Some(host) = self.controller.presenting_surface() else {
            log::debug!("no presenting surface attached, web view login not handled");
            return Ok(AuthorizeStatus::NotHandled);
        };

        let config = AuthDialogConfig::from_request(
            request,
            parameters,
            e2e,
            self.environment.is_chrome_os(),
        )
        .with_theme(self.controller.dialog_theme());
        let listener = self.completion_listener(request.clone(), attempt);
        let dialog = build_auth_dialog(
            config,
            listener,
            host,
            self.launcher.clone(),
            self.environment.as_ref(),
        )?;

        self.state.lock().unwrap().dialog = Some(dialog.clone());
        log::debug!("showing web view login dialog {}", dialog.url());
        dialog.show();
        Ok(AuthorizeStatus::Started)
    }

    /// Cancels the active dialog, if any. Calling it again is a no-op.
    pub fn cancel(&self) {
        let dialog = self.state.lock().unwrap().dialog.take();
        if let Some(dialog) = dialog {
            log::debug!("cancelling web view login dialog");
            dialog.cancel();
        }
    }

    fn completion_listener(&self, request: LoginRequest, attempt: u64) -> CompletionListener {
        let state = Arc::downgrade(&self.state);
        let controller = self.controller.clone();
        let delivered = AtomicBool::new(false);
        Arc::new(move |outcome: LoginOutcome| {
            if delivered.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap();
                // A dialog from an earlier attempt must not touch the current one.
                if state.attempt == attempt {
                    state.dialog = None;
                    if let LoginOutcome::Success(bundle) = &outcome {
                        if let Some(e2e) = bundle.e2e() {
                            state.e2e = Some(e2e.to_string());
                        }
                    }
                }
            }
            match &outcome {
                LoginOutcome::Success(_) => log::debug!("web view login completed"),
                LoginOutcome::Cancelled => log::debug!("web view login cancelled"),
                LoginOutcome::Error(err) => log::warn!("web view login failed: {err}"),
            }
            controller.complete(&request, outcome);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::environment::SdkSettings;
    use crate::login::error::LaunchError;
    use crate::login::strategy::RedirectStrategy;
    use crate::login::types::LoginBehavior;

    #[derive(Default)]
    struct CountingHost {
        dismissed: Mutex<usize>,
    }

    impl DialogHost for CountingHost {
        fn show(&self, _dialog: &WebDialog) {}

        fn dismiss(&self, _dialog: &WebDialog) {
            *self.dismissed.lock().unwrap() += 1;
        }
    }

    struct NoopLauncher;

    impl UrlLauncher for NoopLauncher {
        fn open_url(&self, _url: &str) -> Result<(), LaunchError> {
            Ok(())
        }
    }

    struct RecordingController {
        surface: Option<Arc<dyn DialogHost>>,
        outcomes: Mutex<Vec<(String, LoginOutcome)>>,
    }

    impl RecordingController {
        fn new(surface: Option<Arc<dyn DialogHost>>) -> Arc<Self> {
            Arc::new(Self {
                surface,
                outcomes: Mutex::new(Vec::new()),
            })
        }
    }

    impl LoginFlowController for RecordingController {
        fn presenting_surface(&self) -> Option<Arc<dyn DialogHost>> {
            self.surface.clone()
        }

        fn complete(&self, request: &LoginRequest, outcome: LoginOutcome) {
            self.outcomes
                .lock()
                .unwrap()
                .push((request.auth_id().to_string(), outcome));
        }
    }

    fn handler_with(controller: Arc<RecordingController>) -> WebViewLoginHandler {
        WebViewLoginHandler::new(
            controller,
            Arc::new(NoopLauncher),
            Arc::new(SdkSettings::new("app-123")),
        )
    }

    #[test]
    fn missing_surface_is_not_handled() {
        let controller = RecordingController::new(None);
        let handler = handler_with(controller.clone());
        let status = handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]))
            .unwrap();
        assert_eq!(status, AuthorizeStatus::NotHandled);
        assert!(handler.active_dialog().is_none());
        assert!(handler.e2e().is_some());
        assert!(controller.outcomes.lock().unwrap().is_empty());
    }

    #[test]
    fn login_behavior_does_not_gate_the_dialog() {
        for behavior in [
            LoginBehavior::NativeOnly,
            LoginBehavior::KatanaOnly,
            LoginBehavior::DeviceAuth,
        ] {
            let host: Arc<dyn DialogHost> = Arc::new(CountingHost::default());
            let handler = handler_with(RecordingController::new(Some(host)));
            let request = LoginRequest::new("app-123", ["email"]).with_login_behavior(behavior);
            assert_eq!(handler.try_authorize(&request).unwrap(), AuthorizeStatus::Started);
            let dialog = handler.active_dialog().expect("dialog is active");
            let behavior_param = dialog
                .url()
                .query_pairs()
                .find(|(key, _)| key == DIALOG_PARAM_LOGIN_BEHAVIOR)
                .map(|(_, value)| value.into_owned());
            assert_eq!(behavior_param.as_deref(), Some(behavior.as_str()));
            handler.cancel();
        }
    }

    #[test]
    fn stale_dialog_reports_without_touching_current_attempt() {
        let host: Arc<dyn DialogHost> = Arc::new(CountingHost::default());
        let controller = RecordingController::new(Some(host));
        let handler = handler_with(controller.clone());

        handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]).with_auth_id("first"))
            .unwrap();
        let first = handler.active_dialog().expect("first dialog");
        handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]).with_auth_id("second"))
            .unwrap();
        let second = handler.active_dialog().expect("second dialog");
        let current_e2e = handler.e2e();

        first.handle_navigation("fbconnect://success#access_token=x&e2e=from-first-attempt");

        let outcomes = controller.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, "first");
        assert!(outcomes[0].1.is_success());
        drop(outcomes);
        assert!(handler.active_dialog().is_some_and(|active| active.ptr_eq(&second)));
        assert_eq!(handler.e2e(), current_e2e);
    }

    #[test]
    fn controller_theme_reaches_dialog() {
        struct ThemedController(Arc<dyn DialogHost>);

        impl LoginFlowController for ThemedController {
            fn presenting_surface(&self) -> Option<Arc<dyn DialogHost>> {
                Some(self.0.clone())
            }

            fn dialog_theme(&self) -> Option<String> {
                Some("dark".to_string())
            }

            fn complete(&self, _request: &LoginRequest, _outcome: LoginOutcome) {}
        }

        let handler = WebViewLoginHandler::new(
            Arc::new(ThemedController(Arc::new(CountingHost::default()))),
            Arc::new(NoopLauncher),
            Arc::new(SdkSettings::new("app-123")),
        );
        handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]))
            .unwrap();
        assert_eq!(handler.active_dialog().unwrap().theme(), Some("dark"));
    }

    #[test]
    fn cancel_is_idempotent() {
        let host = Arc::new(CountingHost::default());
        let controller = RecordingController::new(Some(host.clone() as Arc<dyn DialogHost>));
        let handler = handler_with(controller.clone());
        let request = LoginRequest::new("app-123", ["email"]).with_auth_id("attempt-1");
        assert_eq!(handler.try_authorize(&request).unwrap(), AuthorizeStatus::Started);

        handler.cancel();
        handler.cancel();

        let outcomes = controller.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0], ("attempt-1".to_string(), LoginOutcome::Cancelled));
        assert_eq!(*host.dismissed.lock().unwrap(), 1);
        assert!(handler.active_dialog().is_none());
    }

    #[test]
    fn success_consumes_dialog_and_adopts_returned_e2e() {
        let host: Arc<dyn DialogHost> = Arc::new(CountingHost::default());
        let controller = RecordingController::new(Some(host));
        let handler = handler_with(controller.clone());
        handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]))
            .unwrap();
        let dialog = handler.active_dialog().expect("dialog is active");
        assert_eq!(dialog.strategy(), &RedirectStrategy::Standard);

        dialog.handle_navigation("fbconnect://success#access_token=abc&e2e=server-e2e");
        dialog.handle_navigation("fbconnect://success#access_token=again");

        assert_eq!(controller.outcomes.lock().unwrap().len(), 1);
        assert!(handler.active_dialog().is_none());
        assert_eq!(handler.e2e().as_deref(), Some("server-e2e"));
        assert_eq!(
            handler.logging_extras().get(DIALOG_PARAM_SCOPE).map(String::as_str),
            Some("email")
        );
    }

    #[test]
    fn persisted_e2e_round_trips() {
        let host: Arc<dyn DialogHost> = Arc::new(CountingHost::default());
        let controller = RecordingController::new(Some(host));
        let handler = handler_with(controller.clone());
        handler
            .try_authorize(&LoginRequest::new("app-123", ["email"]))
            .unwrap();
        let original = handler.e2e().expect("e2e generated");

        let json = handler.to_json_string().unwrap();
        let restored = WebViewLoginHandler::restore_from_json_str(
            &json,
            controller,
            Arc::new(NoopLauncher),
            Arc::new(SdkSettings::new("app-123")),
        )
        .unwrap();
        assert_eq!(restored.e2e(), Some(original));
        restored.cancel();
    }
}
