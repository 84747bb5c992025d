use std::sync::{Arc, Mutex};

use async_channel::{Receiver, Sender};

use crate::login::dialog::DialogHost;
use crate::login::handler::LoginFlowController;
use crate::login::types::{LoginOutcome, LoginRequest};

/// A finished login attempt as observed by [`ChannelLoginController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedLogin {
    pub request: LoginRequest,
    pub outcome: LoginOutcome,
}

/// Controller that forwards outcomes into an async channel, letting callers
/// `await` the result of a login started on the UI side.
pub struct ChannelLoginController {
    surface: Mutex<Option<Arc<dyn DialogHost>>>,
    sender: Sender<CompletedLogin>,
}

impl ChannelLoginController {
    pub fn new(surface: Option<Arc<dyn DialogHost>>) -> (Arc<Self>, Receiver<CompletedLogin>) {
        let (sender, receiver) = async_channel::unbounded();
        let controller = Arc::new(Self {
            surface: Mutex::new(surface),
            sender,
        });
        (controller, receiver)
    }

    /// Attaches or detaches the surface used for subsequent attempts.
    pub fn set_presenting_surface(&self, surface: Option<Arc<dyn DialogHost>>) {
        *self.surface.lock().unwrap() = surface;
    }
}

impl LoginFlowController for ChannelLoginController {
    fn presenting_surface(&self) -> Option<Arc<dyn DialogHost>> {
        self.surface.lock().unwrap().clone()
    }

    fn complete(&self, request: &LoginRequest, outcome: LoginOutcome) {
        let completed = CompletedLogin {
            request: request.clone(),
            outcome,
        };
        if let Err(err) = self.sender.try_send(completed) {
            log::warn!("dropping login outcome, receiver is gone: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::dialog::WebDialog;
    use futures::executor::block_on;

    struct NullHost;

    impl DialogHost for NullHost {
        fn show(&self, _dialog: &WebDialog) {}
        fn dismiss(&self, _dialog: &WebDialog) {}
    }

    #[test]
    fn forwards_outcomes_to_receiver() {
        let (controller, receiver) = ChannelLoginController::new(None);
        let request = LoginRequest::new("app-123", ["email"]);
        controller.complete(&request, LoginOutcome::Cancelled);

        let completed = block_on(receiver.recv()).unwrap();
        assert_eq!(completed.request, request);
        assert_eq!(completed.outcome, LoginOutcome::Cancelled);
    }

    #[test]
    fn surface_can_be_swapped() {
        let (controller, _receiver) = ChannelLoginController::new(None);
        assert!(controller.presenting_surface().is_none());
        controller.set_presenting_surface(Some(Arc::new(NullHost)));
        assert!(controller.presenting_surface().is_some());
    }

    #[test]
    fn closed_receiver_does_not_panic() {
        let (controller, receiver) = ChannelLoginController::new(None);
        drop(receiver);
        controller.complete(&LoginRequest::new("app-123", ["email"]), LoginOutcome::Cancelled);
    }
}
