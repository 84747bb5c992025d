use std::io::{self, BufRead};
use std::sync::Arc;

use futures::executor::block_on;
use social_login_rs_sdk::login::*;

/// Opens the dialog in the system browser instead of an embedded web view.
struct BrowserSurface;

impl DialogHost for BrowserSurface {
    fn show(&self, dialog: &WebDialog) {
        println!("Opening {}", dialog.url());
        if let Err(err) = webbrowser::open(dialog.url().as_str()) {
            eprintln!("could not open browser: {err}");
        }
    }

    fn dismiss(&self, _dialog: &WebDialog) {
        println!("Dialog closed");
    }
}

struct BrowserLauncher;

impl UrlLauncher for BrowserLauncher {
    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        webbrowser::open(url).map_err(|err| LaunchError::Rejected(err.to_string()))
    }
}

fn main() -> LoginResult<()> {
    let settings = SdkSettings::from_env()?;
    let application_id = settings.application_id.clone();
    let surface: Arc<dyn DialogHost> = Arc::new(BrowserSurface);
    let (controller, outcomes) = ChannelLoginController::new(Some(surface));
    let handler = WebViewLoginHandler::new(controller, Arc::new(BrowserLauncher), Arc::new(settings));

    let request = LoginRequest::new(application_id, ["public_profile", "email"])
        .with_login_behavior(LoginBehavior::WebViewOnly);
    if handler.try_authorize(&request)? == AuthorizeStatus::NotHandled {
        println!("Web view login is not available");
        return Ok(());
    }

    // Paste the final redirect URL shown by the browser to feed it to the dialog.
    let dialog = handler.active_dialog().expect("dialog was just started");
    println!("Paste the redirect URL (empty line cancels):");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok();
    let url = line.trim();
    if !url.is_empty() {
        dialog.handle_navigation(url);
    }
    if !dialog.is_completed() {
        handler.cancel();
    }

    if let Ok(completed) = block_on(outcomes.recv()) {
        match completed.outcome {
            LoginOutcome::Success(bundle) => println!("Access token: {:?}", bundle.access_token()),
            LoginOutcome::Cancelled => println!("Login cancelled"),
            LoginOutcome::Error(err) => println!("Login failed: {err}"),
        }
    }
    Ok(())
}
