use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::attribution::error::{invalid_trigger, unavailable, AttributionResult};

pub const TRIGGER_SERVER_URI: &str = "https://www.facebook.com/privacy_sandbox/mobile/register/trigger";
const APP_ID_KEY: &str = "app_id";
const EVENT_NAME_KEY: &str = "_eventName";

/// Platform measurement API that accepts attribution trigger registrations.
pub trait MeasurementApi: Send + Sync {
    /// Availability check; registrations are skipped when this returns `false`.
    fn is_available(&self) -> bool;
    fn register_trigger(&self, trigger_uri: &Url) -> AttributionResult<()>;
}

/// An app event as logged by the host application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppEvent {
    name: String,
    parameters: Map<String, Value>,
}

impl AppEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event's wire representation: its parameters plus `_eventName`.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut object = self.parameters.clone();
        object.insert(EVENT_NAME_KEY.to_string(), Value::String(self.name.clone()));
        object
    }
}

/// Forwards app events to the measurement API once enabled. Every failure is
/// logged and swallowed so event logging never breaks because of attribution.
pub struct AttributionTriggers {
    api: Option<Arc<dyn MeasurementApi>>,
    enabled: AtomicBool,
}

impl AttributionTriggers {
    pub fn new(api: Option<Arc<dyn MeasurementApi>>) -> Self {
        Self {
            api,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Registers a trigger for `event`. Returns whether the registration
    /// reached the measurement API and succeeded.
    pub fn register_trigger(&self, application_id: &str, event: &AppEvent) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match self.try_register(application_id, event) {
            Ok(()) => {
                log::debug!("registered attribution trigger for {}", event.name());
                true
            }
            Err(err) => {
                log::warn!("attribution trigger registration failed: {err}");
                false
            }
        }
    }

    fn try_register(&self, application_id: &str, event: &AppEvent) -> AttributionResult<()> {
        let api = self
            .api
            .as_ref()
            .filter(|api| api.is_available())
            .ok_or_else(|| unavailable("measurement API is not available on this device"))?;
        let uri = trigger_uri(application_id, event)?;
        api.register_trigger(&uri)
    }
}

/// Builds `TRIGGER_SERVER_URI?app_id=<id>&<event params>`.
pub fn trigger_uri(application_id: &str, event: &AppEvent) -> AttributionResult<Url> {
    let mut query = format!("{APP_ID_KEY}={}", encode(application_id));
    let params = event_parameters(event);
    if !params.is_empty() {
        query.push('&');
        query.push_str(&params);
    }
    Url::parse(&format!("{TRIGGER_SERVER_URI}?{query}"))
        .map_err(|err| invalid_trigger(format!("could not build trigger URI: {err}")))
}

fn event_parameters(event: &AppEvent) -> String {
    event
        .to_json_object()
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            format!("{}={}", encode(key), encode(&value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
