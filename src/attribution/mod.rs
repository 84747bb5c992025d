//! Privacy-sandbox attribution trigger registration for app events.

mod error;
mod triggers;

#[doc(inline)]
pub use error::{
    invalid_trigger, registration_failed, unavailable, AttributionError, AttributionErrorCode,
    AttributionResult,
};

#[doc(inline)]
pub use triggers::{trigger_uri, AppEvent, AttributionTriggers, MeasurementApi, TRIGGER_SERVER_URI};
