//! Observability for lexicon
//!
//! Structured JSON logging of typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only: logging never changes an outcome
//! 2. Synchronous, no background threads
//! 3. Deterministic field order
//!
//! # Usage
//!
//! ```ignore
//! use lexicon::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::SnapshotDownload, &[("version", "dictionary_2020-01-01_00:00:00")]);
//!
//! let scope = ObservationScope::new("VERSION_BUILD");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

fn severity_of(event: Event) -> Severity {
    if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}
