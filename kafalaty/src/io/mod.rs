//! # IO Module
//!
//! The boundary towards the presentation layer: the notification façade, the
//! localized message catalogue, outcome reporting and log setup.

pub mod logging;
pub mod messages;
pub mod notifications;
pub mod reporter;

pub use logging::init_logging;
pub use messages::{Locale, Messages, Operation};
pub use notifications::{BusyGuard, LogNotifier, Notifier, NotifierEvent, RecordingNotifier};
pub use reporter::OperationReporter;
