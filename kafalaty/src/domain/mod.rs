//! # Domain Module
//!
//! Business rules of the kafala tracker: models, validation, currency
//! aggregation, the session, and the services the presentation layer calls.
//!
//! ## Services
//!
//! - [`AccountService`]: registration, sign-in and the account profile
//! - [`ChildService`]: children of the signed-in account, including the
//!   cascading delete
//! - [`KafalaService`]: kafalas recorded for a child and their totals
//!
//! Services validate input first, then require an authenticated session, and
//! only then reach the document store.

pub mod account_service;
pub mod aggregator;
pub mod cascade;
pub mod child_service;
pub mod commands;
pub mod errors;
pub mod kafala_service;
pub mod models;
pub mod session;
pub mod validation;

pub use account_service::AccountService;
pub use aggregator::summarize;
pub use cascade::CascadeReport;
pub use child_service::ChildService;
pub use errors::{
    AuthError, CascadePhase, CompoundOperation, Field, KafalatyError, KafalatyResult, PartialFailure,
    Rule, StoreError, ValidationError,
};
pub use kafala_service::KafalaService;
pub use models::{Account, Child, ChildOverview, Kafala};
pub use session::{Session, SessionContext, SessionState};
