//! Lifecycle controller and service facade.
//!
//! The worker moves through the standard lifecycle
//! (installing → waiting → active → redundant); [`SiteCacheService`]
//! exposes the phases as methods and dispatches intercepted fetches to the
//! strategy executors while active.

pub(crate) mod activate;
mod builder;
pub(crate) mod error;
pub(crate) mod events;
mod facade;
pub(crate) mod fetch;
pub(crate) mod install;
pub(crate) mod messages;
pub(crate) mod state;

pub use activate::ActivationReport;
pub use builder::ServiceBuilder;
pub use error::WorkerError;
pub use events::{event_channel, EventSender, WorkerEvent, EVENT_CHANNEL_CAPACITY};
pub use facade::SiteCacheService;
pub use install::InstallReport;
pub use messages::{ControlMessage, MessageReply};
pub use state::WorkerState;
