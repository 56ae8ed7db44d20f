//! Command dispatcher and effect providers for the AutoType desktop assistant.
//!
//! A host process sends one command per request (argv or a JSON line). The
//! [`dispatcher::Dispatcher`] validates it against the [`registry`], runs the
//! bound provider and streams `progress` / `result` / `error` events back.

pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod events;
pub mod logging;
pub mod paths;
pub mod progress;
pub mod providers;
pub mod registry;
pub mod session;
pub mod settings;
pub mod state;
pub mod typing;
pub mod util;
