//! Switchboard Runner - hosts configured models and dispatches keyword-argument
//! calls to their exposed functions.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod state;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use model::{ClassResolver, FunctionSpec, ModelDescriptor, ModelRegistry};
pub use state::AppState;
