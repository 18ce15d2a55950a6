//! The conversation controller and the state it renders from

mod controller;
mod selector;
mod status;

pub use controller::*;
pub use selector::{ModelError, ModelSelector};
pub use status::{Status, StatusKind, TRANSIENT_STATUS_DURATION};
