pub mod policy;
mod service;

pub use service::{ControlService, RunOutcome};
