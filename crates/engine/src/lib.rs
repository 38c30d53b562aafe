pub mod calc;
pub mod error;
pub mod monitor;
pub mod orchestrator;
pub mod parser;

pub use error::{EngineError, error_notification};
pub use monitor::MonitorSettings;
pub use orchestrator::Orchestrator;

#[cfg(test)]
pub(crate) mod testutil;
