//! Runner for JSON-described composition jobs and asset commands.

pub mod job;
pub mod logging;

pub use job::{Job, JobOutcome, JobRunner};
pub use logging::init_tracing;
