//! CLI command implementations.

pub mod jobs;
pub mod run;
pub mod tick;
pub mod validate;
