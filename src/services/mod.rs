//! Service layer: jobs, the job directory, alert evaluation and orchestration.

pub mod alert_evaluator;
pub mod connector;
pub mod job;
pub mod job_directory;
pub mod runner;

pub use alert_evaluator::{AlertEvaluator, AlertOutcome, EvaluationError};
pub use connector::{Connector, HttpConnector};
pub use job::{Job, JobUpdate};
pub use job_directory::{compile_pattern, JobDirectory, ResolveError};
pub use runner::{Composition, Runner, RunnerError, TickReport};
