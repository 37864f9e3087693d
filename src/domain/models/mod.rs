//! Domain models

pub mod config;
pub mod job;
pub mod light;
pub mod snapshot;

pub use config::{
    AlertConfig, BridgeConfig, Config, FetchConfig, HealthConfig, JenkinsConfig, LogFormat,
    LoggingConfig, PollConfig, RotationPolicy, VirtualLightConfig,
};
pub use job::{JobHealth, JobName, StreakBasis, UnknownHealthPolicy};
pub use light::{aggregate_verdicts, JobVerdict, LightState};
pub use snapshot::{view_job_names, BuildDetail, JobSnapshot, NamedEntry, ServerListing};
