//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces infrastructure adapters implement:
//! - SnapshotFetcher: CI server document retrieval
//! - Light / LightBridge: indicator lights
//!
//! These traits keep the health model and the orchestration independent
//! of HTTP and of any particular light hardware.

pub mod fetcher;
pub mod light;

pub use fetcher::SnapshotFetcher;
pub use light::{Light, LightBridge};
