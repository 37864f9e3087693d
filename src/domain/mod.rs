//! Domain layer for buildbeacon
//!
//! This module contains the health model, decoded CI documents and the port traits.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{FetchError, LightError, SnapshotError};
