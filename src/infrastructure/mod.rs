//! Infrastructure layer module
//!
//! This module contains all infrastructure adapters and external integrations:
//! - CI server HTTP fetcher with bounded retries
//! - Light adapters (virtual lights, Hue bridge)
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod http;
pub mod lights;
pub mod logging;
