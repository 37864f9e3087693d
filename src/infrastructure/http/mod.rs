//! CI server HTTP access
//!
//! reqwest-based fetcher with equal-interval bounded retries.

pub mod client;
pub mod retry;

pub use client::{HttpFetcher, HttpFetcherConfig};
pub use retry::RetryPolicy;
