//! Buildbar - build freshness at a glance
//!
//! Tells whether locally built modules match their current sources and
//! whether the repositories they come from are in sync with upstream.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod git;
pub mod state;
pub mod status;
pub mod target;

pub use error::{BuildbarError, BuildbarResult};
