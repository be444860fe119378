//! Persisted build state

pub mod cache;

pub use cache::BuildStateCache;
