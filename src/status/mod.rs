//! Status aggregation across modules and repositories

pub mod aggregator;

pub use aggregator::{Health, ModuleReport, ModuleSummary, StatusAggregator, StatusSummary};
