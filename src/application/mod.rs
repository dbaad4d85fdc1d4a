pub mod service;

// Re-export key components to form the application's public API.
pub use service::{BridgeRunner, RunEntry, RunPlan, RunReport, RunSummary};
