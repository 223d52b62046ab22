// Public modules
pub mod config;
pub mod defaults;
pub mod dotnet;
pub mod error;
pub mod git;
pub mod naming;
pub mod output;
pub mod paths;
pub mod plan;
pub mod refactor;
pub mod registration;
pub mod service;
pub mod solution;

// Re-export common types for convenience
pub use config::ScaffoldConfig;
pub use error::{Error, ErrorCode, Result};
pub use naming::{normalize, normalize_simple, Identifier, NamingMode};
pub use output::{BulkResult, BulkSummary, ItemOutcome, OperationWarning};
pub use plan::{apply, plan_operation, ApplyReport, Plan, Request, Step};
