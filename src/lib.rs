pub mod analysis;
pub mod audit;
pub mod core;
pub mod edgar;
pub mod fetch;
pub mod history;
pub mod scorer;

// Re-exports
pub use crate::core::config::TruthlensConfig;
pub use fetch::{FilingBundle, FilingDocument, FilingType};
pub use scorer::{CompositeResult, Verdict};
