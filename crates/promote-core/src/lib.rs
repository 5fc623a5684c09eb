pub mod error;
pub mod service;
pub mod structure;
pub mod types;
pub mod waterfall;

pub use error::PromoteError;
pub use types::*;

/// Standard result type for all promote-engine operations
pub type PromoteResult<T> = Result<T, PromoteError>;
