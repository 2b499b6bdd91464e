//! Error types for graph building
//!
//! Data-quality problems (unresolvable names, malformed JSON fields, unknown
//! company ids, dangling links) are never errors: they are omitted from the
//! graph. Only failures of the data source propagate to the caller.

use thiserror::Error;

/// Main error type for graph building
#[derive(Error, Debug)]
pub enum GraphError {
    /// The data source could not be queried
    #[error(transparent)]
    DataAccess(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
