use std::path::PathBuf;
use thiserror::Error;

/// Failure to materialize a [`Registry`](crate::registry::Registry).
///
/// Any of these aborts the load; no partially populated registry is ever
/// handed to a query.
#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("registry not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read registry {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registry {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate entity id: {0}")]
    DuplicateId(String),

    #[error("unrecognized entity type '{0}'")]
    UnknownType(String),

    #[error("invalid entity '{id}': {reason}")]
    InvalidEntity { id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum IdsError {
    #[error(transparent)]
    RegistryLoad(#[from] RegistryLoadError),

    #[error("invalid entity type '{0}': expected one of task, script, agent, template, workflow, checklist, data, tool, util, module")]
    InvalidEntityType(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("justification store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdsError>;
