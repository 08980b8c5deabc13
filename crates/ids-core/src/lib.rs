pub mod config;
pub mod decision;
pub mod error;
pub mod io;
pub mod justification;
pub mod matcher;
pub mod paths;
pub mod registry;
pub mod review;
pub mod score;
pub mod types;

pub use decision::{AnalysisResult, IncrementalDecisionEngine, Recommendation, Summary};
pub use error::{IdsError, RegistryLoadError, Result};
pub use matcher::QueryFilters;
pub use registry::{FileRegistry, JustificationStore, MemoryRegistry, Registry, RegistryLoader};
pub use review::{ReviewEntry, ReviewReport};
