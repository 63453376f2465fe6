#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generation pipeline for protoc-gen-openapiv2.
//!
//! A [`Generator`] turns one `CodeGeneratorRequest` into one
//! [`ResponseEnvelope`]. The stages run in a fixed order and the first failure
//! aborts the run:
//!
//! - configuration: caller options, then invocation parameters
//! - injection of the built-in error schemas, unless disabled
//! - ingestion of the request's schema graph into a registry
//! - target resolution (`file_to_generate`, in order)
//! - translation by the engine
//! - response assembly
//!
//! ## Module Organization
//!
//! - `orchestration` - the [`Generator`] and its stage sequence
//! - `targets` - resolution of requested file names
//! - `response` - response envelope and supported features

pub mod orchestration;
pub mod response;
pub mod targets;

use config::ConfigError;
use descriptor::RegistryError;
use plugins::EngineError;
use thiserror::Error;

pub use orchestration::Generator;
pub use response::{emit_files, Feature, FeatureSet, ResponseEnvelope};
pub use targets::resolve_targets;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration could not be built.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The built-in error schemas could not be added.
    #[error("failed to add default error definitions: {0}")]
    Injection(#[source] EngineError),
    /// The request's schema graph is malformed.
    #[error("failed to load schema graph: {0}")]
    Ingestion(#[source] RegistryError),
    /// A requested file is not part of the schema graph.
    #[error("failed to resolve target: {0}")]
    Resolution(#[source] RegistryError),
    /// The translation engine failed.
    #[error(transparent)]
    Translation(EngineError),
}
