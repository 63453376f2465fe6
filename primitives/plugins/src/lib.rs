#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generator plugins
//!
//! This crate defines the seams between the generation pipeline and the code
//! that does the actual schema translation: the [`TranslationEngine`] that
//! turns resolved files into output artifacts, and the [`ErrorDefsProvider`]
//! that supplies built-in error schemas before ingestion.

use config::GeneratorOptions;
use descriptor::{File, Registry, RegistryError};
use prost_types::FileDescriptorProto;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plugin trait for extending generator functionality
pub trait Plugin: Send + Sync {
    /// Plugin name
    fn name(&self) -> &'static str;

    /// Plugin description
    fn description(&self) -> &'static str { "" }
}

/// Maps resolved schema files to output artifacts.
pub trait TranslationEngine: Plugin {
    /// Translate `targets`, in order.
    ///
    /// `registry` holds the whole schema graph so references outside the
    /// targets can be followed. The returned artifacts are passed through to
    /// the response untouched.
    fn generate(
        &self,
        options: &GeneratorOptions,
        registry: &Registry,
        targets: &[&File],
    ) -> Result<Vec<ResponseFile>, EngineError>;
}

/// Supplies the built-in error schema files.
pub trait ErrorDefsProvider: Plugin {
    /// Descriptor files to stage ahead of the request's own files.
    fn error_defs(
        &self,
        options: &GeneratorOptions,
    ) -> Result<Vec<FileDescriptorProto>, EngineError>;
}

/// One generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFile {
    /// Output path, relative to the plugin output directory
    pub name: String,
    /// File contents
    pub content: String,
}

impl ResponseFile {
    /// Create an artifact.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { name: name.into(), content: content.into() }
    }
}

/// Errors raised by engines and error schema providers
#[derive(Debug, Error)]
pub enum EngineError {
    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Registry error surfaced while translating or staging
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A type the engine needs is not in the registry
    #[error("type {0} is not registered")]
    MissingType(String),
    /// Generic engine error
    #[error("{0}")]
    Message(String),
}

impl From<String> for EngineError {
    fn from(msg: String) -> Self { EngineError::Message(msg) }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Plugin for Echo {
        fn name(&self) -> &'static str { "echo" }
    }

    impl TranslationEngine for Echo {
        fn generate(
            &self,
            _options: &GeneratorOptions,
            _registry: &Registry,
            targets: &[&File],
        ) -> Result<Vec<ResponseFile>, EngineError> {
            Ok(targets.iter().map(|f| ResponseFile::new(f.name.clone(), "")).collect())
        }
    }

    #[test]
    fn test_plugin_defaults() {
        assert_eq!(Echo.name(), "echo");
        assert_eq!(Echo.description(), "");
    }

    #[test]
    fn test_engine_over_empty_targets() {
        let registry = Registry::builder()
            .load_files(&GeneratorOptions::default(), &[])
            .expect("empty graph ingests");
        let out = Echo
            .generate(&GeneratorOptions::default(), &registry, &[])
            .expect("echo never fails");
        assert!(out.is_empty());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(EngineError::from("boom".to_string()).to_string(), "boom");
        assert_eq!(
            EngineError::MissingType(".pkg.Gone".to_string()).to_string(),
            "type .pkg.Gone is not registered"
        );
        let wrapped: EngineError = RegistryError::FileNotFound("x.proto".to_string()).into();
        assert_eq!(wrapped.to_string(), "no such file: x.proto");
    }
}
