// SPDX-License-Identifier: CC0-1.0

//! protoc-gen-openapiv2 umbrella crate.
//!
//! This crate is the workspace root. It re-exports the entry points most
//! callers need to embed the generator in their own tooling:
//!
//! - [`Generator`] runs the generation pipeline over a `CodeGeneratorRequest`
//! - [`GenOption`] configures it
//! - [`OpenApiGenerator`] is the production OpenAPI v2 translation engine
//!
//! All functional code lives in the workspace member crates under
//! `compiler`, `primitives` and `cli`.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use config::{ConfigError, GenOption, GeneratorOptions, PathParamSeparator};
pub use genopenapi::{DefaultErrorDefs, OpenApiGenerator};
pub use pipeline::{Feature, FeatureSet, Generator, PipelineError, ResponseEnvelope};

/// Miscellaneous metadata about the workspace.
pub mod openapiv2_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
