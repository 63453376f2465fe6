#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! In-memory schema registry for a protobuf schema graph.
//!
//! This crate ingests the `FileDescriptorProto`s of a `CodeGeneratorRequest`
//! into an addressable arena of files, resolving every cross-file type
//! reference up front. Ingestion is all-or-nothing: a graph with duplicate
//! files, dangling imports, unresolvable types or a reference chain deeper
//! than the configured recursion depth is rejected as a whole.

pub mod registry;
pub mod source_info;
pub mod types;

use thiserror::Error;

pub use registry::{Registry, RegistryBuilder, TypeKind};
pub use types::{
    Enum, EnumValue, Field, FieldKind, File, Label, Message, Method, ScalarType, Service,
};

/// Errors raised while ingesting or querying the schema graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A file descriptor without a name.
    #[error("file descriptor has no name")]
    MissingFileName,
    /// Two files share a name.
    #[error("duplicate file in schema graph: {0}")]
    DuplicateFile(String),
    /// Two types share a fully-qualified name.
    #[error("duplicate type {name} declared in {file}")]
    DuplicateType {
        /// File declaring the second definition
        file: String,
        /// Fully-qualified type name
        name: String,
    },
    /// An import that is not part of the graph.
    #[error("{file} imports {dependency}, which is not in the schema graph")]
    MissingDependency {
        /// Importing file
        file: String,
        /// Missing import
        dependency: String,
    },
    /// A type reference that does not resolve.
    #[error("{referrer} in {file} references unknown type {type_name:?}")]
    UnresolvedType {
        /// File containing the reference
        file: String,
        /// Field or method holding the reference
        referrer: String,
        /// The name as written
        type_name: String,
    },
    /// A message reference chain deeper than allowed.
    #[error("message {message} exceeds the maximum recursion depth of {limit}")]
    RecursionDepthExceeded {
        /// Message where the chain starts
        message: String,
        /// Configured limit
        limit: usize,
    },
    /// A requested file is not in the registry.
    #[error("no such file: {0}")]
    FileNotFound(String),
}
