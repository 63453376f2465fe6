//! Generation options.
//!
//! Options are applied as an ordered sequence of [`GenOption`] setters to a
//! single [`OptionsBuilder`]. Once every caller option and invocation
//! parameter has been applied the builder is frozen into an immutable
//! [`GeneratorOptions`] that the rest of the pipeline reads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default maximum recursion allowed for a self-referencing field type.
pub const DEFAULT_RECURSIVE_DEPTH: usize = 1024;

/// Default file name prefix for merged output.
pub const DEFAULT_MERGE_FILE_NAME: &str = "apidocs";

/// How repeated values in a path-style parameter are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathParamSeparator {
    /// Comma separated (`a,b,c`)
    #[default]
    Csv,
    /// Pipe separated (`a|b|c`)
    Pipes,
    /// Space separated (`a b c`)
    Ssv,
    /// Tab separated
    Tsv,
}

impl PathParamSeparator {
    /// All recognised separators.
    pub const ALL: [PathParamSeparator; 4] = [Self::Csv, Self::Pipes, Self::Ssv, Self::Tsv];

    /// The token used on the command line and in OpenAPI `collectionFormat`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pipes => "pipes",
            Self::Ssv => "ssv",
            Self::Tsv => "tsv",
        }
    }
}

impl fmt::Display for PathParamSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PathParamSeparator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sep| sep.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidSeparator(s.to_string()))
    }
}

/// A single caller-supplied option setter.
///
/// Setters never fail. Applying the same option twice keeps the last value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenOption {
    /// Use the proto `json_name` for fields instead of the original proto name.
    UseJsonNamesForFields(bool),
    /// Maximum recursion count allowed for a field type.
    RecursiveDepth(usize),
    /// Render enum values as integers instead of their names.
    EnumsAsInts(bool),
    /// Output file name prefix when targets are merged into one artifact.
    MergeFileName(String),
    /// Skip injection of the built-in error response schemas.
    DisableDefaultErrors(bool),
    /// Merge every target into a single artifact.
    AllowMerge(bool),
}

impl GenOption {
    /// Apply this setter to `builder`.
    pub fn apply(self, builder: &mut OptionsBuilder) {
        match self {
            GenOption::UseJsonNamesForFields(b) => builder.use_json_names_for_fields = b,
            GenOption::RecursiveDepth(depth) => builder.recursive_depth = depth,
            GenOption::EnumsAsInts(b) => builder.enums_as_ints = b,
            GenOption::MergeFileName(name) => builder.merge_file_name = name,
            GenOption::DisableDefaultErrors(b) => builder.disable_default_errors = b,
            GenOption::AllowMerge(b) => builder.allow_merge = b,
        }
    }
}

/// Mutable option set used while a configuration is being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsBuilder {
    use_json_names_for_fields: bool,
    recursive_depth: usize,
    enums_as_ints: bool,
    merge_file_name: String,
    disable_default_errors: bool,
    allow_merge: bool,
    generate_rpc_methods: bool,
    repeated_path_param_separator: PathParamSeparator,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            use_json_names_for_fields: true,
            recursive_depth: DEFAULT_RECURSIVE_DEPTH,
            enums_as_ints: false,
            merge_file_name: DEFAULT_MERGE_FILE_NAME.to_string(),
            disable_default_errors: true,
            allow_merge: false,
            generate_rpc_methods: false,
            repeated_path_param_separator: PathParamSeparator::default(),
        }
    }
}

impl OptionsBuilder {
    /// Create a builder holding the documented defaults.
    pub fn new() -> Self { Self::default() }

    /// Apply `options` in order.
    pub fn apply_all<I>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = GenOption>,
    {
        for option in options {
            option.apply(self);
        }
        self
    }

    /// Restrict generation to RPC-method-derived artifacts.
    pub fn set_generate_rpc_methods(&mut self, only_rpc: bool) -> &mut Self {
        self.generate_rpc_methods = only_rpc;
        self
    }

    /// Set the repeated path parameter separator from its token.
    ///
    /// Fails with [`ConfigError::InvalidSeparator`] if `token` is not one of
    /// `csv`, `pipes`, `ssv` or `tsv`; the builder is left untouched.
    pub fn set_repeated_path_param_separator(
        &mut self,
        token: &str,
    ) -> Result<&mut Self, ConfigError> {
        self.repeated_path_param_separator = token.parse()?;
        Ok(self)
    }

    /// Freeze into the read-only configuration.
    pub fn freeze(self) -> GeneratorOptions {
        GeneratorOptions {
            use_json_names_for_fields: self.use_json_names_for_fields,
            recursive_depth: self.recursive_depth,
            enums_as_ints: self.enums_as_ints,
            merge_file_name: self.merge_file_name,
            disable_default_errors: self.disable_default_errors,
            allow_merge: self.allow_merge,
            generate_rpc_methods: self.generate_rpc_methods,
            repeated_path_param_separator: self.repeated_path_param_separator,
        }
    }
}

/// Frozen generation configuration.
///
/// Exposes getters only; there is no way to mutate a value once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    use_json_names_for_fields: bool,
    recursive_depth: usize,
    enums_as_ints: bool,
    merge_file_name: String,
    disable_default_errors: bool,
    allow_merge: bool,
    generate_rpc_methods: bool,
    repeated_path_param_separator: PathParamSeparator,
}

impl Default for GeneratorOptions {
    fn default() -> Self { OptionsBuilder::default().freeze() }
}

impl GeneratorOptions {
    /// Whether field identifiers use the proto `json_name`.
    pub fn use_json_names_for_fields(&self) -> bool { self.use_json_names_for_fields }

    /// Maximum allowed nesting depth of message references.
    pub fn recursive_depth(&self) -> usize { self.recursive_depth }

    /// Whether enums are rendered as integers.
    pub fn enums_as_ints(&self) -> bool { self.enums_as_ints }

    /// File name prefix for merged output.
    pub fn merge_file_name(&self) -> &str { &self.merge_file_name }

    /// Whether the built-in error schemas are skipped.
    pub fn disable_default_errors(&self) -> bool { self.disable_default_errors }

    /// Whether all targets are merged into one artifact.
    pub fn allow_merge(&self) -> bool { self.allow_merge }

    /// Whether only RPC-derived artifacts are generated.
    pub fn generate_rpc_methods(&self) -> bool { self.generate_rpc_methods }

    /// Separator for repeated path parameter values.
    pub fn repeated_path_param_separator(&self) -> PathParamSeparator {
        self.repeated_path_param_separator
    }
}
