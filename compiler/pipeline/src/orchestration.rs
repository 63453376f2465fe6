//! Pipeline orchestration.
//!
//! The [`Generator`] owns the caller's options and the two plugin seams. Each
//! call to [`Generator::generate`] builds a fresh configuration and registry,
//! so one generator can serve many requests.

use config::{GenOption, GeneratorOptions, OptionsBuilder, PathParamSeparator};
use descriptor::Registry;
use genopenapi::{DefaultErrorDefs, OpenApiGenerator};
use plugins::{ErrorDefsProvider, TranslationEngine};
use prost_types::compiler::CodeGeneratorRequest;
use tracing::{debug, info};

use crate::response::{emit_files, ResponseEnvelope};
use crate::targets::resolve_targets;
use crate::PipelineError;

/// Runs requests through configuration, ingestion, resolution and translation.
pub struct Generator {
    options: Vec<GenOption>,
    separator: String,
    engine: Box<dyn TranslationEngine>,
    error_defs: Box<dyn ErrorDefsProvider>,
}

impl Generator {
    /// Create a generator that applies `options`, in order, to every run.
    ///
    /// Uses the Swagger 2.0 engine and the built-in error schemas.
    pub fn new(options: impl IntoIterator<Item = GenOption>) -> Self {
        Self {
            options: options.into_iter().collect(),
            separator: PathParamSeparator::default().as_str().to_string(),
            engine: Box::new(OpenApiGenerator::new()),
            error_defs: Box::new(DefaultErrorDefs),
        }
    }

    /// Replace the translation engine.
    pub fn with_engine(mut self, engine: impl TranslationEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Replace the error schema provider.
    pub fn with_error_defs(mut self, provider: impl ErrorDefsProvider + 'static) -> Self {
        self.error_defs = Box::new(provider);
        self
    }

    /// Set the repeated path parameter separator token (`csv`, `pipes`, `ssv`, `tsv`).
    ///
    /// The token is validated when a request is generated.
    pub fn with_path_param_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Name of the active engine.
    pub fn engine_name(&self) -> &'static str { self.engine.name() }

    /// Build the frozen configuration for one run.
    ///
    /// Caller options are applied first, invocation parameters after.
    pub fn configure(&self, only_rpc: bool) -> Result<GeneratorOptions, PipelineError> {
        let mut builder = OptionsBuilder::new();
        builder.apply_all(self.options.iter().cloned());
        builder.set_generate_rpc_methods(only_rpc);
        builder.set_repeated_path_param_separator(&self.separator)?;
        Ok(builder.freeze())
    }

    /// Generate the response for `request`.
    ///
    /// `only_rpc` restricts definitions to the types reachable from service
    /// methods. No envelope is produced if any stage fails.
    pub fn generate(
        &self,
        request: &CodeGeneratorRequest,
        only_rpc: bool,
    ) -> Result<ResponseEnvelope, PipelineError> {
        let options = self.configure(only_rpc)?;
        debug!(
            only_rpc,
            separator = %options.repeated_path_param_separator(),
            engine = self.engine.name(),
            "configuration frozen"
        );

        let mut builder = Registry::builder();
        if !options.disable_default_errors() {
            let defs = self.error_defs.error_defs(&options).map_err(PipelineError::Injection)?;
            builder.stage_builtin(defs).map_err(|e| PipelineError::Injection(e.into()))?;
            logging::trace("pipeline", "default error definitions staged");
        }

        let registry = builder.load(&options, request).map_err(PipelineError::Ingestion)?;
        debug!(files = registry.len(), "registry loaded");

        let targets = resolve_targets(&registry, &request.file_to_generate)
            .map_err(PipelineError::Resolution)?;
        debug!(targets = targets.len(), "targets resolved");

        let files = self
            .engine
            .generate(&options, &registry, &targets)
            .map_err(PipelineError::Translation)?;

        info!(files = files.len(), "generation complete");
        Ok(emit_files(files))
    }
}

impl Default for Generator {
    fn default() -> Self { Self::new(Vec::new()) }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .field("separator", &self.separator)
            .field("engine", &self.engine.name())
            .field("error_defs", &self.error_defs.name())
            .finish()
    }
}
