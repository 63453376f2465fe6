#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Plumbing for the `protoc-gen-openapiv2` executable.
//!
//! protoc writes a serialized `CodeGeneratorRequest` to the plugin's stdin and
//! reads a `CodeGeneratorResponse` from its stdout. Generation failures travel
//! back inside the response; only framing failures are process errors.

use std::io::{Read, Write};
use std::path::Path;

use config::{parse_parameter, Config, ConfigError};
use logging::LoggingError;
use pipeline::{FeatureSet, Generator, PipelineError};
use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;
use tracing::{debug, error};

/// Errors that end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// stdin did not hold a `CodeGeneratorRequest`.
    #[error("failed to decode CodeGeneratorRequest: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging could not be initialised.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Load `path`, or the default config file if it exists, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::from_file(path)?);
    }
    match Config::default_path() {
        Ok(path) if path.is_file() => {
            debug!(path = %path.display(), "using default config file");
            Ok(Config::from_file(path)?)
        }
        _ => Ok(Config::default()),
    }
}

/// Build the generator for one request.
///
/// Config file options come first and the parameter string after, so the
/// parameter string wins. Returns the generator and the only-RPC flag.
pub fn generator_for(
    config: &Config,
    parameter: &str,
) -> std::result::Result<(Generator, bool), ConfigError> {
    let params = parse_parameter(parameter)?;
    let section = &config.generator;

    let mut options = section.to_options();
    options.extend(params.options);
    let only_rpc = params.generate_rpc_methods.or(section.generate_rpc_methods).unwrap_or(false);

    let mut generator = Generator::new(options);
    let separator = params
        .repeated_path_param_separator
        .or_else(|| section.repeated_path_param_separator.clone());
    if let Some(separator) = separator {
        generator = generator.with_path_param_separator(separator);
    }
    Ok((generator, only_rpc))
}

/// Response reporting `err` to protoc.
pub fn error_response(err: &PipelineError) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        error: Some(err.to_string()),
        supported_features: Some(FeatureSet::supported().bits()),
        ..Default::default()
    }
}

/// Run the pipeline for `request`, folding any failure into the response.
pub fn respond(config: &Config, request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let outcome = generator_for(config, request.parameter())
        .map_err(PipelineError::from)
        .and_then(|(generator, only_rpc)| generator.generate(request, only_rpc));
    match outcome {
        Ok(envelope) => envelope.into_code_generator_response(),
        Err(err) => {
            error!(%err, "generation failed");
            error_response(&err)
        }
    }
}

/// Read a request from `input` and write the response to `output`.
pub fn run<R: Read, W: Write>(config: &Config, mut input: R, mut output: W) -> Result<()> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    let request = CodeGeneratorRequest::decode(buf.as_slice())?;
    debug!(
        files = request.proto_file.len(),
        targets = request.file_to_generate.len(),
        "request decoded"
    );

    let response = respond(config, &request);
    output.write_all(&response.encode_to_vec())?;
    output.flush()?;
    Ok(())
}
