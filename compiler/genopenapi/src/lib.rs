#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! OpenAPI v2 translation engine
//!
//! Renders resolved protobuf files as Swagger 2.0 JSON documents. Each service
//! method becomes a `POST /{package}.{Service}/{Method}` operation; every
//! message and enum reachable from the document's roots becomes a definition.

pub mod document;
pub mod error_defs;
pub mod naming;
pub mod schema;
pub mod swagger;

use config::GeneratorOptions;
use descriptor::{File, Registry};
use plugins::{EngineError, Plugin, ResponseFile, TranslationEngine};
use tracing::debug;

pub use document::{collect_definitions, render_document};
pub use error_defs::{DefaultErrorDefs, ANY_PROTO, STATUS_PROTO};
pub use naming::DefinitionNamer;
pub use schema::SchemaRenderer;
pub use swagger::SwaggerObject;

/// Suffix appended to every output file name.
pub const OUTPUT_SUFFIX: &str = ".swagger.json";

/// Swagger 2.0 engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiGenerator;

impl OpenApiGenerator {
    /// Create the engine.
    pub fn new() -> Self { Self }
}

impl Plugin for OpenApiGenerator {
    fn name(&self) -> &'static str { "openapiv2" }

    fn description(&self) -> &'static str { "Swagger 2.0 JSON documents" }
}

impl TranslationEngine for OpenApiGenerator {
    fn generate(
        &self,
        options: &GeneratorOptions,
        registry: &Registry,
        targets: &[&File],
    ) -> Result<Vec<ResponseFile>, EngineError> {
        let namer = DefinitionNamer::new(registry);
        let renderer = SchemaRenderer::new(options, registry, &namer);

        if options.allow_merge() {
            let name = options.merge_file_name();
            let doc = render_document(name, targets, options, registry, &renderer)?;
            debug!(files = targets.len(), output = name, "merged targets into one document");
            return Ok(vec![ResponseFile::new(
                format!("{}{}", name, OUTPUT_SUFFIX),
                serde_json::to_string_pretty(&doc)?,
            )]);
        }

        targets
            .iter()
            .map(|file| -> Result<ResponseFile, EngineError> {
                let doc = render_document(&file.name, &[*file], options, registry, &renderer)?;
                Ok(ResponseFile::new(
                    format!("{}{}", file.base_name(), OUTPUT_SUFFIX),
                    serde_json::to_string_pretty(&doc)?,
                ))
            })
            .collect()
    }
}
