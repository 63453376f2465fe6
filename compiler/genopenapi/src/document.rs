//! Document assembly.
//!
//! A document covers one or more target files: their services become paths
//! and tags, and every message or enum reachable from the roots becomes a
//! definition.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use config::GeneratorOptions;
use descriptor::{File, FieldKind, Method, Registry, Service, TypeKind};
use plugins::EngineError;
use tracing::debug;

use crate::schema::{split_comment, well_known_schema, SchemaRenderer, STATUS_FQN};
use crate::swagger::{
    Operation, Parameter, PathItem, Properties, Response, Schema, SwaggerObject, Tag,
};

/// Render one document titled `title` from `files`.
pub fn render_document(
    title: &str,
    files: &[&File],
    options: &GeneratorOptions,
    registry: &Registry,
    renderer: &SchemaRenderer<'_>,
) -> Result<SwaggerObject, EngineError> {
    let mut doc = SwaggerObject::new(title);
    let with_errors = !options.disable_default_errors();

    for file in files {
        for service in &file.services {
            doc.tags.push(Tag {
                name: service.name.clone(),
                description: service.comment.clone(),
            });
            for method in &service.methods {
                let path = format!("/{}/{}", service.fqn.trim_start_matches('.'), method.name);
                let operation = render_operation(service, method, with_errors, renderer);
                doc.paths.insert(path, PathItem { post: Some(operation) });
            }
        }
    }

    let has_services = files.iter().any(|f| f.has_services());
    let extra_roots: &[&str] = if with_errors && has_services { &[STATUS_FQN] } else { &[] };
    let reachable =
        collect_definitions(registry, files, options.generate_rpc_methods(), extra_roots)?;

    for fqn in &reachable {
        let name = renderer.definition_name(fqn);
        let schema = match registry.type_kind(fqn) {
            Some(TypeKind::Message) => {
                let message = registry
                    .lookup_message(fqn)
                    .ok_or_else(|| EngineError::MissingType(fqn.clone()))?;
                renderer.message_definition(message)?
            }
            Some(TypeKind::Enum) => {
                let enumeration = registry
                    .lookup_enum(fqn)
                    .ok_or_else(|| EngineError::MissingType(fqn.clone()))?;
                renderer.enum_definition(enumeration)
            }
            None => return Err(EngineError::MissingType(fqn.clone())),
        };
        doc.definitions.insert(name, schema);
    }

    debug!(
        title,
        paths = doc.paths.len(),
        definitions = doc.definitions.len(),
        "rendered document"
    );
    Ok(doc)
}

fn render_operation(
    service: &Service,
    method: &Method,
    with_errors: bool,
    renderer: &SchemaRenderer<'_>,
) -> Operation {
    let (summary, description) = match &method.comment {
        Some(comment) => split_comment(comment),
        None => (None, None),
    };

    let output = renderer.message_ref(&method.output_type);
    let success = if method.server_streaming {
        let mut properties = vec![("result".to_string(), output)];
        if with_errors {
            properties.push(("error".to_string(), renderer.message_ref(STATUS_FQN)));
        }
        Response {
            description: "A successful response.(streaming responses)".to_string(),
            schema: Some(Schema {
                properties: Some(Properties(properties)),
                title: Some(format!(
                    "Stream result of {}",
                    renderer.definition_name(&method.output_type)
                )),
                ..Schema::typed("object")
            }),
        }
    } else {
        Response { description: "A successful response.".to_string(), schema: Some(output) }
    };

    let mut responses = BTreeMap::new();
    responses.insert("200".to_string(), success);
    if with_errors {
        responses.insert(
            "default".to_string(),
            Response {
                description: "An unexpected error response.".to_string(),
                schema: Some(renderer.message_ref(STATUS_FQN)),
            },
        );
    }

    Operation {
        summary,
        description,
        operation_id: format!("{}_{}", service.name, method.name),
        responses,
        parameters: vec![Parameter {
            name: "body".to_string(),
            description: method.client_streaming.then(|| " (streaming inputs)".to_string()),
            location: "body".to_string(),
            required: true,
            schema: Some(renderer.message_ref(&method.input_type)),
        }],
        tags: vec![service.name.clone()],
    }
}

/// Fully-qualified names of every definition the document needs.
///
/// Roots are the method request/response types, plus every message and enum
/// declared in `files` unless `only_rpc` is set, plus `extra_roots`. Map
/// entries are followed but not emitted; inline well-known types are neither.
pub fn collect_definitions(
    registry: &Registry,
    files: &[&File],
    only_rpc: bool,
    extra_roots: &[&str],
) -> Result<BTreeSet<String>, EngineError> {
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut push = |fqn: &str, queue: &mut VecDeque<String>| {
        if well_known_schema(fqn).is_none() && seen.insert(fqn.to_string()) {
            queue.push_back(fqn.to_string());
        }
    };

    for file in files {
        for method in file.services.iter().flat_map(|s| s.methods.iter()) {
            push(&method.input_type, &mut queue);
            push(&method.output_type, &mut queue);
        }
        if !only_rpc {
            for message in file.messages.iter().filter(|m| !m.map_entry) {
                push(&message.fqn, &mut queue);
            }
            for enumeration in &file.enums {
                push(&enumeration.fqn, &mut queue);
            }
        }
    }
    for root in extra_roots {
        push(root, &mut queue);
    }

    let mut emitted = BTreeSet::new();
    while let Some(fqn) = queue.pop_front() {
        match registry.type_kind(&fqn) {
            Some(TypeKind::Message) => {
                let message = registry
                    .lookup_message(&fqn)
                    .ok_or_else(|| EngineError::MissingType(fqn.clone()))?;
                for field in &message.fields {
                    match &field.kind {
                        FieldKind::Message(target) | FieldKind::Enum(target) => {
                            push(target, &mut queue)
                        }
                        FieldKind::Scalar(_) => {}
                    }
                }
                if !message.map_entry {
                    emitted.insert(fqn);
                }
            }
            Some(TypeKind::Enum) => {
                emitted.insert(fqn);
            }
            None => return Err(EngineError::MissingType(fqn)),
        }
    }

    Ok(emitted)
}
