//! Schema rendering for messages, enums and fields.

use config::GeneratorOptions;
use descriptor::{Enum, Field, FieldKind, Label, Message, Registry, ScalarType};
use plugins::EngineError;
use serde_json::{json, Value};

use crate::naming::DefinitionNamer;
use crate::swagger::{Properties, Schema};

/// Fully-qualified name of `google.protobuf.Any`.
pub const ANY_FQN: &str = ".google.protobuf.Any";

/// Fully-qualified name of `google.rpc.Status`.
pub const STATUS_FQN: &str = ".google.rpc.Status";

/// Inline schema for well-known types that are not rendered as definitions.
pub fn well_known_schema(fqn: &str) -> Option<Schema> {
    let schema = match fqn {
        ".google.protobuf.Timestamp" => Schema::formatted("string", "date-time"),
        ".google.protobuf.Duration" | ".google.protobuf.FieldMask" => Schema::typed("string"),
        ".google.protobuf.StringValue" => Schema::typed("string"),
        ".google.protobuf.BytesValue" => Schema::formatted("string", "byte"),
        ".google.protobuf.Int32Value" => Schema::formatted("integer", "int32"),
        ".google.protobuf.UInt32Value" => Schema::formatted("integer", "int64"),
        ".google.protobuf.Int64Value" => Schema::formatted("string", "int64"),
        ".google.protobuf.UInt64Value" => Schema::formatted("string", "uint64"),
        ".google.protobuf.FloatValue" => Schema::formatted("number", "float"),
        ".google.protobuf.DoubleValue" => Schema::formatted("number", "double"),
        ".google.protobuf.BoolValue" => Schema::typed("boolean"),
        ".google.protobuf.Empty" | ".google.protobuf.Struct" => Schema::typed("object"),
        ".google.protobuf.Value" => Schema::default(),
        ".google.protobuf.ListValue" => Schema::array(Schema::typed("object")),
        ".google.protobuf.NullValue" => Schema::typed("string"),
        _ => return None,
    };
    Some(schema)
}

/// Schema of a scalar value.
pub fn scalar_schema(scalar: ScalarType) -> Schema {
    match scalar {
        ScalarType::Double => Schema::formatted("number", "double"),
        ScalarType::Float => Schema::formatted("number", "float"),
        ScalarType::Int64 | ScalarType::Sfixed64 | ScalarType::Sint64 => {
            Schema::formatted("string", "int64")
        }
        ScalarType::Uint64 | ScalarType::Fixed64 => Schema::formatted("string", "uint64"),
        ScalarType::Int32 | ScalarType::Sfixed32 | ScalarType::Sint32 => {
            Schema::formatted("integer", "int32")
        }
        ScalarType::Uint32 | ScalarType::Fixed32 => Schema::formatted("integer", "int64"),
        ScalarType::Bool => Schema::typed("boolean"),
        ScalarType::String => Schema::typed("string"),
        ScalarType::Bytes => Schema::formatted("string", "byte"),
    }
}

/// Split a comment into `(title, description)`.
///
/// A single-line first paragraph that does not end with a period is a title.
pub fn split_comment(comment: &str) -> (Option<String>, Option<String>) {
    let comment = comment.trim();
    if comment.is_empty() {
        return (None, None);
    }
    let (first, rest) = match comment.split_once("\n\n") {
        Some((first, rest)) => (first.trim(), Some(rest.trim())),
        None => (comment, None),
    };
    if first.contains('\n') || first.ends_with('.') {
        return (None, Some(comment.to_string()));
    }
    (Some(first.to_string()), rest.filter(|r| !r.is_empty()).map(str::to_string))
}

/// Renders schemas against one registry and option set.
pub struct SchemaRenderer<'a> {
    options: &'a GeneratorOptions,
    registry: &'a Registry,
    namer: &'a DefinitionNamer,
}

impl<'a> SchemaRenderer<'a> {
    /// Create a renderer.
    pub fn new(
        options: &'a GeneratorOptions,
        registry: &'a Registry,
        namer: &'a DefinitionNamer,
    ) -> Self {
        Self { options, registry, namer }
    }

    /// Definition name of `fqn`.
    pub fn definition_name(&self, fqn: &str) -> String { self.namer.name(fqn) }

    /// Inline schema for well-known types, `$ref` otherwise.
    pub fn message_ref(&self, fqn: &str) -> Schema {
        well_known_schema(fqn).unwrap_or_else(|| Schema::reference(&self.namer.name(fqn)))
    }

    /// Schema of a message field, including its comment.
    pub fn field_schema(&self, field: &Field) -> Result<Schema, EngineError> {
        let mut schema = self.field_type_schema(field)?;
        if let Some(comment) = &field.comment {
            let (title, description) = split_comment(comment);
            schema.title = title;
            schema.description = description;
        }
        Ok(schema)
    }

    fn field_type_schema(&self, field: &Field) -> Result<Schema, EngineError> {
        let single = match &field.kind {
            FieldKind::Scalar(scalar) => scalar_schema(*scalar),
            FieldKind::Enum(fqn) => Schema::reference(&self.namer.name(fqn)),
            FieldKind::Message(fqn) => {
                let message = self
                    .registry
                    .lookup_message(fqn)
                    .ok_or_else(|| EngineError::MissingType(fqn.clone()))?;
                if message.map_entry && field.is_repeated() {
                    let value = message.field("value").ok_or_else(|| {
                        EngineError::Message(format!("map entry {} has no value field", fqn))
                    })?;
                    return Ok(Schema::map(self.field_type_schema(value)?));
                }
                self.message_ref(fqn)
            }
        };
        if field.is_repeated() {
            Ok(Schema::array(single))
        } else {
            Ok(single)
        }
    }

    /// Definition of a message.
    pub fn message_definition(&self, message: &Message) -> Result<Schema, EngineError> {
        let mut schema = if message.fqn == ANY_FQN {
            any_definition()
        } else {
            let mut properties = Vec::with_capacity(message.fields.len());
            let mut required = Vec::new();
            for field in &message.fields {
                let name = field.display_name(self.options.use_json_names_for_fields());
                if field.label == Label::Required {
                    required.push(name.to_string());
                }
                properties.push((name.to_string(), self.field_schema(field)?));
            }
            Schema {
                properties: Some(Properties(properties)),
                required: (!required.is_empty()).then_some(required),
                ..Schema::typed("object")
            }
        };
        if let Some(comment) = &message.comment {
            let (title, description) = split_comment(comment);
            schema.title = title;
            schema.description = description;
        }
        Ok(schema)
    }

    /// Definition of an enum.
    pub fn enum_definition(&self, enumeration: &Enum) -> Schema {
        let mut schema = if self.options.enums_as_ints() {
            Schema {
                enum_values: Some(enumeration.values.iter().map(|v| json!(v.number)).collect()),
                default: enumeration.values.first().map(|v| json!(v.number)),
                ..Schema::formatted("integer", "int32")
            }
        } else {
            Schema {
                enum_values: Some(
                    enumeration.values.iter().map(|v| Value::String(v.name.clone())).collect(),
                ),
                default: enumeration.values.first().map(|v| Value::String(v.name.clone())),
                ..Schema::typed("string")
            }
        };

        let value_docs: Vec<String> = enumeration
            .values
            .iter()
            .filter_map(|v| v.comment.as_ref().map(|c| format!(" - {}: {}", v.name, c)))
            .collect();
        let description = match (&enumeration.comment, value_docs.is_empty()) {
            (Some(comment), true) => Some(comment.clone()),
            (Some(comment), false) => Some(format!("{}\n\n{}", comment, value_docs.join("\n"))),
            (None, false) => Some(value_docs.join("\n")),
            (None, true) => None,
        };
        schema.description = description;
        schema
    }
}

fn any_definition() -> Schema {
    Schema {
        properties: Some(Properties(vec![("@type".to_string(), Schema::typed("string"))])),
        additional_properties: Some(Box::new(Schema::default())),
        ..Schema::typed("object")
    }
}
