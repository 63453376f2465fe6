//! OpenAPI v2 (Swagger) document model.
//!
//! Only the subset the generator emits is modelled. Keys that are maps in the
//! document (`paths`, `definitions`, `responses`) are sorted; message
//! properties keep field declaration order.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Version string placed in `info.version`.
pub const VERSION_NOT_SET: &str = "version not set";

/// Top-level document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwaggerObject {
    /// Always `2.0`.
    pub swagger: &'static str,
    /// Title and version.
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    /// One tag per service.
    pub tags: Vec<Tag>,
    /// Request media types.
    pub consumes: Vec<String>,
    /// Response media types.
    pub produces: Vec<String>,
    /// Operations keyed by URL path.
    pub paths: BTreeMap<String, PathItem>,
    /// Schemas keyed by definition name.
    pub definitions: BTreeMap<String, Schema>,
}

impl SwaggerObject {
    /// Empty document titled `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            swagger: "2.0",
            info: Info { title: title.into(), version: VERSION_NOT_SET.to_string() },
            tags: Vec::new(),
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
            paths: BTreeMap::new(),
            definitions: BTreeMap::new(),
        }
    }
}

/// The `info` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// Source file or merged document name.
    pub title: String,
    /// Always [`VERSION_NOT_SET`].
    pub version: String,
}

/// A service tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    /// Service name.
    pub name: String,
    /// Leading comment of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations under one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    /// Every RPC maps to `POST`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
}

/// One RPC method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// First paragraph of the method comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Rest of the method comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `<Service>_<Method>`.
    pub operation_id: String,
    /// `200` and `default` responses.
    pub responses: BTreeMap<String, Response>,
    /// The request body parameter.
    pub parameters: Vec<Parameter>,
    /// Owning service tag.
    pub tags: Vec<String>,
}

/// A response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Required by Swagger 2.0, may be empty.
    pub description: String,
    /// Body schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name, `body` for request messages.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Serialized as `in`.
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Body schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// A schema object. All fields are optional; the empty schema is `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// Serialized as `$ref`.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Serialized as `type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format modifier such as `int64`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Element schema of an array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Message fields in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Value schema of a map.
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Serialized as `enum`.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Short title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names of required properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    /// `{"type": ty}`
    pub fn typed(ty: &str) -> Self { Self { schema_type: Some(ty.to_string()), ..Self::default() } }

    /// `{"type": ty, "format": format}`
    pub fn formatted(ty: &str, format: &str) -> Self {
        Self { format: Some(format.to_string()), ..Self::typed(ty) }
    }

    /// `{"$ref": "#/definitions/<name>"}`
    pub fn reference(name: &str) -> Self {
        Self { reference: Some(format!("#/definitions/{}", name)), ..Self::default() }
    }

    /// `{"type": "array", "items": item}`
    pub fn array(item: Schema) -> Self {
        Self { items: Some(Box::new(item)), ..Self::typed("array") }
    }

    /// `{"type": "object", "additionalProperties": value}`
    pub fn map(value: Schema) -> Self {
        Self { additional_properties: Some(Box::new(value)), ..Self::typed("object") }
    }
}

/// Ordered `properties` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(
    /// `(name, schema)` pairs in output order.
    pub Vec<(String, Schema)>,
);

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_schema_is_empty_object() {
        assert_eq!(serde_json::to_value(Schema::default()).expect("serializes"), json!({}));
    }

    #[test]
    fn test_properties_keep_order() {
        let schema = Schema {
            properties: Some(Properties(vec![
                ("zeta".to_string(), Schema::typed("string")),
                ("alpha".to_string(), Schema::formatted("integer", "int32")),
            ])),
            ..Schema::typed("object")
        };
        let rendered = serde_json::to_string(&schema).expect("serializes");
        assert_eq!(
            rendered,
            r#"{"type":"object","properties":{"zeta":{"type":"string"},"alpha":{"type":"integer","format":"int32"}}}"#
        );
    }

    #[test]
    fn test_document_skeleton() {
        let doc = serde_json::to_value(SwaggerObject::new("a.proto")).expect("serializes");
        assert_eq!(
            doc,
            json!({
                "swagger": "2.0",
                "info": {"title": "a.proto", "version": "version not set"},
                "consumes": ["application/json"],
                "produces": ["application/json"],
                "paths": {},
                "definitions": {}
            })
        );
    }

    #[test]
    fn test_operation_keys_use_swagger_names() {
        let op = Operation {
            summary: None,
            description: None,
            operation_id: "Svc_Call".to_string(),
            responses: BTreeMap::new(),
            parameters: vec![Parameter {
                name: "body".to_string(),
                description: None,
                location: "body".to_string(),
                required: true,
                schema: Some(Schema::reference("v1Req")),
            }],
            tags: vec!["Svc".to_string()],
        };
        let value = serde_json::to_value(&op).expect("serializes");
        assert_eq!(value["operationId"], "Svc_Call");
        assert_eq!(value["parameters"][0]["in"], "body");
        assert_eq!(value["parameters"][0]["schema"]["$ref"], "#/definitions/v1Req");
        assert!(value.get("summary").is_none());
    }
}
