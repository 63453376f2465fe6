//! In-memory schema entities.
//!
//! These are the registry's own view of a protobuf file: nested messages and
//! enums are flattened and keyed by their fully-qualified name (`.pkg.Outer.Inner`),
//! and every type reference has already been resolved.

use prost_types::field_descriptor_proto::Type;

/// A schema file owned by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// File name as given by the front end (e.g. `foo/v1/bar.proto`)
    pub name: String,
    /// Proto package, possibly empty
    pub package: String,
    /// Names of imported files
    pub dependencies: Vec<String>,
    /// Messages in declaration order, outer messages before their nested ones
    pub messages: Vec<Message>,
    /// Enums in declaration order, including nested enums
    pub enums: Vec<Enum>,
    /// Services in declaration order
    pub services: Vec<Service>,
    /// `proto2`, `proto3` or `editions`
    pub syntax: String,
    /// Whether the file came from the built-in definitions rather than the request
    pub builtin: bool,
}

impl File {
    /// Whether the file declares any service.
    pub fn has_services(&self) -> bool { !self.services.is_empty() }

    /// File name without its extension (`foo/v1/bar.proto` → `foo/v1/bar`).
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if !self.name[idx..].contains('/') => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// A message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Fully-qualified name with leading dot
    pub fqn: String,
    /// Simple name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Synthetic map entry message
    pub map_entry: bool,
    /// Leading comment, if any
    pub comment: Option<String>,
}

impl Message {
    /// Look up a field by proto name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Singular
    Optional,
    /// proto2 `required`
    Required,
    /// `repeated` (and map fields)
    Repeated,
}

/// A message field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Proto field name
    pub name: String,
    /// JSON name (from protoc, or lowerCamelCase of `name`)
    pub json_name: String,
    /// Field number
    pub number: i32,
    /// Cardinality
    pub label: Label,
    /// Resolved type
    pub kind: FieldKind,
    /// Leading comment, if any
    pub comment: Option<String>,
}

impl Field {
    /// Whether the field is repeated.
    pub fn is_repeated(&self) -> bool { self.label == Label::Repeated }

    /// The name emitted for this field under the given naming convention.
    pub fn display_name(&self, use_json_name: bool) -> &str {
        if use_json_name {
            &self.json_name
        } else {
            &self.name
        }
    }
}

/// Resolved field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalar value type
    Scalar(ScalarType),
    /// Message (or group), by fully-qualified name
    Message(String),
    /// Enum, by fully-qualified name
    Enum(String),
}

/// Protobuf scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    #[allow(missing_docs)]
    Double,
    #[allow(missing_docs)]
    Float,
    #[allow(missing_docs)]
    Int64,
    #[allow(missing_docs)]
    Uint64,
    #[allow(missing_docs)]
    Int32,
    #[allow(missing_docs)]
    Fixed64,
    #[allow(missing_docs)]
    Fixed32,
    #[allow(missing_docs)]
    Bool,
    #[allow(missing_docs)]
    String,
    #[allow(missing_docs)]
    Bytes,
    #[allow(missing_docs)]
    Uint32,
    #[allow(missing_docs)]
    Sfixed32,
    #[allow(missing_docs)]
    Sfixed64,
    #[allow(missing_docs)]
    Sint32,
    #[allow(missing_docs)]
    Sint64,
}

impl ScalarType {
    /// Map a descriptor type to a scalar; `None` for message, group and enum.
    pub fn from_proto(ty: Type) -> Option<Self> {
        Some(match ty {
            Type::Double => Self::Double,
            Type::Float => Self::Float,
            Type::Int64 => Self::Int64,
            Type::Uint64 => Self::Uint64,
            Type::Int32 => Self::Int32,
            Type::Fixed64 => Self::Fixed64,
            Type::Fixed32 => Self::Fixed32,
            Type::Bool => Self::Bool,
            Type::String => Self::String,
            Type::Bytes => Self::Bytes,
            Type::Uint32 => Self::Uint32,
            Type::Sfixed32 => Self::Sfixed32,
            Type::Sfixed64 => Self::Sfixed64,
            Type::Sint32 => Self::Sint32,
            Type::Sint64 => Self::Sint64,
            Type::Group | Type::Message | Type::Enum => return None,
        })
    }
}

/// An enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    /// Fully-qualified name with leading dot
    pub fqn: String,
    /// Simple name
    pub name: String,
    /// Values in declaration order
    pub values: Vec<EnumValue>,
    /// Leading comment, if any
    pub comment: Option<String>,
}

/// One enum value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Value name
    pub name: String,
    /// Value number
    pub number: i32,
    /// Leading comment, if any
    pub comment: Option<String>,
}

/// A service.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Simple name
    pub name: String,
    /// Fully-qualified name with leading dot
    pub fqn: String,
    /// Methods in declaration order
    pub methods: Vec<Method>,
    /// Leading comment, if any
    pub comment: Option<String>,
}

/// An RPC method.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Request message, fully-qualified
    pub input_type: String,
    /// Response message, fully-qualified
    pub output_type: String,
    /// Client streams requests
    pub client_streaming: bool,
    /// Server streams responses
    pub server_streaming: bool,
    /// Leading comment, if any
    pub comment: Option<String>,
}

/// Convert `snake_case` into protoc's default `lowerCamelCase` JSON name.
pub fn default_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
