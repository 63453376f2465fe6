//! Built-in error response schemas.
//!
//! Every operation's `default` response references `google.rpc.Status`, which
//! in turn carries `google.protobuf.Any` details. Requests rarely include those
//! files, so they are staged into the registry ahead of ingestion.

use config::GeneratorOptions;
use plugins::{EngineError, ErrorDefsProvider, Plugin};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};

/// Name of the built-in `google.protobuf.Any` file.
pub const ANY_PROTO: &str = "google/protobuf/any.proto";

/// Name of the built-in `google.rpc.Status` file.
pub const STATUS_PROTO: &str = "google/rpc/status.proto";

/// Supplies `google/protobuf/any.proto` and `google/rpc/status.proto`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorDefs;

impl Plugin for DefaultErrorDefs {
    fn name(&self) -> &'static str { "default-error-defs" }

    fn description(&self) -> &'static str { "google.rpc.Status and google.protobuf.Any" }
}

impl ErrorDefsProvider for DefaultErrorDefs {
    fn error_defs(
        &self,
        _options: &GeneratorOptions,
    ) -> Result<Vec<FileDescriptorProto>, EngineError> {
        Ok(vec![any_file(), status_file()])
    }
}

fn field(name: &str, json_name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        json_name: Some(json_name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn proto3_file(
    name: &str,
    package: &str,
    dependency: Vec<String>,
    message: DescriptorProto,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        dependency,
        message_type: vec![message],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn any_file() -> FileDescriptorProto {
    let any = DescriptorProto {
        name: Some("Any".to_string()),
        field: vec![
            field("type_url", "typeUrl", 1, Label::Optional, Type::String),
            field("value", "value", 2, Label::Optional, Type::Bytes),
        ],
        ..Default::default()
    };
    proto3_file(ANY_PROTO, "google.protobuf", vec![], any)
}

fn status_file() -> FileDescriptorProto {
    let mut details = field("details", "details", 3, Label::Repeated, Type::Message);
    details.type_name = Some(".google.protobuf.Any".to_string());

    let status = DescriptorProto {
        name: Some("Status".to_string()),
        field: vec![
            field("code", "code", 1, Label::Optional, Type::Int32),
            field("message", "message", 2, Label::Optional, Type::String),
            details,
        ],
        ..Default::default()
    };
    proto3_file(STATUS_PROTO, "google.rpc", vec![ANY_PROTO.to_string()], status)
}

#[cfg(test)]
mod tests {
    use descriptor::{FieldKind, Registry};

    use super::*;

    #[test]
    fn test_error_defs_ingest_cleanly() {
        let files = DefaultErrorDefs
            .error_defs(&GeneratorOptions::default())
            .expect("built-in definitions are static");
        assert_eq!(files.len(), 2);

        let mut builder = Registry::builder();
        builder.stage_builtin(files).expect("built-in files have distinct names");
        let registry =
            builder.load_files(&GeneratorOptions::default(), &[]).expect("built-ins ingest");

        let status = registry.lookup_message(".google.rpc.Status").expect("Status is registered");
        assert_eq!(
            status.field("details").map(|f| &f.kind),
            Some(&FieldKind::Message(".google.protobuf.Any".to_string()))
        );
        assert!(registry.lookup_file(STATUS_PROTO).map(|f| f.builtin).unwrap_or(false));
    }
}
