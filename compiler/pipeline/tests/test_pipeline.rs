use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use config::{ConfigError, GenOption, GeneratorOptions, PathParamSeparator};
use descriptor::{File, Registry, RegistryError};
use pipeline::{Feature, Generator, PipelineError};
use plugins::{EngineError, ErrorDefsProvider, Plugin, ResponseFile, TranslationEngine};
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    ServiceDescriptorProto,
};

/// Records what the pipeline hands to the engine and returns fixed artifacts.
#[derive(Clone, Default)]
struct MockEngine {
    outputs: Vec<ResponseFile>,
    seen_targets: Arc<Mutex<Vec<String>>>,
    seen_options: Arc<Mutex<Option<GeneratorOptions>>>,
    fail: bool,
}

impl Plugin for MockEngine {
    fn name(&self) -> &'static str { "mock" }
}

impl TranslationEngine for MockEngine {
    fn generate(
        &self,
        options: &GeneratorOptions,
        _registry: &Registry,
        targets: &[&File],
    ) -> Result<Vec<ResponseFile>, EngineError> {
        *self.seen_targets.lock().expect("lock") = targets.iter().map(|f| f.name.clone()).collect();
        *self.seen_options.lock().expect("lock") = Some(options.clone());
        if self.fail {
            return Err(EngineError::Message("engine exploded".to_string()));
        }
        Ok(self.outputs.clone())
    }
}

/// Counts how often the error schemas are requested.
#[derive(Clone, Default)]
struct InjectionSpy {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl Plugin for InjectionSpy {
    fn name(&self) -> &'static str { "spy" }
}

impl ErrorDefsProvider for InjectionSpy {
    fn error_defs(
        &self,
        _options: &GeneratorOptions,
    ) -> Result<Vec<FileDescriptorProto>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Message("no error schemas today".to_string()));
        }
        Ok(vec![])
    }
}

fn proto_file(name: &str, package: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        message_type: messages,
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn message(name: &str) -> DescriptorProto {
    DescriptorProto { name: Some(name.to_string()), ..Default::default() }
}

fn request(files: Vec<FileDescriptorProto>, targets: &[&str]) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: targets.iter().map(|t| t.to_string()).collect(),
        proto_file: files,
        ..Default::default()
    }
}

fn two_file_request(targets: &[&str]) -> CodeGeneratorRequest {
    request(
        vec![
            proto_file("a.proto", "a", vec![message("A")]),
            proto_file("b.proto", "b", vec![message("B")]),
        ],
        targets,
    )
}

fn dangling_request() -> CodeGeneratorRequest {
    let mut holder = message("Holder");
    holder.field.push(FieldDescriptorProto {
        name: Some("x".to_string()),
        number: Some(1),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(".nowhere.Missing".to_string()),
        ..Default::default()
    });
    request(vec![proto_file("a.proto", "a", vec![holder])], &["a.proto"])
}

#[test]
fn caller_options_apply_in_order_over_defaults() {
    let engine = MockEngine::default();
    let generator = Generator::new(vec![
        GenOption::EnumsAsInts(true),
        GenOption::RecursiveDepth(7),
        GenOption::EnumsAsInts(false),
        GenOption::MergeFileName("first".to_string()),
        GenOption::MergeFileName("second".to_string()),
    ])
    .with_engine(engine.clone())
    .with_path_param_separator("pipes");

    generator.generate(&two_file_request(&["a.proto"]), true).expect("run succeeds");

    let seen = engine.seen_options.lock().expect("lock").clone().expect("engine was called");
    assert!(!seen.enums_as_ints());
    assert_eq!(seen.recursive_depth(), 7);
    assert_eq!(seen.merge_file_name(), "second");
    assert!(seen.use_json_names_for_fields());
    assert!(seen.disable_default_errors());
    assert!(seen.generate_rpc_methods());
    assert_eq!(seen.repeated_path_param_separator(), PathParamSeparator::Pipes);
}

#[test]
fn invalid_separator_aborts_before_ingestion() {
    let engine = MockEngine::default();
    let spy = InjectionSpy::default();
    let generator = Generator::new(vec![GenOption::DisableDefaultErrors(false)])
        .with_engine(engine.clone())
        .with_error_defs(spy.clone())
        .with_path_param_separator("semicolons");

    // The graph is malformed too; the configuration error must win.
    match generator.generate(&dangling_request(), false) {
        Err(PipelineError::Config(ConfigError::InvalidSeparator(sep))) => {
            assert_eq!(sep, "semicolons")
        }
        other => panic!("Expected Config error, got {:?}", other),
    }
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    assert!(engine.seen_options.lock().expect("lock").is_none());
}

#[test]
fn dangling_reference_is_an_ingestion_error() {
    let engine = MockEngine::default();
    let generator = Generator::default().with_engine(engine.clone());

    match generator.generate(&dangling_request(), false) {
        Err(PipelineError::Ingestion(RegistryError::UnresolvedType { type_name, .. })) => {
            assert_eq!(type_name, ".nowhere.Missing")
        }
        other => panic!("Expected Ingestion error, got {:?}", other),
    }
    assert!(engine.seen_options.lock().expect("lock").is_none());
}

#[test]
fn first_missing_target_is_reported() {
    let engine = MockEngine::default();
    let generator = Generator::default().with_engine(engine.clone());
    let req = request(
        vec![
            proto_file("a.proto", "a", vec![]),
            proto_file("c.proto", "c", vec![]),
        ],
        &["a.proto", "b.proto", "c.proto"],
    );

    match generator.generate(&req, false) {
        Err(PipelineError::Resolution(RegistryError::FileNotFound(name))) => {
            assert_eq!(name, "b.proto")
        }
        other => panic!("Expected Resolution error, got {:?}", other),
    }
    assert!(engine.seen_targets.lock().expect("lock").is_empty());
}

#[test]
fn targets_reach_the_engine_in_request_order() {
    let engine = MockEngine::default();
    let generator = Generator::default().with_engine(engine.clone());

    generator.generate(&two_file_request(&["b.proto", "a.proto"]), false).expect("run succeeds");
    assert_eq!(*engine.seen_targets.lock().expect("lock"), vec!["b.proto", "a.proto"]);

    generator.generate(&two_file_request(&["a.proto", "b.proto"]), false).expect("run succeeds");
    assert_eq!(*engine.seen_targets.lock().expect("lock"), vec!["a.proto", "b.proto"]);
}

#[test]
fn engine_artifacts_are_emitted_in_order_with_features() {
    let engine = MockEngine {
        outputs: vec![ResponseFile::new("x.json", "{}"), ResponseFile::new("y.json", "{}")],
        ..Default::default()
    };
    let generator = Generator::default().with_engine(engine);

    let envelope =
        generator.generate(&two_file_request(&["a.proto"]), false).expect("run succeeds");
    let names: Vec<_> = envelope.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["x.json", "y.json"]);
    assert!(!envelope.features.is_empty());
    assert!(envelope.features.contains(Feature::Proto3Optional));

    let wire = envelope.into_code_generator_response();
    assert_eq!(wire.file.len(), 2);
    assert_ne!(wire.supported_features(), 0);
}

#[test]
fn error_schemas_are_injected_only_when_enabled() {
    for (disabled, expected) in [(true, 0), (false, 1)] {
        let spy = InjectionSpy::default();
        let generator = Generator::new(vec![GenOption::DisableDefaultErrors(disabled)])
            .with_engine(MockEngine::default())
            .with_error_defs(spy.clone());

        generator.generate(&two_file_request(&["a.proto"]), false).expect("run succeeds");
        assert_eq!(spy.calls.load(Ordering::SeqCst), expected, "disabled = {}", disabled);
    }
}

#[test]
fn injection_failure_aborts_the_run() {
    let engine = MockEngine::default();
    let spy = InjectionSpy { fail: true, ..Default::default() };
    let generator = Generator::new(vec![GenOption::DisableDefaultErrors(false)])
        .with_engine(engine.clone())
        .with_error_defs(spy);

    match generator.generate(&two_file_request(&["a.proto"]), false) {
        Err(PipelineError::Injection(EngineError::Message(msg))) => {
            assert_eq!(msg, "no error schemas today")
        }
        other => panic!("Expected Injection error, got {:?}", other),
    }
    assert!(engine.seen_options.lock().expect("lock").is_none());
}

#[test]
fn engine_failure_propagates_unchanged() {
    let engine = MockEngine { fail: true, ..Default::default() };
    let generator = Generator::default().with_engine(engine);

    match generator.generate(&two_file_request(&["a.proto"]), false) {
        Err(PipelineError::Translation(EngineError::Message(msg))) => {
            assert_eq!(msg, "engine exploded")
        }
        other => panic!("Expected Translation error, got {:?}", other),
    }
}

#[test]
fn default_engine_renders_services_with_error_schemas() {
    let mut file = proto_file("svc/v1/echo.proto", "svc.v1", vec![message("Ping")]);
    file.service.push(ServiceDescriptorProto {
        name: Some("Echo".to_string()),
        method: vec![MethodDescriptorProto {
            name: Some("Call".to_string()),
            input_type: Some(".svc.v1.Ping".to_string()),
            output_type: Some(".svc.v1.Ping".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    });
    let generator = Generator::new(vec![GenOption::DisableDefaultErrors(false)]);
    assert_eq!(generator.engine_name(), "openapiv2");

    let envelope = generator
        .generate(&request(vec![file], &["svc/v1/echo.proto"]), false)
        .expect("run succeeds");
    assert_eq!(envelope.files.len(), 1);
    assert_eq!(envelope.files[0].name, "svc/v1/echo.swagger.json");

    let doc: serde_json::Value =
        serde_json::from_str(&envelope.files[0].content).expect("output is JSON");
    assert!(doc["paths"]["/svc.v1.Echo/Call"]["post"]["responses"]["default"].is_object());
    assert!(doc["definitions"]["rpcStatus"].is_object());
    assert!(doc["definitions"]["protobufAny"].is_object());
}
