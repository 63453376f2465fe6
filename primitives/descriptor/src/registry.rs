//! Schema registry.
//!
//! The registry is an arena of [`File`]s addressed by file name, plus an index
//! of every fully-qualified message and enum name. It is built in one shot by
//! [`RegistryBuilder::load`] and never mutated afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};

use config::GeneratorOptions;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::Label as ProtoLabel;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};
use tracing::{debug, warn};

use crate::source_info::{self, child, Comments};
use crate::types::{
    default_json_name, Enum, EnumValue, Field, FieldKind, File, Label, Message, Method,
    ScalarType, Service,
};
use crate::RegistryError;

/// Kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A message
    Message,
    /// An enum
    Enum,
}

#[derive(Debug, Clone, Copy)]
struct TypeLocation {
    file: usize,
    index: usize,
    kind: TypeKind,
}

/// Immutable, cross-reference-resolved view of a schema graph.
#[derive(Debug)]
pub struct Registry {
    files: Vec<File>,
    by_name: BTreeMap<String, usize>,
    types: BTreeMap<String, TypeLocation>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder { RegistryBuilder::default() }

    fn index(files: Vec<File>) -> Self {
        let mut by_name = BTreeMap::new();
        let mut types = BTreeMap::new();
        for (file_idx, file) in files.iter().enumerate() {
            by_name.insert(file.name.clone(), file_idx);
            for (index, message) in file.messages.iter().enumerate() {
                types.insert(
                    message.fqn.clone(),
                    TypeLocation { file: file_idx, index, kind: TypeKind::Message },
                );
            }
            for (index, enumeration) in file.enums.iter().enumerate() {
                types.insert(
                    enumeration.fqn.clone(),
                    TypeLocation { file: file_idx, index, kind: TypeKind::Enum },
                );
            }
        }
        Self { files, by_name, types }
    }

    /// Look up a file by name.
    pub fn lookup_file(&self, name: &str) -> Result<&File, RegistryError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.files[idx])
            .ok_or_else(|| RegistryError::FileNotFound(name.to_string()))
    }

    /// All files, built-in ones included.
    pub fn files(&self) -> &[File] { &self.files }

    /// Number of files.
    pub fn len(&self) -> usize { self.files.len() }

    /// Whether the registry holds no files.
    pub fn is_empty(&self) -> bool { self.files.is_empty() }

    /// Kind of the type named `fqn`.
    pub fn type_kind(&self, fqn: &str) -> Option<TypeKind> {
        self.types.get(fqn).map(|loc| loc.kind)
    }

    /// Message named `fqn`.
    pub fn lookup_message(&self, fqn: &str) -> Option<&Message> {
        match self.types.get(fqn) {
            Some(loc) if loc.kind == TypeKind::Message => {
                self.files[loc.file].messages.get(loc.index)
            }
            _ => None,
        }
    }

    /// Enum named `fqn`.
    pub fn lookup_enum(&self, fqn: &str) -> Option<&Enum> {
        match self.types.get(fqn) {
            Some(loc) if loc.kind == TypeKind::Enum => self.files[loc.file].enums.get(loc.index),
            _ => None,
        }
    }

    /// File declaring the type named `fqn`.
    pub fn file_of_type(&self, fqn: &str) -> Option<&File> {
        self.types.get(fqn).map(|loc| &self.files[loc.file])
    }
}

/// Collects built-in files, then ingests a request into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    builtin: Vec<FileDescriptorProto>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self { Self::default() }

    /// Stage built-in files to be ingested alongside the request.
    ///
    /// A request file with the same name supersedes a staged one.
    pub fn stage_builtin<I>(&mut self, files: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = FileDescriptorProto>,
    {
        for file in files {
            if file.name().is_empty() {
                return Err(RegistryError::MissingFileName);
            }
            if self.builtin.iter().any(|f| f.name() == file.name()) {
                return Err(RegistryError::DuplicateFile(file.name().to_string()));
            }
            self.builtin.push(file);
        }
        Ok(())
    }

    /// Number of staged built-in files.
    pub fn staged_len(&self) -> usize { self.builtin.len() }

    /// Ingest the request's complete schema graph.
    pub fn load(
        self,
        options: &GeneratorOptions,
        request: &CodeGeneratorRequest,
    ) -> Result<Registry, RegistryError> {
        self.load_files(options, &request.proto_file)
    }

    /// Ingest `files` together with the staged built-ins.
    pub fn load_files(
        self,
        options: &GeneratorOptions,
        files: &[FileDescriptorProto],
    ) -> Result<Registry, RegistryError> {
        let mut seen = HashSet::new();
        for file in files {
            if file.name().is_empty() {
                return Err(RegistryError::MissingFileName);
            }
            if !seen.insert(file.name()) {
                return Err(RegistryError::DuplicateFile(file.name().to_string()));
            }
        }

        let mut protos: Vec<(&FileDescriptorProto, bool)> = Vec::with_capacity(files.len());
        for builtin in &self.builtin {
            if seen.contains(builtin.name()) {
                warn!(file = builtin.name(), "request file supersedes built-in definition");
                continue;
            }
            protos.push((builtin, true));
        }
        protos.extend(files.iter().map(|f| (f, false)));

        let mut kinds = HashMap::new();
        for (proto, _) in &protos {
            collect_type_names(proto, &mut kinds)?;
        }

        let mut converted = Vec::with_capacity(protos.len());
        for (proto, builtin) in &protos {
            converted.push(FileConverter::new(proto, &kinds).convert(*builtin)?);
        }

        let registry = Registry::index(converted);

        for file in &registry.files {
            if let Some(dep) = file.dependencies.iter().find(|d| !registry.by_name.contains_key(*d))
            {
                return Err(RegistryError::MissingDependency {
                    file: file.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        check_recursion(&registry, options.recursive_depth())?;

        debug!(
            files = registry.files.len(),
            types = registry.types.len(),
            builtin = self.builtin.len(),
            "schema graph ingested"
        );
        Ok(registry)
    }
}

fn package_scope(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{}", package)
    }
}

fn collect_type_names(
    file: &FileDescriptorProto,
    kinds: &mut HashMap<String, TypeKind>,
) -> Result<(), RegistryError> {
    let scope = package_scope(file.package());
    for message in &file.message_type {
        collect_message_names(file.name(), &scope, message, kinds)?;
    }
    for enumeration in &file.enum_type {
        let fqn = format!("{}.{}", scope, enumeration.name());
        insert_type(file.name(), fqn, TypeKind::Enum, kinds)?;
    }
    Ok(())
}

fn collect_message_names(
    file: &str,
    scope: &str,
    message: &DescriptorProto,
    kinds: &mut HashMap<String, TypeKind>,
) -> Result<(), RegistryError> {
    let fqn = format!("{}.{}", scope, message.name());
    insert_type(file, fqn.clone(), TypeKind::Message, kinds)?;
    for nested in &message.nested_type {
        collect_message_names(file, &fqn, nested, kinds)?;
    }
    for enumeration in &message.enum_type {
        insert_type(file, format!("{}.{}", fqn, enumeration.name()), TypeKind::Enum, kinds)?;
    }
    Ok(())
}

fn insert_type(
    file: &str,
    fqn: String,
    kind: TypeKind,
    kinds: &mut HashMap<String, TypeKind>,
) -> Result<(), RegistryError> {
    if kinds.contains_key(&fqn) {
        return Err(RegistryError::DuplicateType { file: file.to_string(), name: fqn });
    }
    kinds.insert(fqn, kind);
    Ok(())
}

/// Resolve `type_name` as protoc would from inside `scope`.
///
/// Absolute names (leading dot) are looked up directly; relative names are
/// tried from the innermost scope outwards.
fn resolve_type_name(
    type_name: &str,
    scope: &str,
    kinds: &HashMap<String, TypeKind>,
) -> Option<(String, TypeKind)> {
    if type_name.starts_with('.') {
        return kinds.get(type_name).map(|k| (type_name.to_string(), *k));
    }
    let mut scope = scope;
    loop {
        let candidate = format!("{}.{}", scope, type_name);
        if let Some(kind) = kinds.get(&candidate) {
            return Some((candidate, *kind));
        }
        if scope.is_empty() {
            return None;
        }
        scope = match scope.rfind('.') {
            Some(idx) => &scope[..idx],
            None => "",
        };
    }
}

struct FileConverter<'a> {
    proto: &'a FileDescriptorProto,
    kinds: &'a HashMap<String, TypeKind>,
    comments: Comments,
    messages: Vec<Message>,
    enums: Vec<Enum>,
}

impl<'a> FileConverter<'a> {
    fn new(proto: &'a FileDescriptorProto, kinds: &'a HashMap<String, TypeKind>) -> Self {
        Self {
            proto,
            kinds,
            comments: Comments::new(proto.source_code_info.as_ref()),
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    fn convert(mut self, builtin: bool) -> Result<File, RegistryError> {
        let proto = self.proto;
        let scope = package_scope(proto.package());

        for (i, message) in proto.message_type.iter().enumerate() {
            self.message(message, &scope, vec![source_info::FILE_MESSAGE, i as i32])?;
        }
        for (i, enumeration) in proto.enum_type.iter().enumerate() {
            self.enumeration(enumeration, &scope, vec![source_info::FILE_ENUM, i as i32]);
        }
        let services = proto
            .service
            .iter()
            .enumerate()
            .map(|(i, s)| self.service(s, &scope, vec![source_info::FILE_SERVICE, i as i32]))
            .collect::<Result<Vec<_>, _>>()?;

        let syntax = match proto.syntax() {
            "" => "proto2".to_string(),
            other => other.to_string(),
        };

        Ok(File {
            name: proto.name().to_string(),
            package: proto.package().to_string(),
            dependencies: proto.dependency.clone(),
            messages: self.messages,
            enums: self.enums,
            services,
            syntax,
            builtin,
        })
    }

    fn message(
        &mut self,
        proto: &DescriptorProto,
        scope: &str,
        path: Vec<i32>,
    ) -> Result<(), RegistryError> {
        let fqn = format!("{}.{}", scope, proto.name());
        let fields = proto
            .field
            .iter()
            .enumerate()
            .map(|(i, f)| self.field(f, &fqn, child(&path, source_info::MESSAGE_FIELD, i)))
            .collect::<Result<Vec<_>, _>>()?;

        self.messages.push(Message {
            fqn: fqn.clone(),
            name: proto.name().to_string(),
            fields,
            map_entry: proto.options.as_ref().map(|o| o.map_entry()).unwrap_or(false),
            comment: self.comments.at(&path),
        });

        for (i, nested) in proto.nested_type.iter().enumerate() {
            self.message(nested, &fqn, child(&path, source_info::MESSAGE_NESTED, i))?;
        }
        for (i, enumeration) in proto.enum_type.iter().enumerate() {
            self.enumeration(enumeration, &fqn, child(&path, source_info::MESSAGE_ENUM, i));
        }
        Ok(())
    }

    fn field(
        &self,
        proto: &FieldDescriptorProto,
        scope: &str,
        path: Vec<i32>,
    ) -> Result<Field, RegistryError> {
        let scalar = proto.r#type.and_then(|_| ScalarType::from_proto(proto.r#type()));
        let kind = match scalar {
            Some(scalar) => FieldKind::Scalar(scalar),
            None => {
                let unresolved = || RegistryError::UnresolvedType {
                    file: self.proto.name().to_string(),
                    referrer: format!("{}.{}", scope, proto.name()),
                    type_name: proto.type_name().to_string(),
                };
                match resolve_type_name(proto.type_name(), scope, self.kinds) {
                    Some((fqn, TypeKind::Message)) => FieldKind::Message(fqn),
                    Some((fqn, TypeKind::Enum)) => FieldKind::Enum(fqn),
                    None => return Err(unresolved()),
                }
            }
        };

        let label = match proto.label() {
            ProtoLabel::Repeated => Label::Repeated,
            ProtoLabel::Required => Label::Required,
            ProtoLabel::Optional => Label::Optional,
        };

        let json_name = match proto.json_name() {
            "" => default_json_name(proto.name()),
            name => name.to_string(),
        };

        Ok(Field {
            name: proto.name().to_string(),
            json_name,
            number: proto.number(),
            label,
            kind,
            comment: self.comments.at(&path),
        })
    }

    fn enumeration(
        &mut self,
        proto: &EnumDescriptorProto,
        scope: &str,
        path: Vec<i32>,
    ) {
        let values = proto
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| EnumValue {
                name: v.name().to_string(),
                number: v.number(),
                comment: self.comments.at(&child(&path, source_info::ENUM_VALUE, i)),
            })
            .collect();

        self.enums.push(Enum {
            fqn: format!("{}.{}", scope, proto.name()),
            name: proto.name().to_string(),
            values,
            comment: self.comments.at(&path),
        });
    }

    fn service(
        &self,
        proto: &ServiceDescriptorProto,
        scope: &str,
        path: Vec<i32>,
    ) -> Result<Service, RegistryError> {
        let fqn = format!("{}.{}", scope, proto.name());
        let mut methods = Vec::with_capacity(proto.method.len());
        for (i, method) in proto.method.iter().enumerate() {
            let resolve = |type_name: &str| match resolve_type_name(type_name, scope, self.kinds) {
                Some((resolved, TypeKind::Message)) => Ok(resolved),
                _ => Err(RegistryError::UnresolvedType {
                    file: self.proto.name().to_string(),
                    referrer: format!("{}.{}", fqn, method.name()),
                    type_name: type_name.to_string(),
                }),
            };
            methods.push(Method {
                name: method.name().to_string(),
                input_type: resolve(method.input_type())?,
                output_type: resolve(method.output_type())?,
                client_streaming: method.client_streaming(),
                server_streaming: method.server_streaming(),
                comment: self.comments.at(&child(&path, source_info::SERVICE_METHOD, i)),
            });
        }

        Ok(Service {
            name: proto.name().to_string(),
            fqn,
            methods,
            comment: self.comments.at(&path),
        })
    }
}

/// Reject message reference chains deeper than `limit` hops.
///
/// Each message reference is one hop. A cycle of `k` messages counts as `k`
/// hops wherever it is entered, so mutually recursive messages are measured
/// the same way regardless of declaration order. The walk keeps its own
/// stacks and never recurses.
fn check_recursion(registry: &Registry, limit: usize) -> Result<(), RegistryError> {
    let graph = MessageGraph::new(registry);
    let depths = graph.depths();
    for (node, fqn) in graph.names.iter().enumerate() {
        if depths[node] > limit {
            return Err(RegistryError::RecursionDepthExceeded {
                message: fqn.to_string(),
                limit,
            });
        }
    }
    Ok(())
}

/// Message reference graph in declaration order.
struct MessageGraph<'r> {
    names: Vec<&'r str>,
    edges: Vec<Vec<usize>>,
}

impl<'r> MessageGraph<'r> {
    fn new(registry: &'r Registry) -> Self {
        let names: Vec<&str> = registry
            .files
            .iter()
            .flat_map(|f| f.messages.iter().map(|m| m.fqn.as_str()))
            .collect();
        let index: HashMap<&str, usize> =
            names.iter().enumerate().map(|(i, name)| (*name, i)).collect();

        let edges = registry
            .files
            .iter()
            .flat_map(|f| f.messages.iter())
            .map(|message| {
                message
                    .fields
                    .iter()
                    .filter_map(|field| match &field.kind {
                        FieldKind::Message(target) => index.get(target.as_str()).copied(),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        Self { names, edges }
    }

    /// Deepest hop count reachable from every node.
    ///
    /// Strongly connected components are found with an iterative Tarjan walk.
    /// Tarjan emits a component only after every component it reaches, so each
    /// depth is computed from finished successors.
    fn depths(&self) -> Vec<usize> {
        const UNVISITED: usize = usize::MAX;
        let n = self.edges.len();
        let mut index = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut component = vec![UNVISITED; n];
        let mut component_depth: Vec<usize> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut next_index = 0;

        for start in 0..n {
            if index[start] != UNVISITED {
                continue;
            }
            // (node, next edge to follow)
            let mut work: Vec<(usize, usize)> = vec![(start, 0)];
            while let Some(frame) = work.last_mut() {
                let v = frame.0;
                if index[v] == UNVISITED {
                    index[v] = next_index;
                    low[v] = next_index;
                    next_index += 1;
                    stack.push(v);
                    on_stack[v] = true;
                }

                if let Some(&w) = self.edges[v].get(frame.1) {
                    frame.1 += 1;
                    if index[w] == UNVISITED {
                        work.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(index[w]);
                    }
                    continue;
                }

                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    low[parent] = low[parent].min(low[v]);
                }
                if low[v] != index[v] {
                    continue;
                }

                let id = component_depth.len();
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component[w] = id;
                    members.push(w);
                    if w == v {
                        break;
                    }
                }

                let cyclic = members.len() > 1 || self.edges[v].contains(&v);
                let own = if cyclic { members.len() } else { 0 };
                let below = members
                    .iter()
                    .flat_map(|&m| self.edges[m].iter())
                    .filter(|&&t| component[t] != id)
                    .map(|&t| component_depth[component[t]] + 1)
                    .max()
                    .unwrap_or(0);
                component_depth.push(own + below);
            }
        }

        component.iter().map(|&c| component_depth[c]).collect()
    }
}
