//! # Linking
//!
//! Turns the loaded file set into a validated [`Schema`] in two passes.
//!
//! **Pass A** walks every file and assigns each declaration its fully
//! qualified name, inserting it into the schema index. Map fields desugar
//! here into synthetic nested entry messages.
//!
//! **Pass B** resolves every field type, rpc request/response, extendee, and
//! option against the index using proto's lexical scoping rules, then
//! validates tags, reserved ranges, oneofs, extension ranges, enums, and
//! option values.
//!
//! Errors are accumulated, not thrown: the linker runs to completion and
//! reports everything it found as one [`LinkFailure`].

mod error;
mod options;
mod resolver;
mod validate;

pub use error::{LinkError, LinkFailure};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::parser::ast::{
    self, EnumNode, ExtendNode, FieldNode, FieldType, FileNode, MessageNode, Syntax, TypeNode,
};
use crate::schema::{
    Decl, DeclMeta, EnumConstant, EnumDecl, ExtendBlock, Field, FileId, Label, MessageDecl, OneOf,
    OptionSet, ProtoFile, Rpc, ScalarKind, Schema, ServiceDecl, TypeId, TypeRef,
};

use resolver::{Resolver, scope_segments};

/// Link a loaded file set into a schema.
pub fn link(files: Vec<FileNode>) -> Result<Schema, LinkFailure> {
    Linker::default().run(files)
}

/// An `extend` block awaiting resolution, with the scope it appeared in.
struct PendingExtend {
    node: ExtendNode,
    file: FileId,
    scope: Vec<String>,
    syntax: Syntax,
}

/// A resolved extension field, indexed for option resolution and tag
/// validation.
pub(crate) struct ExtensionEntry {
    pub qualified_name: String,
    pub extendee: TypeId,
    pub field: Field,
    pub file: FileId,
}

/// A map field recorded during pass A, desugared after its message exists.
struct PendingMap {
    field_index: usize,
    key: String,
    value: String,
}

#[derive(Default)]
struct Linker {
    schema: Schema,
    errors: Vec<LinkError>,
    pending_extends: Vec<PendingExtend>,
    /// Per file: indices of files whose declarations it may reference.
    visible: Vec<IndexSet<usize>>,
    extensions: Vec<ExtensionEntry>,
    extension_index: IndexMap<String, usize>,
}

impl Linker {
    fn run(mut self, files: Vec<FileNode>) -> Result<Schema, LinkFailure> {
        // Pass A: declaration indexing.
        for file in files {
            self.index_file(file);
        }
        debug!(decls = self.schema.decl_count(), "declaration indexing complete");

        self.compute_visibility();
        self.check_import_cycles();

        // Pass B: reference resolution.
        self.resolve_references();
        self.resolve_extends();

        options::check_all(
            &mut self.schema,
            &self.visible,
            &self.extensions,
            &self.extension_index,
            &mut self.errors,
        );
        validate::validate(&self.schema, &self.extensions, &mut self.errors);

        if self.errors.is_empty() {
            Ok(self.schema)
        } else {
            debug!(errors = self.errors.len(), "linking failed");
            Err(LinkFailure {
                errors: self.errors,
            })
        }
    }

    // =========================================================================
    // Pass A: declaration indexing
    // =========================================================================

    fn index_file(&mut self, file: FileNode) {
        let package_scope = match &file.package {
            Some(package) => scope_segments(package),
            None => Vec::new(),
        };
        let syntax = file.syntax;

        let fid = self.schema.push_file(ProtoFile {
            location: file.location,
            package: file.package,
            syntax,
            imports: file.imports.iter().map(|i| i.path.clone()).collect(),
            public_imports: file
                .imports
                .iter()
                .filter(|i| i.kind == ast::ImportKind::Public)
                .map(|i| i.path.clone())
                .collect(),
            types: Vec::new(),
            services: Vec::new(),
            extends: Vec::new(),
            options: OptionSet::new(file.options),
        });

        for node in file.types {
            if let Some(id) = self.register_type(node, fid, None, &package_scope, syntax) {
                self.schema.file_mut(fid).types.push(id);
            }
        }
        for node in file.services {
            if let Some(id) = self.register_service(node, fid, &package_scope) {
                self.schema.file_mut(fid).services.push(id);
            }
        }
        for node in file.extends {
            self.pending_extends.push(PendingExtend {
                node,
                file: fid,
                scope: package_scope.clone(),
                syntax,
            });
        }
    }

    fn register_type(
        &mut self,
        node: TypeNode,
        fid: FileId,
        parent: Option<TypeId>,
        scope: &[String],
        syntax: Syntax,
    ) -> Option<TypeId> {
        match node {
            TypeNode::Message(message) => self.register_message(message, fid, parent, scope, syntax),
            TypeNode::Enum(en) => self.register_enum(en, fid, parent, scope, syntax),
        }
    }

    fn register_message(
        &mut self,
        node: MessageNode,
        fid: FileId,
        parent: Option<TypeId>,
        scope: &[String],
        syntax: Syntax,
    ) -> Option<TypeId> {
        let qualified_name = qualify(scope, &node.name);

        let mut fields = Vec::new();
        let mut pending_maps = Vec::new();
        for field in node.fields {
            let (field, map) = self.build_field(field, None, false, syntax);
            if let Some(map) = map {
                pending_maps.push(PendingMap {
                    field_index: fields.len(),
                    key: map.0,
                    value: map.1,
                });
            }
            fields.push(field);
        }

        let mut oneofs = Vec::new();
        for (oneof_index, oneof) in node.oneofs.into_iter().enumerate() {
            for field in oneof.fields {
                if matches!(field.field_type, FieldType::Map { .. }) {
                    self.errors.push(LinkError::MapFieldInOneOf {
                        field: format!("{qualified_name}.{}", field.name),
                        location: field.location.clone(),
                    });
                    continue;
                }
                let (field, _) = self.build_field(field, Some(oneof_index as u32), false, syntax);
                fields.push(field);
            }
            oneofs.push(OneOf {
                name: oneof.name,
                options: OptionSet::new(oneof.options),
                doc: oneof.doc,
            });
        }

        let reserved_ranges = node.reserved.iter().flat_map(|r| r.ranges.clone()).collect();
        let reserved_names = node.reserved.iter().flat_map(|r| r.names.clone()).collect();

        let decl = MessageDecl {
            name: node.name.clone(),
            qualified_name: qualified_name.clone(),
            fields,
            oneofs,
            nested: Vec::new(),
            reserved_ranges,
            reserved_names,
            extension_ranges: node.extension_ranges,
            options: OptionSet::new(node.options),
            map_entry: false,
            doc: node.doc,
            location: node.location.clone(),
        };

        let id = match self.schema.insert(Decl::Message(decl), DeclMeta { file: fid, parent }) {
            Ok(id) => id,
            Err(existing) => {
                self.errors.push(LinkError::DuplicateType {
                    name: qualified_name,
                    first: self.schema.get(existing).location().clone(),
                    second: node.location,
                });
                return None;
            }
        };

        // Child scope covers nested declarations and map entries.
        let mut child_scope = scope.to_vec();
        child_scope.push(node.name);

        let mut nested = Vec::new();
        for child in node.nested {
            if let Some(cid) = self.register_type(child, fid, Some(id), &child_scope, syntax) {
                nested.push(cid);
            }
        }
        for map in pending_maps {
            if let Some(entry_id) = self.register_map_entry(&map, id, fid, &child_scope) {
                nested.push(entry_id);
                if let Decl::Message(m) = self.schema.get_mut(id) {
                    m.fields[map.field_index].typ = TypeRef::Resolved(entry_id);
                }
            }
        }
        if let Decl::Message(m) = self.schema.get_mut(id) {
            m.nested = nested;
        }

        for extend in node.extends {
            self.pending_extends.push(PendingExtend {
                node: extend,
                file: fid,
                scope: child_scope.clone(),
                syntax,
            });
        }

        Some(id)
    }

    /// Desugar `map<K, V> name = N;` into a synthetic nested message with
    /// `key = 1` and `value = 2`, referenced by the rewritten field.
    fn register_map_entry(
        &mut self,
        map: &PendingMap,
        parent: TypeId,
        fid: FileId,
        child_scope: &[String],
    ) -> Option<TypeId> {
        let (field_name, field_location) = {
            let Decl::Message(m) = self.schema.get(parent) else {
                return None;
            };
            let field = &m.fields[map.field_index];
            (field.name.clone(), field.location.clone())
        };

        let key_type = match ScalarKind::parse(&map.key) {
            Some(scalar) if scalar.valid_map_key() => TypeRef::Scalar(scalar),
            _ => {
                self.errors.push(LinkError::InvalidMapKey {
                    field: format!("{}.{field_name}", qualify_all(child_scope)),
                    key: map.key.clone(),
                    location: field_location.clone(),
                });
                return None;
            }
        };

        let entry_name = format!("{}Entry", pascal_case(&field_name));
        let qualified_name = qualify(child_scope, &entry_name);

        let make_field = |name: &str, tag: i32, typ: TypeRef| Field {
            name: name.to_string(),
            tag,
            label: Label::Optional,
            typ,
            oneof_index: None,
            default_value: None,
            json_name: None,
            packed: None,
            options: OptionSet::default(),
            is_extension: false,
            doc: String::new(),
            location: field_location.clone(),
        };

        let entry = MessageDecl {
            name: entry_name,
            qualified_name: qualified_name.clone(),
            fields: vec![
                make_field("key", 1, key_type),
                make_field("value", 2, TypeRef::Named(map.value.clone())),
            ],
            oneofs: Vec::new(),
            nested: Vec::new(),
            reserved_ranges: Vec::new(),
            reserved_names: Vec::new(),
            extension_ranges: Vec::new(),
            options: OptionSet::default(),
            map_entry: true,
            doc: String::new(),
            location: field_location.clone(),
        };

        match self.schema.insert(
            Decl::Message(entry),
            DeclMeta {
                file: fid,
                parent: Some(parent),
            },
        ) {
            Ok(id) => Some(id),
            Err(existing) => {
                self.errors.push(LinkError::DuplicateType {
                    name: qualified_name,
                    first: self.schema.get(existing).location().clone(),
                    second: field_location,
                });
                None
            }
        }
    }

    fn register_enum(
        &mut self,
        node: EnumNode,
        fid: FileId,
        parent: Option<TypeId>,
        scope: &[String],
        _syntax: Syntax,
    ) -> Option<TypeId> {
        let qualified_name = qualify(scope, &node.name);
        let allow_alias = ast::find_option(&node.options, "allow_alias")
            .and_then(|o| o.value.as_bool())
            .unwrap_or(false);

        let constants = node
            .constants
            .into_iter()
            .map(|c| EnumConstant {
                name: c.name,
                tag: c.tag,
                options: OptionSet::new(c.options),
                doc: c.doc,
                location: c.location,
            })
            .collect();

        let decl = EnumDecl {
            name: node.name,
            qualified_name: qualified_name.clone(),
            constants,
            reserved_ranges: node.reserved.iter().flat_map(|r| r.ranges.clone()).collect(),
            reserved_names: node.reserved.iter().flat_map(|r| r.names.clone()).collect(),
            options: OptionSet::new(node.options),
            allow_alias,
            doc: node.doc,
            location: node.location.clone(),
        };

        match self.schema.insert(Decl::Enum(decl), DeclMeta { file: fid, parent }) {
            Ok(id) => Some(id),
            Err(existing) => {
                self.errors.push(LinkError::DuplicateType {
                    name: qualified_name,
                    first: self.schema.get(existing).location().clone(),
                    second: node.location,
                });
                None
            }
        }
    }

    fn register_service(
        &mut self,
        node: ast::ServiceNode,
        fid: FileId,
        scope: &[String],
    ) -> Option<TypeId> {
        let qualified_name = qualify(scope, &node.name);
        let rpcs = node
            .rpcs
            .into_iter()
            .map(|rpc| Rpc {
                name: rpc.name,
                request_type: TypeRef::Named(rpc.request_type),
                request_streaming: rpc.request_streaming,
                response_type: TypeRef::Named(rpc.response_type),
                response_streaming: rpc.response_streaming,
                options: OptionSet::new(rpc.options),
                doc: rpc.doc,
                location: rpc.location,
            })
            .collect();

        let decl = ServiceDecl {
            name: node.name,
            qualified_name: qualified_name.clone(),
            rpcs,
            options: OptionSet::new(node.options),
            doc: node.doc,
            location: node.location.clone(),
        };

        match self.schema.insert(Decl::Service(decl), DeclMeta { file: fid, parent: None }) {
            Ok(id) => Some(id),
            Err(existing) => {
                self.errors.push(LinkError::DuplicateType {
                    name: qualified_name,
                    first: self.schema.get(existing).location().clone(),
                    second: node.location,
                });
                None
            }
        }
    }

    fn build_field(
        &mut self,
        node: FieldNode,
        oneof_index: Option<u32>,
        is_extension: bool,
        syntax: Syntax,
    ) -> (Field, Option<(String, String)>) {
        let label = match (oneof_index, node.label) {
            (Some(_), _) => Label::OneOf,
            (None, Some(ast::Label::Optional)) => Label::Optional,
            (None, Some(ast::Label::Required)) => {
                if syntax == Syntax::Proto3 {
                    self.errors.push(LinkError::RequiredInProto3 {
                        field: node.name.clone(),
                        location: node.location.clone(),
                    });
                }
                Label::Required
            }
            (None, Some(ast::Label::Repeated)) => Label::Repeated,
            (None, None) => {
                // Map fields carry no label by design; otherwise proto2
                // requires one.
                if syntax == Syntax::Proto2 && !matches!(node.field_type, FieldType::Map { .. }) {
                    self.errors.push(LinkError::MissingLabel {
                        field: node.name.clone(),
                        location: node.location.clone(),
                    });
                }
                if matches!(node.field_type, FieldType::Map { .. }) {
                    Label::Repeated
                } else {
                    Label::Optional
                }
            }
        };

        let default_value = ast::find_option(&node.options, "default").map(|o| {
            if syntax == Syntax::Proto3 {
                self.errors.push(LinkError::DefaultInProto3 {
                    field: node.name.clone(),
                    location: o.location.clone(),
                });
            }
            o.value.clone()
        });

        let json_name = ast::find_option(&node.options, "json_name").and_then(|o| {
            let value = o.value.as_str().map(str::to_string);
            if value.is_none() {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: "json_name".to_string(),
                    expected: "a string".to_string(),
                    location: o.location.clone(),
                });
            }
            value
        });

        let packed = ast::find_option(&node.options, "packed").and_then(|o| {
            let value = o.value.as_bool();
            if value.is_none() {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: "packed".to_string(),
                    expected: "true or false".to_string(),
                    location: o.location.clone(),
                });
            }
            value
        });

        let (typ, map) = match node.field_type {
            FieldType::Named(name) => (TypeRef::Named(name), None),
            FieldType::Map { key, value } => {
                // A placeholder until the synthetic entry message exists.
                (TypeRef::Named(String::new()), Some((key, value)))
            }
        };

        let field = Field {
            name: node.name,
            tag: node.tag,
            label,
            typ,
            oneof_index,
            default_value,
            json_name,
            packed,
            options: OptionSet::new(node.options),
            is_extension,
            doc: node.doc,
            location: node.location,
        };
        (field, map)
    }

    // =========================================================================
    // Import visibility and cycles
    // =========================================================================

    /// A file sees its own declarations, its direct imports, and whatever
    /// those imports re-export through `public` imports. The descriptor
    /// definitions are visible everywhere for option resolution.
    fn compute_visibility(&mut self) {
        let path_to_file: IndexMap<&str, usize> = self
            .schema
            .files()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.location.path(), i))
            .collect();

        let descriptor = path_to_file
            .get(crate::loader::DESCRIPTOR_PROTO_PATH)
            .copied();

        // Transitive closure over public imports, memoized per file.
        let mut public_closure: Vec<Option<IndexSet<usize>>> =
            vec![None; self.schema.files().len()];
        for i in 0..self.schema.files().len() {
            self.public_exports(i, &path_to_file, &mut public_closure);
        }

        self.visible = (0..self.schema.files().len())
            .map(|i| {
                let mut set = IndexSet::new();
                set.insert(i);
                if let Some(d) = descriptor {
                    set.insert(d);
                }
                for import in &self.schema.files()[i].imports {
                    if let Some(&j) = path_to_file.get(import.as_str()) {
                        set.insert(j);
                        if let Some(exports) = &public_closure[j] {
                            set.extend(exports.iter().copied());
                        }
                    }
                }
                set
            })
            .collect();
    }

    /// Files re-exported by `i` through public imports, transitively.
    fn public_exports(
        &self,
        i: usize,
        path_to_file: &IndexMap<&str, usize>,
        memo: &mut Vec<Option<IndexSet<usize>>>,
    ) -> IndexSet<usize> {
        if let Some(cached) = &memo[i] {
            return cached.clone();
        }
        // Break self-referential public import chains.
        memo[i] = Some(IndexSet::new());

        let mut exports = IndexSet::new();
        for public in &self.schema.files()[i].public_imports {
            if let Some(&j) = path_to_file.get(public.as_str()) {
                exports.insert(j);
                exports.extend(self.public_exports(j, path_to_file, memo));
            }
        }
        memo[i] = Some(exports.clone());
        exports
    }

    /// The import graph must be acyclic for non-public imports.
    fn check_import_cycles(&mut self) {
        let files = self.schema.files();
        let path_to_file: IndexMap<&str, usize> = files
            .iter()
            .enumerate()
            .map(|(i, f)| (f.location.path(), i))
            .collect();

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }
        let mut marks = vec![Mark::White; files.len()];
        let mut cycle: Option<Vec<String>> = None;

        fn visit(
            i: usize,
            files: &[ProtoFile],
            path_to_file: &IndexMap<&str, usize>,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
            cycle: &mut Option<Vec<String>>,
        ) {
            if cycle.is_some() || marks[i] == Mark::Black {
                return;
            }
            marks[i] = Mark::Gray;
            stack.push(i);
            for import in &files[i].imports {
                if files[i].public_imports.contains(import) {
                    continue;
                }
                if let Some(&j) = path_to_file.get(import.as_str()) {
                    if marks[j] == Mark::Gray {
                        let start = stack.iter().position(|&s| s == j).unwrap_or(0);
                        let mut chain: Vec<String> = stack[start..]
                            .iter()
                            .map(|&s| files[s].location.path().to_string())
                            .collect();
                        chain.push(files[j].location.path().to_string());
                        *cycle = Some(chain);
                        break;
                    }
                    visit(j, files, path_to_file, marks, stack, cycle);
                }
            }
            stack.pop();
            marks[i] = Mark::Black;
        }

        let mut stack = Vec::new();
        for i in 0..files.len() {
            visit(i, files, &path_to_file, &mut marks, &mut stack, &mut cycle);
        }
        if let Some(chain) = cycle {
            self.errors.push(LinkError::CyclicImports { chain });
        }
    }

    // =========================================================================
    // Pass B: reference resolution
    // =========================================================================

    fn resolve_references(&mut self) {
        for index in 0..self.schema.decl_count() {
            let id = TypeId::new(index);
            let fid = self.schema.meta(id).file;

            // Collect the unresolved references first; resolution pushes
            // errors, so it cannot run while the declaration is borrowed.
            enum Slot {
                Field(usize),
                Request(usize),
                Response(usize),
            }
            let mut scope = Vec::new();
            let mut pending: Vec<(Slot, String, crate::core::Location)> = Vec::new();
            match self.schema.get(id) {
                Decl::Message(message) => {
                    scope = scope_segments(&message.qualified_name);
                    for (i, field) in message.fields.iter().enumerate() {
                        if let TypeRef::Named(name) = &field.typ {
                            pending.push((Slot::Field(i), name.clone(), field.location.clone()));
                        }
                    }
                }
                Decl::Service(service) => {
                    scope = scope_segments(&service.qualified_name);
                    for (i, rpc) in service.rpcs.iter().enumerate() {
                        if let TypeRef::Named(name) = &rpc.request_type {
                            pending.push((Slot::Request(i), name.clone(), rpc.location.clone()));
                        }
                        if let TypeRef::Named(name) = &rpc.response_type {
                            pending.push((Slot::Response(i), name.clone(), rpc.location.clone()));
                        }
                    }
                }
                Decl::Enum(_) => {}
            }

            for (slot, name, location) in pending {
                let resolved = match slot {
                    Slot::Field(_) => self.resolve_field_type(&name, fid, &scope, &location),
                    _ => self.resolve_rpc_type(&name, fid, &scope, &location),
                };
                let Some(typ) = resolved else { continue };
                match (slot, self.schema.get_mut(id)) {
                    (Slot::Field(i), Decl::Message(m)) => m.fields[i].typ = typ,
                    (Slot::Request(i), Decl::Service(s)) => s.rpcs[i].request_type = typ,
                    (Slot::Response(i), Decl::Service(s)) => s.rpcs[i].response_type = typ,
                    _ => {}
                }
            }
        }
    }

    /// Classify and resolve a field type name. Scalar names only apply to
    /// unqualified references.
    fn resolve_field_type(
        &mut self,
        name: &str,
        fid: FileId,
        scope: &[String],
        referrer: &crate::core::Location,
    ) -> Option<TypeRef> {
        if !name.contains('.')
            && let Some(scalar) = ScalarKind::parse(name)
        {
            return Some(TypeRef::Scalar(scalar));
        }
        let resolver = Resolver::new(&self.schema, &self.visible);
        match resolver.resolve(name, fid, scope) {
            Some(id) => match self.schema.get(id) {
                Decl::Message(_) | Decl::Enum(_) => Some(TypeRef::Resolved(id)),
                Decl::Service(_) => {
                    self.errors.push(LinkError::WrongKind {
                        name: name.to_string(),
                        expected: "message or enum",
                        actual: "service",
                        referrer: referrer.clone(),
                    });
                    None
                }
            },
            None => {
                self.errors.push(LinkError::UnresolvedReference {
                    name: name.to_string(),
                    referrer: referrer.clone(),
                });
                None
            }
        }
    }

    /// Rpc request and response types must be messages.
    fn resolve_rpc_type(
        &mut self,
        name: &str,
        fid: FileId,
        scope: &[String],
        referrer: &crate::core::Location,
    ) -> Option<TypeRef> {
        let resolver = Resolver::new(&self.schema, &self.visible);
        match resolver.resolve(name, fid, scope) {
            Some(id) => match self.schema.get(id) {
                Decl::Message(_) => Some(TypeRef::Resolved(id)),
                other => {
                    self.errors.push(LinkError::WrongKind {
                        name: name.to_string(),
                        expected: "message",
                        actual: other.kind_name(),
                        referrer: referrer.clone(),
                    });
                    None
                }
            },
            None => {
                self.errors.push(LinkError::UnresolvedReference {
                    name: name.to_string(),
                    referrer: referrer.clone(),
                });
                None
            }
        }
    }

    fn resolve_extends(&mut self) {
        let pending = std::mem::take(&mut self.pending_extends);
        for extend in pending {
            let extendee = {
                let resolver = Resolver::new(&self.schema, &self.visible);
                resolver.resolve(&extend.node.name, extend.file, &extend.scope)
            };
            let extendee = match extendee {
                Some(id) => match self.schema.get(id) {
                    Decl::Message(_) => id,
                    other => {
                        self.errors.push(LinkError::WrongKind {
                            name: extend.node.name.clone(),
                            expected: "message",
                            actual: other.kind_name(),
                            referrer: extend.node.location.clone(),
                        });
                        continue;
                    }
                },
                None => {
                    self.errors.push(LinkError::UnresolvedReference {
                        name: extend.node.name.clone(),
                        referrer: extend.node.location.clone(),
                    });
                    continue;
                }
            };

            let mut fields = Vec::new();
            for field_node in extend.node.fields {
                let (mut field, map) =
                    self.build_field(field_node, None, true, extend.syntax);
                if map.is_some() {
                    self.errors.push(LinkError::MapFieldAsExtension {
                        field: field.name.clone(),
                        location: field.location.clone(),
                    });
                    continue;
                }
                if let TypeRef::Named(name) = field.typ.clone()
                    && let Some(typ) =
                        self.resolve_field_type(&name, extend.file, &extend.scope, &field.location)
                {
                    field.typ = typ;
                }

                let qualified_name = qualify(&extend.scope, &field.name);
                if let Some(&existing) = self.extension_index.get(&qualified_name) {
                    self.errors.push(LinkError::DuplicateMemberName {
                        scope: self.schema.get(extendee).qualified_name().to_string(),
                        name: qualified_name,
                        first: self.extensions[existing].field.location.clone(),
                        second: field.location.clone(),
                    });
                    continue;
                }
                self.extension_index
                    .insert(qualified_name.clone(), self.extensions.len());
                self.extensions.push(ExtensionEntry {
                    qualified_name,
                    extendee,
                    field: field.clone(),
                    file: extend.file,
                });
                fields.push(field);
            }

            self.schema.file_mut(extend.file).extends.push(ExtendBlock {
                extendee,
                fields,
                doc: extend.node.doc,
                location: extend.node.location,
            });
        }
    }
}

/// `scope` joined with `.` and suffixed with `name`.
fn qualify(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{name}", scope.join("."))
    }
}

fn qualify_all(scope: &[String]) -> String {
    scope.join(".")
}

/// `page_map` -> `PageMap`, the naming scheme for synthetic map entries.
fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
