//! The schema arena and its qualified-name index.

use indexmap::IndexMap;

use crate::core::Location;
use crate::parser::ast::Syntax;

use super::decl::{Decl, DeclMeta, ExtendBlock, OptionSet};

/// Index of a declaration in the schema arena. u32 keeps the id compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a file in the schema's file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A linked `.proto` file: its metadata plus the arena ids of its top-level
/// declarations.
#[derive(Debug, Clone)]
pub struct ProtoFile {
    pub location: Location,
    pub package: Option<String>,
    pub syntax: Syntax,
    pub imports: Vec<String>,
    pub public_imports: Vec<String>,
    pub types: Vec<TypeId>,
    pub services: Vec<TypeId>,
    pub extends: Vec<ExtendBlock>,
    pub options: OptionSet,
}

impl ProtoFile {
    /// The package prefix for declarations in this file, empty for the
    /// default package.
    pub fn package_prefix(&self) -> String {
        match &self.package {
            Some(package) => format!("{package}."),
            None => String::new(),
        }
    }
}

/// The linked, validated set of files forming one compilation unit.
///
/// Declarations live in a flat arena; `index` maps every qualified name to
/// its slot. Index iteration order is insertion order: file enumeration
/// order, then declaration order within a file. This order is observable
/// through the pruner and dispatcher and is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    files: Vec<ProtoFile>,
    arena: Vec<Decl>,
    meta: Vec<DeclMeta>,
    index: IndexMap<String, TypeId>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ProtoFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &ProtoFile {
        &self.files[id.index()]
    }

    pub(crate) fn file_mut(&mut self, id: FileId) -> &mut ProtoFile {
        &mut self.files[id.index()]
    }

    /// Number of declarations in the arena.
    pub fn decl_count(&self) -> usize {
        self.arena.len()
    }

    pub fn get(&self, id: TypeId) -> &Decl {
        &self.arena[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Decl {
        &mut self.arena[id.index()]
    }

    pub fn meta(&self, id: TypeId) -> DeclMeta {
        self.meta[id.index()]
    }

    /// Find a declaration by its exact qualified name.
    pub fn resolve(&self, qualified_name: &str) -> Option<TypeId> {
        self.index.get(qualified_name).copied()
    }

    /// All declarations in index order.
    pub fn decls(&self) -> impl Iterator<Item = (TypeId, &Decl)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(i, decl)| (TypeId::new(i), decl))
    }

    /// Qualified names in index order.
    pub fn qualified_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub(crate) fn push_file(&mut self, file: ProtoFile) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(file);
        id
    }

    /// Insert a declaration under its qualified name.
    ///
    /// On a name collision the arena is left unchanged and the existing id
    /// is returned as the error.
    pub(crate) fn insert(&mut self, decl: Decl, meta: DeclMeta) -> Result<TypeId, TypeId> {
        let qualified_name = decl.qualified_name().to_string();
        if let Some(existing) = self.index.get(&qualified_name) {
            return Err(*existing);
        }
        let id = TypeId::new(self.arena.len());
        self.arena.push(decl);
        self.meta.push(meta);
        self.index.insert(qualified_name, id);
        Ok(id)
    }

    /// The declarations of a file in declaration order, nested types
    /// following their enclosing message pre-order.
    pub fn file_decls(&self, id: FileId) -> Vec<TypeId> {
        let file = self.file(id);
        let mut ordered = Vec::new();
        for &type_id in file.types.iter().chain(&file.services) {
            self.collect_pre_order(type_id, &mut ordered);
        }
        ordered
    }

    fn collect_pre_order(&self, id: TypeId, into: &mut Vec<TypeId>) {
        into.push(id);
        if let Decl::Message(message) = self.get(id) {
            for &nested in &message.nested {
                self.collect_pre_order(nested, into);
            }
        }
    }
}
