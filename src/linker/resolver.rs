//! Name resolution over the indexed schema.
//!
//! All resolution logic lives here, keeping [`Schema`] a pure data
//! structure. Resolution follows proto's lexical scoping: a leading dot is
//! absolute; otherwise the innermost enclosing scope is searched first,
//! walking outward, and the innermost match wins.

use indexmap::IndexSet;

use crate::schema::{FileId, Schema, TypeId};

pub(crate) struct Resolver<'a> {
    schema: &'a Schema,
    /// Per file: the indices of files whose declarations it may reference —
    /// itself, its direct imports, the transitive closure of public imports,
    /// and the descriptor definitions.
    visible: &'a [IndexSet<usize>],
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema, visible: &'a [IndexSet<usize>]) -> Self {
        Self { schema, visible }
    }

    /// Resolve a type name written at the given scope.
    ///
    /// `scope` is the chain of enclosing segments: package segments followed
    /// by enclosing message names, innermost last.
    pub fn resolve(&self, name: &str, from: FileId, scope: &[String]) -> Option<TypeId> {
        if let Some(absolute) = name.strip_prefix('.') {
            return self.lookup_visible(absolute, from);
        }

        // Innermost scope first: for scope [a, b, Outer] try
        // a.b.Outer.name, a.b.name, a.name, name.
        for depth in (0..=scope.len()).rev() {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                let mut qualified = scope[..depth].join(".");
                qualified.push('.');
                qualified.push_str(name);
                qualified
            };
            if let Some(id) = self.lookup_visible(&candidate, from) {
                return Some(id);
            }
        }
        None
    }

    fn lookup_visible(&self, qualified_name: &str, from: FileId) -> Option<TypeId> {
        let id = self.schema.resolve(qualified_name)?;
        self.is_visible(id, from).then_some(id)
    }

    fn is_visible(&self, id: TypeId, from: FileId) -> bool {
        let declared_in = self.schema.meta(id).file.index();
        self.visible
            .get(from.index())
            .is_some_and(|set| set.contains(&declared_in))
    }
}

/// Split a qualified name into its scope segments.
pub(crate) fn scope_segments(qualified_name: &str) -> Vec<String> {
    if qualified_name.is_empty() {
        return Vec::new();
    }
    qualified_name.split('.').map(str::to_string).collect()
}
