//! Reachability pruning.
//!
//! The pruner seeds from the declarations the rules include, follows type
//! references from retained members, and rewrites the schema to the
//! transitive closure. The input schema is never mutated; the output is a
//! freshly numbered arena.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use thiserror::Error;
use tracing::debug;

use crate::parser::ast::Syntax;
use crate::schema::{
    Decl, DeclMeta, EnumDecl, Field, FileId, MessageDecl, ProtoFile, Rpc, Schema, ServiceDecl,
    TypeId, TypeRef,
};

use super::IdentifierSet;

/// Pruning halts at the first offender.
#[derive(Debug, Clone, Error)]
pub enum PruneError {
    /// Pruning removed every constant of an enum, or the zero constant a
    /// proto3 enum must keep.
    #[error("pruning left enum {name} unusable: every constant (or the proto3 zero constant) was removed")]
    EmptyEnum { name: String },
}

/// Prunes a schema against a rule set.
pub struct Pruner<'s, 'r> {
    schema: &'s Schema,
    rules: &'r mut IdentifierSet,
}

impl<'s, 'r> Pruner<'s, 'r> {
    pub fn new(schema: &'s Schema, rules: &'r mut IdentifierSet) -> Self {
        Self { schema, rules }
    }

    pub fn prune(mut self) -> Result<Schema, PruneError> {
        // Nothing to do when the rules keep everything.
        if self.rules.matches_everything() {
            self.rules.mark_wildcards_used();
            return Ok(self.schema.clone());
        }

        let included = self.reachable();
        let keep = self.with_ancestors(&included);
        debug!(
            included = included.len(),
            kept = keep.len(),
            total = self.schema.decl_count(),
            "pruning schema"
        );
        self.rebuild(&included, &keep)
    }

    /// Seed with every included declaration, then follow type references
    /// from retained members and resolved option types.
    fn reachable(&mut self) -> IndexSet<TypeId> {
        let mut included = IndexSet::new();
        let mut queue: VecDeque<TypeId> = VecDeque::new();

        for (id, decl) in self.schema.decls() {
            if decl.is_map_entry() {
                continue;
            }
            if self.rules.includes_type(decl.qualified_name()) {
                queue.push_back(id);
            }
        }

        while let Some(id) = queue.pop_front() {
            if !included.insert(id) {
                continue;
            }
            match self.schema.get(id) {
                Decl::Message(message) => {
                    queue.extend(&message.options.resolved_types);
                    for oneof in &message.oneofs {
                        queue.extend(&oneof.options.resolved_types);
                    }
                    for field in &message.fields {
                        if !self.rules.retains_member(&message.qualified_name, &field.name) {
                            continue;
                        }
                        if let TypeRef::Resolved(tid) = field.typ {
                            queue.push_back(tid);
                        }
                        queue.extend(&field.options.resolved_types);
                    }
                }
                Decl::Enum(en) => {
                    queue.extend(&en.options.resolved_types);
                    for constant in &en.constants {
                        if self.rules.retains_member(&en.qualified_name, &constant.name) {
                            queue.extend(&constant.options.resolved_types);
                        }
                    }
                }
                Decl::Service(service) => {
                    queue.extend(&service.options.resolved_types);
                    for rpc in &service.rpcs {
                        if !self.rules.retains_member(&service.qualified_name, &rpc.name) {
                            continue;
                        }
                        if let TypeRef::Resolved(tid) = rpc.request_type {
                            queue.push_back(tid);
                        }
                        if let TypeRef::Resolved(tid) = rpc.response_type {
                            queue.push_back(tid);
                        }
                        queue.extend(&rpc.options.resolved_types);
                    }
                }
            }
        }

        included
    }

    /// A surviving nested declaration keeps its enclosing messages as
    /// containers, with their own members subject to the usual decision.
    fn with_ancestors(&self, included: &IndexSet<TypeId>) -> IndexSet<TypeId> {
        let mut keep = IndexSet::new();
        for &id in included {
            let mut current = Some(id);
            while let Some(c) = current {
                keep.insert(c);
                current = self.schema.meta(c).parent;
            }
        }
        keep
    }

    fn rebuild(
        &mut self,
        included: &IndexSet<TypeId>,
        keep: &IndexSet<TypeId>,
    ) -> Result<Schema, PruneError> {
        let mut out = Schema::new();
        let mut remap: HashMap<TypeId, TypeId> = HashMap::new();

        for (i, file) in self.schema.files().iter().enumerate() {
            let old_fid = FileId::new(i);
            let survivors: Vec<TypeId> = file
                .types
                .iter()
                .chain(&file.services)
                .copied()
                .filter(|id| keep.contains(id))
                .collect();
            if survivors.is_empty() {
                continue;
            }

            let fid = out.push_file(ProtoFile {
                location: file.location.clone(),
                package: file.package.clone(),
                syntax: file.syntax,
                imports: file.imports.clone(),
                public_imports: file.public_imports.clone(),
                types: Vec::new(),
                services: Vec::new(),
                extends: Vec::new(),
                options: file.options.clone(),
            });

            for &tid in &file.types {
                if keep.contains(&tid) {
                    let new_id =
                        self.rebuild_decl(tid, old_fid, fid, None, included, keep, &mut out, &mut remap)?;
                    out.file_mut(fid).types.push(new_id);
                }
            }
            for &sid in &file.services {
                if keep.contains(&sid) {
                    let new_id =
                        self.rebuild_decl(sid, old_fid, fid, None, included, keep, &mut out, &mut remap)?;
                    out.file_mut(fid).services.push(new_id);
                }
            }

            let extends = file
                .extends
                .iter()
                .filter(|extend| keep.contains(&extend.extendee))
                .map(|extend| {
                    let mut extend = extend.clone();
                    extend.fields.retain(|f| type_survives(&f.typ, keep));
                    extend
                })
                .filter(|extend| !extend.fields.is_empty())
                .collect();
            out.file_mut(fid).extends = extends;
        }

        remap_references(&mut out, &remap);
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn rebuild_decl(
        &mut self,
        old_id: TypeId,
        old_fid: FileId,
        fid: FileId,
        parent: Option<TypeId>,
        included: &IndexSet<TypeId>,
        keep: &IndexSet<TypeId>,
        out: &mut Schema,
        remap: &mut HashMap<TypeId, TypeId>,
    ) -> Result<TypeId, PruneError> {
        let meta = DeclMeta { file: fid, parent };
        match self.schema.get(old_id) {
            Decl::Message(message) => {
                let full = included.contains(&old_id);
                let fields: Vec<Field> = if full {
                    message
                        .fields
                        .iter()
                        .filter(|f| {
                            self.rules.retains_member(&message.qualified_name, &f.name)
                                && type_survives(&f.typ, keep)
                        })
                        .cloned()
                        .collect()
                } else {
                    // Kept only as a container for surviving nested types.
                    Vec::new()
                };

                let rebuilt = MessageDecl {
                    fields,
                    oneofs: if full { message.oneofs.clone() } else { Vec::new() },
                    nested: Vec::new(),
                    ..message.clone()
                };
                let new_id = out
                    .insert(Decl::Message(rebuilt), meta)
                    .unwrap_or_else(|existing| existing);
                remap.insert(old_id, new_id);

                let mut nested = Vec::new();
                for &child in &message.nested {
                    if keep.contains(&child) {
                        nested.push(self.rebuild_decl(
                            child,
                            old_fid,
                            fid,
                            Some(new_id),
                            included,
                            keep,
                            out,
                            remap,
                        )?);
                    }
                }
                if let Decl::Message(m) = out.get_mut(new_id) {
                    m.nested = nested;
                }
                Ok(new_id)
            }
            Decl::Enum(en) => {
                let constants: Vec<_> = en
                    .constants
                    .iter()
                    .filter(|c| self.rules.retains_member(&en.qualified_name, &c.name))
                    .cloned()
                    .collect();
                let zero_removed = self.schema.file(old_fid).syntax == Syntax::Proto3
                    && !constants.iter().any(|c| c.tag == 0);
                if constants.is_empty() || zero_removed {
                    return Err(PruneError::EmptyEnum {
                        name: en.qualified_name.clone(),
                    });
                }
                let rebuilt = EnumDecl {
                    constants,
                    ..en.clone()
                };
                let new_id = out
                    .insert(Decl::Enum(rebuilt), meta)
                    .unwrap_or_else(|existing| existing);
                remap.insert(old_id, new_id);
                Ok(new_id)
            }
            Decl::Service(service) => {
                let rpcs: Vec<Rpc> = service
                    .rpcs
                    .iter()
                    .filter(|rpc| {
                        self.rules.retains_member(&service.qualified_name, &rpc.name)
                            && type_survives(&rpc.request_type, keep)
                            && type_survives(&rpc.response_type, keep)
                    })
                    .cloned()
                    .collect();
                let rebuilt = ServiceDecl {
                    rpcs,
                    ..service.clone()
                };
                let new_id = out
                    .insert(Decl::Service(rebuilt), meta)
                    .unwrap_or_else(|existing| existing);
                remap.insert(old_id, new_id);
                Ok(new_id)
            }
        }
    }
}

fn type_survives(typ: &TypeRef, keep: &IndexSet<TypeId>) -> bool {
    match typ {
        TypeRef::Scalar(_) => true,
        TypeRef::Resolved(id) => keep.contains(id),
        TypeRef::Named(_) => false,
    }
}

/// Rewrite every arena id in the rebuilt schema from old numbering to new.
fn remap_references(out: &mut Schema, remap: &HashMap<TypeId, TypeId>) {
    let map = |typ: &mut TypeRef| {
        if let TypeRef::Resolved(id) = typ
            && let Some(&new_id) = remap.get(id)
        {
            *typ = TypeRef::Resolved(new_id);
        }
    };
    let map_options = |resolved: &mut Vec<TypeId>| {
        *resolved = resolved
            .iter()
            .filter_map(|id| remap.get(id).copied())
            .collect();
    };

    for index in 0..out.decl_count() {
        let id = TypeId::new(index);
        match out.get_mut(id) {
            Decl::Message(message) => {
                map_options(&mut message.options.resolved_types);
                for oneof in &mut message.oneofs {
                    map_options(&mut oneof.options.resolved_types);
                }
                for field in &mut message.fields {
                    map(&mut field.typ);
                    map_options(&mut field.options.resolved_types);
                }
            }
            Decl::Enum(en) => {
                map_options(&mut en.options.resolved_types);
                for constant in &mut en.constants {
                    map_options(&mut constant.options.resolved_types);
                }
            }
            Decl::Service(service) => {
                map_options(&mut service.options.resolved_types);
                for rpc in &mut service.rpcs {
                    map(&mut rpc.request_type);
                    map(&mut rpc.response_type);
                    map_options(&mut rpc.options.resolved_types);
                }
            }
        }
    }

    for index in 0..out.files().len() {
        let fid = FileId::new(index);
        for extend in &mut out.file_mut(fid).extends {
            if let Some(&new_id) = remap.get(&extend.extendee) {
                extend.extendee = new_id;
            }
            for field in &mut extend.fields {
                map(&mut field.typ);
                map_options(&mut field.options.resolved_types);
            }
        }
        let file = out.file_mut(fid);
        map_options(&mut file.options.resolved_types);
    }
}
