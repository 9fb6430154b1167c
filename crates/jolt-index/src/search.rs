//! Hierarchy-wide searches: override families, occurrences and subclasses.

use std::collections::{BTreeMap, HashSet};

use jolt_core::FileId;
use jolt_syntax::ast::NodeId;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::model::{keys_match, MethodId, TypeId};
use crate::workspace::Workspace;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("search cancelled")]
pub struct Cancelled;

fn check(cancel: &CancellationToken) -> Result<(), Cancelled> {
    if cancel.is_cancelled() {
        tracing::debug!(target: "jolt.index", "search cancelled");
        return Err(Cancelled);
    }
    Ok(())
}

impl Workspace {
    /// `method` plus every method it overrides or is overridden by, directly
    /// or through a shared implementation, sorted by id. Constructors, static
    /// and private methods form a family of one.
    pub fn override_family(
        &self,
        method: MethodId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MethodId>, Cancelled> {
        let model = self.model();
        let info = model.method(method);
        if !info.is_virtual() {
            return Ok(vec![method]);
        }

        let mut family = vec![method];
        let mut seen = HashSet::from([method]);
        let mut queue = vec![method];
        while let Some(next) = queue.pop() {
            check(cancel)?;
            let next_info = model.method(next);
            let owner = next_info.declaring_type;

            let mut related: Vec<TypeId> = model.supertypes_and_self(owner);
            for sub in model.all_subtypes(owner) {
                related.extend(model.supertypes_and_self(sub));
            }
            let mut visited = HashSet::new();
            related.retain(|ty| visited.insert(*ty));

            for ty in related {
                for &candidate in &model.type_info(ty).methods {
                    if seen.contains(&candidate) {
                        continue;
                    }
                    let candidate_info = model.method(candidate);
                    if candidate_info.is_virtual()
                        && candidate_info.name == next_info.name
                        && keys_match(&candidate_info.param_keys, &next_info.param_keys)
                    {
                        seen.insert(candidate);
                        family.push(candidate);
                        queue.push(candidate);
                    }
                }
            }
        }
        family.sort();
        tracing::debug!(
            target: "jolt.index",
            method = %model.method_label(method),
            size = family.len(),
            "override family"
        );
        Ok(family)
    }

    /// Nodes bound to any of `methods`, grouped per file in source order.
    /// Declarations are included.
    pub fn occurrences(
        &self,
        methods: &[MethodId],
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<FileId, Vec<NodeId>>, Cancelled> {
        let mut out = BTreeMap::new();
        for unit in self.units() {
            check(cancel)?;
            let mut nodes: Vec<NodeId> = unit.bindings.nodes_bound_to(methods).collect();
            if nodes.is_empty() {
                continue;
            }
            nodes.sort();
            out.insert(unit.file.clone(), nodes);
        }
        tracing::debug!(
            target: "jolt.index",
            files = out.len(),
            nodes = out.values().map(Vec::len).sum::<usize>(),
            "occurrences"
        );
        Ok(out)
    }

    /// Named classes declared in source whose super class is `ty`.
    pub fn direct_subclasses(&self, ty: TypeId) -> Vec<TypeId> {
        self.model()
            .types()
            .filter(|info| info.super_class == Some(ty))
            .filter(|info| !info.is_anonymous() && !info.is_interface() && info.origin.is_source())
            .map(|info| info.id)
            .collect()
    }
}
