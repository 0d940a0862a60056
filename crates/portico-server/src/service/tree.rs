//! Flat-to-tree reconstruction of a namespace's resources

use std::collections::HashMap;

use serde::Serialize;

use portico_common::{PorticoError, PorticoResult};
use portico_persistence::{MethodInfo, ResourceInfo};

/// Deepest nesting accepted on write and rebuilt on read; a root is level 1
pub const MAX_RESOURCE_DEPTH: usize = 32;

/// A resource together with the methods loaded for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceWithMethods {
    pub resource: ResourceInfo,
    pub methods: Vec<MethodInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    #[serde(flatten)]
    pub resource: ResourceInfo,
    pub methods: Vec<MethodInfo>,
    pub child_resources: Vec<ResourceNode>,
}

impl ResourceNode {
    /// Number of nodes in this subtree, including `self`
    pub fn size(&self) -> usize {
        1 + self
            .child_resources
            .iter()
            .map(ResourceNode::size)
            .sum::<usize>()
    }
}

/// Build the forest of `records`.
///
/// Roots and every `childResources` list keep input order. `records` must be
/// the complete resource set of one namespace: a parent id missing from it,
/// a duplicate id, a parent cycle, or nesting deeper than
/// [`MAX_RESOURCE_DEPTH`] fails with `Integrity` instead of dropping part of
/// the tree.
pub fn build_resource_tree(records: Vec<ResourceWithMethods>) -> PorticoResult<Vec<ResourceNode>> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.resource.id.as_str(), pos).is_some() {
                return Err(PorticoError::Integrity(format!(
                    "resource '{}' appears more than once",
                    record.resource.id
                )));
            }
        }

        for (pos, record) in records.iter().enumerate() {
            match record.resource.parent_resource_id.as_deref() {
                Some(parent_id) => {
                    let parent = index.get(parent_id).ok_or_else(|| {
                        PorticoError::Integrity(format!(
                            "resource '{}' references parent '{}' outside the loaded set",
                            record.resource.id, parent_id
                        ))
                    })?;
                    children[*parent].push(pos);
                }
                None => roots.push(pos),
            }
        }
    }

    let total = records.len();
    let mut slots: Vec<Option<ResourceWithMethods>> = records.into_iter().map(Some).collect();
    let mut placed = 0;
    let forest = roots
        .iter()
        .map(|&pos| assemble(pos, 1, &mut slots, &children, &mut placed))
        .collect::<PorticoResult<Vec<_>>>()?;

    if placed != total {
        return Err(PorticoError::Integrity(format!(
            "{} of {} resources are not reachable from a root",
            total - placed,
            total
        )));
    }

    Ok(forest)
}

fn assemble(
    pos: usize,
    depth: usize,
    slots: &mut [Option<ResourceWithMethods>],
    children: &[Vec<usize>],
    placed: &mut usize,
) -> PorticoResult<ResourceNode> {
    if depth > MAX_RESOURCE_DEPTH {
        return Err(PorticoError::Integrity(format!(
            "resources nest deeper than {MAX_RESOURCE_DEPTH} levels"
        )));
    }
    let record = slots[pos].take().ok_or_else(|| {
        PorticoError::Integrity(format!("resource at position {pos} reached twice"))
    })?;
    *placed += 1;

    let child_resources = children[pos]
        .iter()
        .map(|&child| assemble(child, depth + 1, slots, children, placed))
        .collect::<PorticoResult<Vec<_>>>()?;

    Ok(ResourceNode {
        resource: record.resource,
        methods: record.methods,
        child_resources,
    })
}
