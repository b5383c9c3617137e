//! The administrative tree.
//!
//! [`TenantHierarchy`] is built once from the node list the backend returns
//! and then only read. Construction validates the level rules so that every
//! later ancestor walk can assume a well-formed tree.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::TenantId;
use super::level::TenantType;
use crate::error::HierarchyError;

/// A single node of the administrative hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantNode {
    /// Node identifier.
    pub id: TenantId,
    /// Administrative level.
    #[serde(rename = "type")]
    pub tenant_type: TenantType,
    /// Display name.
    pub name: String,
    /// Parent node; `None` only for the bureau.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TenantId>,
}

impl TenantNode {
    /// Creates a node.
    pub fn new(
        id: impl Into<TenantId>,
        tenant_type: TenantType,
        name: impl Into<String>,
        parent_id: Option<TenantId>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_type,
            name: name.into(),
            parent_id,
        }
    }
}

/// A validated, read-only administrative tree.
///
/// # Examples
///
/// ```
/// use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};
///
/// let hierarchy = TenantHierarchy::from_nodes(vec![
///     TenantNode::new("bureau", TenantType::Bureau, "Education Bureau", None),
///     TenantNode::new("r-1", TenantType::Region, "Region 1", Some("bureau".into())),
///     TenantNode::new("z-1", TenantType::Zone, "Zone 1", Some("r-1".into())),
/// ])
/// .unwrap();
///
/// assert!(hierarchy.is_descendant_of(&TenantId::new("z-1"), &TenantId::new("bureau")));
/// assert_eq!(hierarchy.subtree(&TenantId::new("r-1")).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TenantHierarchy {
    nodes: HashMap<TenantId, TenantNode>,
    children: HashMap<TenantId, Vec<TenantId>>,
    root: Option<TenantId>,
}

impl TenantHierarchy {
    /// Builds a hierarchy from an unordered node list.
    ///
    /// Children keep the relative order in which they were supplied.
    pub fn from_nodes(
        nodes: impl IntoIterator<Item = TenantNode>,
    ) -> Result<Self, HierarchyError> {
        let mut ordered: Vec<TenantId> = Vec::new();
        let mut by_id: HashMap<TenantId, TenantNode> = HashMap::new();
        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(HierarchyError::DuplicateNode { tenant_id: node.id });
            }
            ordered.push(node.id.clone());
            by_id.insert(node.id.clone(), node);
        }

        let mut root: Option<TenantId> = None;
        let mut children: HashMap<TenantId, Vec<TenantId>> = HashMap::new();

        for id in &ordered {
            let node = &by_id[id];
            match (&node.parent_id, node.tenant_type.is_root()) {
                (Some(_), true) => {
                    return Err(HierarchyError::RootWithParent {
                        tenant_id: node.id.clone(),
                    });
                }
                (None, true) => {
                    if let Some(first) = &root {
                        return Err(HierarchyError::MultipleRoots {
                            first: first.clone(),
                            second: node.id.clone(),
                        });
                    }
                    root = Some(node.id.clone());
                }
                (None, false) => {
                    return Err(HierarchyError::MissingParent {
                        tenant_id: node.id.clone(),
                        tenant_type: node.tenant_type,
                    });
                }
                (Some(parent_id), false) => {
                    let parent =
                        by_id
                            .get(parent_id)
                            .ok_or_else(|| HierarchyError::UnknownParent {
                                tenant_id: node.id.clone(),
                                parent_id: parent_id.clone(),
                            })?;
                    if !node.tenant_type.accepts_parent(parent.tenant_type) {
                        return Err(HierarchyError::InvalidParentLevel {
                            tenant_id: node.id.clone(),
                            tenant_type: node.tenant_type,
                            parent_type: parent.tenant_type,
                        });
                    }
                    children
                        .entry(parent_id.clone())
                        .or_default()
                        .push(node.id.clone());
                }
            }
        }

        debug!(nodes = by_id.len(), root = ?root, "Built tenant hierarchy");

        Ok(Self {
            nodes: by_id,
            children,
            root,
        })
    }

    /// Returns the bureau node, if the hierarchy has one.
    pub fn root(&self) -> Option<&TenantNode> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    /// Looks up a node.
    pub fn get(&self, id: &TenantId) -> Option<&TenantNode> {
        self.nodes.get(id)
    }

    /// Returns `true` if the node exists.
    pub fn contains(&self, id: &TenantId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the level of a node.
    pub fn tenant_type(&self, id: &TenantId) -> Option<TenantType> {
        self.nodes.get(id).map(|node| node.tenant_type)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the hierarchy has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children of a node, in supply order.
    pub fn children(&self, id: &TenantId) -> &[TenantId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over the ancestors of a node, from its parent up to the root.
    pub fn ancestors<'a>(&'a self, id: &TenantId) -> Ancestors<'a> {
        Ancestors {
            hierarchy: self,
            next: self.nodes.get(id).and_then(|node| node.parent_id.as_ref()),
        }
    }

    /// Returns `true` if `candidate` sits strictly below `ancestor`.
    ///
    /// A node is not its own descendant.
    pub fn is_descendant_of(&self, candidate: &TenantId, ancestor: &TenantId) -> bool {
        self.ancestors(candidate).any(|node| &node.id == ancestor)
    }

    /// Returns `true` if `candidate` is `root` or one of its descendants.
    pub fn is_within(&self, candidate: &TenantId, root: &TenantId) -> bool {
        if !self.contains(candidate) {
            return false;
        }
        candidate == root || self.is_descendant_of(candidate, root)
    }

    /// Collects the membership index for the subtree rooted at `id`.
    ///
    /// The index includes `id` itself. An unknown `id` yields an empty index.
    pub fn subtree(&self, id: &TenantId) -> SubtreeIndex {
        let mut members = HashSet::new();
        if self.contains(id) {
            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                members.insert(current.clone());
                stack.extend(self.children(current));
            }
        }
        SubtreeIndex {
            root: id.clone(),
            members,
        }
    }

    /// Returns every node of `tenant_type` inside the subtree rooted at `id`,
    /// in depth-first supply order.
    pub fn descendants_of_type(&self, id: &TenantId, tenant_type: TenantType) -> Vec<&TenantNode> {
        let mut found = Vec::new();
        let mut stack: Vec<&TenantId> = self.children(id).iter().rev().collect();
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if node.tenant_type == tenant_type {
                found.push(node);
            }
            if node.tenant_type < tenant_type {
                stack.extend(self.children(current).iter().rev());
            }
        }
        found
    }

    /// Renames a node. Identity, level and parent are immutable.
    pub fn rename(&mut self, id: &TenantId, name: impl Into<String>) -> Result<(), HierarchyError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| HierarchyError::UnknownTenant {
                tenant_id: id.clone(),
            })?;
        node.name = name.into();
        Ok(())
    }
}

/// Iterator over ancestor nodes, from immediate parent to root.
pub struct Ancestors<'a> {
    hierarchy: &'a TenantHierarchy,
    next: Option<&'a TenantId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TenantNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.hierarchy.nodes.get(self.next?)?;
        self.next = node.parent_id.as_ref();
        Some(node)
    }
}

/// Precomputed membership of one subtree.
///
/// Built once per effective tenant and reused across a whole filter pass so
/// that each record costs a single hash lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeIndex {
    root: TenantId,
    members: HashSet<TenantId>,
}

impl SubtreeIndex {
    /// The node the subtree is rooted at.
    pub fn root(&self) -> &TenantId {
        &self.root
    }

    /// Returns `true` if `id` is the root or one of its descendants.
    pub fn contains(&self, id: &TenantId) -> bool {
        self.members.contains(id)
    }

    /// Number of nodes in the subtree.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the root was not part of the hierarchy.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
