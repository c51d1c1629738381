// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folder tree of the documentation library.
//!
//! An item is only reachable when the principal may view the item itself and every folder on the
//! path leading to it. Items whose parent is missing from the tree are never reachable.
use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use thiserror::Error;
use tracing::warn;

use crate::principal::Principal;
use crate::resolver::{AccessResolver, Snapshot};
use crate::target::DocumentationItem;
use crate::traits::DomainDirectory;

/// Documentation items arranged by their `parent_id` links.
#[derive(Clone, Debug, Default)]
pub struct DocumentationTree {
    items: Vec<DocumentationItem>,
    index: HashMap<String, usize>,

    /// Edges point from parent to child.
    graph: DiGraphMap<usize, ()>,

    /// Items referencing a parent which is not part of the tree.
    orphans: HashSet<usize>,
}

impl DocumentationTree {
    /// Build the tree, rejecting duplicate ids and cyclic parent links.
    pub fn new<I>(items: I) -> Result<Self, DocumentationTreeError>
    where
        I: IntoIterator<Item = DocumentationItem>,
    {
        let mut tree = Self::default();

        for item in items {
            let idx = tree.items.len();
            if tree.index.insert(item.id.clone(), idx).is_some() {
                return Err(DocumentationTreeError::DuplicateItem(item.id));
            }
            tree.graph.add_node(idx);
            tree.items.push(item);
        }

        for (idx, item) in tree.items.iter().enumerate() {
            let Some(parent_id) = &item.parent_id else {
                continue;
            };

            if parent_id == &item.id {
                return Err(DocumentationTreeError::Cycle(item.id.clone()));
            }

            match tree.index.get(parent_id) {
                Some(parent) => {
                    tree.graph.add_edge(*parent, idx, ());
                }
                None => {
                    warn!(item = %item.id, parent = %parent_id, "documentation item has no parent");
                    tree.orphans.insert(idx);
                }
            }
        }

        if let Err(cycle) = toposort(&tree.graph, None) {
            return Err(DocumentationTreeError::Cycle(
                tree.items[cycle.node_id()].id.clone(),
            ));
        }

        Ok(tree)
    }

    pub fn get(&self, id: &str) -> Option<&DocumentationItem> {
        self.index.get(id).map(|idx| &self.items[*idx])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Folders leading to the given item, root first. `None` if the item is unknown.
    pub fn ancestors(&self, id: &str) -> Option<Vec<&DocumentationItem>> {
        let mut current = *self.index.get(id)?;
        let mut path = Vec::new();

        while let Some(parent) = self.parent_of(current) {
            path.push(&self.items[parent]);
            current = parent;
        }

        path.reverse();
        Some(path)
    }

    /// Direct children of a folder, or the root items when `parent` is `None`, in insertion
    /// order.
    pub fn children(&self, parent: Option<&str>) -> Vec<&DocumentationItem> {
        let mut children: Vec<usize> = match parent {
            Some(parent) => match self.index.get(parent) {
                Some(parent) => self
                    .graph
                    .neighbors_directed(*parent, Direction::Outgoing)
                    .collect(),
                None => return Vec::new(),
            },
            None => (0..self.items.len())
                .filter(|idx| self.is_root(*idx))
                .collect(),
        };

        children.sort_unstable();
        children.into_iter().map(|idx| &self.items[idx]).collect()
    }

    /// All items below the given one, excluding the item itself.
    pub fn descendants(&self, id: &str) -> Vec<&DocumentationItem> {
        let Some(start) = self.index.get(id) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut dfs = Dfs::new(&self.graph, *start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != *start {
                found.push(idx);
            }
        }

        found.sort_unstable();
        found.into_iter().map(|idx| &self.items[idx]).collect()
    }

    /// Returns `true` if the principal may view the item and every folder above it.
    pub fn can_reach<D>(
        &self,
        resolver: &AccessResolver,
        principal: Option<&Principal>,
        id: &str,
        snapshot: &Snapshot<'_, D>,
    ) -> bool
    where
        D: DomainDirectory,
    {
        let Some(idx) = self.index.get(id) else {
            return false;
        };

        if self.detached(*idx) {
            return false;
        }

        let Some(ancestors) = self.ancestors(id) else {
            return false;
        };

        resolver.can_view(principal, &self.items[*idx], snapshot)
            && ancestors
                .into_iter()
                .all(|folder| resolver.can_view(principal, folder, snapshot))
    }

    /// Reachable direct children of a folder, or reachable roots when `parent` is `None`.
    pub fn visible_children<D>(
        &self,
        resolver: &AccessResolver,
        principal: Option<&Principal>,
        parent: Option<&str>,
        snapshot: &Snapshot<'_, D>,
    ) -> Vec<&DocumentationItem>
    where
        D: DomainDirectory,
    {
        if let Some(parent) = parent {
            if !self.can_reach(resolver, principal, parent, snapshot) {
                return Vec::new();
            }
        }

        self.children(parent)
            .into_iter()
            .filter(|item| !self.index.get(&item.id).is_some_and(|idx| self.detached(*idx)))
            .filter(|item| resolver.can_view(principal, *item, snapshot))
            .collect()
    }

    fn parent_of(&self, idx: usize) -> Option<usize> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn is_root(&self, idx: usize) -> bool {
        self.parent_of(idx).is_none() && !self.orphans.contains(&idx)
    }

    /// Returns `true` if the item or one of its ancestors references a missing parent.
    fn detached(&self, idx: usize) -> bool {
        let mut current = idx;
        loop {
            if self.orphans.contains(&current) {
                return true;
            }
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentationTreeError {
    #[error("documentation item {0} appears more than once")]
    DuplicateItem(String),

    #[error("documentation item {0} is part of a parent cycle")]
    Cycle(String),
}
