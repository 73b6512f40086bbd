//! Namespace tree: hierarchical storage and traversal of event listeners.
//!
//! Each [`EventLevel`] is one tree location holding the listeners registered
//! at that exact path plus a map of named children. The tree treats
//! `player.inventory.changed` as:
//!
//! - root -> "player" -> "inventory" -> "changed"
//!
//! The facade owns exactly one root level per namespace universe; parents own
//! their children exclusively, and the only upward traversal (the ancestor
//! chain) starts at the root, so no back-references are needed.

use crate::events::EventHandler;
use compact_str::CompactString;
use std::collections::HashMap;
use std::sync::Arc;

/// Selector deciding what a cancellation removes at the resolved level.
#[derive(Debug, Clone, Default)]
pub enum Cancel {
    /// Detach the level and its entire subtree.
    #[default]
    All,
    /// Clear only the level's local listener set, keeping its children.
    LocalOnly,
    /// Remove the one entry matching this exact listener reference.
    Listener(Arc<dyn EventHandler>),
}

/// Selector deciding what an existence query looks for.
#[derive(Debug, Clone)]
pub enum Query {
    /// At least one listener, whichever it is.
    Any,
    /// This exact listener reference.
    Listener(Arc<dyn EventHandler>),
}

impl Query {
    fn matches(&self, listeners: &[Arc<dyn EventHandler>]) -> bool {
        match self {
            Query::Any => !listeners.is_empty(),
            Query::Listener(target) => {
                listeners.iter().any(|l| Arc::ptr_eq(l, target))
            }
        }
    }
}

/// A node in the namespace tree.
///
/// The local listener set is insertion-ordered and identity-de-duplicated:
/// registering the same `Arc` twice at the same level stores it once, and a
/// single trigger invokes it once. Listener sets are only ever dispatched
/// from a snapshot, so a listener that mutates the tree mid-dispatch never
/// affects the current pass.
#[derive(Debug, Default)]
pub struct EventLevel {
    /// Listeners registered at this exact path.
    listeners: Vec<Arc<dyn EventHandler>>,
    /// Child levels keyed by path segment.
    children: HashMap<CompactString, EventLevel>,
}

impl EventLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the tree following `path` without mutating it.
    ///
    /// Returns `None` as soon as a required segment is missing; the empty
    /// path resolves to this level.
    pub fn descend(&self, path: &[CompactString]) -> Option<&EventLevel> {
        let mut current = self;
        for segment in path {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    fn descend_mut(&mut self, path: &[CompactString]) -> Option<&mut EventLevel> {
        let mut current = self;
        for segment in path {
            current = current.children.get_mut(segment)?;
        }
        Some(current)
    }

    /// Walks the tree following `path`, creating missing levels as empty
    /// nodes linked under the preceding level.
    pub fn descend_or_create(&mut self, path: &[CompactString]) -> &mut EventLevel {
        let mut current = self;
        for segment in path {
            current = current.children.entry(segment.clone()).or_default();
        }
        current
    }

    /// Resolves `path` with auto-create and adds `handler` to the local set.
    ///
    /// Returns `false` when the identical reference is already registered at
    /// that level (set semantics).
    pub fn add_listener(
        &mut self,
        path: &[CompactString],
        handler: Arc<dyn EventHandler>,
    ) -> bool {
        let level = self.descend_or_create(path);
        if level
            .listeners
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &handler))
        {
            return false;
        }
        level.listeners.push(handler);
        true
    }

    /// Removes listeners at `path` per `selector`; missing paths are a no-op.
    ///
    /// Returns the number of listener entries removed, counting the whole
    /// subtree for [`Cancel::All`].
    pub fn remove_listeners(&mut self, path: &[CompactString], selector: &Cancel) -> usize {
        match selector {
            Cancel::All => {
                if let Some((last, parents)) = path.split_last() {
                    match self.descend_mut(parents) {
                        Some(parent) => parent
                            .children
                            .remove(last)
                            .map(|subtree| subtree.total_listeners())
                            .unwrap_or(0),
                        None => 0,
                    }
                } else {
                    // Cancelling the root clears the whole universe.
                    let removed = self.total_listeners();
                    self.listeners.clear();
                    self.children.clear();
                    removed
                }
            }
            Cancel::LocalOnly => match self.descend_mut(path) {
                Some(level) => {
                    let removed = level.listeners.len();
                    level.listeners.clear();
                    removed
                }
                None => 0,
            },
            Cancel::Listener(target) => match self.descend_mut(path) {
                Some(level) => {
                    let before = level.listeners.len();
                    level.listeners.retain(|l| !Arc::ptr_eq(l, target));
                    before - level.listeners.len()
                }
                None => 0,
            },
        }
    }

    /// Clears the local listener sets of the level's entire subtree,
    /// detaching the children; `include_self` also clears the level's own set
    /// (the level itself stays attached).
    pub fn clear_descendants(&mut self, path: &[CompactString], include_self: bool) -> usize {
        match self.descend_mut(path) {
            Some(level) => {
                let mut removed: usize = level
                    .children
                    .drain()
                    .map(|(_, subtree)| subtree.total_listeners())
                    .sum();
                if include_self {
                    removed += level.listeners.len();
                    level.listeners.clear();
                }
                removed
            }
            None => 0,
        }
    }

    /// Clears local listener sets from the root down to the level at `path`,
    /// stopping early when the chain breaks; `include_self` controls the
    /// terminal level.
    pub fn clear_ancestors(&mut self, path: &[CompactString], include_self: bool) -> usize {
        let mut removed = 0;
        let mut current = self;
        for segment in path {
            removed += current.listeners.len();
            current.listeners.clear();
            match current.children.get_mut(segment) {
                Some(child) => current = child,
                None => return removed,
            }
        }
        if include_self {
            removed += current.listeners.len();
            current.listeners.clear();
        }
        removed
    }

    /// Snapshots the listeners local to the level at `path`.
    pub fn collect_local(&self, path: &[CompactString], out: &mut Vec<Arc<dyn EventHandler>>) {
        if let Some(level) = self.descend(path) {
            out.extend(level.listeners.iter().cloned());
        }
    }

    /// Snapshots the level's own listeners (if `include_self`) followed by a
    /// depth-first pre-order walk of its subtree.
    ///
    /// Pre-order guarantees root-to-leaf order along any chain; sibling order
    /// follows the child map and is unspecified.
    pub fn collect_descendants(
        &self,
        path: &[CompactString],
        include_self: bool,
        out: &mut Vec<Arc<dyn EventHandler>>,
    ) {
        if let Some(level) = self.descend(path) {
            if include_self {
                out.extend(level.listeners.iter().cloned());
            }
            for child in level.children.values() {
                child.collect_subtree(out);
            }
        }
    }

    fn collect_subtree(&self, out: &mut Vec<Arc<dyn EventHandler>>) {
        out.extend(self.listeners.iter().cloned());
        for child in self.children.values() {
            child.collect_subtree(out);
        }
    }

    /// Snapshots listeners along the chain from the root to the level at
    /// `path`, in root-to-leaf order, stopping early when a segment is
    /// missing; `include_self` controls the terminal level.
    pub fn collect_ancestors(
        &self,
        path: &[CompactString],
        include_self: bool,
        out: &mut Vec<Arc<dyn EventHandler>>,
    ) {
        let mut current = self;
        for segment in path {
            out.extend(current.listeners.iter().cloned());
            match current.children.get(segment) {
                Some(child) => current = child,
                None => return,
            }
        }
        if include_self {
            out.extend(current.listeners.iter().cloned());
        }
    }

    /// Whether the level at `path` matches `query`; missing paths are `false`.
    pub fn has(&self, path: &[CompactString], query: &Query) -> bool {
        self.descend(path)
            .map_or(false, |level| query.matches(&level.listeners))
    }

    /// Whether the level (if `include_self`) or any level in its subtree
    /// matches `query`.
    pub fn has_descendants(
        &self,
        path: &[CompactString],
        query: &Query,
        include_self: bool,
    ) -> bool {
        match self.descend(path) {
            Some(level) => {
                (include_self && query.matches(&level.listeners))
                    || level.children.values().any(|c| c.subtree_has(query))
            }
            None => false,
        }
    }

    fn subtree_has(&self, query: &Query) -> bool {
        query.matches(&self.listeners) || self.children.values().any(|c| c.subtree_has(query))
    }

    /// Whether any level on the root-to-`path` chain matches `query`;
    /// `include_self` controls the terminal level.
    pub fn has_ancestors(
        &self,
        path: &[CompactString],
        query: &Query,
        include_self: bool,
    ) -> bool {
        let mut current = self;
        for segment in path {
            if query.matches(&current.listeners) {
                return true;
            }
            match current.children.get(segment) {
                Some(child) => current = child,
                None => return false,
            }
        }
        include_self && query.matches(&current.listeners)
    }

    /// Total number of listener entries in this level and its subtree.
    pub fn total_listeners(&self) -> usize {
        let mut count = self.listeners.len();
        for child in self.children.values() {
            count += child.total_listeners();
        }
        count
    }

    /// Number of listeners local to the level at `path`.
    pub fn listener_count_at(&self, path: &[CompactString]) -> usize {
        self.descend(path).map_or(0, |level| level.listeners.len())
    }

    /// All paths with at least one listener (for debugging/stats).
    pub fn registered_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_registered_paths("", &mut paths);
        paths
    }

    fn collect_registered_paths(&self, current_path: &str, paths: &mut Vec<String>) {
        if !self.listeners.is_empty() && !current_path.is_empty() {
            paths.push(current_path.to_string());
        }
        for (segment, child) in &self.children {
            let child_path = if current_path.is_empty() {
                segment.to_string()
            } else {
                format!("{}.{}", current_path, segment)
            };
            child.collect_registered_paths(&child_path, paths);
        }
    }

    /// Finds registered paths similar to `target_path` for diagnostics when
    /// a trigger resolves no listeners.
    ///
    /// Traverses relevant branches first, which is much cheaper than scanning
    /// every registered path linearly.
    pub fn find_similar_paths(&self, target_path: &str, max_results: usize) -> Vec<String> {
        let target_parts: Vec<&str> = target_path.split('.').collect();
        let mut results = Vec::new();
        self.collect_similar_paths("", &target_parts, 0, &mut results, max_results);
        results
    }

    fn collect_similar_paths(
        &self,
        current_path: &str,
        target_parts: &[&str],
        depth: usize,
        results: &mut Vec<String>,
        max_results: usize,
    ) {
        if results.len() >= max_results {
            return;
        }

        if !self.listeners.is_empty() && !current_path.is_empty() {
            let current_parts: Vec<&str> = current_path.split('.').collect();
            if similarity(&current_parts, target_parts) > 0.0 {
                results.push(current_path.to_string());
            }
        }

        // Branches matching the target component at this depth first, the
        // rest afterwards.
        for pass in 0..2 {
            for (segment, child) in &self.children {
                if results.len() >= max_results {
                    return;
                }
                let matches_component =
                    depth < target_parts.len() && target_parts[depth] == segment.as_str();
                if (pass == 0) != matches_component {
                    continue;
                }
                let child_path = if current_path.is_empty() {
                    segment.to_string()
                } else {
                    format!("{}.{}", current_path, segment)
                };
                child.collect_similar_paths(
                    &child_path,
                    target_parts,
                    depth + 1,
                    results,
                    max_results,
                );
            }
        }
    }

    /// Reports structural issues: empty-shell levels left behind by targeted
    /// cancellations and levels with excessive listener counts.
    pub fn audit(&self, issues: &mut Vec<String>) {
        self.audit_inner("", issues);
    }

    fn audit_inner(&self, current_path: &str, issues: &mut Vec<String>) {
        if !current_path.is_empty() && self.listeners.is_empty() && self.children.is_empty() {
            issues.push(format!("Path '{}' is an empty shell", current_path));
        }
        if self.listeners.len() > 100 {
            let label = if current_path.is_empty() { "<root>" } else { current_path };
            issues.push(format!(
                "Path '{}' has excessive listeners: {}",
                label,
                self.listeners.len()
            ));
        }
        for (segment, child) in &self.children {
            let child_path = if current_path.is_empty() {
                segment.to_string()
            } else {
                format!("{}.{}", current_path, segment)
            };
            child.audit_inner(&child_path, issues);
        }
    }
}

/// Fraction of components shared between two paths, at any position.
fn similarity(path1: &[&str], path2: &[&str]) -> f32 {
    let max_len = path1.len().max(path2.len());
    if max_len == 0 {
        return 0.0;
    }
    let mut matches = 0;
    for component1 in path1 {
        if path2.iter().any(|component2| component1 == component2) {
            matches += 1;
        }
    }
    matches as f32 / max_len as f32
}
