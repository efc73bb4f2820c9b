use std::sync::Arc;

use tracing::debug;

use droid_use_core::Selector;

use crate::platform::NodeHandle;
use crate::platform::UiTree;

/// Guard against pathologically deep (or looping) trees.
const MAX_WALK_DEPTH: usize = 64;

/// The four point-in-time projections of the live tree the server can
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    All,
    Interactive,
    Clickable,
    ByText(String),
}

/// Walks the live accessibility tree and produces (projection, handle)
/// pairs. Callers own the returned handles: cache them or let them drop.
pub struct NodeQueryEngine {
    tree: Arc<dyn UiTree>,
}

impl NodeQueryEngine {
    pub fn new(tree: Arc<dyn UiTree>) -> Self {
        Self { tree }
    }

    /// Collects every node matching `kind` from the active window.
    ///
    /// An unavailable root or a root that fails its liveness refresh is
    /// the normal "nothing to show yet" case and yields an empty list,
    /// never an error. Individual nodes going stale mid-walk are skipped;
    /// the walk continues with their siblings.
    pub fn query(&self, kind: &QueryKind) -> Vec<(Selector, NodeHandle)> {
        let Some(root) = self.tree.active_root() else {
            debug!("query skipped: no active root");
            return Vec::new();
        };
        if !root.refresh() {
            debug!("query skipped: root failed liveness refresh");
            return Vec::new();
        }

        let mut out = Vec::new();
        walk(&root, kind, 0, &mut out);
        debug!(kind = ?kind, count = out.len(), "tree query complete");
        out
    }

    pub fn query_all(&self) -> Vec<(Selector, NodeHandle)> {
        self.query(&QueryKind::All)
    }

    pub fn query_interactive(&self) -> Vec<(Selector, NodeHandle)> {
        self.query(&QueryKind::Interactive)
    }

    pub fn query_clickable(&self) -> Vec<(Selector, NodeHandle)> {
        self.query(&QueryKind::Clickable)
    }

    pub fn query_by_text(&self, needle: &str) -> Vec<(Selector, NodeHandle)> {
        self.query(&QueryKind::ByText(needle.to_string()))
    }
}

fn walk(node: &NodeHandle, kind: &QueryKind, depth: usize, out: &mut Vec<(Selector, NodeHandle)>) {
    if depth > MAX_WALK_DEPTH {
        return;
    }

    // A node that goes stale between observation and projection is
    // skipped; its subtree is still attempted below.
    if let Ok(projection) = node.project() {
        if matches(node, kind, &projection) {
            if let Ok(owned) = node.duplicate() {
                out.push((projection, owned));
            }
        }
    }

    let child_count = node.child_count().unwrap_or(0);
    for index in 0..child_count {
        match node.child(index) {
            Ok(Some(child)) => walk(&child, kind, depth + 1, out),
            Ok(None) => {}
            // The parent itself went stale: no further children are
            // reachable from it.
            Err(_) => break,
        }
    }
}

fn matches(node: &NodeHandle, kind: &QueryKind, projection: &Selector) -> bool {
    match kind {
        QueryKind::All => true,
        QueryKind::Interactive => {
            let visible = node.is_visible().unwrap_or(false);
            let focusable = node.is_focusable().unwrap_or(false);
            visible && (projection.is_clickable || projection.is_long_clickable || focusable)
        }
        QueryKind::Clickable => {
            let visible = node.is_visible().unwrap_or(false);
            visible && (projection.is_clickable || projection.is_long_clickable)
        }
        QueryKind::ByText(needle) => {
            let visible = node.is_visible().unwrap_or(false);
            if !visible {
                return false;
            }
            let needle = needle.to_lowercase();
            let text_matches = projection
                .text
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            let desc_matches = projection
                .content_desc
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            text_matches || desc_matches
        }
    }
}
