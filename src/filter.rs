//! Hierarchy-preserving subtree filtering.
//!
//! Given a forest of [`Node`]s, keep every node that matches the query plus
//! the ancestor path needed to reach it, pruning everything else. A node
//! that matches directly is kept whole, its subtree untouched; a node kept
//! only for a matching descendant has its children replaced by the filtered
//! subset.
//!
//! The filter consumes its input and returns the new authoritative forest.
//! Directly matched nodes are moved through unmodified; there is no aliasing
//! between the input and the result.

use crate::tree::Node;

/// The node attribute a filter query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Id,
    Title,
    Tag,
    Url,
}

impl FilterKey {
    fn value(self, node: &Node) -> Option<&str> {
        match self {
            FilterKey::Id => Some(node.id.as_str()),
            FilterKey::Title => node.title.as_deref(),
            FilterKey::Tag => Some(node.tag.as_str()),
            FilterKey::Url => node.url.as_deref(),
        }
    }
}

/// Filter a forest by attribute match.
///
/// A node matches when ANY query value matches its `key` attribute: strict
/// equality in `exact` mode, substring containment otherwise. An absent
/// attribute (untitled node, folder without url) never matches in either
/// mode.
///
/// Top-level order is preserved. Recursion is bounded only by tree depth.
pub fn filter_nodes<S: AsRef<str>>(
    nodes: Vec<Node>,
    key: FilterKey,
    query: &[S],
    exact: bool,
) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| filter_node(node, key, query, exact))
        .collect()
}

fn filter_node<S: AsRef<str>>(mut node: Node, key: FilterKey, query: &[S], exact: bool) -> Option<Node> {
    // A direct match keeps the entire subtree; descendants are not examined.
    if matches(&node, key, query, exact) {
        return Some(node);
    }

    let children = std::mem::take(&mut node.children);
    let kept = filter_nodes(children, key, query, exact);
    if kept.is_empty() {
        return None;
    }
    node.children = kept;
    Some(node)
}

fn matches<S: AsRef<str>>(node: &Node, key: FilterKey, query: &[S], exact: bool) -> bool {
    let Some(value) = key.value(node) else {
        return false;
    };
    if exact {
        query.iter().any(|q| value == q.as_ref())
    } else {
        query.iter().any(|q| value.contains(q.as_ref()))
    }
}
