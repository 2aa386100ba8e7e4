//! Reconstruction of the sidebar's pinned-item trees.
//!
//! The snapshot stores items as a flat, denormalized list: each record names
//! its children by id, and a space names its pinned-items root through the
//! `"pinned"` marker in `containerIDs`. This module joins those references
//! back into one owned tree per space.

use crate::importer::{ItemRecord, SidebarSnapshot, SpaceRecord};
use std::collections::{HashMap, HashSet};

/// Marker word preceding the pinned-items root id in `containerIDs`.
const PINNED_MARKER: &str = "pinned";

/// One entry in a reconstructed tree: a folder, a link, or both.
///
/// A node with children and no url is a folder; a node with a url is a saved
/// link. The two are not mutually exclusive (a pinned tab can carry nested
/// bookmarks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Item id, copied from the snapshot.
    pub id: String,
    /// Resolved display title: the record's own title if present, else the
    /// tab payload's saved title, else absent.
    pub title: Option<String>,
    /// The tab payload's saved URL, if any.
    pub url: Option<String>,
    /// Derived identifier path: `<parent tag or "arc">-<normalized title>`.
    /// Human-readable and stable across exports, but not guaranteed unique.
    pub tag: String,
    /// Owned children, in snapshot order.
    pub children: Vec<Node>,
}

impl Node {
    /// Number of saved links in this subtree, the node itself included.
    pub fn link_count(&self) -> usize {
        let own = usize::from(self.url.is_some());
        own + self.children.iter().map(Node::link_count).sum::<usize>()
    }
}

/// A sidebar space with its reconstructed pinned-items tree.
///
/// `root.children` are the space's pinned items; the root itself is the
/// invisible container item, renamed after the space.
#[derive(Debug, Clone)]
pub struct Space {
    pub id: String,
    pub title: String,
    pub root: Node,
}

/// Id → record index over the flat item list.
///
/// Built once per snapshot so child resolution is a lookup rather than a
/// linear scan. On duplicate ids the first record wins, matching the
/// first-match scan semantics of the snapshot format.
struct ItemIndex<'a> {
    by_id: HashMap<&'a str, &'a ItemRecord>,
}

impl<'a> ItemIndex<'a> {
    fn new(items: &'a [ItemRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        for item in items {
            by_id.entry(item.id.as_str()).or_insert(item);
        }
        Self { by_id }
    }

    fn get(&self, id: &str) -> Option<&'a ItemRecord> {
        self.by_id.get(id).copied()
    }
}

/// Reconstruct every space's pinned-items tree, in sidebar order.
///
/// A space whose `"pinned"` marker is missing, or whose root id resolves to
/// no item record, contributes nothing; such per-space failures never affect
/// the other spaces. A snapshot with no resolvable spaces yields an empty
/// vector.
pub fn build_spaces(snapshot: &SidebarSnapshot) -> Vec<Space> {
    let index = ItemIndex::new(&snapshot.items);
    snapshot
        .spaces
        .iter()
        .filter_map(|space| build_space(space, &index))
        .collect()
}

fn build_space(space: &SpaceRecord, index: &ItemIndex<'_>) -> Option<Space> {
    let marker = space.container_ids.iter().position(|r| r == PINNED_MARKER)?;
    let root_id = space.container_ids.get(marker + 1)?;
    let record = index.get(root_id)?;

    // The container item is untitled; the space name becomes the root's
    // display name and seeds every tag beneath it.
    let mut ancestors = HashSet::new();
    let root = build_node(record, Some(space.title.clone()), index, None, &mut ancestors);

    Some(Space {
        id: space.id.clone(),
        title: space.title.clone(),
        root,
    })
}

/// Recursively build the node for `record` and its entire subtree.
///
/// Children are resolved in `childrenIds` order; ids absent from the index
/// are skipped without a placeholder. `ancestors` holds the ids on the
/// current path: a child id already present would form a cycle and is
/// skipped exactly like a dangling reference.
fn build_node<'a>(
    record: &'a ItemRecord,
    title_override: Option<String>,
    index: &ItemIndex<'a>,
    parent_tag: Option<&str>,
    ancestors: &mut HashSet<&'a str>,
) -> Node {
    let tab = record.tab();
    let title = title_override
        .or_else(|| record.title.clone().filter(|t| !t.is_empty()))
        .or_else(|| tab.and_then(|t| t.saved_title.clone()));
    let url = tab.and_then(|t| t.saved_url.clone());

    let tag = format!(
        "{}-{}",
        parent_tag.unwrap_or("arc"),
        normalize_tag(title.as_deref().unwrap_or(""))
    );

    ancestors.insert(record.id.as_str());
    let mut children = Vec::new();
    for child_id in &record.children_ids {
        if ancestors.contains(child_id.as_str()) {
            continue;
        }
        if let Some(child) = index.get(child_id) {
            children.push(build_node(child, None, index, Some(tag.as_str()), ancestors));
        }
    }
    ancestors.remove(record.id.as_str());

    Node {
        id: record.id.clone(),
        title,
        url,
        tag,
        children,
    }
}

/// Lower-case and strip every run of non-word characters (`[^A-Za-z0-9_]`),
/// inserting no separator: `"My Space!"` → `"myspace"`.
fn normalize_tag(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
