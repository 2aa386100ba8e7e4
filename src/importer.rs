//! Complete, self-contained type definitions for Arc's sidebar snapshot schema.
//!
//! Storage format: a single JSON file, `StorableSidebar.json`, written by the
//! Arc browser into its application-support directory. The format is
//! undocumented and versioned only implicitly; these types track the subset
//! needed to reconstruct spaces and their pinned items.
//!
//! Snapshot shape:
//! ```json
//! {
//!   "sidebar": {
//!     "containers": [
//!       { ... },
//!       {
//!         "spaces": [ "<uuid>", { "id": "...", "title": "...", "containerIDs": [...] }, ... ],
//!         "items":  [ "<uuid>", { "id": "...", "childrenIds": [...], "data": { "tab": {...} } }, ... ]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! The synced container lives at `sidebar.containers[1]`. Both the `spaces`
//! and `items` arrays are heterogeneous: record objects interleaved with
//! plain id strings. Entries that do not deserialize as records are ignored.

use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Vendor envelope
// ---------------------------------------------------------------------------

/// Top-level document: `{ "sidebar": { "containers": [...] } }`.
#[derive(Debug, Deserialize)]
struct SidebarFile {
    sidebar: Sidebar,
}

/// The `containers` array mixes container kinds; only the synced container
/// (index 1) carries `spaces` and `items`, so entries stay untyped here.
#[derive(Debug, Deserialize)]
struct Sidebar {
    containers: Vec<serde_json::Value>,
}

/// The synced container: the two flat, denormalized collections that must be
/// joined to reconstruct the pinned-item trees.
#[derive(Debug, Deserialize)]
struct SyncedContainer {
    #[serde(default)]
    spaces: Vec<serde_json::Value>,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A sidebar space: a named top-level grouping of items.
///
/// `containerIDs` interleaves marker words with container item ids, e.g.
/// `["favorites", "<uuid>", "pinned", "<uuid>", "unpinned", "<uuid>"]`.
/// The id immediately after the literal `"pinned"` names the item record
/// that roots the space's pinned-items tree.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "containerIDs", default)]
    pub container_ids: Vec<String>,
}

/// A sidebar item: a folder, a pinned tab, or both.
///
/// `childrenIds` may reference ids absent from the snapshot (items can be
/// deleted while still referenced); such dangling ids are skipped during
/// tree construction.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "childrenIds")]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub data: Option<ItemData>,
}

/// The `data` variant payload. Only the tab payload is modeled; other
/// variants (lists, easels, splits) carry nothing the tree needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub tab: Option<TabPayload>,
}

/// Saved state of a pinned tab.
#[derive(Debug, Clone, Deserialize)]
pub struct TabPayload {
    #[serde(rename = "savedTitle", default)]
    pub saved_title: Option<String>,
    #[serde(rename = "savedURL", default)]
    pub saved_url: Option<String>,
}

impl ItemRecord {
    /// The tab payload, if this record represents a saved web link.
    pub fn tab(&self) -> Option<&TabPayload> {
        self.data.as_ref().and_then(|d| d.tab.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Snapshot loading
// ---------------------------------------------------------------------------

/// The flat record collections extracted from the vendor envelope.
#[derive(Debug, Clone)]
pub struct SidebarSnapshot {
    pub spaces: Vec<SpaceRecord>,
    pub items: Vec<ItemRecord>,
}

/// Index of the synced container within `sidebar.containers`.
const SYNCED_CONTAINER: usize = 1;

/// Read and parse a sidebar snapshot from disk.
///
/// An unreadable file or an envelope that does not match the expected shape
/// is a hard error with context; a readable snapshot that simply contains no
/// spaces yields an empty (but valid) snapshot.
pub fn load_sidebar(path: &Path) -> Result<SidebarSnapshot> {
    let raw = fs::read_to_string(path).wrap_err_with(|| {
        format!(
            "Failed to read sidebar snapshot: {} (ensure Arc has written one)",
            path.display()
        )
    })?;
    parse_sidebar(&raw)
        .wrap_err_with(|| format!("Failed to parse sidebar snapshot: {}", path.display()))
}

/// Parse a snapshot from its raw JSON text.
pub fn parse_sidebar(raw: &str) -> Result<SidebarSnapshot> {
    let file: SidebarFile = serde_json::from_str(raw).wrap_err("Not a sidebar document")?;

    let container = file.sidebar.containers.get(SYNCED_CONTAINER).ok_or_else(|| {
        eyre!("Sidebar has no synced container (containers[{SYNCED_CONTAINER}] missing)")
    })?;
    let container: SyncedContainer = serde_json::from_value(container.clone())
        .wrap_err("Synced container does not match the expected shape")?;

    Ok(SidebarSnapshot {
        spaces: collect_records(container.spaces),
        items: collect_records(container.items),
    })
}

/// Keep the entries of a heterogeneous array that deserialize as `T`.
/// Plain id strings and unrecognized objects are dropped silently.
fn collect_records<T: serde::de::DeserializeOwned>(entries: Vec<serde_json::Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect()
}
