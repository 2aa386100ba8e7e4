//! # arc-sidebar-export
//!
//! A CLI tool that exports [Arc](https://arc.net) browser sidebar spaces to local Markdown files.
//!
//! ## What it does
//!
//! Arc stores its sidebar — spaces, folders, and pinned tabs — in a single JSON
//! snapshot (`StorableSidebar.json`). This tool reads that snapshot, rebuilds the
//! pinned-item tree of every space from the flat record lists inside it, and writes
//! each space as a standalone Markdown note with YAML frontmatter containing
//! metadata like the space id, the pinned-item count, and a content hash.
//!
//! The snapshot is opened **read-only** — your sidebar is never modified.
//!
//! ## Incremental export
//!
//! On repeated runs, existing notes are checked against the snapshot state using
//! content hashes embedded in the frontmatter. Unchanged spaces are skipped.
//! Spaces with new or changed pins are re-exported in place.
//!
//! ## Usage
//!
//! ```sh
//! # Export all spaces to a directory
//! arc-sidebar-export ~/notes/arc-spaces
//!
//! # Only two spaces, with tags for Obsidian and a custom snapshot path
//! arc-sidebar-export ~/notes/arc-spaces --spaces Personal,Work --tags arc,bookmarks \
//!     --sidebar "/path/to/StorableSidebar.json"
//!
//! # See what's there first
//! arc-sidebar-export --list
//! ```
//!
//! Preferences can be persisted in `~/.config/arc-sidebar-export/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks Arc's internal (undocumented) sidebar JSON schema. Last verified against
//! Arc `1.104`. If an Arc update breaks the schema, please
//! [open an issue](https://github.com/egemengol/arc-sidebar-export/issues).

pub mod export;
pub mod filter;
pub mod importer;
pub mod renderer;
pub mod tree;
pub mod utils;
