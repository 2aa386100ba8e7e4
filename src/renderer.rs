//! Markdown projection of a space: YAML frontmatter plus a body listing the
//! pinned items. The body is rendered to a string first so its hash can be
//! compared against a previous export before anything touches the disk.

use crate::tree::{Node, Space};
use crate::utils::sha256_hex;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

#[derive(Serialize)]
struct Frontmatter<'a> {
    arc_space: &'a str,
    space_id: &'a str,
    pinned_count: usize,
    export_date: String,
    content_hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

/// Write the complete note: frontmatter fences around the serialized
/// metadata, then the pre-rendered body.
pub fn write_note<W: Write>(
    writer: &mut W,
    space: &Space,
    body: &str,
    content_hash: &str,
    tags: Option<&[String]>,
) -> std::io::Result<()> {
    let fm = Frontmatter {
        arc_space: &space.title,
        space_id: &space.id,
        pinned_count: space.root.children.len(),
        export_date: Utc::now().format("%Y-%m-%d").to_string(),
        content_hash,
        tags,
    };

    writeln!(writer, "---")?;
    let yaml = serde_yaml::to_string(&fm).map_err(std::io::Error::other)?;
    write!(writer, "{}", yaml)?;
    writeln!(writer, "---")?;
    writeln!(writer)?;
    write!(writer, "{}", body)
}

/// Hash of a rendered body, as stored in the `content_hash` frontmatter
/// field. The hash covers only the body, so the export date never forces a
/// rewrite on its own.
pub fn body_hash(body: &str) -> String {
    sha256_hex(body.as_bytes())
}

/// Render the note body for one space.
///
/// Top-level folders become `##` sections with their subtree as a nested
/// bullet list; top-level links keep the `###` + `- **Link**:` shape.
pub fn render_body(space: &Space) -> String {
    let items = &space.root.children;
    let mut out = String::new();

    let _ = writeln!(out, "# Arc Space: {}", space.title);
    out.push('\n');
    let _ = writeln!(out, "Pinned items ({}) from Arc browser space.", items.len());
    out.push('\n');

    if items.is_empty() {
        out.push_str("No pinned items found.\n");
        return out;
    }

    let sections: Vec<String> = items.iter().map(render_section).collect();
    out.push_str(&sections.join("\n\n"));
    out.push('\n');
    out
}

fn render_section(item: &Node) -> String {
    let mut out = String::new();
    if item.url.is_none() && !item.children.is_empty() {
        let _ = writeln!(out, "## {}", display_title(item));
        for child in &item.children {
            render_entry(&mut out, child, 0);
        }
    } else {
        let _ = writeln!(out, "### {}", display_title(item));
        if let Some(url) = &item.url {
            let _ = writeln!(out, "- **Link**: {url}");
        }
        for child in &item.children {
            render_entry(&mut out, child, 0);
        }
    }
    out.truncate(out.trim_end().len());
    out
}

fn render_entry(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.url {
        Some(url) => {
            let _ = writeln!(out, "{indent}- [{}]({url})", display_title(node));
        }
        None => {
            let _ = writeln!(out, "{indent}- **{}**", display_title(node));
        }
    }
    for child in &node.children {
        render_entry(out, child, depth + 1);
    }
}

fn display_title(node: &Node) -> &str {
    node.title.as_deref().unwrap_or("Untitled")
}
