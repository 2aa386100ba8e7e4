//! The export run: load the snapshot, rebuild the space trees, and write one
//! Markdown note per selected space. Re-exports are idempotent: a note whose
//! body hash matches the `content_hash` recorded in its frontmatter is left
//! alone unless `--force` is given.

use crate::filter::{FilterKey, filter_nodes};
use crate::importer;
use crate::renderer;
use crate::tree::{self, Space};
use crate::utils::{ExportConfig, ProcessResult, parse_existing_frontmatter};
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The main entry point for the business logic.
pub fn execute(config: ExportConfig) -> Result<()> {
    let snapshot = importer::load_sidebar(&config.sidebar_path)?;
    let mut spaces = tree::build_spaces(&snapshot);

    if config.list {
        print_listing(&spaces);
        return Ok(());
    }

    if let Some(names) = &config.spaces {
        spaces = select_spaces(spaces, names, config.quiet);
    }

    if let Some(pattern) = &config.grep {
        spaces = grep_spaces(spaces, pattern, config.quiet);
    }

    fs::create_dir_all(&config.target_dir).wrap_err_with(|| {
        format!(
            "Failed to create target directory: {}",
            config.target_dir.display()
        )
    })?;

    let mut count_created = 0usize;
    let mut count_updated = 0usize;
    let mut count_skipped = 0usize;
    let mut count_errors = 0usize;

    for space in &spaces {
        match export_space(space, &config) {
            Ok(ProcessResult::Created) => count_created += 1,
            Ok(ProcessResult::Updated) => count_updated += 1,
            Ok(ProcessResult::Skipped) => count_skipped += 1,
            Err(e) => {
                count_errors += 1;
                eprintln!("Error [{}]: {:#}", space.title, e);
            }
        }
    }

    if !config.quiet {
        let mut summary = format!(
            "Done. {} created, {} updated, {} skipped.",
            count_created, count_updated, count_skipped
        );
        if count_errors > 0 {
            summary.push_str(&format!(" Completed with {} error(s).", count_errors));
        }
        eprintln!("{}", summary);
    }

    Ok(())
}

/// `--list`: one line per space, to stdout.
fn print_listing(spaces: &[Space]) {
    if spaces.is_empty() {
        println!("No spaces with pinned items found.");
        return;
    }
    println!("Found {} space(s):", spaces.len());
    for space in spaces {
        println!(
            "  {} — {} pinned item(s), {} link(s)",
            space.title,
            space.root.children.len(),
            space.root.link_count()
        );
    }
}

/// `--spaces`: keep the named spaces, sidebar order preserved. Requested
/// names that match nothing are reported but not fatal.
fn select_spaces(spaces: Vec<Space>, names: &[String], quiet: bool) -> Vec<Space> {
    let selected: Vec<Space> = spaces
        .into_iter()
        .filter(|space| names.contains(&space.title))
        .collect();

    if !quiet {
        for name in names {
            if !selected.iter().any(|space| &space.title == name) {
                eprintln!("Warning: no space named {:?} in the sidebar.", name);
            }
        }
    }
    selected
}

/// `--grep`: within each space, keep only the pinned items whose subtree
/// contains a title matching the pattern. Spaces left empty are dropped.
fn grep_spaces(spaces: Vec<Space>, pattern: &str, quiet: bool) -> Vec<Space> {
    spaces
        .into_iter()
        .filter_map(|mut space| {
            let items = std::mem::take(&mut space.root.children);
            let kept = filter_nodes(items, FilterKey::Title, &[pattern], false);
            if kept.is_empty() {
                if !quiet {
                    eprintln!("Skipping space {:?}: no items matching {:?}.", space.title, pattern);
                }
                return None;
            }
            space.root.children = kept;
            Some(space)
        })
        .collect()
}

fn export_space(space: &Space, config: &ExportConfig) -> Result<ProcessResult> {
    let body = renderer::render_body(space);
    let hash = renderer::body_hash(&body);

    let (path, existing) = allocate_path(space, &config.target_dir);

    if !config.force
        && let Some(ref fm) = existing
        && fm.content_hash.as_deref() == Some(hash.as_str())
    {
        if config.verbose {
            eprintln!("Skipped: {}", path.display());
        }
        return Ok(ProcessResult::Skipped);
    }

    let result_variant = if existing.is_none() {
        ProcessResult::Created
    } else {
        ProcessResult::Updated
    };

    let md_file =
        File::create(&path).wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(md_file);
    renderer::write_note(&mut writer, space, &body, &hash, config.tags.as_deref())
        .wrap_err("Failed to write note")?;
    writer.flush().wrap_err("Failed to flush note")?;

    if config.verbose {
        match result_variant {
            ProcessResult::Created => eprintln!("Created: {}", path.display()),
            ProcessResult::Updated => eprintln!("Updated: {}", path.display()),
            ProcessResult::Skipped => {}
        }
    }

    Ok(result_variant)
}

// Optimistically allocate a note path for the space.
// For each candidate stem (bare slug, slug + 8-char id prefix, slug + full id)
// we check the filesystem:
//   - File absent  → claim it (the caller creates it immediately after)
//   - File present and owned by this space → reuse it (incremental update)
//   - File present and owned by another space → try the next candidate
// Ownership is confirmed by the `space_id` frontmatter field.
fn allocate_path(space: &Space, target_dir: &Path) -> (PathBuf, Option<crate::utils::FileFrontmatter>) {
    let base = note_stem(space);

    for suffix in [None, Some(8usize), Some(space.id.len())] {
        let stem = match suffix {
            None => base.clone(),
            Some(len) => format!("{}_{}", base, &space.id[..len.min(space.id.len())]),
        };
        let path = target_dir.join(format!("{}.md", stem));
        match path.try_exists() {
            Ok(false) => return (path, None),
            Ok(true) => {
                if let Some(fm) = parse_existing_frontmatter(&path)
                    && fm.space_id == space.id
                {
                    return (path, Some(fm));
                }
                // Taken by another space (or not ours to touch) — longer suffix
            }
            Err(_) => return (path, None),
        }
    }

    // Full-id suffix is unique per space, so the loop cannot actually fall
    // through with a live conflict; keep the claim anyway.
    let path = target_dir.join(format!("{}_{}.md", base, space.id));
    (path, None)
}

fn note_stem(space: &Space) -> String {
    let raw_slug = slug::slugify(&space.title);
    // Truncate slug to 60 chars (slug output is ASCII-only, so byte == char)
    let slug = raw_slug[..raw_slug.len().min(60)]
        .trim_end_matches('-')
        .to_string();

    if slug.is_empty() {
        format!("arc-{}", &space.id[..8.min(space.id.len())])
    } else {
        format!("arc-{}", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn space(id: &str, title: &str, children: Vec<Node>) -> Space {
        Space {
            id: id.to_string(),
            title: title.to_string(),
            root: Node {
                id: format!("{id}-root"),
                title: Some(title.to_string()),
                url: None,
                tag: "arc-test".to_string(),
                children,
            },
        }
    }

    fn link(id: &str, title: &str, url: &str) -> Node {
        Node {
            id: id.to_string(),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            tag: format!("arc-test-{id}"),
            children: Vec::new(),
        }
    }

    fn config(target_dir: &Path) -> ExportConfig {
        ExportConfig {
            target_dir: target_dir.to_path_buf(),
            sidebar_path: PathBuf::from("unused"),
            tags: None,
            spaces: None,
            grep: None,
            list: false,
            force: false,
            verbose: false,
            quiet: true,
        }
    }

    #[test]
    fn stems_are_slugified_with_id_fallback() {
        let s = space("0123456789ab", "My Space!", Vec::new());
        assert_eq!(note_stem(&s), "arc-my-space");

        let s = space("0123456789ab", "!!!", Vec::new());
        assert_eq!(note_stem(&s), "arc-01234567");
    }

    #[test]
    fn export_creates_then_skips_then_updates() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut s = space("space-1", "Work", vec![link("a", "Mail", "https://mail.example.com/")]);

        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Created));
        // Unchanged content → skipped.
        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Skipped));

        // Changed content → updated in place.
        s.root.children.push(link("b", "Chat", "https://chat.example.com/"));
        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Updated));

        let note = fs::read_to_string(dir.path().join("arc-work.md")).unwrap();
        assert!(note.contains("Chat"));
    }

    #[test]
    fn force_rewrites_unchanged_note() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        let s = space("space-1", "Work", vec![link("a", "Mail", "https://mail.example.com/")]);

        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Created));
        cfg.force = true;
        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Updated));
    }

    #[test]
    fn colliding_titles_get_id_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let first = space("aaaaaaaaaaaa", "Work", vec![link("a", "Mail", "https://mail.example.com/")]);
        let second = space("bbbbbbbbbbbb", "Work", vec![link("b", "Chat", "https://chat.example.com/")]);

        export_space(&first, &cfg).unwrap();
        export_space(&second, &cfg).unwrap();

        assert!(dir.path().join("arc-work.md").exists());
        assert!(dir.path().join("arc-work_bbbbbbbb.md").exists());

        // Re-exporting either space finds its own file again.
        assert!(matches!(export_space(&first, &cfg).unwrap(), ProcessResult::Skipped));
        assert!(matches!(export_space(&second, &cfg).unwrap(), ProcessResult::Skipped));
    }

    #[test]
    fn foreign_file_without_frontmatter_is_not_claimed() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        fs::write(dir.path().join("arc-work.md"), "# hand-written note\n").unwrap();

        let s = space("space-1", "Work", vec![link("a", "Mail", "https://mail.example.com/")]);
        assert!(matches!(export_space(&s, &cfg).unwrap(), ProcessResult::Created));

        // The hand-written note is untouched; ours went to a suffixed path.
        let untouched = fs::read_to_string(dir.path().join("arc-work.md")).unwrap();
        assert_eq!(untouched, "# hand-written note\n");
        assert!(dir.path().join("arc-work_space-1.md").exists());
    }

    #[test]
    fn selects_spaces_by_exact_title() {
        let spaces = vec![
            space("1", "Personal", Vec::new()),
            space("2", "Work", Vec::new()),
            space("3", "Per", Vec::new()),
        ];
        let names = vec!["Work".to_string(), "Per".to_string(), "Missing".to_string()];

        let selected = select_spaces(spaces, &names, true);
        let titles: Vec<&str> = selected.iter().map(|s| s.title.as_str()).collect();
        // Sidebar order, not request order; "Per" does not pull in "Personal".
        assert_eq!(titles, ["Work", "Per"]);
    }

    #[test]
    fn grep_prunes_items_and_drops_empty_spaces() {
        let matching = space(
            "1",
            "Work",
            vec![
                link("a", "Rust Book", "https://doc.rust-lang.org/book/"),
                link("b", "Mail", "https://mail.example.com/"),
            ],
        );
        let unmatching = space("2", "Personal", vec![link("c", "News", "https://news.example/")]);

        let kept = grep_spaces(vec![matching, unmatching], "Rust", true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Work");
        let titles: Vec<&str> = kept[0]
            .root
            .children
            .iter()
            .filter_map(|n| n.title.as_deref())
            .collect();
        assert_eq!(titles, ["Rust Book"]);
    }
}
