use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone)]
pub struct ExportConfig {
    pub target_dir: std::path::PathBuf,
    pub sidebar_path: std::path::PathBuf,
    pub tags: Option<Vec<String>>,
    pub spaces: Option<Vec<String>>,
    pub grep: Option<String>,
    pub list: bool,
    pub force: bool,
    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Clone, Copy)]
pub enum ProcessResult {
    Created,
    Updated,
    Skipped,
}

/// Fields recovered from a previously exported note.
#[derive(Clone)]
pub struct FileFrontmatter {
    pub space_id: String,
    pub content_hash: Option<String>,
}

/// Read the YAML frontmatter from an existing .md file and extract relevant fields.
pub fn parse_existing_frontmatter(path: &Path) -> Option<FileFrontmatter> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();
    let first = lines.next()?.ok()?;
    if first.trim() != "---" {
        return None;
    }

    let mut space_id: Option<String> = None;
    let mut content_hash: Option<String> = None;
    let mut bytes_read = 0usize;

    for line in lines {
        let line = line.ok()?;
        bytes_read += line.len() + 1;
        if bytes_read > 2048 || line.trim() == "---" {
            break;
        }
        if let Some(rest) = line.strip_prefix("space_id:") {
            space_id = Some(rest.trim().trim_matches('\'').trim_matches('"').to_string());
        } else if let Some(rest) = line.strip_prefix("content_hash:") {
            content_hash = Some(rest.trim().trim_matches('\'').trim_matches('"').to_string());
        }
    }

    space_id.map(|id| FileFrontmatter {
        space_id: id,
        content_hash,
    })
}

/// Hex-encoded SHA-256 digest, as embedded in the `content_hash` field.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn parses_frontmatter_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "---").unwrap();
        writeln!(f, "arc_space: Personal").unwrap();
        writeln!(f, "space_id: 'space-1'").unwrap();
        writeln!(f, "content_hash: abc123").unwrap();
        writeln!(f, "---").unwrap();
        writeln!(f, "# body").unwrap();

        let fm = parse_existing_frontmatter(&path).unwrap();
        assert_eq!(fm.space_id, "space-1");
        assert_eq!(fm.content_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn rejects_file_without_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.md");
        std::fs::write(&path, "# just markdown\n").unwrap();
        assert!(parse_existing_frontmatter(&path).is_none());
    }

    #[test]
    fn rejects_frontmatter_without_space_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.md");
        std::fs::write(&path, "---\ntitle: someone else's note\n---\n").unwrap();
        assert!(parse_existing_frontmatter(&path).is_none());
    }
}
