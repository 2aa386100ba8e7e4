use arc_sidebar_export::export;
use arc_sidebar_export::utils::ExportConfig;
use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Export Arc browser sidebar spaces and pinned tabs to Markdown files.
/// Reads Arc's StorableSidebar.json snapshot.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to export markdown files.
    /// Defaults to ./arc-sidebar-export if not set in config.
    #[arg(value_name = "TARGET_DIR")]
    target_dir: Option<PathBuf>,

    /// Path to Arc's sidebar snapshot (StorableSidebar.json).
    /// Auto-detected if omitted.
    #[arg(long, value_name = "PATH")]
    sidebar: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/arc-sidebar-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Comma-separated tags to add to frontmatter (e.g. "arc,bookmarks").
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Comma-separated space names to export. Exports every space if omitted.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    spaces: Option<Vec<String>>,

    /// Only export items whose title contains this text.
    /// Folders containing a match are kept; their other items are pruned.
    #[arg(long, value_name = "TEXT")]
    grep: Option<String>,

    /// List the spaces found in the sidebar and exit.
    #[arg(long)]
    list: bool,

    /// Overwrite existing files even if their content is unchanged.
    #[arg(short, long)]
    force: bool,

    /// Print each file written or skipped.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the summary output.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    target_dir: Option<PathBuf>,
    sidebar_path: Option<PathBuf>,
    tags: Option<Vec<String>>,
    spaces: Option<Vec<String>>,
}

fn default_sidebar_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("Arc/StorableSidebar.json"))
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("arc-sidebar-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve target_dir (CLI > Config > Default)
    let target_dir = cli
        .target_dir
        .or(file_cfg.target_dir)
        .unwrap_or_else(|| PathBuf::from("arc-sidebar-export"));

    // 3. Resolve the sidebar path (CLI > Config > Auto-detect)
    let sidebar_path = cli
        .sidebar
        .or(file_cfg.sidebar_path)
        .or_else(default_sidebar_path)
        .ok_or_else(|| {
            eyre!("Could not determine the sidebar snapshot path.\nUse --sidebar to specify manually, or set sidebar_path in config.toml.")
        })?;

    if !sidebar_path.exists() {
        return Err(eyre!(
            "Sidebar snapshot not found at: {}\nEnsure Arc has been run at least once, or use --sidebar to specify the path manually.",
            sidebar_path.display()
        ));
    }

    // 4. Resolve tags and space selection (CLI > Config)
    let tags = cli.tags.or(file_cfg.tags);
    let spaces = cli.spaces.or(file_cfg.spaces);

    // 5. Build the Export Config
    let config = ExportConfig {
        target_dir,
        sidebar_path,
        tags,
        spaces,
        grep: cli.grep,
        list: cli.list,
        force: cli.force,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    // 6. Run the Business Logic
    export::execute(config)
}
