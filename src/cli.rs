//! Command-line interface definitions for comiclink.
//!
//! Every option here overrides the matching configuration value; an option
//! left out keeps whatever the defaults, the configuration file or the
//! environment provided.
//!
//! # Example
//!
//! ```bash
//! # Publish one library into a linked tree
//! comiclink --source ~/Comics --dest ~/Library
//!
//! # Several sources, no webhook, debug logging
//! comiclink -v -s /mnt/a -s /mnt/b -d /srv/library --no-notify
//!
//! # Use a specific configuration file
//! comiclink --config ./comiclink.toml
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Organize a comic collection into a browsable tree of symlinks.
///
/// comiclink reads the ComicInfo.xml descriptor inside each archive, groups
/// copies of the same issue, links the largest one under
/// `<series>/<volume>.<title>` and removes links whose targets disappeared.
#[derive(Debug, Parser)]
#[command(name = "comiclink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Output errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    ///
    /// If not specified, `config.toml` in the platform configuration
    /// directory is used when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source directory to scan (can be specified multiple times)
    #[arg(short, long = "source", value_name = "DIR", num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Root of the symlink tree
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Webhook URL receiving the run report
    #[arg(short, long, value_name = "URL")]
    pub webhook: Option<String>,

    /// Number of worker threads (0 uses one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Do not send the run report to the webhook
    #[arg(long)]
    pub no_notify: bool,

    /// Keep symlinks whose targets no longer exist
    #[arg(long)]
    pub no_cleanup: bool,

    /// Link files whose descriptor has neither series nor title by directory
    ///
    /// Without this flag such files are counted and left unlinked.
    #[arg(long)]
    pub missing_info_fallback: bool,

    /// Gitignore-style patterns to skip (can be specified multiple times)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links inside source directories
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,
}
