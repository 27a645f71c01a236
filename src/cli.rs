// src/cli.rs

use crate::host::HostKind;
use clap::Parser;

/// Download a directory from a GitHub or GitLab repository without cloning it.
///
/// glone walks the host's directory listings and downloads every file in
/// parallel, mirroring the remote tree on disk. With --tarball it fetches one
/// archive of the repository instead and extracts only the requested part.
#[derive(Parser, Debug)]
#[command(
    name = "glone",
    author,
    version,
    about,
    long_about = None,
    after_help = "Set GLONE_GITHUB_TOKEN to a GitHub token to raise the API rate limit."
)]
pub struct Cli {
    /// Repository URL (e.g. https://github.com/owner/repo, a GitLab URL, or owner/repo).
    pub url: String,

    /// Subdirectory of the repository to download. Defaults to the whole repository.
    pub path: Option<String>,

    /// Directory to download into. Defaults to the repository name.
    pub output: Option<String>,

    // --- Source Selection ---
    /// Branch, tag or commit to download instead of the default branch.
    #[arg(short = 'b', long, alias = "ref", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Force the host API flavour instead of guessing it from the URL.
    #[arg(long, value_enum, value_name = "HOST")]
    pub host: Option<HostKind>,

    /// Download only these files (repository-relative paths).
    #[arg(short = 'F', long = "files", value_name = "PATH", num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Download one tarball of the repository and extract the requested path from it.
    #[arg(short = 't', long, action = clap::ArgAction::SetTrue, conflicts_with = "files")]
    pub tarball: bool,

    // --- Filtering Options ---
    /// Skip these exact repository-relative paths (repeatable).
    #[arg(short = 'a', long = "avoid", value_name = "PATH", num_args = 1..)]
    pub avoid: Option<Vec<String>>,

    /// Skip paths matching any of these regexes, anywhere in the path (repeatable).
    #[arg(short = 'f', long = "filter", value_name = "REGEX", num_args = 1..)]
    pub filter: Option<Vec<String>>,

    /// Skip files not needed to build the project (.github, LICENSE, README, ...).
    #[arg(short = 'B', long = "build", action = clap::ArgAction::SetTrue)]
    pub build: bool,

    // --- Output Options ---
    /// Write files relative to PATH instead of the repository root.
    #[arg(short = 'e', long, action = clap::ArgAction::SetTrue)]
    pub exclude_path: bool,

    /// Do not print download and skip notices.
    #[arg(short = 'q', long, action = clap::ArgAction::SetTrue)]
    pub quiet: bool,

    // --- Execution Control ---
    /// Number of concurrent downloads.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Stop at the first failed download instead of reporting all failures at the end.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub fail_fast: bool,

    /// Overall timeout for each HTTP request, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}
