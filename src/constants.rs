// src/constants.rs

/// Environment variable holding a GitHub token, read by the CLI layer.
pub const GITHUB_TOKEN_ENV: &str = "GLONE_GITHUB_TOKEN";

/// Filters added by `--build`: repository furniture nobody needs to build a project.
pub const BUILD_MODE_FILTERS: &[&str] = &[
    ".github",
    "LICENSE",
    "README",
    ".gitignore",
    "CONTRIBUTING",
    "CHANGELOG",
    "AUTHORS",
    ".editorconfig",
];

/// Default number of worker threads for listing fetches and downloads.
pub const DEFAULT_JOBS: usize = 8;

/// Upper bound for `--jobs`.
pub const MAX_JOBS: usize = 256;

/// Page size requested from paginated listing APIs.
pub const LISTING_PAGE_SIZE: u32 = 100;

/// Stop following `Link: rel="next"` after this many pages.
pub const MAX_LISTING_PAGES: usize = 1000;

/// `User-Agent` sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("glone/", env!("CARGO_PKG_VERSION"));

/// Connection timeout for every request.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
