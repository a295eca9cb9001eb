// config.rs - Runtime settings
// Purpose: Everything a run needs that is not a domain: where artifacts go,
//          which Go release to fetch, and which platform we are on.

use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_GO_VERSION: &str = "1.20.5";

/// Operating systems the Go auto-installer knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
    Unsupported(String),
}

impl Platform {
    pub fn from_os(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub output_root: PathBuf,
    pub go_version: String,
    pub platform: Platform,
    /// Go's name for the CPU architecture (`amd64`, `arm64`, ...)
    pub go_arch: String,
}

impl Settings {
    pub fn new(output_root: impl Into<PathBuf>, go_version: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            go_version: go_version.into(),
            platform: Platform::current(),
            go_arch: go_arch(std::env::consts::ARCH).to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR, DEFAULT_GO_VERSION)
    }
}

/// Map a Rust target arch to the suffix used in Go release archives.
pub fn go_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "armv6l",
        other => other,
    }
}
