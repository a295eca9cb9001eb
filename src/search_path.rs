// search_path.rs - Explicit executable search path
// Purpose: Resolve bare tool names the way the OS would, without ever
//          touching the process-wide PATH. Every spawn receives this value.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Ordered list of directories used to resolve executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Snapshot of the ambient `PATH`. Read once at startup.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Returns a new path with `dir` in front. Already-present directories
    /// are moved to the front rather than duplicated.
    pub fn prepend(&self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut dirs = Vec::with_capacity(self.dirs.len() + 1);
        dirs.push(dir.clone());
        dirs.extend(self.dirs.iter().filter(|d| **d != dir).cloned());
        Self { dirs }
    }

    /// Value to hand a child process as its `PATH`.
    pub fn to_env_value(&self) -> OsString {
        // join_paths only fails on entries containing the separator; such
        // entries are dropped rather than poisoning the whole value.
        std::env::join_paths(&self.dirs).unwrap_or_else(|_| {
            let usable: Vec<&PathBuf> = self
                .dirs
                .iter()
                .filter(|d| std::env::join_paths([d]).is_ok())
                .collect();
            std::env::join_paths(usable).unwrap_or_default()
        })
    }

    /// Full path of the first executable named `binary`, if any.
    pub fn resolve(&self, binary: &str) -> Option<PathBuf> {
        if binary.contains(std::path::MAIN_SEPARATOR) {
            let candidate = PathBuf::from(binary);
            return is_executable(&candidate).then_some(candidate);
        }

        for dir in &self.dirs {
            for name in candidate_names(binary) {
                let candidate = dir.join(&name);
                if is_executable(&candidate) {
                    return Some(candidate);
                }
            }
        }

        None
    }

    /// Names from `binaries` that do not resolve, in the order given.
    pub fn missing<'a>(&self, binaries: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        binaries
            .into_iter()
            .filter(|b| self.resolve(b).is_none())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(windows)]
fn candidate_names(binary: &str) -> Vec<String> {
    if Path::new(binary).extension().is_some() {
        return vec![binary.to_string()];
    }
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let mut names: Vec<String> = exts
        .split(';')
        .filter(|e| !e.is_empty())
        .map(|e| format!("{}{}", binary, e.to_ascii_lowercase()))
        .collect();
    names.push(binary.to_string());
    names
}

#[cfg(not(windows))]
fn candidate_names(binary: &str) -> Vec<String> {
    vec![binary.to_string()]
}

fn is_executable(candidate: &Path) -> bool {
    if !candidate.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(candidate)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn make_tool(dir: &Path, name: &str, mode: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_prepend_moves_existing_dir_to_front() {
        let path = SearchPath::new(vec!["/usr/bin".into(), "/opt/go/bin".into()]);
        let updated = path.prepend("/opt/go/bin");
        assert_eq!(
            updated.dirs(),
            &[PathBuf::from("/opt/go/bin"), PathBuf::from("/usr/bin")]
        );
        // receiver untouched
        assert_eq!(path.dirs().len(), 2);
        assert_eq!(path.dirs()[0], PathBuf::from("/usr/bin"));
    }

    #[test]
    fn test_prepend_does_not_touch_process_env() {
        let before = std::env::var_os("PATH");
        let _ = SearchPath::from_env().prepend("/definitely/not/on/path");
        assert_eq!(std::env::var_os("PATH"), before);
    }

    #[test]
    fn test_env_value_round_trips_through_split() {
        let path = SearchPath::new(vec!["/a".into(), "/b".into()]);
        let value = path.to_env_value();
        let split: Vec<PathBuf> = std::env::split_paths(&value).collect();
        assert_eq!(split, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_finds_first_executable() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        make_tool(first.path(), "httpx", 0o644);
        let expected = make_tool(second.path(), "httpx", 0o755);

        let path = SearchPath::new(vec![first.path().into(), second.path().into()]);
        assert_eq!(path.resolve("httpx"), Some(expected));
        assert_eq!(path.resolve("nuclei"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_preserves_order() {
        let dir = tempdir().unwrap();
        make_tool(dir.path(), "httpx", 0o755);
        let path = SearchPath::new(vec![dir.path().into()]);

        let missing = path.missing(["subfinder", "httpx", "urlfinder", "nuclei"]);
        assert_eq!(missing, vec!["subfinder", "urlfinder", "nuclei"]);
    }
}
