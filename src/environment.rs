// environment.rs - Go runtime resolution
// Purpose: Make sure `go` runs, installing it on Linux or Windows when it
//          does not, and return a search path that includes its bin dirs.

use crate::config::{Platform, Settings};
use crate::error::{Error, Result};
use crate::runner::{probe, run_checked, CommandSpec, ProcessRunner};
use crate::search_path::SearchPath;
use colored::*;
use std::path::{Path, PathBuf};

pub const LINUX_GO_ROOT: &str = "/usr/local/go";

const WINDOWS_GO_BINS: [&str; 2] = [r"C:\Program Files\Go\bin", r"C:\Program Files (x86)\Go\bin"];

fn go_version() -> CommandSpec {
    CommandSpec::new("go", ["version"])
}

/// Prepend `<GOPATH>/bin` when `go env GOPATH` answers and the directory
/// exists. Any failure leaves the path unchanged.
pub async fn add_gobin(runner: &dyn ProcessRunner, path: &SearchPath) -> SearchPath {
    let cmd = CommandSpec::new("go", ["env", "GOPATH"]);
    match runner.capture(&cmd, path).await {
        Ok(out) if out.exit.success() => {
            let gopath = out.stdout.trim();
            if gopath.is_empty() {
                return path.clone();
            }
            // GOPATH may itself be a list; binaries land in the first entry.
            let first = std::env::split_paths(gopath).next().unwrap_or_else(|| PathBuf::from(gopath));
            let bin = first.join("bin");
            if bin.is_dir() {
                path.prepend(bin)
            } else {
                path.clone()
            }
        }
        _ => path.clone(),
    }
}

/// Release archive name for `version` on Linux.
pub fn linux_archive_name(version: &str, arch: &str) -> String {
    format!("go{}.linux-{}.tar.gz", version, arch)
}

pub fn linux_archive_url(version: &str, arch: &str) -> String {
    format!("https://golang.org/dl/{}", linux_archive_name(version, arch))
}

async fn install_go_linux(
    runner: &dyn ProcessRunner,
    settings: &Settings,
    path: &SearchPath,
) -> Result<SearchPath> {
    let archive = linux_archive_name(&settings.go_version, &settings.go_arch);
    let url = linux_archive_url(&settings.go_version, &settings.go_arch);

    run_checked(runner, &CommandSpec::new("curl", ["-LO", url.as_str()]), path).await?;
    run_checked(runner, &CommandSpec::new("sudo", ["rm", "-rf", LINUX_GO_ROOT]), path).await?;
    run_checked(
        runner,
        &CommandSpec::new("sudo", ["tar", "-C", "/usr/local", "-xzf", archive.as_str()]),
        path,
    )
    .await?;

    Ok(path.prepend(Path::new(LINUX_GO_ROOT).join("bin")))
}

async fn install_go_windows(runner: &dyn ProcessRunner, path: &SearchPath) -> Result<SearchPath> {
    run_checked(runner, &CommandSpec::new("choco", ["install", "golang", "-y"]), path).await?;

    let mut updated = path.clone();
    for dir in WINDOWS_GO_BINS {
        if Path::new(dir).is_dir() {
            updated = updated.prepend(dir);
        }
    }
    Ok(updated)
}

/// Returns a search path on which `go version` succeeds.
///
/// The platform only matters when Go is missing: an unsupported platform
/// fails before any command is spawned.
pub async fn ensure_runtime_available(
    runner: &dyn ProcessRunner,
    settings: &Settings,
    path: &SearchPath,
) -> Result<SearchPath> {
    if probe(runner, &go_version(), path).await {
        println!("{}", "[+] Go toolchain found".green());
        return Ok(add_gobin(runner, path).await);
    }

    println!("{}", "[!] Go is not installed, installing it first...".yellow());

    let installed = match &settings.platform {
        Platform::Linux => install_go_linux(runner, settings, path).await?,
        Platform::Windows => install_go_windows(runner, path).await?,
        Platform::Unsupported(os) => return Err(Error::UnsupportedPlatform(os.clone())),
    };

    let updated = add_gobin(runner, &installed).await;
    if !probe(runner, &go_version(), &updated).await {
        return Err(Error::RuntimeUnavailable);
    }

    println!("{}", "[+] Go installed".green());
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::RecordingRunner;
    use tempfile::tempdir;

    fn settings(platform: Platform) -> Settings {
        Settings {
            platform,
            go_arch: "amd64".into(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_present_runtime_installs_nothing() {
        let gopath = tempdir().unwrap();
        std::fs::create_dir(gopath.path().join("bin")).unwrap();
        let runner = RecordingRunner::new()
            .on_capture("go version", 0, "go version go1.22.0 linux/amd64")
            .on_capture("go env GOPATH", 0, &format!("{}\n", gopath.path().display()));

        let path = ensure_runtime_available(&runner, &settings(Platform::Linux), &SearchPath::default())
            .await
            .unwrap();

        assert_eq!(runner.programs(), vec!["go", "go"]);
        assert_eq!(path.dirs(), &[gopath.path().join("bin")]);
    }

    #[tokio::test]
    async fn test_unsupported_platform_has_no_side_effects() {
        let runner = RecordingRunner::new();
        let err = ensure_runtime_available(
            &runner,
            &settings(Platform::Unsupported("freebsd".into())),
            &SearchPath::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedPlatform(ref os) if os == "freebsd"));
        assert_eq!(err.exit_code(), 1);
        // only the failed `go version` probe
        assert_eq!(runner.command_lines(), vec!["go version"]);
    }

    #[tokio::test]
    async fn test_linux_install_sequence() {
        let runner = RecordingRunner::new()
            .on_capture("go version", 1, "")
            .on_capture("go version", 0, "go version go1.20.5 linux/amd64");

        let path = ensure_runtime_available(&runner, &settings(Platform::Linux), &SearchPath::default())
            .await
            .unwrap();

        let lines = runner.command_lines();
        assert_eq!(
            lines,
            vec![
                "go version",
                "curl -LO https://golang.org/dl/go1.20.5.linux-amd64.tar.gz",
                "sudo rm -rf /usr/local/go",
                "sudo tar -C /usr/local -xzf go1.20.5.linux-amd64.tar.gz",
                "go env GOPATH",
                "go version",
            ]
        );
        assert_eq!(path.dirs()[0], PathBuf::from("/usr/local/go/bin"));
        // the verifying probe sees the augmented path
        assert_eq!(runner.paths().last().unwrap(), &path);
    }

    #[tokio::test]
    async fn test_runtime_still_missing_after_install() {
        let runner = RecordingRunner::new().on_capture("go version", 1, "");
        let err = ensure_runtime_available(&runner, &settings(Platform::Windows), &SearchPath::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RuntimeUnavailable));
        assert!(runner.command_lines().contains(&"choco install golang -y".to_string()));
    }

    #[tokio::test]
    async fn test_failed_download_aborts() {
        let runner = RecordingRunner::new().fail("curl", 6);
        let err = ensure_runtime_available(&runner, &settings(Platform::Linux), &SearchPath::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CommandFailed { code: Some(6), .. }));
        assert_eq!(runner.programs(), vec!["go", "curl"]);
    }

    #[tokio::test]
    async fn test_add_gobin_ignores_missing_dir() {
        let runner = RecordingRunner::new().on_capture("go env GOPATH", 0, "/no/such/gopath\n");
        let base = SearchPath::new(vec!["/usr/bin".into()]);
        assert_eq!(add_gobin(&runner, &base).await, base);
    }
}
