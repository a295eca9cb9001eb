// batch.rs - Domain batch driver
// Purpose: Feed one domain, or every line of a domains file, through the
//          pipeline. Strictly sequential; the first failure ends the batch.

use crate::error::{Error, Result};
use crate::pipeline::{run_pipeline, PipelineReport};
use crate::runner::ProcessRunner;
use crate::search_path::SearchPath;
use colored::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Domain(String),
    File(PathBuf),
}

/// Lazily yield trimmed domains from `reader`, skipping blank lines and
/// `#` comments. Read errors are surfaced against `path`.
pub fn domains_from_reader<R: BufRead>(
    reader: R,
    path: &Path,
) -> impl Iterator<Item = Result<String>> {
    let path = path.to_path_buf();
    reader.lines().filter_map(move |line| match line {
        Ok(line) => {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(Ok(trimmed.to_string()))
            }
        }
        Err(source) => Some(Err(Error::DomainsFile {
            path: path.clone(),
            source,
        })),
    })
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<PipelineReport>,
}

impl BatchSummary {
    pub fn domains(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.domain.as_str()).collect()
    }
}

pub async fn run_batch(
    runner: &dyn ProcessRunner,
    path: &SearchPath,
    output_root: &Path,
    source: &Source,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    match source {
        Source::Domain(domain) => {
            summary.reports.push(run_pipeline(runner, path, output_root, domain).await?);
        }
        Source::File(file) => {
            println!("{}", format!("📋 Reading domains from: {}", file.display()).yellow().bold());

            let handle = File::open(file).map_err(|source| Error::DomainsFile {
                path: file.clone(),
                source,
            })?;

            for (idx, domain) in domains_from_reader(BufReader::new(handle), file).enumerate() {
                let domain = domain?;
                println!(
                    "{}",
                    format!("🔍 Processing domain #{}: {}", idx + 1, domain).cyan().bold()
                );
                summary.reports.push(run_pipeline(runner, path, output_root, &domain).await?);
            }

            println!(
                "{}",
                format!("✅ {} domain(s) enumerated", summary.reports.len()).green().bold()
            );
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::RecordingRunner;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_blank_lines_and_comments_skipped() {
        let input = Cursor::new("a.com\n\n  b.com  \n# staging\n\t\nc.com");
        let domains: Vec<String> = domains_from_reader(input, Path::new("list.txt"))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(domains, vec!["a.com", "b.com", "c.com"]);
    }

    #[tokio::test]
    async fn test_file_runs_each_domain_in_order() {
        let root = tempdir().unwrap();
        let list = root.path().join("domains.txt");
        std::fs::write(&list, "a.com\n\nb.com\n").unwrap();
        let out = root.path().join("output");
        let runner = RecordingRunner::new();

        let summary = run_batch(&runner, &SearchPath::default(), &out, &Source::File(list))
            .await
            .unwrap();

        assert_eq!(summary.domains(), vec!["a.com", "b.com"]);
        let targets: Vec<String> = runner
            .calls()
            .iter()
            .filter(|c| c.program == "subfinder")
            .filter_map(|c| c.flag_value("-d").map(str::to_string))
            .collect();
        assert_eq!(targets, vec!["a.com", "b.com"]);
        assert_eq!(runner.calls().len(), 8);
    }

    #[tokio::test]
    async fn test_failure_halts_batch() {
        let root = tempdir().unwrap();
        let list = root.path().join("domains.txt");
        std::fs::write(&list, "a.com\nb.com\n").unwrap();
        let out = root.path().join("output");
        let runner = RecordingRunner::new().fail("subfinder", 1);

        let err = run_batch(&runner, &SearchPath::default(), &out, &Source::File(list))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CommandFailed { .. }));
        assert_eq!(runner.command_lines().len(), 1);
        assert!(!out.join("b.com").exists());
    }

    #[tokio::test]
    async fn test_single_domain() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new();

        let summary = run_batch(
            &runner,
            &SearchPath::default(),
            root.path(),
            &Source::Domain("example.com".into()),
        )
        .await
        .unwrap();

        assert_eq!(summary.domains(), vec!["example.com"]);
        assert_eq!(runner.programs(), vec!["subfinder", "httpx", "urlfinder", "nuclei"]);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_input_error() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new();

        let err = run_batch(
            &runner,
            &SearchPath::default(),
            root.path(),
            &Source::File(root.path().join("nope.txt")),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::DomainsFile { .. }));
        assert!(runner.calls().is_empty());
    }
}
