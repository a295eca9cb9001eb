// pipeline.rs - Four-stage enumeration pipeline
// Purpose: subfinder → httpx → urlfinder → nuclei for a single domain,
//          one plain-text artifact per tool under <output>/<domain>/

use crate::error::{Error, Result};
use crate::progress::EventLog;
use crate::runner::{run_checked, CommandSpec, ProcessRunner};
use crate::search_path::SearchPath;
use colored::*;
use indicatif::HumanDuration;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    HostEnumeration,
    LiveProbe,
    UrlExtraction,
    Scan,
}

/// Execution order. Every stage after the first reads the first stage's output.
pub const STAGES: [Stage; 4] = [
    Stage::HostEnumeration,
    Stage::LiveProbe,
    Stage::UrlExtraction,
    Stage::Scan,
];

impl Stage {
    pub fn tool(&self) -> &'static str {
        match self {
            Stage::HostEnumeration => "subfinder",
            Stage::LiveProbe => "httpx",
            Stage::UrlExtraction => "urlfinder",
            Stage::Scan => "nuclei",
        }
    }

    /// Caption used in the end-of-run summary
    pub fn label(&self) -> &'static str {
        match self {
            Stage::HostEnumeration => "Hosts list",
            Stage::LiveProbe => "HTTP live",
            Stage::UrlExtraction => "URLs found",
            Stage::Scan => "Nuclei scan",
        }
    }

    pub fn output_path(&self, domain_dir: &Path) -> PathBuf {
        domain_dir.join(format!("{}.txt", self.tool()))
    }

    /// Command for this stage. `hosts_file` is ignored by the first stage,
    /// which takes the domain itself.
    pub fn command(&self, domain: &str, hosts_file: &Path, output: &Path) -> CommandSpec {
        let output = output.to_string_lossy();
        match self {
            Stage::HostEnumeration => {
                CommandSpec::new(self.tool(), ["-d", domain, "-silent", "-o", &*output])
            }
            _ => CommandSpec::new(
                self.tool(),
                ["-l", &*hosts_file.to_string_lossy(), "-silent", "-o", &*output],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub stage: Stage,
    pub command: CommandSpec,
    pub output: PathBuf,
}

/// The full ordered plan for `domain`. Pure: touches neither disk nor processes.
pub fn plan(domain: &str, domain_dir: &Path) -> Vec<PlannedStep> {
    let hosts_file = Stage::HostEnumeration.output_path(domain_dir);
    STAGES
        .iter()
        .map(|stage| {
            let output = stage.output_path(domain_dir);
            PlannedStep {
                stage: *stage,
                command: stage.command(domain, &hosts_file, &output),
                output,
            }
        })
        .collect()
}

/// Reject anything that would not stay a single directory under the output root.
pub fn validate_domain(domain: &str) -> Result<()> {
    let bad = domain.is_empty()
        || domain == "."
        || domain == ".."
        || domain.contains(['/', '\\'])
        || domain.chars().any(char::is_whitespace);
    if bad {
        Err(Error::InvalidDomain(domain.to_string()))
    } else {
        Ok(())
    }
}

/// Non-blank lines in `path`; a missing file counts as empty.
pub fn count_lines(path: &Path) -> usize {
    File::open(path)
        .map(|f| {
            BufReader::new(f)
                .lines()
                .map_while(|l| l.ok())
                .filter(|l| !l.trim().is_empty())
                .count()
        })
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub stage: Stage,
    pub path: PathBuf,
    pub lines: usize,
    pub skipped: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub domain: String,
    pub domain_dir: PathBuf,
    pub artifacts: Vec<Artifact>,
}

impl PipelineReport {
    pub fn print_summary(&self) {
        println!("{}", format!("[✔] Done for {}:", self.domain).green().bold());
        for artifact in &self.artifacts {
            let note = if artifact.skipped {
                "skipped, no hosts".dimmed().to_string()
            } else {
                format!("{} line(s)", artifact.lines)
            };
            println!(
                "  • {:<13} {} ({})",
                format!("{}:", artifact.stage.label()),
                artifact.path.display(),
                note
            );
        }
    }
}

/// Run all four stages for `domain` under `output_root`.
///
/// The domain directory exists before the first stage starts. A failing stage
/// aborts the run; artifacts already written are left in place. When the
/// host list comes back empty the remaining stages are skipped and their
/// artifacts are created empty.
pub async fn run_pipeline(
    runner: &dyn ProcessRunner,
    path: &SearchPath,
    output_root: &Path,
    domain: &str,
) -> Result<PipelineReport> {
    validate_domain(domain)?;

    let domain_dir = output_root.join(domain);
    fs::create_dir_all(&domain_dir).map_err(|source| Error::OutputDir {
        path: domain_dir.clone(),
        source,
    })?;

    let log = EventLog::new(domain, &domain_dir);
    log.run_started();

    println!("\n{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
    println!("{}", format!("  ENUMERATING {}", domain).yellow().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
    println!("{}", format!("[*] Output directory: {}/", domain_dir.display()).cyan());

    let mut artifacts = Vec::with_capacity(STAGES.len());
    let mut no_hosts = false;

    for step in plan(domain, &domain_dir) {
        let tool = step.stage.tool();

        if no_hosts {
            File::create(&step.output).map_err(|source| Error::OutputDir {
                path: step.output.clone(),
                source,
            })?;
            log.stage_skipped(tool, "host list is empty");
            artifacts.push(Artifact {
                stage: step.stage,
                path: step.output,
                lines: 0,
                skipped: true,
            });
            continue;
        }

        log.stage_started(tool);
        let started = Instant::now();

        if let Err(e) = run_checked(runner, &step.command, path).await {
            let msg = e.to_string();
            log.stage_failed(tool, &msg);
            log.run_failed(&msg);
            eprintln!("{}", format!("[!] {} failed for {}", tool, domain).red().bold());
            return Err(e);
        }

        let lines = count_lines(&step.output);
        log.stage_completed(tool, lines);
        println!(
            "{}",
            format!(
                "[+] {} finished in {} ({} line(s))",
                tool,
                HumanDuration(started.elapsed()),
                lines
            )
            .green()
        );

        if step.stage == Stage::HostEnumeration && lines == 0 {
            println!(
                "{}",
                format!("[!] No hosts found for {}, skipping remaining stages", domain).yellow()
            );
            no_hosts = true;
        }

        artifacts.push(Artifact {
            stage: step.stage,
            path: step.output,
            lines,
            skipped: false,
        });
    }

    log.run_completed();

    let report = PipelineReport {
        domain: domain.to_string(),
        domain_dir,
        artifacts,
    };
    report.print_summary();
    Ok(report)
}
