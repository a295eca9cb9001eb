// tools.rs - ProjectDiscovery tool set
// Purpose: The fixed table of required binaries, `go install` for each,
//          nuclei template refresh, and the pre-flight presence check.

use crate::environment::add_gobin;
use crate::error::{Error, Result};
use crate::runner::{run_checked, CommandSpec, ProcessRunner};
use crate::search_path::SearchPath;
use colored::*;

/// Tool name and the `go install` locator it is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub locator: &'static str,
}

pub const PD_TOOLS: [ToolSpec; 4] = [
    ToolSpec {
        name: "subfinder",
        locator: "github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
    },
    ToolSpec {
        name: "httpx",
        locator: "github.com/projectdiscovery/httpx/cmd/httpx@latest",
    },
    ToolSpec {
        name: "urlfinder",
        locator: "github.com/projectdiscovery/urlfinder/cmd/urlfinder@latest",
    },
    ToolSpec {
        name: "nuclei",
        locator: "github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
    },
];

impl ToolSpec {
    pub fn install_command(&self) -> CommandSpec {
        CommandSpec::new("go", ["install", self.locator])
    }
}

/// Install every tool in order, then refresh nuclei templates.
///
/// The first failing `go install` aborts; nothing is rolled back.
pub async fn install_tools(
    runner: &dyn ProcessRunner,
    specs: &[ToolSpec],
    path: &SearchPath,
) -> Result<SearchPath> {
    for spec in specs {
        println!("{}", format!("📦 Installing {}...", spec.name).cyan().bold());
        run_checked(runner, &spec.install_command(), path).await?;
    }

    let path = add_gobin(runner, path).await;

    println!("{}", "📥 Updating nuclei templates...".cyan());
    run_checked(runner, &CommandSpec::new("nuclei", ["-update-templates"]), &path).await?;

    let path = add_gobin(runner, &path).await;

    println!(
        "{}",
        "[✔] ProjectDiscovery tools + nuclei-templates installed. Ready to enumerate."
            .green()
            .bold()
    );
    Ok(path)
}

/// Fail with every unresolvable tool name, in table order.
pub fn preflight(path: &SearchPath, specs: &[ToolSpec]) -> Result<()> {
    let missing = path.missing(specs.iter().map(|s| s.name));
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingTools(missing))
    }
}
