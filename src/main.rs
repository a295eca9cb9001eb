// main.rs - pdorchestra CLI
// Purpose: Install Go + ProjectDiscovery tools, or enumerate one domain /
//          a file of domains with subfinder → httpx → urlfinder → nuclei

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use pdorchestra::batch::{run_batch, Source};
use pdorchestra::config::{Settings, DEFAULT_GO_VERSION, DEFAULT_OUTPUT_DIR};
use pdorchestra::environment::{add_gobin, ensure_runtime_available};
use pdorchestra::runner::SystemRunner;
use pdorchestra::search_path::SearchPath;
use pdorchestra::tools::{install_tools, preflight, PD_TOOLS};

/// pdorchestra - ProjectDiscovery enumeration orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "pdorchestra",
    version,
    about = "Install & run PD enumeration (subfinder → httpx → urlfinder → nuclei)",
    long_about = r#"
Cross-platform installer and enumeration runner for ProjectDiscovery tools:

  • subfinder   plain host list
  • httpx       live HTTP hosts
  • urlfinder   URL extraction
  • nuclei      vulnerability scanning

EXAMPLES:

  Install Go, the four tools and nuclei-templates:
    pdorchestra --install-tools

  Enumerate a single domain:
    pdorchestra --domain example.com

  Enumerate every domain in a file (one per line, # for comments):
    pdorchestra --domains domains.txt

OUTPUT FILES:

  output/{domain}/
  ├── subfinder.txt     # Hosts list
  ├── httpx.txt         # Live HTTP hosts
  ├── urlfinder.txt     # URLs found
  ├── nuclei.txt        # Nuclei findings
  └── progress.jsonl    # Run events
"#
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(false)
        .args(["install_tools", "domain", "domains"])
))]
struct Args {
    /// Install Go & PD tools + templates
    #[arg(long, help_heading = "Modes")]
    install_tools: bool,

    /// Single domain to enumerate
    #[arg(long, value_name = "DOMAIN", help_heading = "Modes")]
    domain: Option<String>,

    /// File with list of domains
    #[arg(long, value_name = "FILE", help_heading = "Modes")]
    domains: Option<PathBuf>,

    /// Root directory for per-domain results
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Go release fetched when auto-installing on Linux
    #[arg(long, value_name = "VERSION", default_value = DEFAULT_GO_VERSION)]
    go_version: String,

    /// Don't print the description and banner
    #[arg(long)]
    no_banner: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if !args.no_banner {
        print_banner();
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("[!] {:#}", e).red().bold());
            let code = e
                .downcast_ref::<pdorchestra::Error>()
                .map(|err| err.exit_code())
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::new(args.output_dir, args.go_version);
    let runner = SystemRunner;
    let path = SearchPath::from_env();

    if args.install_tools {
        let path = ensure_runtime_available(&runner, &settings, &path)
            .await
            .context("Go runtime unavailable")?;
        install_tools(&runner, &PD_TOOLS, &path)
            .await
            .context("tool installation failed")?;
        return Ok(());
    }

    let path = add_gobin(&runner, &path).await;
    preflight(&path, &PD_TOOLS)?;

    let source = match (args.domain, args.domains) {
        (Some(domain), _) => Source::Domain(domain),
        (None, Some(file)) => Source::File(file),
        (None, None) => anyhow::bail!("one of --install-tools, --domain or --domains is required"),
    };

    run_batch(&runner, &path, &settings.output_root, &source).await?;
    Ok(())
}

fn print_banner() {
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", "  ██████╗ ██████╗      ██████╗ ██████╗  ██████╗██╗  ██╗".cyan().bold());
    println!("{}", "  ██╔══██╗██╔══██╗    ██╔═══██╗██╔══██╗██╔════╝██║  ██║".cyan().bold());
    println!("{}", "  ██████╔╝██║  ██║    ██║   ██║██████╔╝██║     ███████║".cyan().bold());
    println!("{}", "  ██╔═══╝ ██║  ██║    ██║   ██║██╔══██╗██║     ██╔══██║".cyan().bold());
    println!("{}", "  ██║     ██████╔╝    ╚██████╔╝██║  ██║╚██████╗██║  ██║".cyan().bold());
    println!("{}", "  ╚═╝     ╚═════╝      ╚═════╝ ╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝".cyan().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", format!("  pdorchestra v{}", env!("CARGO_PKG_VERSION")).white().bold());
    println!("{}", "  subfinder → httpx → urlfinder → nuclei".white());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".cyan().bold());
}
