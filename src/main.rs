use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use wrapper_release::cli::{self, ReleaseOptions};
use wrapper_release::config::{self, Config};
use wrapper_release::domain::ManifestSnapshot;
use wrapper_release::git::Git2Repository;
use wrapper_release::logging;
use wrapper_release::probe::CommandProbe;
use wrapper_release::registry::NpmRegistry;
use wrapper_release::ui;
use wrapper_release::ReleaseError;

#[derive(Parser)]
#[command(
    name = "wrapper-release",
    version,
    about = "Decide and record release versions for a packaged compiler wrapper"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Path to the package manifest")]
    manifest: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump and commit the manifest version unless the last commit already did
    ReleaseIfChanged {
        #[arg(long, help = "Preview the next version without writing or committing")]
        dry_run: bool,
    },
    /// Check whether the manifest version is newer than the latest published one
    IsReleaseNeeded {
        #[arg(long, help = "Registry base URL")]
        registry_url: Option<String>,

        #[arg(long, help = "Package name to look up (defaults to the manifest name)")]
        package: Option<String>,

        #[arg(long, help = "Exit with status 1 when no release is needed")]
        exit_code: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let manifest_path = args.manifest.unwrap_or_else(|| config.manifest.clone());
    let snapshot = match ManifestSnapshot::load(&manifest_path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    match args.command {
        Command::ReleaseIfChanged { dry_run } => {
            if let Err(e) = release_if_changed(&config, &snapshot, dry_run).await {
                report_failure(&e);
                std::process::exit(1);
            }
        }
        Command::IsReleaseNeeded {
            registry_url,
            package,
            exit_code,
        } => {
            let url = registry_url.unwrap_or_else(|| config.registry.url.clone());
            let package = package.or_else(|| config.registry.package.clone());

            let registry = match NpmRegistry::new(&url, config.registry.timeout()) {
                Ok(registry) => registry,
                Err(e) => {
                    report_failure(&e);
                    std::process::exit(1);
                }
            };

            match cli::check_release_needed(&snapshot, &registry, package.as_deref()).await {
                Ok(check) => {
                    ui::display_release_check(&check);
                    if exit_code && !check.needed {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    report_failure(&e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn release_if_changed(
    config: &Config,
    snapshot: &ManifestSnapshot,
    dry_run: bool,
) -> wrapper_release::Result<()> {
    let repo_dir = match snapshot.path().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // without a repository there is no diff to inspect
    let history =
        Git2Repository::open(repo_dir).map_err(|e| ReleaseError::diff(e.to_string()))?;
    let probe = CommandProbe::new(&config.compiler.command, config.compiler.args.clone());
    let options = ReleaseOptions {
        dry_run,
        commit_message: config.commit.message.clone(),
    };

    if dry_run {
        ui::display_status("Dry run: nothing will be written or committed");
    }

    let outcome = cli::release_if_changed(snapshot, &history, &probe, &options).await?;
    ui::display_release_outcome(&outcome, dry_run);
    Ok(())
}

fn report_failure(error: &ReleaseError) {
    ui::display_error(&error.to_string());
    if error.is_partial_failure() {
        ui::display_status("The manifest was rewritten; review and commit it manually.");
    }
}
