//! tfc-backup - Main entry point

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, info};

use tfc_backup::config::defaults;
use tfc_backup::error::EXIT_INTERRUPTED;
use tfc_backup::{
    backup_and_cleanup, Cli, FailureReporter, ResticBackup, RunContext, RunOptions, TfeClient,
    TfxWorkspaceLister, TokenResolver,
};

#[tokio::main]
async fn main() -> ExitCode {
    let reporter = FailureReporter::from_env();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if !matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                // clap prints the full message itself
                reporter.alert(&usage_error_summary(&e));
                reporter.flush().await;
            }
            e.exit();
        }
    };

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting tfc-backup v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "CLI args: org={}, workspace={:?}, all={}, host={}, dest={}, concurrency={}",
        cli.org,
        cli.workspace,
        cli.all,
        cli.host,
        cli.dest.display(),
        cli.concurrency
    );

    let token = match TokenResolver::new(&cli.host).resolve(cli.token.as_deref()) {
        Ok(token) => token,
        Err(e) => {
            reporter.report(&e.to_string());
            reporter.flush().await;
            return ExitCode::from(e.exit_code());
        }
    };

    let client = TfeClient::new(token, cli.host.clone());
    let lister = TfxWorkspaceLister::new(cli.listing_tool.clone(), defaults::COLLABORATOR_TIMEOUT);

    // First Ctrl-C stops new requests and lets in-flight ones finish their
    // atomic writes; a second one exits immediately
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if cancelled.swap(true, Ordering::SeqCst) {
                    eprintln!("Interrupted again, exiting");
                    std::process::exit(i32::from(EXIT_INTERRUPTED));
                }
                eprintln!("Interrupted, waiting for in-flight requests (Ctrl-C again to exit now)...");
            }
        });
    }

    let options = RunOptions {
        org: cli.org.clone(),
        mode: cli.workspace_mode(),
        staging_dir: cli.dest.clone(),
        concurrency: cli.concurrency,
        quiet: cli.quiet,
    };

    let mut ctx = RunContext::new(&client, &lister, &reporter, Arc::clone(&cancelled));
    let summary = match ctx.run_export(&options).await {
        Ok(summary) => summary,
        // Already reported by the run
        Err(e) => return ExitCode::from(e.exit_code()),
    };

    if !cli.quiet {
        println!(
            "Exported {} file(s) for {} workspace(s) and {} variable set(s) to {}",
            summary.artifacts.len(),
            summary.workspaces,
            summary.varsets,
            cli.dest.display()
        );
        if !summary.is_complete() {
            println!(
                "Export incomplete: {} failure(s), {} warning(s)",
                summary.failures.len(),
                summary.warnings.len()
            );
        }
    }

    if cli.backup {
        let engine = ResticBackup::default();
        if let Err(e) = backup_and_cleanup(&engine, &cli.dest, &cli.retention()).await {
            reporter.report(&e.to_string());
            reporter.flush().await;
            return ExitCode::from(e.exit_code());
        }
        if !cli.quiet {
            println!("Backup completed");
        }
    }

    if summary.is_complete() {
        info!("Completed successfully");
    } else {
        info!("Completed with some errors");
    }
    ExitCode::SUCCESS
}

/// One-line form of a clap usage error, without the usage block
fn usage_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let summary = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "Invalid arguments: {}",
        summary.trim_start_matches("error: ")
    )
}
