// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Dispatch to the appropriate subcommand handler
// 3. Collect URLs, probe them, write the reports and print a summary
// 4. Exit with proper code (0 = all ok, 1 = failing URLs, 2 = usage/config error)
//
// All the real work lives in the link_prober library; this file only wires
// CLI flags to it and decides what gets printed.
// =============================================================================

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CheckArgs, Cli, Commands, FailedArgs, NetworkArgs, TableArgs};
use link_prober::collect::{
    apply_limit, has_http_scheme, into_requests, load_table, normalize, Collector, UrlPattern,
};
use link_prober::report::{
    aggregate, delete_others, filter_failed, load_report, print_summary, write_failed,
    write_reports, Aggregate,
};
use link_prober::{ProbeConfig, ProbeRequest, ReqwestTransport, Scheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // clap exits with code 2 on its own for bad arguments
    let cli = Cli::parse();

    if let Err(e) = logging::initialize_logging(&cli) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Bad configuration or unwritable reports
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every probed URL is ok (or there was nothing to do)
//   Ok(1) = at least one URL failed, the run was interrupted, or the report was unreadable
//   Ok(2) / Err = usage or configuration error
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check(args) => handle_check(args).await,
        Commands::Table(args) => handle_table(args).await,
        Commands::Failed(args) => handle_failed(&args),
    }
}

// Handles the 'check' subcommand: files/directories and explicit URLs
async fn handle_check(args: CheckArgs) -> Result<i32> {
    if args.inputs.is_empty() && args.urls.is_empty() {
        eprintln!("Error: provide at least one of --inputs or --url");
        return Ok(2);
    }

    let pattern = UrlPattern::new(args.extract_regex.as_deref()).context("invalid --extract-regex")?;

    for url in args.urls.iter().filter(|u| !has_http_scheme(u)) {
        warn!(url = %url, "ignoring --url without http:// or https://");
    }

    let extracted = Collector::new(pattern).collect_paths(&args.inputs);
    info!(count = extracted.len(), "extracted URL candidates from inputs");

    let mut urls = normalize(extracted, args.urls, args.allow_duplicate);
    apply_limit(&mut urls, args.limit);

    if urls.is_empty() {
        warn!("no URLs found to probe");
        return Ok(0);
    }

    let prefix = args.output_prefix.unwrap_or_else(default_check_prefix);
    probe_and_report(into_requests(urls), &args.network, &prefix, args.json).await
}

// Handles the 'table' subcommand: (id, url) rows from a JSON file
async fn handle_table(args: TableArgs) -> Result<i32> {
    let mut requests = load_table(&args.file)
        .with_context(|| format!("failed to load table {}", args.file.display()))?;
    apply_limit(&mut requests, args.limit);

    if requests.is_empty() {
        warn!(file = %args.file.display(), "table has no rows with an integer id and an http(s) url");
        return Ok(0);
    }

    probe_and_report(requests, &args.network, &args.output_prefix, args.json).await
}

// Handles the 'failed' subcommand
fn handle_failed(args: &FailedArgs) -> Result<i32> {
    let rows = match load_report(&args.report) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("❌ {e}");
            return Ok(1);
        }
    };

    let failed = filter_failed(&rows);
    println!("📋 Entries: {}  Failed: {}", rows.len(), failed.len());

    if failed.is_empty() {
        println!("✅ No failed entries, no failure report written");
        return Ok(0);
    }

    let paths = write_failed(&failed, &args.output_prefix).context("failed to write failure reports")?;
    println!("📄 Failure reports:");
    println!("   JSON: {}", paths.json.display());
    println!("   CSV : {}", paths.csv.display());
    println!("   MD  : {}", paths.markdown.display());

    if args.delete_others {
        let base_dir = match args.report.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let removed = delete_others(&paths, base_dir)
            .with_context(|| format!("failed to clean up {}", base_dir.display()))?;

        if removed.is_empty() {
            println!("🧹 No other reports to delete");
        } else {
            println!("🧹 Deleted other reports:");
            for name in removed {
                println!("   - {name}");
            }
        }
    }

    Ok(0)
}

// Probes the requests, writes the reports and prints the outcome.
// Ctrl-C stops the run early; whatever finished is still reported.
async fn probe_and_report(
    requests: Vec<ProbeRequest>,
    network: &NetworkArgs,
    prefix: &Path,
    json: bool,
) -> Result<i32> {
    let config = build_config(network)?;
    let concurrency = config.concurrency;
    let transport = Arc::new(ReqwestTransport::new(&config)?);
    let scheduler = Scheduler::new(transport, config)?;

    if !json {
        println!(
            "🌐 Probing {} URL(s) with concurrency {}...",
            requests.len(),
            concurrency
        );
    }

    let run = scheduler.run_until(requests, shutdown_signal()).await;
    if run.interrupted {
        warn!(
            completed = run.completed.len(),
            submitted = run.submitted,
            "interrupted, writing partial report"
        );
    }

    let Aggregate { results, summary } = aggregate(run.completed);
    let paths = write_reports(&results, prefix).context("failed to write reports")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_summary(&summary);
        println!("\n📄 Reports:");
        println!("   JSON: {}", paths.json.display());
        println!("   CSV : {}", paths.csv.display());
    }

    if run.interrupted || summary.failed() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn build_config(network: &NetworkArgs) -> Result<ProbeConfig> {
    let mut config = ProbeConfig::from_secs(
        network.concurrency,
        network.timeout,
        network.retries,
        !network.no_head,
        network.jitter,
        network.http2,
        network.proxy.clone(),
    )?;
    config.retry_http_errors = !network.no_retry_http_errors;
    Ok(config)
}

// reports/link_check_report_<YYYYmmdd_HHMMSS> in local time
fn default_check_prefix() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("reports/link_check_report_{stamp}"))
}

// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
