// src/logging.rs
// =============================================================================
// Installs the global tracing subscriber.
//
// Logs go to stderr so stdout stays free for the summary and --json output.
// The level comes only from the CLI flags:
//   default   -> INFO  (progress lines, skipped inputs, interrupts)
//   --verbose -> DEBUG (one line per attempt)
//   --quiet   -> ERROR
// =============================================================================

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;

// Picks the log level for the given flags
pub fn level_for(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::INFO
    }
}

/// Sets up logging for the whole process. Call once, before any work.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(cli.verbose, cli.quiet))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
