//! Tracing subscriber setup for the server binary.

use tracing::debug;

use crate::config::Args;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_logging(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(args.verbose >= 2)
        .with_thread_ids(args.verbose >= 3)
        .with_line_number(args.verbose >= 3)
        .init();

    debug!("survey-server started with verbosity level: {}", args.verbose);
}
