//! Logging setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. The filter honors `RUST_LOG` and
/// defaults to `info`.
pub fn setup_stderr_logging(verbose: bool, colors: Option<bool>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(colors.unwrap_or_else(|| atty::is(atty::Stream::Stderr)));

    let result = if verbose {
        builder.try_init()
    } else {
        builder.without_time().with_target(false).try_init()
    };

    if let Err(error) = result {
        eprintln!("failed to initialize logging: {error}");
    }
}
