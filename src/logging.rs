use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr diagnostics logger.
///
/// The filter is fixed by the verbosity flag; stdout is reserved for the report.
pub fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("validate_xaml=debug")
    } else {
        EnvFilter::new("validate_xaml=warn")
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
