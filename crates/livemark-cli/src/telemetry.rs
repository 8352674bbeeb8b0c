//! Console tracing for the CLI.
//!
//! `RUST_LOG` wins over the configured level. Output goes to stderr so that
//! scan results on stdout stay machine-readable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Pick the filter directive: `-v` raises the floor to debug, `-vv` to trace.
pub fn filter_directive(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_owned(),
        1 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

pub fn init(configured: &str, verbose: u8) {
    let directive = filter_directive(configured, verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(env_filter);

    // A second init (tests, embedding) keeps the first subscriber.
    if tracing_subscriber::registry().with(console_layer).try_init().is_ok() {
        tracing::debug!(filter = %directive, "telemetry initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(filter_directive("info", 0), "info");
        assert_eq!(filter_directive("info", 1), "debug");
        assert_eq!(filter_directive("info", 3), "trace");
    }
}
