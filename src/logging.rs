//! Diagnostic logging setup.
//!
//! Log lines go to stderr so they never mix with report output (including
//! `--json`) on stdout.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Maps the number of `-v` flags to a filter directive.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logger(verbosity: u8) {
    let filter = EnvFilter::new(format!("extsort={}", level_for(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "debug");
        assert_eq!(level_for(2), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(0);
        init_logger(1);
    }
}
