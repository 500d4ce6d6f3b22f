#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! The engines log through `tracing` directly. This module re-exports the
//! macros for downstream convenience and, with the `tracing-json` feature,
//! installs a JSON subscriber filtered by `RUST_LOG` (default `info`).

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Install a global JSON `tracing` subscriber.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_install_wins() {
        let _ = init_json_logging();
        assert!(!init_json_logging());
        info!("json subscriber installed");
    }
}
