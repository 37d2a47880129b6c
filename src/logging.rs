//! Subscriber setup for the command-line binary

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ClimateError;
use crate::config::LoggingConfig;

/// Filter directive for the subscriber.
///
/// `verbose` forces debug, otherwise a non-empty `RUST_LOG` value wins over
/// the configured level.
pub fn filter_directive(config: &LoggingConfig, verbose: bool, rust_log: Option<&str>) -> String {
    if verbose {
        return "tzclimate=debug".to_string();
    }
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => format!("tzclimate={}", config.level),
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// parseable.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directive(config, verbose, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose, None)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| ClimateError::config(format!("Failed to install logger: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info", false, None, "tzclimate=info")]
    #[case("warn", false, None, "tzclimate=warn")]
    #[case("warn", true, None, "tzclimate=debug")]
    #[case("warn", false, Some("tzclimate=trace"), "tzclimate=trace")]
    #[case("warn", false, Some("  "), "tzclimate=warn")]
    #[case("info", true, Some("tzclimate=error"), "tzclimate=debug")]
    fn test_filter_directive(
        #[case] level: &str,
        #[case] verbose: bool,
        #[case] rust_log: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = LoggingConfig {
            level: level.to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(filter_directive(&config, verbose, rust_log), expected);
    }
}
