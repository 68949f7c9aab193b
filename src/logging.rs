//! Logging setup.
//!
//! Compact timestamped output on stderr with per-module levels taken from the
//! `[logging]` section. `RUST_LOG` overrides the config when set:
//!
//! ```bash
//! RUST_LOG=pdf_rag::services=debug pdfrag ingest
//! ```

use std::sync::Once;

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::models::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Filter directives for `config`. `verbose` raises the default level to
/// `debug`; module overrides still apply.
pub fn filter_directives(config: &LoggingConfig, verbose: bool) -> String {
    let mut directives = if verbose {
        "debug".to_string()
    } else {
        config.default.clone()
    };
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init_with_config(config: &LoggingConfig, verbose: bool) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config, verbose))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_filter_directives() {
        let config = LoggingConfig {
            default: "warn".to_string(),
            modules: BTreeMap::from([
                ("hyper".to_string(), "error".to_string()),
                ("pdf_rag::services".to_string(), "debug".to_string()),
            ]),
        };
        assert_eq!(
            filter_directives(&config, false),
            "warn,hyper=error,pdf_rag::services=debug"
        );
        assert!(filter_directives(&config, true).starts_with("debug,"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_with_config(&config, false);
        init_with_config(&config, true);
    }
}
