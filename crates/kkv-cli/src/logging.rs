//! Logging setup on `tracing` and `tracing-subscriber`.
//!
//! # Log levels
//!
//! - `error`: fatal load and export failures
//! - `warn`: recovered match failures, suspicious inputs
//! - `info`: stage timings and counts
//! - `debug`: per-stage detail
//! - `trace`: row values (only with `--log-data`; registry rows are personal data)

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder logged instead of row values.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose targets follow the configured level.
const CRATE_TARGETS: [&str; 8] = [
    "kk_validator",
    "kkv_cli",
    "kkv_gazetteer",
    "kkv_ingest",
    "kkv_match",
    "kkv_normalization",
    "kkv_report",
    "kkv_validate",
];

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns `value` when row logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the computed filter.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    /// Emit span close events (json format only).
    pub with_spans: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    /// Whether row values may be logged.
    pub log_data: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_spans: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    init_logging_with_writer(config, writer)
}

pub fn init_logging_with_writer(config: &LogConfig, writer: BoxMakeWriter) -> io::Result<()> {
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    tracing_subscriber::registry()
        .with(output_layer(config, writer))
        .try_init()
        .map_err(io::Error::other)
}

/// Sends panics that batch reconciliation recovers from to the debug log.
///
/// Every other panic still reaches the previously installed hook.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if kkv_match::recovering_scorer_panic() {
            tracing::debug!(panic = %info, "scorer panic recovered");
        } else {
            previous(info);
        }
    }));
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The formatting layer for `config`, filtered by its own `EnvFilter`.
fn output_layer(config: &LogConfig, writer: BoxMakeWriter) -> BoxedLayer {
    let filter = build_env_filter(config.level_filter, config.use_env_filter);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target)
        .with_ansi(config.with_ansi && config.format != LogFormat::Json);

    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => {
            let spans = if config.with_spans {
                FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            };
            layer.json().with_span_events(spans).with_filter(filter).boxed()
        }
        (LogFormat::Compact, true) => layer.compact().with_filter(filter).boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().with_filter(filter).boxed(),
        (LogFormat::Pretty, true) => layer.with_filter(filter).boxed(),
        (LogFormat::Pretty, false) => layer.without_time().with_filter(filter).boxed(),
    }
}

/// Our crates log at `level`; dependencies stay at warn.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATE_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn build_env_filter(level: LevelFilter, use_env_filter: bool) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(level));
    if use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("kkv_match=debug"));
        assert!(directives.contains("kk_validator=debug"));
        assert_eq!(directives.matches('=').count(), CRATE_TARGETS.len());
    }

    #[test]
    fn off_level_silences_our_crates() {
        assert!(default_directives(LevelFilter::OFF).contains("kkv_gazetteer=off"));
    }

    #[test]
    fn values_are_redacted_by_default() {
        assert_eq!(redact_value("Bandung"), REDACTED_VALUE);
    }

    struct Exploding;

    impl kkv_match::Similarity for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn score(&self, _query: &str, _candidate: &str) -> Result<f64, kkv_match::MatchFailure> {
            panic!("scorer exploded");
        }
    }

    #[test]
    fn hooked_scorer_panics_still_fail_the_row() {
        install_panic_hook();
        let index = kkv_gazetteer::GazetteerIndex::from_entries(vec![kkv_model::GazetteerEntry {
            canonical_name: "Kota Bandung".to_string(),
            normalized_name: "BANDUNG".to_string(),
            level: kkv_model::AdminLevel::Regency,
        }]);
        let reconciler = kkv_match::Reconciler::with_scorer(
            &index,
            kkv_match::ReconcileOptions::default(),
            Exploding,
        )
        .unwrap();
        let output = reconciler.reconcile(&["Bandung", "Atlantis"]).unwrap();
        assert_eq!(output.places[0].match_kind, kkv_model::MatchKind::Exact);
        assert_eq!(output.places[1].match_kind, kkv_model::MatchKind::Failed);
        assert!(!kkv_match::recovering_scorer_panic());
    }

    #[test]
    fn json_layer_keeps_our_targets_and_drops_noise() {
        let log = tempfile::NamedTempFile::new().unwrap();
        let writer = BoxMakeWriter::new(Mutex::new(log.reopen().unwrap()));
        let config = LogConfig {
            level_filter: LevelFilter::INFO,
            use_env_filter: false,
            format: LogFormat::Json,
            ..LogConfig::default()
        };
        let subscriber = tracing_subscriber::registry().with(output_layer(&config, writer));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "kkv_match", rows = 3, "places reconciled");
            tracing::info!(target: "noisy_dependency", "chatter");
            tracing::warn!(target: "noisy_dependency", "disk almost full");
            tracing::debug!(target: "kkv_match", "too detailed");
        });

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "{text}");
        assert!(lines[0].contains(r#""message":"places reconciled""#));
        assert!(lines[0].contains(r#""rows":3"#));
        assert!(lines[1].contains("disk almost full"));
        assert!(!text.contains('\u{1b}'));
    }
}
