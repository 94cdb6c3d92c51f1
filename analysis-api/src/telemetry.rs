use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Targets of the workspace crates; verbosity flags apply to these only.
pub const TARGET_PREFIXES: [&str; 5] = [
    "devassist",
    "analysis_api",
    "file_intake",
    "lang_detect",
    "workbench",
];

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Compact single-line formatting layer writing to **stderr**.
///
/// Stdout is reserved for rendered results, so logs never interleave with them.
/// ANSI colors are enabled only when stderr is a terminal. Span close events
/// carry durations for `#[instrument]`ed calls.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    use std::io::IsTerminal;
    let use_ansi = std::io::stderr().is_terminal();

    fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
}

/// Level directive for one workspace crate, e.g. `workbench=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// `RUST_LOG` if set, else `default`; then `level` for every workspace crate.
///
/// `level = None` leaves the base filter untouched, so `RUST_LOG` alone
/// decides. Example: `default = "warn"`, `level = Some(Level::DEBUG)` shows
/// warnings from dependencies and debug events from this workspace.
pub fn env_filter_with_level(default: &str, level: Option<Level>) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(rust_log.as_deref(), default, level)
}

fn build_filter(rust_log: Option<&str>, default: &str, level: Option<Level>) -> EnvFilter {
    let base = rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default));
    let Some(level) = level else {
        return base;
    };
    TARGET_PREFIXES
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(base, |f, d| f.add_directive(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn directives_render_per_crate() {
        let d = level_directive("workbench", Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "workbench=debug");
    }

    #[test]
    fn rust_log_decides_without_verbosity() {
        let filter = build_filter(Some("workbench=debug"), "warn", None);
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "workbench", Level::DEBUG));
            assert!(!tracing::enabled!(target: "analysis_api", Level::INFO));
        });
    }

    #[test]
    fn verbosity_applies_to_every_workspace_crate() {
        let filter = build_filter(Some("warn"), "warn", Some(Level::DEBUG));
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "file_intake", Level::DEBUG));
            assert!(!tracing::enabled!(target: "reqwest", Level::INFO));
        });
    }

    #[test]
    fn missing_rust_log_falls_back_to_default() {
        let filter = build_filter(None, "warn", None);
        assert_eq!(filter.to_string(), "warn");
    }
}
