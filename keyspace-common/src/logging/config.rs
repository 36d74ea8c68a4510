//! Logging setup for the benchmark binaries.
//!
//! Settings come from `LOG_FORMAT`, `LOG_TIMESTAMPS`, `LOG_LEVEL` and
//! `LOG_LOCATION`; command-line flags then override them through the
//! `with_*` methods. `RUST_LOG`, when set, replaces the level entirely.

use std::env;
use std::io;

use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// How each event is rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event, for log shippers
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else if name.eq_ignore_ascii_case("compact") {
            LogFormat::Compact
        } else {
            LogFormat::Pretty
        }
    }
}

/// Clock used to stamp events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    #[default]
    Local,
    Utc,
    None,
}

impl TimestampFormat {
    /// Unknown names fall back to `Local`
    pub fn parse(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "utc" => TimestampFormat::Utc,
            "none" | "off" => TimestampFormat::None,
            _ => TimestampFormat::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub timestamps: TimestampFormat,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Print file and line of each event
    pub source_location: bool,
    pub app_name: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            timestamps: TimestampFormat::default(),
            level: "info".to_string(),
            source_location: false,
            app_name: None,
        }
    }
}

impl LogConfig {
    /// Read the `LOG_*` variables of the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; absent variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(format) = lookup("LOG_FORMAT") {
            config.format = LogFormat::parse(&format);
        }
        if let Some(timestamps) = lookup("LOG_TIMESTAMPS") {
            config.timestamps = TimestampFormat::parse(&timestamps);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level;
        }
        config.source_location = matches!(lookup("LOG_LOCATION").as_deref(), Some("1" | "true"));
        config
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber.
///
/// Fails when one is already installed.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let base = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_ansi(config.format != LogFormat::Json && atty::is(atty::Stream::Stderr));

    // Each arm produces a distinct layer type, so each installs its own subscriber.
    match (config.format, config.timestamps) {
        (LogFormat::Json, TimestampFormat::None) => {
            registry.with(base.json().without_time()).try_init()?
        }
        (LogFormat::Json, TimestampFormat::Local) => registry
            .with(base.json().with_timer(ChronoLocal::rfc_3339()))
            .try_init()?,
        (LogFormat::Json, TimestampFormat::Utc) => registry
            .with(base.json().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?,
        (LogFormat::Compact, TimestampFormat::None) => {
            registry.with(base.compact().without_time()).try_init()?
        }
        (LogFormat::Compact, TimestampFormat::Local) => registry
            .with(base.compact().with_timer(local_timer()))
            .try_init()?,
        (LogFormat::Compact, TimestampFormat::Utc) => registry
            .with(base.compact().with_timer(utc_timer()))
            .try_init()?,
        (LogFormat::Pretty, TimestampFormat::None) => {
            registry.with(base.without_time()).try_init()?
        }
        (LogFormat::Pretty, TimestampFormat::Local) => {
            registry.with(base.with_timer(local_timer())).try_init()?
        }
        (LogFormat::Pretty, TimestampFormat::Utc) => {
            registry.with(base.with_timer(utc_timer())).try_init()?
        }
    }

    if let Some(app) = &config.app_name {
        tracing::debug!(app = %app, "logging initialized");
    }

    Ok(())
}

fn local_timer() -> ChronoLocal {
    ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f %z".to_string())
}

fn utc_timer() -> ChronoUtc {
    ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string())
}
