use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Transport crates stay at `warn` unless the operator names them explicitly.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "h2", "tower"];

#[derive(Debug)]
pub enum TelemetryError {
    InvalidDirective { directive: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidDirective { directive, .. } => {
                write!(f, "log directive '{directive}' could not be parsed")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a global tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidDirective { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn configured_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directive = filter_directive(level);
    EnvFilter::try_new(&directive)
        .map_err(|source| TelemetryError::InvalidDirective { directive, source })
}

fn filter_directive(level: &str) -> String {
    let level = level.trim();
    let mut directive = level.to_string();
    for dependency in QUIET_DEPENDENCIES {
        if !level.contains(dependency) {
            directive.push_str(&format!(",{dependency}=warn"));
        }
    }
    directive
}
