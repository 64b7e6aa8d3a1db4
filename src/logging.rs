use serde::Deserialize;
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<Verbosity> for Level {
    fn from(value: Verbosity) -> Self {
        match value {
            Verbosity::Trace => Level::TRACE,
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Info => Level::INFO,
            Verbosity::Warn => Level::WARN,
            Verbosity::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Verbosity,
}

pub fn init(config: &LoggingConfig) {
    //! Install the process-wide diagnostics subscriber, writing to standard output.
    //!
    //! Call once, before the event loop. A second call leaves the first subscriber in place.
    let installed = tracing_subscriber::fmt()
        .with_max_level(Level::from(config.level))
        .with_target(false)
        .with_writer(std::io::stdout)
        .try_init();
    if installed.is_err() {
        tracing::debug!("diagnostics subscriber already installed");
    }
}
