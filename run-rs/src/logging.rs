//! Console logging for model runs.
//!
//! Log records go to stderr so that stdout stays free for CSV output when no
//! output directory is configured.

use log::LevelFilter;
use log4rs::Config;
use log4rs::Handle;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::RunError;

// ISO 8601 timestamp with UTC offset, color coded level tag, then the module target
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%S%.3f%:z)} {h({l})} {t} - {m}{n}";

fn build_config(level: LevelFilter) -> Result<Config, RunError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| RunError::Logging(e.to_string()))
}

/// Installs the global logger. Can only succeed once per process.
pub fn init(level: LevelFilter) -> Result<Handle, RunError> {
    let config = build_config(level)?;
    log4rs::init_config(config).map_err(|e| RunError::Logging(e.to_string()))
}
