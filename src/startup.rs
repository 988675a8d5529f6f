use crate::config::Config;
use crate::error::{Error, GcalResult};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// Logs go to stderr so stdout only carries command output.
pub fn init_logging() -> GcalResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> GcalResult<Config> {
    match Config::load() {
        Ok(config) => {
            debug!(
                "Loaded config: timezone {}, default calendars {:?}",
                config.timezone, config.default_calendars
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e)
        }
    }
}
