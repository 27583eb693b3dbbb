use crate::error::Error;
use config::{Config, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_PARALLELISM: usize = 10;
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB

/// Tunables for the copy executor. Some profiles could reasonably run with a
/// higher or lower degree of parallelism than the default.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupOptions {
    #[serde(default = "default_parallelism")]
    pub parallelism_degree: usize,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            parallelism_degree: DEFAULT_PARALLELISM,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl BackupOptions {
    /// A zero bound here is a setup bug, not an environmental condition, so
    /// it is the one thing allowed to abort a run.
    pub fn validate(&self) -> Result<(), Error> {
        if self.parallelism_degree == 0 {
            return Err(Error::InvalidOptions(
                "parallelism degree must be at least 1".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidOptions(
                "copy buffer size must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backup: BackupOptions,
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}
