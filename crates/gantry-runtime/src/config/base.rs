use super::{AcceleratorConfig, DiagnosticsConfig, accelerator::SelectionLogLevel};
use crate::config::diagnostics::DiagnosticsLogLevel;
use gantry_common::Devices;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static GANTRY_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// File names searched for, in order, in the current directory and its parents.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["gantry.toml", "Gantry.toml"];

/// Represents the global configuration for gantry, combining accelerator selection and
/// diagnostics settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration for accelerator selection.
    #[serde(default)]
    pub accelerator: AcceleratorConfig,

    /// Configuration for the diagnostic channel.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Error while loading, saving or installing the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The config file couldn't be read or written.
    #[error("Can't access config file {}\nCaused by:\n  {source}", path.display())]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file isn't valid TOML or doesn't match the expected format.
    #[error("The file {} doesn't have the right format\nCaused by:\n  {source}", path.display())]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The config couldn't be serialized.
    #[error("Can't serialize the config\nCaused by:\n  {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The global configuration was already set or read.
    #[error("Cannot set the global configuration multiple times")]
    AlreadyInitialized,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `gantry.toml` or `Gantry.toml` in
    /// the current directory or its parents, then applies the environment overrides (see
    /// [override_from_env](Self::override_from_env)). If no file is found, a default
    /// configuration is used.
    pub fn get() -> Arc<Self> {
        let mut state = GANTRY_GLOBAL_CONFIG.lock();

        if let Some(config) = state.as_ref() {
            return config.clone();
        }

        let config = Arc::new(Self::from_current_dir().override_from_env());
        *state = Some(config.clone());
        config
    }

    /// Sets the global configuration to the provided value.
    ///
    /// This must happen at the start of the program, before any call to [get](Self::get).
    pub fn set(config: Self) -> Result<(), ConfigError> {
        let mut state = GANTRY_GLOBAL_CONFIG.lock();
        if state.is_some() {
            return Err(ConfigError::AlreadyInitialized);
        }
        *state = Some(Arc::new(config));

        Ok(())
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        Self::get().save(path)
    }

    /// Save this configuration to the provided file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides configuration fields based on environment variables.
    ///
    /// - `GANTRY_ACCELERATOR`: the accelerator name.
    /// - `GANTRY_DEVICES`: the device specification, interpreted with [Devices::parse].
    /// - `GANTRY_DEBUG_LOG`: where diagnostics and selection messages go: `stdout`,
    ///   `stderr`, `0`/`false` to disable them, `1`/`true` for `/tmp/gantry.log`, or any
    ///   other value as a file path.
    pub fn override_from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("GANTRY_ACCELERATOR") {
            self.accelerator.name = val.trim().to_string();
        }

        if let Ok(val) = std::env::var("GANTRY_DEVICES") {
            self.accelerator.devices = Devices::parse(&val);
        }

        if let Ok(val) = std::env::var("GANTRY_DEBUG_LOG") {
            self.accelerator.logger.level = SelectionLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.diagnostics.logger.stdout = true;
                    self.accelerator.logger.stdout = true;
                }
                "stderr" => {
                    self.diagnostics.logger.stderr = true;
                    self.accelerator.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/gantry.log";
                    self.diagnostics.logger.file = Some(file_path.into());
                    self.accelerator.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.diagnostics.logger.level = DiagnosticsLogLevel::Disabled;
                    self.accelerator.logger.level = SelectionLogLevel::Disabled;
                }
                file_path => {
                    self.diagnostics.logger.file = Some(file_path.into());
                    self.accelerator.logger.file = Some(file_path.into());
                }
            }
        }

        self
    }

    /// Loads the configuration from a specified file path.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Loads configuration from `gantry.toml` or `Gantry.toml` in the current directory or its
    // parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is
    // reached. Returns a default configuration if no file is found.
    fn from_current_dir() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::from_dir(dir),
            Err(err) => {
                log::warn!("Can't read the current directory, using the default config: {err}");
                Self::default()
            }
        }
    }

    fn from_dir(mut dir: PathBuf) -> Self {
        loop {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }

                match Self::from_file_path(&path) {
                    Ok(config) => return config,
                    Err(err) => log::warn!("Skipping config file: {err}"),
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    // Swaps the global configuration, `None` resets it to lazy loading.
    #[cfg(test)]
    pub(crate) fn replace(config: Option<Self>) {
        *GANTRY_GLOBAL_CONFIG.lock() = config.map(Arc::new);
    }
}
