use super::logger::{LogCrateLevel, LogLevel, LoggerConfig};
use gantry_common::Devices;

/// Which accelerator a run uses and on how many devices.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AcceleratorConfig {
    /// Registry name of the accelerator, or `"auto"` to pick the best available one.
    #[serde(default = "name_default")]
    pub name: String,

    /// The device specification handed to the accelerator.
    #[serde(default)]
    pub devices: Devices,

    /// Logger configuration for the selection summary.
    #[serde(default = "default_logger")]
    pub logger: LoggerConfig<SelectionLogLevel>,
}

impl AcceleratorConfig {
    /// The name selecting the best available accelerator.
    pub const AUTO: &'static str = "auto";

    /// Whether the accelerator name asks for automatic selection.
    pub fn is_auto(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(Self::AUTO)
    }
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            name: name_default(),
            devices: Devices::default(),
            logger: default_logger(),
        }
    }
}

fn name_default() -> String {
    AcceleratorConfig::AUTO.to_string()
}

fn default_logger() -> LoggerConfig<SelectionLogLevel> {
    LoggerConfig::with_log_crate(LogCrateLevel::Info)
}

/// Log levels for the accelerator selection summary.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum SelectionLogLevel {
    /// Nothing is logged.
    #[serde(rename = "disabled")]
    Disabled,

    /// Logs the selected accelerator and the availability of every registered one.
    #[default]
    #[serde(rename = "basic")]
    Basic,

    /// Also logs every device used for parallel execution.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for SelectionLogLevel {
    fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}
