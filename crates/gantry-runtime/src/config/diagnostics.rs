use super::logger::{LogCrateLevel, LogLevel, LoggerConfig};

/// Configuration of the diagnostic channel carrying non-fatal warnings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticsConfig {
    /// Logger configuration for warnings.
    #[serde(default = "default_logger")]
    pub logger: LoggerConfig<DiagnosticsLogLevel>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            logger: default_logger(),
        }
    }
}

fn default_logger() -> LoggerConfig<DiagnosticsLogLevel> {
    LoggerConfig::with_log_crate(LogCrateLevel::Warn)
}

/// Log levels for the diagnostic channel.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticsLogLevel {
    /// Warnings are dropped.
    #[serde(rename = "disabled")]
    Disabled,

    /// Warnings are emitted on the rank-zero process.
    #[default]
    #[serde(rename = "warn")]
    Warn,

    /// Warnings are emitted on every process.
    #[serde(rename = "all-ranks")]
    AllRanks,
}

impl LogLevel for DiagnosticsLogLevel {
    fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}
