use core::fmt::Display;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Utilization statistics reported by an accelerator for one device.
pub type DeviceStats = BTreeMap<String, serde_json::Value>;

/// The kind of backend a [device reference](DeviceRef) belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    /// Host CPU.
    Cpu,
    /// NVIDIA GPU.
    Cuda,
    /// AMD GPU.
    Hip,
    /// Apple Metal Performance Shaders.
    Mps,
    /// Intel GPU.
    Xpu,
    /// Device without storage, used for shape inference only.
    Meta,
    /// Any other backend, identified by its lowercase name.
    Other(String),
}

impl DeviceKind {
    /// The stable name of the kind, as used in device strings.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Cuda => "cuda",
            DeviceKind::Hip => "hip",
            DeviceKind::Mps => "mps",
            DeviceKind::Xpu => "xpu",
            DeviceKind::Meta => "meta",
            DeviceKind::Other(name) => name.as_str(),
        }
    }
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = DeviceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        if name.is_empty() {
            return Err(DeviceParseError::EmptyKind {
                input: s.to_string(),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DeviceParseError::InvalidKind {
                input: s.to_string(),
            });
        }

        let kind = match name.to_ascii_lowercase().as_str() {
            "cpu" => DeviceKind::Cpu,
            "cuda" | "gpu" => DeviceKind::Cuda,
            "hip" | "rocm" => DeviceKind::Hip,
            "mps" => DeviceKind::Mps,
            "xpu" => DeviceKind::Xpu,
            "meta" => DeviceKind::Meta,
            other => DeviceKind::Other(other.to_string()),
        };

        Ok(kind)
    }
}

/// Reference to one compute unit of a given backend kind.
///
/// A reference is a plain value: it carries no handle on the hardware and outlives the
/// accelerator that produced it.
///
/// # Example
///
/// ```
/// use gantry_common::{DeviceKind, DeviceRef};
///
/// let device: DeviceRef = "cuda:1".parse().unwrap();
///
/// assert_eq!(device.kind, DeviceKind::Cuda);
/// assert_eq!(device.index, Some(1));
/// assert_eq!(DeviceRef::cpu().to_string(), "cpu");
/// ```
#[derive(new, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceRef {
    /// The backend the device belongs to.
    pub kind: DeviceKind,
    /// The device number within its backend, when the backend addresses devices individually.
    pub index: Option<u32>,
}

impl DeviceRef {
    /// The generic CPU device.
    pub const fn cpu() -> Self {
        Self {
            kind: DeviceKind::Cpu,
            index: None,
        }
    }

    /// A device of the given kind without an index.
    pub const fn of_kind(kind: DeviceKind) -> Self {
        Self { kind, index: None }
    }

    /// A device of the given kind with an explicit index.
    pub const fn indexed(kind: DeviceKind, index: u32) -> Self {
        Self {
            kind,
            index: Some(index),
        }
    }

    /// Whether this device belongs to the given backend kind.
    pub fn is_kind(&self, kind: &DeviceKind) -> bool {
        &self.kind == kind
    }
}

impl Default for DeviceRef {
    fn default() -> Self {
        Self::cpu()
    }
}

impl Display for DeviceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{index}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for DeviceRef {
    type Err = DeviceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, ':');
        // `splitn` always yields at least one item.
        let kind = parts.next().unwrap_or_default().parse::<DeviceKind>()?;

        let index = match parts.next() {
            None => None,
            Some(index) => Some(index.trim().parse::<u32>().map_err(|_| {
                DeviceParseError::InvalidIndex {
                    input: s.to_string(),
                }
            })?),
        };

        Ok(Self { kind, index })
    }
}

impl Serialize for DeviceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when a device string can't be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceParseError {
    /// The device kind is missing.
    #[error("Device string `{input}` has no device kind")]
    EmptyKind {
        /// The string that failed to parse.
        input: String,
    },
    /// The device kind contains characters that aren't allowed in a backend name.
    #[error("Device string `{input}` has an invalid device kind")]
    InvalidKind {
        /// The string that failed to parse.
        input: String,
    },
    /// The part after `:` isn't a non-negative integer.
    #[error("Device string `{input}` has an invalid device index, expected `kind:index`")]
    InvalidIndex {
        /// The string that failed to parse.
        input: String,
    },
}
