use core::fmt::Display;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How many devices, or which ones, a run should use.
///
/// This is the value of the user-facing `devices` flag. Accelerators decide what each shape
/// means for their backend: an integer count, a backend-specific token such as `"auto"`, or an
/// explicit list of device indices.
///
/// The serde representation is untagged, so the three shapes are written naturally in config
/// files: `devices = 4`, `devices = "auto"` or `devices = [0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Devices {
    /// A device count. Kept signed so any integer the user passes survives unchanged.
    Count(i64),
    /// An explicit, ordered list of device indices.
    Indices(Vec<u32>),
    /// A backend-specific string token.
    Token(String),
}

impl Devices {
    /// The token requesting automatic device-count discovery.
    pub const AUTO: &'static str = "auto";

    /// The `"auto"` token.
    pub fn auto() -> Self {
        Self::Token(Self::AUTO.to_string())
    }

    /// Whether this is the `"auto"` token (case-insensitive).
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Token(token) if token.trim().eq_ignore_ascii_case(Self::AUTO))
    }

    /// The count, when the specification is an integer.
    pub fn as_count(&self) -> Option<i64> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }

    /// Interpret user text as a device specification.
    ///
    /// An integer becomes a [count](Devices::Count), a comma-separated or bracketed list of
    /// integers becomes a [list](Devices::Indices), and anything else is kept verbatim as a
    /// [token](Devices::Token). `From<&str>` on the other hand never interprets its input.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if let Ok(count) = trimmed.parse::<i64>() {
            return Self::Count(count);
        }

        let is_bracketed = trimmed.starts_with('[') && trimmed.ends_with(']');
        let inner = if is_bracketed {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };

        if is_bracketed || inner.contains(',') {
            let indices = inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::parse::<u32>)
                .collect::<Result<Vec<_>, _>>();

            if let Ok(indices) = indices {
                return Self::Indices(indices);
            }
        }

        Self::Token(input.to_string())
    }
}

impl Default for Devices {
    fn default() -> Self {
        Self::auto()
    }
}

impl Display for Devices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Devices::Count(count) => write!(f, "{count}"),
            Devices::Token(token) => write!(f, "'{token}'"),
            Devices::Indices(indices) => {
                f.write_str("[")?;
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{index}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl FromStr for Devices {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for Devices {
    fn from(count: i64) -> Self {
        Self::Count(count)
    }
}

impl From<i32> for Devices {
    fn from(count: i32) -> Self {
        Self::Count(count as i64)
    }
}

impl From<usize> for Devices {
    fn from(count: usize) -> Self {
        Self::Count(count as i64)
    }
}

impl From<&str> for Devices {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl From<String> for Devices {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<Vec<u32>> for Devices {
    fn from(indices: Vec<u32>) -> Self {
        Self::Indices(indices)
    }
}

impl From<&[u32]> for Devices {
    fn from(indices: &[u32]) -> Self {
        Self::Indices(indices.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4", Devices::Count(4))]
    #[case(" -1 ", Devices::Count(-1))]
    #[case("0,1,2", Devices::Indices(vec![0, 1, 2]))]
    #[case("[2, 3]", Devices::Indices(vec![2, 3]))]
    #[case("1,", Devices::Indices(vec![1]))]
    #[case("[]", Devices::Indices(vec![]))]
    #[case("auto", Devices::Token("auto".into()))]
    #[case("0,x", Devices::Token("0,x".into()))]
    fn parses_user_text(#[case] input: &str, #[case] expected: Devices) {
        assert_eq!(Devices::parse(input), expected);
    }

    #[test]
    fn from_str_keeps_tokens_verbatim() {
        assert_eq!(Devices::from("4"), Devices::Token("4".into()));
    }

    #[test]
    fn auto_detection_ignores_case() {
        assert!(Devices::auto().is_auto());
        assert!(Devices::from("AUTO").is_auto());
        assert!(!Devices::from(1).is_auto());
        assert!(!Devices::from("1").is_auto());
    }

    #[test]
    fn display_quotes_tokens() {
        assert_eq!(Devices::from(3).to_string(), "3");
        assert_eq!(Devices::from("4").to_string(), "'4'");
        assert_eq!(Devices::from(vec![0, 1, 2]).to_string(), "[0, 1, 2]");
    }

    #[test]
    fn only_integers_have_a_count() {
        assert_eq!(Devices::from(2usize).as_count(), Some(2));
        assert_eq!(Devices::from("2").as_count(), None);
        assert_eq!(Devices::from(&[2][..]).as_count(), None);
    }

    #[test]
    fn deserializes_every_shape() {
        #[derive(Deserialize)]
        struct Flag {
            devices: Devices,
        }

        let count: Flag = serde_json::from_str(r#"{"devices": 2}"#).unwrap();
        let token: Flag = serde_json::from_str(r#"{"devices": "auto"}"#).unwrap();
        let list: Flag = serde_json::from_str(r#"{"devices": [0, 3]}"#).unwrap();

        assert_eq!(count.devices, Devices::Count(2));
        assert_eq!(token.devices, Devices::auto());
        assert_eq!(list.devices, Devices::Indices(vec![0, 3]));
    }
}
