use serde::{Deserialize, Serialize};

pub const DEFAULT_DECIMALS: usize = 2;
pub const MAX_DECIMALS: usize = 6;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// store_path: /srv/camp/camp.json
/// display:
///   decimals: 2
///   medals: true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Store file location (default: ~/.config/camp-olympics/camp.json)
    #[serde(default)]
    pub store_path: Option<String>,

    #[serde(default)]
    pub display: Option<DisplayConfig>,
}

/// How rankings are rendered in the terminal.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Decimal places for aggregated values (default: 2)
    #[serde(default)]
    pub decimals: Option<usize>,

    /// Show medals for the first three places (default: true)
    #[serde(default)]
    pub medals: Option<bool>,
}

impl Config {
    pub fn decimals(&self) -> usize {
        self.display
            .as_ref()
            .and_then(|d| d.decimals)
            .unwrap_or(DEFAULT_DECIMALS)
    }

    pub fn medals(&self) -> bool {
        self.display.as_ref().and_then(|d| d.medals).unwrap_or(true)
    }
}
