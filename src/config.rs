//! Configuration
//!
//! Settings for forest construction, the tree aggregation modes, and JSON
//! input/output shared by configurations and results.
use crate::errors::SplitwiseError;
use crate::utils::items_to_strings;
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How trees are aggregated across outcome values.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    /// One tree per outcome value.
    #[default]
    Independent,
    /// A single tree for the union of all selected outcome values.
    #[serde(alias = "together")]
    Combined,
}

impl FromStr for TreeMode {
    type Err = SplitwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "independent" => Ok(TreeMode::Independent),
            "combined" | "together" => Ok(TreeMode::Combined),
            _ => Err(SplitwiseError::ParseString(
                s.to_string(),
                "TreeMode".to_string(),
                items_to_strings(&["independent", "combined", "together"]),
            )),
        }
    }
}

impl Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeMode::Independent => write!(f, "independent"),
            TreeMode::Combined => write!(f, "combined"),
        }
    }
}

/// Treat a non-positive threshold as "no limit".
pub fn normalize_threshold(threshold: Option<i64>) -> Option<usize> {
    threshold.filter(|&t| t > 0).map(|t| t as usize)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawThreshold {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawThreshold {
    fn normalize(self) -> Option<usize> {
        match self {
            RawThreshold::Int(i) => normalize_threshold(Some(i)),
            // A fractional threshold t stops the same subsets as ceil(t).
            RawThreshold::Float(f) if f.is_finite() && f > 0.0 => Some(f.ceil() as usize),
            RawThreshold::Float(_) => None,
            RawThreshold::Text(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => normalize_threshold(Some(i)),
                    Err(_) => s.parse::<f64>().ok().and_then(|f| RawThreshold::Float(f).normalize()),
                }
            }
            RawThreshold::Other(_) => None,
        }
    }
}

/// Lenient threshold parsing: null, non-positive and non-numeric values
/// all mean "no limit".
pub(crate) fn parse_threshold<'de, D>(d: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(d).map(|x: Option<RawThreshold>| x.and_then(RawThreshold::normalize))
}

fn default_num_threads() -> Option<usize> {
    None
}

/// Configuration for forest construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ForestConfig {
    /// Tree aggregation mode.
    #[serde(default)]
    pub mode: TreeMode,
    /// Minimum number of rows a subset needs for construction to recurse
    /// into it. `None` means no limit.
    #[serde(default, deserialize_with = "parse_threshold")]
    pub min_population_threshold: Option<usize>,
    /// Number of threads for building trees of different outcome values.
    /// Defaults to the available parallelism.
    #[serde(default = "default_num_threads")]
    pub num_threads: Option<usize>,
}

impl ForestConfig {
    pub fn new(mode: TreeMode, min_population_threshold: Option<i64>) -> Self {
        ForestConfig {
            mode,
            min_population_threshold: normalize_threshold(min_population_threshold),
            num_threads: default_num_threads(),
        }
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }
}

/// JSON persistence for forest settings and forest results.
///
/// Results embed their trees, filtering report and mode, so a saved result
/// can be reloaded and printed without the source data.
pub trait ForestIO: Serialize + DeserializeOwned + Sized {
    /// Write the JSON form to `path`, replacing any existing file.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SplitwiseError> {
        fs::write(path, self.json_dump()?).map_err(|e| SplitwiseError::UnableToWrite(e.to_string()))
    }

    /// JSON form. Labels keep their first-seen order.
    fn json_dump(&self) -> Result<String, SplitwiseError> {
        serde_json::to_string(self).map_err(|e| SplitwiseError::UnableToWrite(e.to_string()))
    }

    /// Parse from JSON. Thresholds are read leniently, see [`ForestConfig`].
    fn from_json(json_str: &str) -> Result<Self, SplitwiseError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| SplitwiseError::UnableToRead(e.to_string()))
    }

    /// Read a file written by [`ForestIO::save`].
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, SplitwiseError> {
        let json_str = fs::read_to_string(path).map_err(|e| SplitwiseError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ForestIO for ForestConfig {}
