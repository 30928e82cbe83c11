use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Batch configuration: shared settings plus the topologies to build
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub topologies: Vec<TopologySpec>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if log::LevelFilter::from_str(level).is_err() {
                return Err(ValidationError::InvalidGeneral(format!("unknown log_level '{}'", level)));
            }
        }
        if let Some(dir) = &self.general.output_dir {
            if dir.trim().is_empty() {
                return Err(ValidationError::InvalidGeneral("output_dir cannot be empty".to_string()));
            }
        }

        if self.topologies.is_empty() {
            return Err(ValidationError::InvalidTopology("at least one topology is required".to_string()));
        }
        // Output file names depend only on q or d
        let mut seen = BTreeMap::new();
        for (index, spec) in self.topologies.iter().enumerate() {
            let topology = spec.resolve()?;
            topology.validate()?;
            if let Some(first) = seen.insert(topology.output_key(), index) {
                return Err(ValidationError::InvalidTopology(format!(
                    "topologies {} and {} both write the {} output files",
                    first,
                    index,
                    topology.output_key()
                )));
            }
        }

        Ok(())
    }

    /// Resolve every entry into its tagged form, in file order
    pub fn resolved_topologies(&self) -> Result<Vec<TopologyConfig>, ValidationError> {
        self.topologies.iter().map(TopologySpec::resolve).collect()
    }

    /// Get the general configuration
    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Re-check diameter and routing tables after building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate: Option<bool>,
}

impl GeneralConfig {
    pub fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    pub fn should_validate(&self) -> bool {
        self.validate.unwrap_or(true)
    }
}

pub const DEFAULT_OUTPUT_DIR: &str = "topo_output";

/// A topology entry as written in YAML: either a shape string such as
/// `"dragonfly:5:36"` or a parameter mapping
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TopologySpec {
    Shape(String),
    Params(TopologyConfig),
}

impl TopologySpec {
    pub fn resolve(&self) -> Result<TopologyConfig, ValidationError> {
        match self {
            TopologySpec::Shape(shape) => shape.parse(),
            TopologySpec::Params(config) => Ok(config.clone()),
        }
    }
}

/// A fully resolved topology request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TopologyConfig {
    Polarfly(PolarflyConfig),
    Dragonfly(DragonflyConfig),
}

impl TopologyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            TopologyConfig::Polarfly(pf) => {
                if pf.q == 0 {
                    return Err(ValidationError::InvalidTopology("polarfly q must be positive".to_string()));
                }
                if pf.hosts_per_router == Some(0) {
                    return Err(ValidationError::InvalidTopology(
                        "hosts_per_router must be positive".to_string(),
                    ));
                }
            }
            TopologyConfig::Dragonfly(df) => {
                if df.degree == 0 {
                    return Err(ValidationError::InvalidTopology("dragonfly degree must be positive".to_string()));
                }
                if df.routers == Some(0) {
                    return Err(ValidationError::InvalidTopology("dragonfly routers must be positive".to_string()));
                }
                if df.hosts_per_router == Some(0) {
                    return Err(ValidationError::InvalidTopology(
                        "hosts_per_router must be positive".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Field order this topology needs, if any
    pub fn field_order(&self) -> Option<u32> {
        match self {
            TopologyConfig::Polarfly(pf) => Some(pf.q),
            TopologyConfig::Dragonfly(_) => None,
        }
    }

    /// The parameter that names this topology's output files
    pub fn output_key(&self) -> String {
        match self {
            TopologyConfig::Polarfly(pf) => format!("polarfly:{}", pf.q),
            TopologyConfig::Dragonfly(df) => format!("dragonfly:{}", df.degree),
        }
    }

    pub fn wants_routing(&self) -> bool {
        match self {
            TopologyConfig::Polarfly(pf) => pf.routing,
            TopologyConfig::Dragonfly(df) => df.routing,
        }
    }
}

impl fmt::Display for TopologyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyConfig::Polarfly(pf) => write!(f, "polarfly:{}", pf.q),
            TopologyConfig::Dragonfly(df) => match df.routers {
                Some(routers) => write!(f, "dragonfly:{}:{}", df.degree, routers),
                None => write!(f, "dragonfly:{}", df.degree),
            },
        }
    }
}

impl FromStr for TopologyConfig {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidShape(s.to_string(), reason.to_string());
        let parse_number = |field: &str| {
            field
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(&format!("'{}' is not a non-negative integer", field)))
        };

        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            &["polarfly", q] => Ok(TopologyConfig::Polarfly(PolarflyConfig::new(parse_number(q)?))),
            &["dragonfly", degree] => Ok(TopologyConfig::Dragonfly(DragonflyConfig::new(parse_number(degree)?, None))),
            &["dragonfly", degree, routers] => Ok(TopologyConfig::Dragonfly(DragonflyConfig::new(
                parse_number(degree)?,
                Some(parse_number(routers)? as usize),
            ))),
            &["polarfly", ..] => Err(invalid("expected polarfly:<q>")),
            &["dragonfly", ..] => Err(invalid("expected dragonfly:<degree>[:<routers>]")),
            _ => Err(invalid("unknown topology kind, expected polarfly or dragonfly")),
        }
    }
}

/// Polarfly parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolarflyConfig {
    pub q: u32,
    #[serde(default)]
    pub replication: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts_per_router: Option<u32>,
    #[serde(default = "default_routing")]
    pub routing: bool,
}

impl PolarflyConfig {
    pub fn new(q: u32) -> Self {
        Self { q, replication: 0, hosts_per_router: None, routing: true }
    }
}

/// Dragonfly parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DragonflyConfig {
    pub degree: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts_per_router: Option<u32>,
    #[serde(default = "default_routing")]
    pub routing: bool,
}

impl DragonflyConfig {
    pub fn new(degree: u32, routers: Option<usize>) -> Self {
        Self { degree, routers, hosts_per_router: None, routing: true }
    }
}

fn default_routing() -> bool {
    true
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid topology shape '{0}': {1}")]
    InvalidShape(String, String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            output_dir: Some(DEFAULT_OUTPUT_DIR.to_string()),
            validate: Some(true),
        }
    }
}
