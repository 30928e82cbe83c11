use crate::config::{Config, GeneralConfig, TopologyConfig, TopologySpec};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration {}", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration {}", config_path.display()))?;

    config.validate()?;

    debug!("Configuration lists {} topologies", config.topologies.len());
    Ok(config)
}

/// Build a single-topology configuration from CLI arguments
pub fn config_from_cli(topology: TopologyConfig, output_dir: Option<&str>) -> Result<Config> {
    let mut general = GeneralConfig::default();
    if let Some(dir) = output_dir {
        general.output_dir = Some(dir.to_string());
    }
    let config = Config { general, topologies: vec![TopologySpec::Params(topology)] };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DragonflyConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  output_dir: "generated"
topologies:
  - "polarfly:3"
  - dragonfly:
      degree: 2
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general().output_dir(), "generated");
        assert_eq!(config.resolved_topologies().unwrap().len(), 2);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "topologies:\n  - \"polarfly:\"\n").unwrap();
        assert!(load_config(temp_file.path()).is_err());

        assert!(load_config(Path::new("/nonexistent/topogen.yaml")).is_err());
    }

    #[test]
    fn test_config_from_cli() {
        let config = config_from_cli(TopologyConfig::Dragonfly(DragonflyConfig::new(5, None)), Some("out")).unwrap();
        assert_eq!(config.general().output_dir(), "out");
        assert_eq!(config.topologies.len(), 1);

        assert!(config_from_cli(TopologyConfig::Dragonfly(DragonflyConfig::new(0, None)), None).is_err());
    }
}
