//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::MappingConfig;
use std::path::Path;

/// Loads and validates a `neuromap.toml` configuration file.
pub fn load_config(path: &Path) -> Result<MappingConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Parses and validates a `neuromap.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<MappingConfig, ConfigError> {
    parse_config(content, Path::new("<inline>"))
}

fn parse_config(content: &str, path: &Path) -> Result<MappingConfig, ConfigError> {
    let config: MappingConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks values that the schema alone cannot express.
///
/// The neuron size is only checked for parity here; whether it fits a
/// neuron block depends on the fabric and is checked at placement time.
pub fn validate_config(config: &MappingConfig) -> Result<(), ConfigError> {
    let size = config.placement.default_neuron_size;
    if size == 0 || size % 2 != 0 {
        return Err(ConfigError::ValidationError(format!(
            "placement.default_neuron_size must be even and non-zero, got {size}"
        )));
    }
    if let Some(topo) = &config.topology {
        match (&topo.preset, &topo.file) {
            (None, None) => {
                return Err(ConfigError::MissingField(
                    "topology.preset or topology.file".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::ValidationError(
                    "topology.preset and topology.file are mutually exclusive".to_string(),
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::path::PathBuf;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.placement.default_neuron_size, 4);
        assert!(config.placement.strict);
        assert_eq!(config.placement.address_strategy, AddressStrategy::Low);
        assert_eq!(config.routing.spill, SpillPolicy::None);
        assert!(config.analog.enabled);
        assert_eq!(config.backend.kind, BackendKind::None);
        assert!(config.persistence.path.is_none());
        assert!(config.topology_source().is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[placement]
default_neuron_size = 8
strict = false
address_strategy = "alternate"

[routing]
spill = "neighbors"

[analog]
enabled = false

[backend]
kind = "simulator"

[persistence]
path = "out/results.json.gz"

[topology]
preset = "wafer"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.placement.default_neuron_size, 8);
        assert!(!config.placement.strict);
        assert_eq!(config.placement.address_strategy, AddressStrategy::Alternate);
        assert_eq!(config.routing.spill, SpillPolicy::Neighbors);
        assert!(!config.analog.enabled);
        assert_eq!(config.backend.kind, BackendKind::Simulator);
        assert_eq!(
            config.persistence.path,
            Some(PathBuf::from("out/results.json.gz"))
        );
        assert_eq!(
            config.topology_source(),
            Some(TopologySource::Preset("wafer".to_string()))
        );
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[placement]\nstrict = false\n").unwrap();
        assert_eq!(config.placement.default_neuron_size, 4);
        assert!(!config.placement.strict);
    }

    #[test]
    fn odd_neuron_size_rejected() {
        let err = load_config_from_str("[placement]\ndefault_neuron_size = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        let err = load_config_from_str("[placement]\ndefault_neuron_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn topology_needs_exactly_one_source() {
        let err = load_config_from_str("[topology]\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
        let err = load_config_from_str(
            "[topology]\npreset = \"quad\"\nfile = \"fabric.toml\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        let config = load_config_from_str("[topology]\nfile = \"fabric.toml\"\n").unwrap();
        assert_eq!(
            config.topology_source(),
            Some(TopologySource::File(PathBuf::from("fabric.toml")))
        );
    }

    #[test]
    fn unknown_enum_value_is_parse_error() {
        let err = load_config_from_str("[routing]\nspill = \"everywhere\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuromap.toml");
        std::fs::write(&path, "[analog]\nenabled = false\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(!config.analog.enabled);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuromap.toml");
        std::fs::write(&path, "[placement\n").unwrap();
        match load_config(&path).unwrap_err() {
            ConfigError::ParseError { path: at, .. } => assert_eq!(at, path),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new("/nonexistent/neuromap.toml");
        match load_config(path).unwrap_err() {
            ConfigError::IoError { path: at, .. } => assert_eq!(at, path),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
