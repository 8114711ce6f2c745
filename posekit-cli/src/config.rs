use anyhow::{Context, Result};
use log::info;
use posekit_io::LoadOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--config` TOML file
///
/// ```toml
/// [load]
/// start_frame = 10
/// fps_out = 60.0
/// up_axis = "z"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub load: LoadOptions,
}

impl CliConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posekit_core::UpAxis;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load]\nstart_frame = 10\nfps_out = 60.0\nup_axis = \"z\"").unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.load.start_frame, Some(10));
        assert_eq!(config.load.end_frame, None);
        assert_eq!(config.load.fps_out, Some(60.0));
        assert_eq!(config.load.up_axis, UpAxis::Z);
        assert!(config.load.include_root);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.load, LoadOptions::default());
    }

    #[test]
    fn test_bad_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load]\nfps_out = \"fast\"").unwrap();
        assert!(CliConfig::load(file.path()).is_err());
    }
}
