//! Server configuration file handling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::resolve::ResolverConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// GeoJSON FeatureCollection of provinces.
    pub provinces: PathBuf,
    /// GeoJSON FeatureCollection of districts.
    pub districts: PathBuf,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).with_context(|| {
            format!("failed to read config file {}", path.as_ref().display())
        })?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!("failed to parse config file {}", path.as_ref().display())
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_config_with_resolver_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[data]
provinces = "data/provinces.geojson"
districts = "data/districts.geojson"
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.data.provinces, PathBuf::from("data/provinces.geojson"));
        assert_eq!(config.resolver.max_regions, 16);
        assert_eq!(config.resolver.min_fuzzy_len, 2);
    }

    #[test]
    fn resolver_section_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[data]
provinces = "p.geojson"
districts = "d.geojson"

[resolver]
max_regions = 4
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.resolver.max_regions, 4);
        assert_eq!(config.resolver.min_fuzzy_len, 2);
    }
}
