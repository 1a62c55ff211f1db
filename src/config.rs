use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use home::home_dir;
use serde::Deserialize;

use crate::model::IdentityConfig;

const CONFIG_FILE: &str = ".config/clone-lite/config.toml";

/// Defaults for the command line, layered from the config file and the environment.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CloneLiteConfig {
    pub clone_path: Option<PathBuf>,
    pub mirror_path: Option<PathBuf>,
    pub remotes: Option<Vec<String>>,
    pub identity: IdentityConfig,
}

impl CloneLiteConfig {
    pub fn load() -> anyhow::Result<Self> {
        let file = home_dir().map(|home| home.join(CONFIG_FILE));
        let raw_config = RawConfig::load(file, None)?;

        Ok(Self {
            clone_path: raw_config.clone.path,
            mirror_path: raw_config.mirror.path,
            remotes: raw_config.discovery.remotes,
            identity: raw_config.identity,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    clone: PathConfig,
    #[serde(default)]
    mirror: PathConfig,
    #[serde(default)]
    discovery: DiscoveryConfig,
    #[serde(default)]
    identity: IdentityConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct PathConfig {
    path: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct DiscoveryConfig {
    remotes: Option<Vec<String>>,
}

impl RawConfig {
    fn load(
        file: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix("CLONE_LITE")
                    .separator("_")
                    .list_separator(",")
                    .with_list_parse_key("discovery.remotes")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
