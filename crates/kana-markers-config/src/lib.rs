use kana_markers_engine::{Conversion, TagDefinition, TagError, TagSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid tag vocabulary: {0}")]
    InvalidTags(#[from] TagError),
}

/// One `[[tags]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    pub conversion: Conversion,
    /// Overrides the `{name}` opening delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    /// Overrides the `{/name}` closing delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
}

impl TagConfig {
    fn to_definition(&self) -> Result<TagDefinition, TagError> {
        match (&self.open, &self.close) {
            (None, None) => TagDefinition::new(self.name.clone(), self.conversion),
            (open, close) => {
                let open = open.clone().unwrap_or_else(|| format!("{{{}}}", self.name));
                let close = close.clone().unwrap_or_else(|| format!("{{/{}}}", self.name));
                TagDefinition::with_delimiters(self.name.clone(), open, close, self.conversion)
            }
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tag vocabulary in tie-break order. Empty means the built-in set.
    #[serde(default)]
    pub tags: Vec<TagConfig>,
}

impl Config {
    /// Config listing the built-in `hg`, `kk` and `hk` tags explicitly.
    pub fn with_default_tags() -> Self {
        let tags = TagSet::default()
            .iter()
            .map(|t| TagConfig {
                name: t.name().to_string(),
                conversion: t.conversion(),
                open: None,
                close: None,
            })
            .collect();
        Self { tags }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/kana-markers");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Builds the validated tag set, falling back to the built-in vocabulary
    /// when no tags are configured.
    pub fn tag_set(&self) -> Result<TagSet, ConfigError> {
        if self.tags.is_empty() {
            return Ok(TagSet::default());
        }
        let definitions = self
            .tags
            .iter()
            .map(TagConfig::to_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TagSet::new(definitions)?)
    }

    /// Expands `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
