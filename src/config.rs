use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{QuizSettings, DEFAULT_TOKEN_LENGTH};
use crate::parser::ParseOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    pub author: Option<String>,
    pub base_url: Option<String>,
    pub language: Option<String>,
    pub token_length: Option<usize>,
    pub settings: Option<QuizSettings>,
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "livequiz").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Reads `path` when given (it must exist), otherwise the per-user config
/// file if there is one.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => read_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(Config::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config: Config = serde_yaml::from_str(&content)?;
    config.validate()?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.token_length == Some(0) {
            return Err(Error::Config("tokenLength must be at least 1".to_string()));
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "baseUrl must start with http:// or https://, got {}",
                    url
                )));
            }
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();
        ParseOptions {
            author: self.author.clone().unwrap_or(defaults.author),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            language: self.language.clone().unwrap_or(defaults.language),
            token_length: self.token_length.unwrap_or(DEFAULT_TOKEN_LENGTH),
            settings: self.settings.clone().unwrap_or(defaults.settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_from_defaults() {
        let yaml = "author: Ms. Rivera\nsettings:\n  defaultTimerSeconds: 12\n  shuffleOptions: true\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let options = config.parse_options();
        assert_eq!(options.author, "Ms. Rivera");
        assert_eq!(options.settings.default_timer_seconds, 12);
        assert!(options.settings.shuffle_options);
        assert_eq!(options.settings.max_participants, 500);
        assert_eq!(options.base_url, "http://localhost:8080");
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config {
            token_length: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            base_url: Some("quiz.example.com".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("colour: blue\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("livequiz_missing_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(matches!(load_config(Some(path.as_path())), Err(Error::Io { .. })));
    }
}
