use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::path::PathBuf;

use crate::warn;

/// Environment variable consulted for the compatible-provider payload when
/// the config file does not set one.
pub(crate) const COMPATIBLE_PROVIDERS_ENV_VAR: &str = "MODELBOARD_COMPATIBLE_PROVIDERS";

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub(crate) struct HostedProvider {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub(crate) struct Ollama {
    pub api_base: Option<String>,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Providers {
    #[serde(default)]
    pub openai: HostedProvider,
    #[serde(default)]
    pub anthropic: HostedProvider,
    #[serde(default)]
    pub google: HostedProvider,
    #[serde(default)]
    pub xai: HostedProvider,
    #[serde(default)]
    pub ollama: Ollama,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Config {
    /// The model used when a reference cannot be resolved, as `provider/model`
    pub fallback_model: Option<String>,
    /// JSON array describing additional OpenAI-compatible providers
    pub compatible_providers: Option<String>,
    #[serde(default)]
    pub providers: Providers,
}

impl Config {
    /// The compatible-provider payload, from the config file or the
    /// environment.
    pub(crate) fn compatible_payload(&self) -> Option<String> {
        if let Some(payload) = &self.compatible_providers {
            return Some(payload.clone());
        }

        env_var(COMPATIBLE_PROVIDERS_ENV_VAR)
    }
}

/// Read an environment variable, treating empty and non-unicode values as
/// unset.
pub(crate) fn env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            warn!("ignoring {}, it is not valid unicode", name);
            None
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/modelboard/config.toml", ".modelboard.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/modelboard.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn parse_config_or_die<S: serde::de::DeserializeOwned>(config: &str) -> S {
    match toml::de::from_str(config) {
        Ok(s) => s,
        Err(err) => die::die!("failed to parse config: {}", err),
    }
}

fn extraneous_keys(path: &mut Vec<String>, user_config: &toml::Table, config: &toml::Table) -> Vec<String> {
    let mut extraneous = Vec::new();

    for (user_key, user_value) in user_config {
        path.push(user_key.clone());

        match (user_value, config.get(user_key)) {
            (toml::Value::Table(user_value), Some(toml::Value::Table(config_value))) => {
                extraneous.extend(extraneous_keys(path, user_value, config_value));
            }
            (_, Some(_)) => {}
            (_, None) => extraneous.push(path.join(".")),
        }

        path.pop();
    }

    extraneous
}

fn warn_on_extra_fields(config: &Config, raw_config: &str) {
    let user_config: toml::Table = parse_config_or_die(raw_config);

    let config: toml::Table = match toml::Table::try_from(config) {
        Ok(config) => config,
        Err(err) => die::die!("failed to reserialize config: {}", err),
    };

    for key in extraneous_keys(&mut Vec::new(), &user_config, &config) {
        warn!("config contains extraneous key \"{}\", ignoring", key);
    }
}

pub(crate) fn read_config(config: Option<PathBuf>) -> Config {
    let config_path = config.or_else(get_config_path);

    let path = match config_path {
        Some(path) => path,
        None => return Config::default(),
    };

    tracing::debug!(path = %path.display(), "reading config");

    let raw_config = match std::fs::read_to_string(&path) {
        Ok(raw_config) => raw_config,
        Err(err) => die::die!("failed to read config {}: {}", path.display(), err),
    };

    let config: Config = parse_config_or_die(&raw_config);

    warn_on_extra_fields(&config, &raw_config);

    config
}
