use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::Result;
use log::{debug, warn};
use serde::Deserialize;

use crate::entity::CategoryDomains;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	pub settings: SettingsConfig,
	pub http: HttpConfig,
	pub secret: SecretConfig,
	pub categories: CategoryDomains,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SettingsConfig {
	pub schema_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpConfig {
	pub timeout_secs: u64,
}

impl HttpConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SecretConfig {
	pub label: String,
}

lazy_static! {
	static ref DEFAULT_CONFIG: Config = Config {
		settings: SettingsConfig {
			schema_id: "org.gnome.shell.extensions.hass-data".to_string(),
		},
		http: HttpConfig {
			timeout_secs: 10,
		},
		secret: SecretConfig {
			label: "long_live_access_token".to_string(),
		},
		categories: CategoryDomains::default(),
	};
}

impl Default for Config {
	fn default() -> Self {
		DEFAULT_CONFIG.clone()
	}
}

#[derive(Debug, Deserialize, PartialEq)]
struct RawConfig {
	settings: Option<RawSettingsConfig>,
	http: Option<RawHttpConfig>,
	secret: Option<RawSecretConfig>,
	categories: Option<RawCategoriesConfig>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct RawSettingsConfig {
	schema_id: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct RawHttpConfig {
	timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct RawSecretConfig {
	label: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct RawCategoriesConfig {
	togglable: Option<Vec<String>>,
	runnable: Option<Vec<String>>,
	sensor: Option<Vec<String>>,
}

impl From<RawConfig> for Config {
	fn from(raw: RawConfig) -> Self {
		let defaults = Config::default();
		Self {
			settings: SettingsConfig {
				schema_id: raw.settings.and_then(|s| s.schema_id).unwrap_or(defaults.settings.schema_id),
			},
			http: HttpConfig {
				timeout_secs: raw.http.and_then(|h| h.timeout_secs).unwrap_or(defaults.http.timeout_secs),
			},
			secret: SecretConfig {
				label: raw.secret.and_then(|s| s.label).unwrap_or(defaults.secret.label),
			},
			categories: if let Some(categories) = raw.categories { categories.into_domains(defaults.categories) } else { defaults.categories },
		}
	}
}

impl RawCategoriesConfig {
	fn into_domains(self, defaults: CategoryDomains) -> CategoryDomains {
		CategoryDomains {
			togglable: self.togglable.unwrap_or(defaults.togglable),
			runnable: self.runnable.unwrap_or(defaults.runnable),
			sensor: self.sensor.unwrap_or(defaults.sensor),
		}
	}
}

pub fn config_path() -> PathBuf {
	glib::user_config_dir().join("hass-prefs").join("config.toml")
}

pub fn load() -> Config {
	let path = config_path();
	if !path.exists() {
		debug!("No config at {}, using defaults", path.display());
		return Config::default();
	}

	match parse_config_at(&path) {
		Ok(config) => config,
		Err(e) => {
			warn!("Could not parse {}: {}, using defaults", path.display(), e);
			Config::default()
		}
	}
}

fn parse_config_at(path: &Path) -> Result<Config> {
	let s = fs::read_to_string(path)?;
	parse_config_str(&s)
}

fn parse_config_str(s: &str) -> Result<Config> {
	let config: RawConfig = toml::from_str(s)?;
	Ok(config.into())
}

#[cfg(test)]
mod tests {

use super::*;

static SAMPLE_CONFIG: &'static str = r#"
[settings]
schema_id = "org.example.hass"

[http]
timeout_secs = 3

[categories]
togglable = ["switch", "input_boolean"]
"#;

#[test]
fn test_parse_config_str() {
	let config: RawConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
	assert_eq!(config, RawConfig {
		settings: Some(RawSettingsConfig {
			schema_id: Some("org.example.hass".to_string()),
		}),
		http: Some(RawHttpConfig {
			timeout_secs: Some(3),
		}),
		secret: None,
		categories: Some(RawCategoriesConfig {
			togglable: Some(vec!["switch".to_string(), "input_boolean".to_string()]),
			runnable: None,
			sensor: None,
		}),
	})
}

#[test]
fn test_missing_values_fall_back_to_defaults() {
	let config = parse_config_str(SAMPLE_CONFIG).unwrap();
	assert_eq!(config.settings.schema_id, "org.example.hass");
	assert_eq!(config.http.timeout(), Duration::from_secs(3));
	assert_eq!(config.secret.label, "long_live_access_token");
	assert_eq!(config.categories.togglable, vec!["switch", "input_boolean"]);
	assert_eq!(config.categories.runnable, CategoryDomains::default().runnable);
	assert_eq!(config.categories.sensor, CategoryDomains::default().sensor);
}

#[test]
fn test_empty_config_is_default() {
	assert_eq!(parse_config_str("").unwrap(), Config::default());
}

#[test]
fn test_invalid_config_is_an_error() {
	assert!(parse_config_str("[http]\ntimeout_secs = \"soon\"").is_err());
}

}
