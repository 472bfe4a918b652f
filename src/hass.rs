use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::entity::Entity;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FetchError {
	#[error("No Home-Assistant URL configured")]
	MissingUrl,
	#[error("No Home-Assistant access token stored")]
	MissingToken,
	#[error("Home-Assistant rejected the access token")]
	Unauthorized,
	#[error("Home-Assistant answered with HTTP status {0}")]
	Status(u16),
	#[error("Could not reach Home-Assistant: {0}")]
	Transport(String),
	#[error("Could not decode Home-Assistant response: {0}")]
	Decode(String),
	#[error("Could not read access token: {0}")]
	Secret(String),
}

impl From<ureq::Error> for FetchError {
	fn from(err: ureq::Error) -> Self {
		match err {
			ureq::Error::Status(401, _) => FetchError::Unauthorized,
			ureq::Error::Status(code, _) => FetchError::Status(code),
			ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
		}
	}
}

#[derive(Debug, Deserialize)]
struct State {
	entity_id: String,
	#[serde(default)]
	attributes: Attributes,
}

#[derive(Debug, Default, Deserialize)]
struct Attributes {
	friendly_name: Option<String>,
}

impl From<State> for Entity {
	fn from(state: State) -> Self {
		let name = state.attributes.friendly_name.unwrap_or_else(|| state.entity_id.clone());
		Entity { entity_id: state.entity_id, name }
	}
}

/// Parses the body of `GET /api/states`.
pub fn parse_states(body: &str) -> Result<Vec<Entity>, FetchError> {
	let states: Vec<State> = serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
	Ok(states.into_iter().map(Entity::from).collect())
}

pub struct Client {
	agent: ureq::Agent,
	base_url: String,
	token: String,
}

impl Client {
	pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, FetchError> {
		let base_url = base_url.trim().trim_end_matches('/');
		if base_url.is_empty() {
			return Err(FetchError::MissingUrl);
		}
		if token.is_empty() {
			return Err(FetchError::MissingToken);
		}

		Ok(Self {
			agent: ureq::AgentBuilder::new().timeout(timeout).build(),
			base_url: base_url.to_string(),
			token: token.to_string(),
		})
	}

	pub fn states_url(&self) -> String {
		format!("{}/api/states", self.base_url)
	}

	/// Every entity Home-Assistant knows about.
	pub fn states(&self) -> Result<Vec<Entity>, FetchError> {
		let url = self.states_url();
		debug!("Fetching entities from {}", url);
		let body = self.agent.get(&url)
			.set("Authorization", &format!("Bearer {}", self.token))
			.set("Content-Type", "application/json")
			.call()?
			.into_string()
			.map_err(|e| FetchError::Transport(e.to_string()))?;
		let entities = parse_states(&body)?;
		debug!("Fetched {} entities", entities.len());
		Ok(entities)
	}
}

#[cfg(test)]
mod tests {

use super::*;

static SAMPLE_STATES: &'static str = r#"
[
	{
		"entity_id": "switch.coffee_machine",
		"state": "off",
		"attributes": { "friendly_name": "Coffee machine", "icon": "mdi:coffee" },
		"last_changed": "2024-01-02T03:04:05.000000+00:00"
	},
	{
		"entity_id": "sensor.outside_temperature",
		"state": "12.5",
		"attributes": { "unit_of_measurement": "°C" }
	},
	{
		"entity_id": "script.good_night",
		"state": "off"
	}
]
"#;

#[test]
fn test_parse_states() {
	let entities = parse_states(SAMPLE_STATES).unwrap();
	assert_eq!(entities, vec![
		Entity::new("switch.coffee_machine", "Coffee machine"),
		Entity::new("sensor.outside_temperature", "sensor.outside_temperature"),
		Entity::new("script.good_night", "script.good_night"),
	]);
}

#[test]
fn test_parse_states_rejects_garbage() {
	assert!(matches!(parse_states("{\"message\": \"nope\"}"), Err(FetchError::Decode(_))));
	assert!(matches!(parse_states(""), Err(FetchError::Decode(_))));
}

#[test]
fn test_client_requires_url_and_token() {
	let timeout = Duration::from_secs(1);
	assert!(matches!(Client::new("", "token", timeout), Err(FetchError::MissingUrl)));
	assert!(matches!(Client::new("   ", "token", timeout), Err(FetchError::MissingUrl)));
	assert!(matches!(Client::new("http://hass.local:8123", "", timeout), Err(FetchError::MissingToken)));
}

#[test]
fn test_states_url_strips_trailing_slash() {
	let client = Client::new("http://hass.local:8123/", "token", Duration::from_secs(1)).unwrap();
	assert_eq!(client.states_url(), "http://hass.local:8123/api/states");
}

}
