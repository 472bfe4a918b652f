use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::entity::{Category, CategoryDomains, Entity};

/// Entities as last fetched from Home-Assistant, stored as JSON in settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityCache {
	pub fetched_at: DateTime<Utc>,
	pub entities: Vec<Entity>,
}

impl EntityCache {
	pub fn new(entities: Vec<Entity>) -> Self {
		Self { fetched_at: Utc::now(), entities }
	}

	/// An empty string is "no cache". Unparsable contents are treated the same.
	pub fn parse(raw: &str) -> Option<Self> {
		if raw.trim().is_empty() {
			return None;
		}
		match serde_json::from_str(raw) {
			Ok(cache) => Some(cache),
			Err(e) => {
				warn!("Ignoring invalid entities cache: {}", e);
				None
			}
		}
	}

	pub fn to_json(&self) -> String {
		// Serialising plain strings and a timestamp cannot fail.
		serde_json::to_string(self).unwrap_or_default()
	}

	pub fn by_category(&self, category: Category, domains: &CategoryDomains) -> Vec<Entity> {
		domains.filter(category, &self.entities)
	}
}

#[cfg(test)]
mod tests {

use chrono::TimeZone;
use super::*;

#[test]
fn test_parse_cache() {
	let raw = r#"{"fetched_at":"2024-05-06T07:08:09Z","entities":[{"entity_id":"switch.a","name":"A"}]}"#;
	let cache = EntityCache::parse(raw).unwrap();
	assert_eq!(cache.fetched_at, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
	assert_eq!(cache.entities, vec![Entity::new("switch.a", "A")]);
}

#[test]
fn test_parse_empty_or_invalid_cache() {
	assert_eq!(EntityCache::parse(""), None);
	assert_eq!(EntityCache::parse("  "), None);
	assert_eq!(EntityCache::parse("[1, 2"), None);
}

#[test]
fn test_cache_json_is_readable_back() {
	let cache = EntityCache::new(vec![Entity::new("sensor.power", "Power")]);
	assert_eq!(EntityCache::parse(&cache.to_json()), Some(cache));
}

#[test]
fn test_by_category() {
	let cache = EntityCache::new(vec![
		Entity::new("sensor.power", "Power"),
		Entity::new("scene.movie", "Movie"),
	]);
	let domains = CategoryDomains::default();
	assert_eq!(cache.by_category(Category::Runnable, &domains), vec![Entity::new("scene.movie", "Movie")]);
	assert!(cache.by_category(Category::Togglable, &domains).is_empty());
}

}
