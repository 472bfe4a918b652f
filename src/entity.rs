use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Home-Assistant entity as shown in the preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
	pub entity_id: String,
	pub name: String,
}

impl Entity {
	pub fn new(entity_id: &str, name: &str) -> Self {
		Self {
			entity_id: entity_id.to_string(),
			name: name.to_string(),
		}
	}

	/// The part of the id before the first dot, e.g. `switch` for `switch.kitchen`.
	pub fn domain(&self) -> &str {
		self.entity_id.split('.').next().unwrap_or_default()
	}

	pub fn label(&self) -> String {
		format!("{} ({})", self.name, self.entity_id)
	}

	/// Case-insensitive match of `term` against the name or the id. A blank
	/// term matches everything.
	pub fn matches(&self, term: &str) -> bool {
		let term = term.trim().to_lowercase();
		term.is_empty()
			|| self.name.to_lowercase().contains(&term)
			|| self.entity_id.to_lowercase().contains(&term)
	}
}

#[derive(Debug, Error, PartialEq)]
#[error("Type {0} is not supported")]
pub struct CategoryError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Togglable,
	Runnable,
	Sensor,
}

impl Category {
	pub const ALL: [Category; 3] = [Category::Togglable, Category::Runnable, Category::Sensor];

	pub fn as_str(&self) -> &'static str {
		match self {
			Category::Togglable => "togglable",
			Category::Runnable => "runnable",
			Category::Sensor => "sensor",
		}
	}

	pub fn title(&self) -> &'static str {
		match self {
			Category::Togglable => "Togglables",
			Category::Runnable => "Runnables",
			Category::Sensor => "Sensors",
		}
	}

	pub fn icon_name(&self) -> &'static str {
		match self {
			Category::Togglable | Category::Runnable => "system-shutdown-symbolic",
			Category::Sensor => "weather-clear-symbolic",
		}
	}

	/// Settings key holding the enabled ids of this category.
	pub fn enabled_key(&self) -> &'static str {
		match self {
			Category::Togglable => crate::settings::ENABLED_TOGGLABLES,
			Category::Runnable => crate::settings::ENABLED_RUNNABLES,
			Category::Sensor => crate::settings::ENABLED_SENSORS,
		}
	}

	pub fn group_title(&self) -> String {
		format!("Choose which {}s should appear in the menu:", self.as_str())
	}

	pub fn empty_message(&self) -> String {
		format!(
			"No {} found. Please check your Home-Assistant connection settings.",
			self.as_str()
		)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Category {
	type Err = CategoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"togglable" => Ok(Category::Togglable),
			"runnable" => Ok(Category::Runnable),
			"sensor" => Ok(Category::Sensor),
			_ => Err(CategoryError(s.to_string())),
		}
	}
}

/// Home-Assistant domains belonging to each category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryDomains {
	pub togglable: Vec<String>,
	pub runnable: Vec<String>,
	pub sensor: Vec<String>,
}

impl Default for CategoryDomains {
	fn default() -> Self {
		Self {
			togglable: vec!["switch", "light", "fan", "input_boolean"].into_iter().map(String::from).collect(),
			runnable: vec!["script", "scene"].into_iter().map(String::from).collect(),
			sensor: vec!["sensor", "binary_sensor"].into_iter().map(String::from).collect(),
		}
	}
}

impl CategoryDomains {
	pub fn domains(&self, category: Category) -> &[String] {
		match category {
			Category::Togglable => &self.togglable,
			Category::Runnable => &self.runnable,
			Category::Sensor => &self.sensor,
		}
	}

	pub fn contains(&self, category: Category, entity: &Entity) -> bool {
		let domain = entity.domain();
		self.domains(category).iter().any(|d| d == domain)
	}

	/// Entities of `category`, keeping their original order.
	pub fn filter(&self, category: Category, entities: &[Entity]) -> Vec<Entity> {
		entities.iter()
			.filter(|entity| self.contains(category, entity))
			.cloned()
			.collect()
	}
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn test_parse_category() {
	assert_eq!("togglable".parse::<Category>().unwrap(), Category::Togglable);
	assert_eq!("runnable".parse::<Category>().unwrap(), Category::Runnable);
	assert_eq!("sensor".parse::<Category>().unwrap(), Category::Sensor);
	assert_eq!("light".parse::<Category>(), Err(CategoryError("light".to_string())));
}

#[test]
fn test_entity_domain_and_label() {
	let entity = Entity::new("switch.kitchen_lamp", "Kitchen lamp");
	assert_eq!(entity.domain(), "switch");
	assert_eq!(entity.label(), "Kitchen lamp (switch.kitchen_lamp)");

	let odd = Entity::new("nodomain", "Odd");
	assert_eq!(odd.domain(), "nodomain");
}

#[test]
fn test_entity_matches_search_term() {
	let entity = Entity::new("light.Living_Room", "Ceiling Light");
	assert!(entity.matches(""));
	assert!(entity.matches("   "));
	assert!(entity.matches("ceiling"));
	assert!(entity.matches("LIGHT"));
	assert!(entity.matches("living_room"));
	assert!(entity.matches(" room "));
	assert!(!entity.matches("kitchen"));
	assert!(!entity.matches("ceiling light (light"));
}

#[test]
fn test_filter_by_category() {
	let entities = vec![
		Entity::new("sensor.temperature", "Temperature"),
		Entity::new("switch.heater", "Heater"),
		Entity::new("script.good_night", "Good night"),
		Entity::new("light.desk", "Desk"),
		Entity::new("binary_sensor.door", "Door"),
		Entity::new("sun.sun", "Sun"),
	];
	let domains = CategoryDomains::default();

	let togglables: Vec<String> = domains.filter(Category::Togglable, &entities).into_iter().map(|e| e.entity_id).collect();
	assert_eq!(togglables, vec!["switch.heater", "light.desk"]);

	let runnables: Vec<String> = domains.filter(Category::Runnable, &entities).into_iter().map(|e| e.entity_id).collect();
	assert_eq!(runnables, vec!["script.good_night"]);

	let sensors: Vec<String> = domains.filter(Category::Sensor, &entities).into_iter().map(|e| e.entity_id).collect();
	assert_eq!(sensors, vec!["sensor.temperature", "binary_sensor.door"]);
}

#[test]
fn test_category_messages() {
	assert_eq!(Category::Sensor.group_title(), "Choose which sensors should appear in the menu:");
	assert_eq!(
		Category::Runnable.empty_message(),
		"No runnable found. Please check your Home-Assistant connection settings."
	);
}

}
