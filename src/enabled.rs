//! Ordered sets of enabled entity ids, one per category.
//!
//! Every mutation is a single read-modify-write of the full set against the
//! settings store.

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::entity::{Category, Entity};
use crate::settings::{SettingsError, SettingsStore};

#[derive(Debug, Error)]
pub enum EnabledError {
	#[error("New order is not a permutation of the enabled {category} entities (missing: {missing:?}, unexpected: {unexpected:?})")]
	NotAPermutation {
		category: Category,
		missing: Vec<String>,
		unexpected: Vec<String>,
	},
	#[error("Entity {0} appears more than once in the new order")]
	Duplicate(String),
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

#[derive(Clone, Debug)]
pub struct EnabledEntities {
	store: Rc<dyn SettingsStore>,
}

impl EnabledEntities {
	pub fn new(store: Rc<dyn SettingsStore>) -> Self {
		Self { store }
	}

	/// Persisted order of enabled ids; empty when unset.
	pub fn enabled(&self, category: Category) -> Vec<String> {
		self.store.strv(category.enabled_key())
	}

	pub fn is_enabled(&self, category: Category, entity_id: &str) -> bool {
		self.enabled(category).iter().any(|id| id == entity_id)
	}

	/// Replaces the whole set. Ids are not checked against any entity list.
	pub fn set_enabled(&self, category: Category, ids: &[String]) -> Result<(), EnabledError> {
		self.store.set_strv(category.enabled_key(), ids)?;
		debug!("{} {} entries enabled: {}", ids.len(), category, ids.join(", "));
		Ok(())
	}

	/// Appends or removes `entity_id`. Does not write when nothing changes.
	pub fn toggle(&self, category: Category, entity_id: &str, enabled: bool) -> Result<Vec<String>, EnabledError> {
		let mut current = self.enabled(category);
		let index = current.iter().position(|id| id == entity_id);

		match (index, enabled) {
			(Some(index), false) => {
				debug!("Entry {} currently present, remove it", entity_id);
				current.remove(index);
			}
			(None, true) => {
				debug!("Entry {} not currently present, add it", entity_id);
				current.push(entity_id.to_string());
			}
			_ => {
				debug!("Entry {} currently {}, no change", entity_id, if enabled { "present" } else { "not present" });
				return Ok(current);
			}
		}

		self.set_enabled(category, &current)?;
		Ok(current)
	}

	/// Persists `new_order`, which must hold exactly the currently enabled ids.
	pub fn reorder(&self, category: Category, new_order: &[String]) -> Result<Vec<String>, EnabledError> {
		let current = self.enabled(category);

		let mut seen = HashSet::new();
		for id in new_order {
			if !seen.insert(id.as_str()) {
				return Err(EnabledError::Duplicate(id.clone()));
			}
		}

		let missing: Vec<String> = current.iter()
			.filter(|id| !seen.contains(id.as_str()))
			.cloned()
			.collect();
		let unexpected: Vec<String> = new_order.iter()
			.filter(|id| !current.contains(id))
			.cloned()
			.collect();
		if !missing.is_empty() || !unexpected.is_empty() {
			return Err(EnabledError::NotAPermutation { category, missing, unexpected });
		}

		self.set_enabled(category, new_order)?;
		Ok(new_order.to_vec())
	}

	/// Reorders from the ids currently displayed. Enabled ids that are not
	/// displayed keep their relative order after the displayed ones.
	pub fn reorder_visible(&self, category: Category, visible: &[String]) -> Result<Vec<String>, EnabledError> {
		let current = self.enabled(category);
		let mut new_order = visible.to_vec();
		new_order.extend(current.into_iter().filter(|id| !visible.contains(id)));
		self.reorder(category, &new_order)
	}
}

/// Splits `entities` into enabled ones, in `enabled` order, and the rest, in
/// their original order.
pub fn partition<'a>(entities: &'a [Entity], enabled: &[String]) -> (Vec<&'a Entity>, Vec<&'a Entity>) {
	let checked = enabled.iter()
		.filter_map(|id| entities.iter().find(|entity| &entity.entity_id == id))
		.collect();
	let unchecked = entities.iter()
		.filter(|entity| !enabled.contains(&entity.entity_id))
		.collect();
	(checked, unchecked)
}

#[cfg(test)]
mod tests {

use super::*;
use crate::settings::MemorySettings;

fn ids(values: &[&str]) -> Vec<String> {
	values.iter().map(|v| v.to_string()).collect()
}

fn manager() -> EnabledEntities {
	EnabledEntities::new(Rc::new(MemorySettings::new()))
}

#[test]
fn test_enabled_defaults_to_empty() {
	let enabled = manager();
	for category in Category::ALL {
		assert!(enabled.enabled(category).is_empty());
	}
}

#[test]
fn test_toggle_reorder_example() {
	let enabled = manager();
	enabled.set_enabled(Category::Togglable, &ids(&["a", "b"])).unwrap();

	assert_eq!(enabled.toggle(Category::Togglable, "c", true).unwrap(), ids(&["a", "b", "c"]));
	assert_eq!(enabled.toggle(Category::Togglable, "a", false).unwrap(), ids(&["b", "c"]));
	assert_eq!(enabled.reorder(Category::Togglable, &ids(&["c", "b"])).unwrap(), ids(&["c", "b"]));
	assert_eq!(enabled.enabled(Category::Togglable), ids(&["c", "b"]));
}

#[test]
fn test_toggle_is_idempotent() {
	let enabled = manager();
	let once = enabled.toggle(Category::Sensor, "sensor.a", true).unwrap();
	let twice = enabled.toggle(Category::Sensor, "sensor.a", true).unwrap();
	assert_eq!(once, twice);
	assert_eq!(twice, ids(&["sensor.a"]));

	let once = enabled.toggle(Category::Sensor, "sensor.a", false).unwrap();
	let twice = enabled.toggle(Category::Sensor, "sensor.a", false).unwrap();
	assert_eq!(once, twice);
	assert!(twice.is_empty());
}

#[test]
fn test_toggle_noop_does_not_write() {
	let store = Rc::new(MemorySettings::new());
	let writes = Rc::new(std::cell::Cell::new(0));
	let counter = writes.clone();
	store.connect_changed(&[Category::Runnable.enabled_key()], Rc::new(move |_| counter.set(counter.get() + 1)));
	let enabled = EnabledEntities::new(store);

	enabled.toggle(Category::Runnable, "script.x", true).unwrap();
	enabled.toggle(Category::Runnable, "script.x", true).unwrap();
	enabled.toggle(Category::Runnable, "script.y", false).unwrap();
	assert_eq!(writes.get(), 1);
}

#[test]
fn test_toggle_sequences_never_duplicate() {
	let enabled = manager();
	let sequence = [("a", true), ("b", true), ("a", true), ("c", true), ("b", false), ("b", true), ("a", true), ("c", false), ("c", true)];
	for (id, state) in sequence {
		let current = enabled.toggle(Category::Togglable, id, state).unwrap();
		let unique: HashSet<&String> = current.iter().collect();
		assert_eq!(unique.len(), current.len());
	}
	assert_eq!(enabled.enabled(Category::Togglable), ids(&["a", "b", "c"]));
}

#[test]
fn test_categories_are_independent() {
	let enabled = manager();
	enabled.toggle(Category::Togglable, "switch.a", true).unwrap();
	enabled.toggle(Category::Sensor, "sensor.a", true).unwrap();
	assert_eq!(enabled.enabled(Category::Togglable), ids(&["switch.a"]));
	assert_eq!(enabled.enabled(Category::Sensor), ids(&["sensor.a"]));
	assert!(enabled.enabled(Category::Runnable).is_empty());
	assert!(!enabled.is_enabled(Category::Runnable, "switch.a"));
}

#[test]
fn test_reorder_permutation_keeps_membership() {
	let enabled = manager();
	enabled.set_enabled(Category::Sensor, &ids(&["a", "b", "c", "d"])).unwrap();
	let reordered = enabled.reorder(Category::Sensor, &ids(&["d", "a", "c", "b"])).unwrap();

	let mut before = ids(&["a", "b", "c", "d"]);
	let mut after = reordered.clone();
	before.sort();
	after.sort();
	assert_eq!(before, after);
	assert_eq!(reordered, ids(&["d", "a", "c", "b"]));
}

#[test]
fn test_reorder_rejects_non_permutations() {
	let enabled = manager();
	enabled.set_enabled(Category::Togglable, &ids(&["a", "b"])).unwrap();

	match enabled.reorder(Category::Togglable, &ids(&["b"])) {
		Err(EnabledError::NotAPermutation { missing, unexpected, .. }) => {
			assert_eq!(missing, ids(&["a"]));
			assert!(unexpected.is_empty());
		}
		other => panic!("unexpected result {:?}", other),
	}

	match enabled.reorder(Category::Togglable, &ids(&["b", "a", "z"])) {
		Err(EnabledError::NotAPermutation { missing, unexpected, .. }) => {
			assert!(missing.is_empty());
			assert_eq!(unexpected, ids(&["z"]));
		}
		other => panic!("unexpected result {:?}", other),
	}

	assert!(matches!(
		enabled.reorder(Category::Togglable, &ids(&["a", "b", "a"])),
		Err(EnabledError::Duplicate(id)) if id == "a"
	));

	// Nothing was written by the rejected calls.
	assert_eq!(enabled.enabled(Category::Togglable), ids(&["a", "b"]));
}

#[test]
fn test_reorder_visible_keeps_stale_ids() {
	let enabled = manager();
	enabled.set_enabled(Category::Togglable, &ids(&["a", "gone", "b", "c"])).unwrap();

	let reordered = enabled.reorder_visible(Category::Togglable, &ids(&["c", "a", "b"])).unwrap();
	assert_eq!(reordered, ids(&["c", "a", "b", "gone"]));

	assert!(enabled.reorder_visible(Category::Togglable, &ids(&["c", "x"])).is_err());
	assert_eq!(enabled.enabled(Category::Togglable), ids(&["c", "a", "b", "gone"]));
}

#[test]
fn test_partition_orders_checked_by_enabled() {
	let entities = vec![
		Entity::new("switch.a", "A"),
		Entity::new("switch.b", "B"),
		Entity::new("switch.c", "C"),
		Entity::new("switch.d", "D"),
	];
	let (checked, unchecked) = partition(&entities, &ids(&["switch.c", "stale", "switch.a"]));
	let checked: Vec<&str> = checked.iter().map(|e| e.entity_id.as_str()).collect();
	let unchecked: Vec<&str> = unchecked.iter().map(|e| e.entity_id.as_str()).collect();
	assert_eq!(checked, vec!["switch.c", "switch.a"]);
	assert_eq!(unchecked, vec!["switch.b", "switch.d"]);
}

#[test]
fn test_partition_empty_entities() {
	let enabled = manager();
	enabled.set_enabled(Category::Sensor, &ids(&["sensor.a"])).unwrap();
	let (checked, unchecked) = partition(&[], &enabled.enabled(Category::Sensor));
	assert!(checked.is_empty());
	assert!(unchecked.is_empty());
	assert_eq!(enabled.enabled(Category::Sensor), ids(&["sensor.a"]));
}

}
