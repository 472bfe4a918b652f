use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use gtk::gio;
use gtk::gio::prelude::*;
use log::debug;
use thiserror::Error;

pub const HASS_URL: &str = "hass-url";
pub const ENTITIES_CACHE: &str = "hass-entities-cache";
pub const SHOW_NOTIFICATIONS: &str = "show-notifications";
pub const DEBUG_MODE: &str = "debug-mode";
pub const DO_REFRESH: &str = "refresh-sensors";
pub const REFRESH_RATE: &str = "refresh-rate";
pub const ENABLED_TOGGLABLES: &str = "hass-enabled-entities";
pub const ENABLED_RUNNABLES: &str = "hass-enabled-runnables";
pub const ENABLED_SENSORS: &str = "hass-enabled-sensor-ids";
pub const VALID_PANEL_ICONS: &str = "valid-panel-icons";
pub const PANEL_ICON: &str = "default-panel-icon";

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("GSettings schema {0} is not installed")]
	SchemaMissing(String),
	#[error("Could not write key {key}: {reason}")]
	Write { key: String, reason: String },
}

pub type ChangedCallback = Rc<dyn Fn(&str)>;

/// Key-value preferences with change notification.
///
/// Reads of unset keys return the type's empty value.
pub trait SettingsStore: fmt::Debug {
	fn string(&self, key: &str) -> String;
	fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError>;
	fn boolean(&self, key: &str) -> bool;
	fn set_boolean(&self, key: &str, value: bool) -> Result<(), SettingsError>;
	fn strv(&self, key: &str) -> Vec<String>;
	fn set_strv(&self, key: &str, value: &[String]) -> Result<(), SettingsError>;
	/// Calls `callback` with the key name whenever one of `keys` changes.
	fn connect_changed(&self, keys: &[&str], callback: ChangedCallback);
}

#[derive(Debug)]
pub struct GSettingsStore {
	settings: gio::Settings,
}

impl GSettingsStore {
	pub fn open(schema_id: &str) -> Result<Self, SettingsError> {
		let installed = gio::SettingsSchemaSource::default()
			.and_then(|source| source.lookup(schema_id, true))
			.is_some();
		if !installed {
			return Err(SettingsError::SchemaMissing(schema_id.to_string()));
		}

		Ok(Self { settings: gio::Settings::new(schema_id) })
	}

	pub fn inner(&self) -> &gio::Settings {
		&self.settings
	}

	/// Summary and description of a key as declared in the schema.
	pub fn describe(&self, key: &str) -> (String, Option<String>) {
		let schema_key = self.settings.settings_schema().map(|schema| schema.key(key));
		let summary = schema_key.as_ref()
			.and_then(|k| k.summary())
			.map(|s| s.to_string())
			.unwrap_or_else(|| key.to_string());
		let description = schema_key.as_ref()
			.and_then(|k| k.description())
			.map(|s| s.to_string());
		(summary, description)
	}
}

fn write_error(key: &str, err: glib::BoolError) -> SettingsError {
	SettingsError::Write { key: key.to_string(), reason: err.to_string() }
}

impl SettingsStore for GSettingsStore {
	fn string(&self, key: &str) -> String {
		self.settings.string(key).to_string()
	}

	fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
		self.settings.set_string(key, value).map_err(|e| write_error(key, e))
	}

	fn boolean(&self, key: &str) -> bool {
		self.settings.boolean(key)
	}

	fn set_boolean(&self, key: &str, value: bool) -> Result<(), SettingsError> {
		self.settings.set_boolean(key, value).map_err(|e| write_error(key, e))
	}

	fn strv(&self, key: &str) -> Vec<String> {
		self.settings.strv(key).iter().map(|s| s.to_string()).collect()
	}

	fn set_strv(&self, key: &str, value: &[String]) -> Result<(), SettingsError> {
		let value: Vec<&str> = value.iter().map(String::as_str).collect();
		self.settings.set_strv(key, &value).map_err(|e| write_error(key, e))
	}

	fn connect_changed(&self, keys: &[&str], callback: ChangedCallback) {
		for key in keys {
			let callback = callback.clone();
			self.settings.connect_changed(Some(*key), move |_, key| {
				debug!("Setting {} changed", key);
				callback(key);
			});
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
enum StoredValue {
	String(String),
	Boolean(bool),
	Strv(Vec<String>),
}

/// In-process store, used where no GSettings schema is available.
#[derive(Default)]
pub struct MemorySettings {
	values: RefCell<HashMap<String, StoredValue>>,
	listeners: RefCell<Vec<(Vec<String>, ChangedCallback)>>,
}

impl fmt::Debug for MemorySettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemorySettings")
			.field("values", &self.values.borrow())
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl MemorySettings {
	pub fn new() -> Self {
		Self::default()
	}

	fn store(&self, key: &str, value: StoredValue) {
		let changed = self.values.borrow_mut().insert(key.to_string(), value.clone()) != Some(value);
		if !changed {
			return;
		}

		// Listeners may read or write the store, so call them without holding a borrow.
		let listeners: Vec<ChangedCallback> = self.listeners.borrow().iter()
			.filter(|(keys, _)| keys.iter().any(|k| k == key))
			.map(|(_, callback)| callback.clone())
			.collect();
		for callback in listeners {
			callback(key);
		}
	}
}

impl SettingsStore for MemorySettings {
	fn string(&self, key: &str) -> String {
		match self.values.borrow().get(key) {
			Some(StoredValue::String(s)) => s.clone(),
			_ => String::new(),
		}
	}

	fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
		self.store(key, StoredValue::String(value.to_string()));
		Ok(())
	}

	fn boolean(&self, key: &str) -> bool {
		matches!(self.values.borrow().get(key), Some(StoredValue::Boolean(true)))
	}

	fn set_boolean(&self, key: &str, value: bool) -> Result<(), SettingsError> {
		self.store(key, StoredValue::Boolean(value));
		Ok(())
	}

	fn strv(&self, key: &str) -> Vec<String> {
		match self.values.borrow().get(key) {
			Some(StoredValue::Strv(v)) => v.clone(),
			_ => Vec::new(),
		}
	}

	fn set_strv(&self, key: &str, value: &[String]) -> Result<(), SettingsError> {
		self.store(key, StoredValue::Strv(value.to_vec()));
		Ok(())
	}

	fn connect_changed(&self, keys: &[&str], callback: ChangedCallback) {
		let keys = keys.iter().map(|k| k.to_string()).collect();
		self.listeners.borrow_mut().push((keys, callback));
	}
}

#[cfg(test)]
mod tests {

use std::cell::Cell;
use super::*;

#[test]
fn test_memory_settings_defaults() {
	let settings = MemorySettings::new();
	assert_eq!(settings.string(HASS_URL), "");
	assert!(!settings.boolean(DEBUG_MODE));
	assert!(settings.strv(ENABLED_SENSORS).is_empty());
}

#[test]
fn test_memory_settings_roundtrip() {
	let settings = MemorySettings::new();
	settings.set_string(HASS_URL, "http://hass.local:8123").unwrap();
	settings.set_boolean(DEBUG_MODE, true).unwrap();
	settings.set_strv(ENABLED_SENSORS, &["sensor.a".to_string()]).unwrap();

	assert_eq!(settings.string(HASS_URL), "http://hass.local:8123");
	assert!(settings.boolean(DEBUG_MODE));
	assert_eq!(settings.strv(ENABLED_SENSORS), vec!["sensor.a"]);
}

#[test]
fn test_memory_settings_notifies_listed_keys_only() {
	let settings = MemorySettings::new();
	let hits = Rc::new(Cell::new(0));
	let counter = hits.clone();
	settings.connect_changed(&[ENTITIES_CACHE], Rc::new(move |key| {
		assert_eq!(key, ENTITIES_CACHE);
		counter.set(counter.get() + 1);
	}));

	settings.set_string(HASS_URL, "http://hass.local").unwrap();
	assert_eq!(hits.get(), 0);
	settings.set_string(ENTITIES_CACHE, "{}").unwrap();
	assert_eq!(hits.get(), 1);
	// Same value again is not a change.
	settings.set_string(ENTITIES_CACHE, "{}").unwrap();
	assert_eq!(hits.get(), 1);
}

#[test]
fn test_memory_settings_listener_can_read_store() {
	let settings = Rc::new(MemorySettings::new());
	let seen = Rc::new(RefCell::new(String::new()));
	let (store, sink) = (Rc::downgrade(&settings), seen.clone());
	settings.connect_changed(&[HASS_URL], Rc::new(move |key| {
		if let Some(store) = store.upgrade() {
			sink.replace(store.string(key));
		}
	}));

	settings.set_string(HASS_URL, "http://hass.local").unwrap();
	assert_eq!(*seen.borrow(), "http://hass.local");
}

}
