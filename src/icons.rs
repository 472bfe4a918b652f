use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::settings::{self, SettingsError, SettingsStore};

#[derive(Debug, Error)]
pub enum IconError {
	#[error("{0} is not a valid panel icon")]
	Unknown(String),
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

/// The panel icon preference, restricted to the icons the panel ships.
#[derive(Clone, Debug)]
pub struct PanelIcons {
	store: Rc<dyn SettingsStore>,
}

impl PanelIcons {
	pub fn new(store: Rc<dyn SettingsStore>) -> Self {
		Self { store }
	}

	pub fn valid(&self) -> Vec<String> {
		self.store.strv(settings::VALID_PANEL_ICONS)
	}

	pub fn current(&self) -> String {
		self.store.string(settings::PANEL_ICON)
	}

	pub fn select(&self, icon: &str) -> Result<(), IconError> {
		if !self.valid().iter().any(|valid| valid == icon) {
			return Err(IconError::Unknown(icon.to_string()));
		}
		debug!("Panel icon set to {}", icon);
		self.store.set_string(settings::PANEL_ICON, icon)?;
		Ok(())
	}
}

/// `/icons/hass-blue.svg` becomes `Hass Blue`.
pub fn icon_label(icon: &str) -> String {
	let file_name = icon.rsplit('/').next().unwrap_or(icon);
	let stem = file_name.split('.').next().unwrap_or(file_name);
	stem.split('-')
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect(),
				None => String::new(),
			}
		})
		.collect::<Vec<String>>()
		.join(" ")
}
