use std::rc::Rc;
use std::sync::Arc;

use hass_prefs::config::Config;
use hass_prefs::enabled::EnabledEntities;
use hass_prefs::icons::PanelIcons;
use hass_prefs::secret::{SecretService, SecretStore};
use hass_prefs::settings::{GSettingsStore, SettingsStore};
use hass_prefs::source::EntitySource;

/// Everything the preference pages share.
#[derive(Debug)]
pub struct AppState {
    pub settings: Rc<GSettingsStore>,
    pub enabled: EnabledEntities,
    pub entities: EntitySource,
    pub icons: PanelIcons,
    pub secrets: Arc<dyn SecretStore>,
}

impl AppState {
    pub fn new(config: Config, settings: Rc<GSettingsStore>) -> Self {
        let store: Rc<dyn SettingsStore> = settings.clone();
        let secrets: Arc<dyn SecretStore> = Arc::new(SecretService::new(&config.secret.label));
        Self {
            enabled: EnabledEntities::new(store.clone()),
            entities: EntitySource::new(store.clone(), secrets.clone(), config),
            icons: PanelIcons::new(store),
            secrets,
            settings,
        }
    }
}
