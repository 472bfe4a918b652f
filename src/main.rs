mod entity_page;
mod entity_row;
mod preferences_window;
mod state;

use std::rc::Rc;

use adw::prelude::*;
use adw::Application;
use gtk::gio;
use log::{error, LevelFilter};

use hass_prefs::config;
use hass_prefs::settings::{self, GSettingsStore, SettingsStore};

use crate::preferences_window::PreferencesWindow;
use crate::state::AppState;

pub const APP_ID: &str = "org.gnome.shell.extensions.hass-data.Preferences";

fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();
    log::set_max_level(LevelFilter::Info);

    gio::resources_register_include!("hass_prefs.gresource")
        .expect("Failed to register resources.");

    let app = Application::builder().application_id(APP_ID).build();
    app.connect_activate(build_ui);
    app.run();
}

fn apply_debug_mode(enabled: bool) {
    log::set_max_level(if enabled { LevelFilter::Debug } else { LevelFilter::Info });
}

fn build_ui(app: &Application) {
    let config = config::load();
    let store = match GSettingsStore::open(&config.settings.schema_id) {
        Ok(store) => Rc::new(store),
        Err(e) => {
            error!("{}", e);
            app.quit();
            return;
        }
    };

    apply_debug_mode(store.boolean(settings::DEBUG_MODE));
    let debug_store = Rc::downgrade(&store);
    store.connect_changed(&[settings::DEBUG_MODE], Rc::new(move |key| {
        if let Some(store) = debug_store.upgrade() {
            apply_debug_mode(store.boolean(key));
        }
    }));

    let state = Rc::new(AppState::new(config, store));
    let window = PreferencesWindow::new(app, state);
    window.present();
}
