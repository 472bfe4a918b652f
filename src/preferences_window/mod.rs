mod imp;

use std::rc::Rc;

use adw::prelude::*;
use adw::subclass::prelude::ObjectSubclassIsExt;
use adw::Application;
use gtk::gio::SettingsBindFlags;
use gtk::glib::{self, clone, Object};
use log::{debug, error, info, warn};

use hass_prefs::icons::icon_label;
use hass_prefs::settings::{self, SettingsStore};
use hass_prefs::task;
use hass_prefs::Category;

use crate::entity_page::EntityPage;
use crate::state::AppState;

glib::wrapper! {
    pub struct PreferencesWindow(ObjectSubclass<imp::PreferencesWindow>)
        @extends adw::PreferencesWindow, adw::Window, gtk::Window, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Native, gtk::Root, gtk::ShortcutManager;
}

impl PreferencesWindow {
    pub fn new(app: &Application, state: Rc<AppState>) -> Self {
        let window: Self = Object::builder().property("application", app).build();
        window.imp()
            .state
            .set(state.clone())
            .expect("Could not set state.");

        window.setup_general_page();
        for category in Category::ALL {
            window.add(&EntityPage::new(category, state.clone()));
        }

        window
    }

    fn state(&self) -> &Rc<AppState> {
        self.imp().state.get().expect("Could not get state.")
    }

    fn toast(&self, message: &str) {
        self.add_toast(&adw::Toast::new(message));
    }

    fn setup_general_page(&self) {
        let imp = self.imp();

        self.bind_string_row(&imp.url_row, settings::HASS_URL, |_| Ok(()));
        imp.token_row.connect_apply(clone!(@weak self as window => move |row| {
            window.store_token(row.text().to_string());
        }));

        self.bind_boolean_row(&imp.notifications_row, &imp.notifications_switch, settings::SHOW_NOTIFICATIONS);
        self.bind_boolean_row(&imp.debug_row, &imp.debug_switch, settings::DEBUG_MODE);
        self.bind_boolean_row(&imp.refresh_row, &imp.refresh_switch, settings::DO_REFRESH);
        self.bind_string_row(&imp.refresh_rate_row, settings::REFRESH_RATE, validate_refresh_rate);

        self.setup_icon_rows();
    }

    fn bind_boolean_row(&self, row: &adw::ActionRow, switch: &gtk::Switch, key: &str) {
        let store = &self.state().settings;
        let (summary, description) = store.describe(key);
        row.set_title(&summary);
        if let Some(description) = description {
            row.set_subtitle(&description);
        }
        store.inner()
            .bind(key, switch, "active")
            .flags(SettingsBindFlags::DEFAULT)
            .build();
    }

    fn bind_string_row<V>(&self, row: &adw::EntryRow, key: &'static str, validate: V)
    where
        V: Fn(&str) -> Result<(), String> + 'static,
    {
        let store = &self.state().settings;
        let (summary, _) = store.describe(key);
        row.set_title(&summary);
        row.set_text(&store.string(key));

        row.connect_apply(clone!(@weak self as window => move |row| {
            let text = row.text();
            if let Err(message) = validate(&text) {
                warn!("Rejected {} value {:?}: {}", key, text, message);
                window.toast(&message);
                return;
            }
            if let Err(e) = window.state().settings.set_string(key, &text) {
                error!("{}", e);
            }
        }));
    }

    fn setup_icon_rows(&self) {
        let icons = &self.state().icons;
        let current = icons.current();
        let mut leader: Option<gtk::CheckButton> = None;

        for icon in icons.valid() {
            let row = adw::ActionRow::builder()
                .title(icon_label(&icon).as_str())
                .build();
            let toggle = gtk::CheckButton::builder()
                .active(icon == current)
                .valign(gtk::Align::Center)
                .build();
            if let Some(leader) = leader.as_ref() {
                toggle.set_group(Some(leader));
            } else {
                leader = Some(toggle.clone());
            }
            row.add_suffix(&toggle);
            row.set_activatable_widget(Some(&toggle));

            toggle.connect_active_notify(clone!(@weak self as window => move |toggle| {
                if !toggle.is_active() {
                    return;
                }
                if let Err(e) = window.state().icons.select(&icon) {
                    error!("{}", e);
                }
            }));
            self.imp().icon_group.add(&row);
        }
    }

    fn store_token(&self, token: String) {
        if token.is_empty() {
            return;
        }
        info!("Access token changed ({} characters)", token.len());

        let secrets = self.state().secrets.clone();
        task::spawn_blocking("hass-secret", move || secrets.store_token(&token),
            clone!(@weak self as window => move |result| {
                match result {
                    Ok(()) => window.reload_entities(),
                    Err(e) => {
                        error!("Could not store access token: {}", e);
                        window.toast(&format!("Could not store access token: {}", e));
                    }
                }
            }),
        );
    }

    // A new token may grant access to a different set of entities.
    fn reload_entities(&self) {
        let window = self.downgrade();
        self.state().entities.reload(move |result| {
            let window = match window.upgrade() {
                Some(window) => window,
                None => return,
            };
            match result {
                Ok(count) => debug!("Reloaded {} entities", count),
                Err(e) => window.toast(&e.to_string()),
            }
        });
    }
}

fn validate_refresh_rate(text: &str) -> Result<(), String> {
    match text.trim().parse::<u32>() {
        Ok(seconds) if seconds > 0 => Ok(()),
        _ => Err("Refresh rate must be a positive number of seconds".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_refresh_rate() {
        assert!(validate_refresh_rate("60").is_ok());
        assert!(validate_refresh_rate(" 5 ").is_ok());
        assert!(validate_refresh_rate("0").is_err());
        assert!(validate_refresh_rate("-3").is_err());
        assert!(validate_refresh_rate("soon").is_err());
        assert!(validate_refresh_rate("").is_err());
    }
}
