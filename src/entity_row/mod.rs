mod imp;

use adw::prelude::*;
use adw::subclass::prelude::ObjectSubclassIsExt;
use gtk::glib::{self, Object};

use hass_prefs::Entity;

glib::wrapper! {
    pub struct EntityRow(ObjectSubclass<imp::EntityRow>)
        @extends adw::ActionRow, adw::PreferencesRow, gtk::ListBoxRow, gtk::Widget,
        @implements gtk::Accessible, gtk::Actionable, gtk::Buildable, gtk::ConstraintTarget;
}

impl EntityRow {
    pub fn new(entity: &Entity, checked: bool) -> Self {
        let row: Self = Object::builder()
            .property("entity-id", entity.entity_id.as_str())
            .property("title", glib::markup_escape_text(&entity.label()).as_str())
            .build();
        row.imp().entity.replace(entity.clone());
        row.imp().check.set_active(checked);
        // Only enabled rows can be dragged.
        row.imp().drag_handle.set_visible(checked);
        row
    }

    pub fn entity_id(&self) -> String {
        self.imp().entity_id.borrow().clone()
    }

    pub fn matches(&self, term: &str) -> bool {
        self.imp().entity.borrow().matches(term)
    }

    pub fn set_checked(&self, checked: bool) {
        self.imp().check.set_active(checked);
    }

    /// Calls `f` with the new state whenever the check button is toggled.
    pub fn connect_checked<F: Fn(&Self, bool) + 'static>(&self, f: F) {
        let row = self.downgrade();
        self.imp().check.connect_active_notify(move |check| {
            if let Some(row) = row.upgrade() {
                f(&row, check.is_active());
            }
        });
    }
}
