use adw::subclass::prelude::*;
use gtk::{glib, CompositeTemplate};
use gtk::glib::subclass::InitializingObject;
use gtk::prelude::InitializingWidgetExt;
use once_cell::unsync::OnceCell;
use std::rc::Rc;

use crate::state::AppState;

// Object holding the state
#[derive(CompositeTemplate, Default)]
#[template(resource = "/org/gnome/hass_prefs/PreferencesWindow.ui")]
pub struct PreferencesWindow {
    #[template_child]
    pub url_row: TemplateChild<adw::EntryRow>,
    #[template_child]
    pub token_row: TemplateChild<adw::PasswordEntryRow>,
    #[template_child]
    pub notifications_row: TemplateChild<adw::ActionRow>,
    #[template_child]
    pub notifications_switch: TemplateChild<gtk::Switch>,
    #[template_child]
    pub debug_row: TemplateChild<adw::ActionRow>,
    #[template_child]
    pub debug_switch: TemplateChild<gtk::Switch>,
    #[template_child]
    pub refresh_row: TemplateChild<adw::ActionRow>,
    #[template_child]
    pub refresh_switch: TemplateChild<gtk::Switch>,
    #[template_child]
    pub refresh_rate_row: TemplateChild<adw::EntryRow>,
    #[template_child]
    pub icon_group: TemplateChild<adw::PreferencesGroup>,
    pub state: OnceCell<Rc<AppState>>,
}

// The central trait for subclassing a GObject
#[glib::object_subclass]
impl ObjectSubclass for PreferencesWindow {
    // `NAME` needs to match `class` attribute of template
    const NAME: &'static str = "HassPreferencesWindow";
    type Type = super::PreferencesWindow;
    type ParentType = adw::PreferencesWindow;

    fn class_init(klass: &mut Self::Class) {
        klass.bind_template();
    }

    fn instance_init(obj: &InitializingObject<Self>) {
        obj.init_template();
    }
}

// Trait shared by all GObjects
impl ObjectImpl for PreferencesWindow {
    fn constructed(&self) {
        // Call "constructed" on parent
        self.parent_constructed();
    }
}

// Trait shared by all widgets
impl WidgetImpl for PreferencesWindow {}

impl PreferencesWindowImpl for PreferencesWindow {}

impl WindowImpl for PreferencesWindow {}

impl AdwWindowImpl for PreferencesWindow {}
