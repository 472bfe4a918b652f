use adw::prelude::*;
use adw::subclass::prelude::*;
use gtk::{glib, CompositeTemplate};
use gtk::glib::{ParamSpec, ParamSpecString, Value};
use gtk::glib::subclass::InitializingObject;
use once_cell::sync::Lazy;
use std::cell::RefCell;

use hass_prefs::Entity;

// Object holding the state
#[derive(CompositeTemplate, Default)]
#[template(resource = "/org/gnome/hass_prefs/EntityRow.ui")]
pub struct EntityRow {
    #[template_child]
    pub drag_handle: TemplateChild<gtk::Image>,
    #[template_child]
    pub check: TemplateChild<gtk::CheckButton>,
    pub entity_id: RefCell<String>,
    pub entity: RefCell<Entity>,
}

#[glib::object_subclass]
impl ObjectSubclass for EntityRow {
    // `NAME` needs to match `class` attribute of template
    const NAME: &'static str = "HassEntityRow";
    type Type = super::EntityRow;
    type ParentType = adw::ActionRow;

    fn class_init(klass: &mut Self::Class) {
        klass.bind_template();
    }

    fn instance_init(obj: &InitializingObject<Self>) {
        obj.init_template();
    }
}

impl ObjectImpl for EntityRow {
    fn properties() -> &'static [ParamSpec] {
        static PROPERTIES: Lazy<Vec<ParamSpec>> =
            Lazy::new(|| vec![
                ParamSpecString::builder("entity-id").build(),
            ]);
        PROPERTIES.as_ref()
    }

    fn set_property(&self, _id: usize, value: &Value, pspec: &ParamSpec) {
        match pspec.name() {
            "entity-id" => {
                let entity_id: Option<String> = value.get().expect("The value needs to be of type `String`.");
                self.entity_id.replace(entity_id.unwrap_or_default());
            }
            _ => unimplemented!(),
        }
    }

    fn property(&self, _id: usize, pspec: &ParamSpec) -> Value {
        match pspec.name() {
            "entity-id" => self.entity_id.borrow().to_value(),
            _ => unimplemented!(),
        }
    }
}

impl WidgetImpl for EntityRow {}

impl ListBoxRowImpl for EntityRow {}

impl PreferencesRowImpl for EntityRow {}

impl ActionRowImpl for EntityRow {}
