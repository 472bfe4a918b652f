use adw::subclass::prelude::*;
use gtk::{glib, CompositeTemplate};
use gtk::glib::subclass::InitializingObject;
use gtk::prelude::InitializingWidgetExt;
use once_cell::unsync::OnceCell;
use std::rc::Rc;

use hass_prefs::Category;

use crate::state::AppState;

// Object holding the state
#[derive(CompositeTemplate, Default)]
#[template(resource = "/org/gnome/hass_prefs/EntityPage.ui")]
pub struct EntityPage {
    #[template_child]
    pub group: TemplateChild<adw::PreferencesGroup>,
    #[template_child]
    pub search: TemplateChild<gtk::SearchEntry>,
    #[template_child]
    pub checked_list: TemplateChild<gtk::ListBox>,
    #[template_child]
    pub unchecked_list: TemplateChild<gtk::ListBox>,
    pub category: OnceCell<Category>,
    pub state: OnceCell<Rc<AppState>>,
}

#[glib::object_subclass]
impl ObjectSubclass for EntityPage {
    // `NAME` needs to match `class` attribute of template
    const NAME: &'static str = "HassEntityPage";
    type Type = super::EntityPage;
    type ParentType = adw::PreferencesPage;

    fn class_init(klass: &mut Self::Class) {
        klass.bind_template();
    }

    fn instance_init(obj: &InitializingObject<Self>) {
        obj.init_template();
    }
}

impl ObjectImpl for EntityPage {}

impl WidgetImpl for EntityPage {}

impl PreferencesPageImpl for EntityPage {}
