mod imp;

use std::cell::Cell;
use std::rc::Rc;

use adw::prelude::*;
use adw::subclass::prelude::ObjectSubclassIsExt;
use gtk::{gdk, glib};
use gtk::glib::{clone, Object};
use log::{debug, error, warn};

use hass_prefs::enabled::partition;
use hass_prefs::settings::{self, SettingsStore};
use hass_prefs::source::FetchResult;
use hass_prefs::{Category, Entity};

use crate::entity_row::EntityRow;
use crate::state::AppState;

glib::wrapper! {
    pub struct EntityPage(ObjectSubclass<imp::EntityPage>)
        @extends adw::PreferencesPage, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget;
}

impl EntityPage {
    pub fn new(category: Category, state: Rc<AppState>) -> Self {
        let page: Self = Object::builder()
            .property("title", category.title())
            .property("icon-name", category.icon_name())
            .build();
        page.imp()
            .category
            .set(category)
            .expect("Could not set category.");
        page.imp()
            .state
            .set(state)
            .expect("Could not set state.");
        page.setup();
        page
    }

    fn category(&self) -> Category {
        *self.imp().category.get().expect("Could not get category.")
    }

    fn state(&self) -> &Rc<AppState> {
        self.imp().state.get().expect("Could not get state.")
    }

    fn setup(&self) {
        self.imp().group.set_title(&self.category().group_title());

        let drop_target = gtk::DropTarget::new(EntityRow::static_type(), gdk::DragAction::MOVE);
        drop_target.connect_drop(
            clone!(@weak self as page => @default-return false, move |_, value, _, y| {
                page.on_drop(value, y)
            }),
        );
        self.imp().checked_list.add_controller(&drop_target);

        self.setup_search();

        let page = self.downgrade();
        self.state().settings.connect_changed(&[settings::ENTITIES_CACHE], Rc::new(move |_| {
            if let Some(page) = page.upgrade() {
                page.refresh();
            }
        }));

        self.refresh();
    }

    fn setup_search(&self) {
        let search = self.imp().search.get();
        for list in [self.imp().checked_list.get(), self.imp().unchecked_list.get()] {
            list.set_filter_func(clone!(@weak search => @default-return true, move |row| {
                // Message rows stay visible.
                match row.downcast_ref::<EntityRow>() {
                    Some(row) => row.matches(&search.text()),
                    None => true,
                }
            }));
        }
        search.connect_search_changed(clone!(@weak self as page => move |search| {
            debug!("Filtering {} entities by {:?}", page.category(), search.text());
            page.imp().checked_list.invalidate_filter();
            page.imp().unchecked_list.invalidate_filter();
        }));
    }

    /// Rebuilds both lists from the entity source and the enabled set.
    pub fn refresh(&self) {
        self.clear_rows();
        let page = self.downgrade();
        self.state().entities.entities_by_type(self.category(), move |result| {
            if let Some(page) = page.upgrade() {
                page.populate(result);
            }
        });
    }

    fn clear_rows(&self) {
        for list in [self.imp().checked_list.get(), self.imp().unchecked_list.get()] {
            while let Some(child) = list.first_child() {
                list.remove(&child);
            }
        }
    }

    fn populate(&self, result: FetchResult) {
        self.clear_rows();
        let category = self.category();

        let entities = match result {
            Ok(entities) => entities,
            Err(e) => {
                warn!("No {} entities: {}", category, e);
                self.show_message(&category.empty_message(), Some(&e.to_string()));
                return;
            }
        };
        if entities.is_empty() {
            self.show_message(&category.empty_message(), None);
            return;
        }

        let enabled = self.state().enabled.enabled(category);
        let (checked, unchecked) = partition(&entities, &enabled);
        for entity in checked {
            self.append_row(entity, true);
        }
        for entity in unchecked {
            self.append_row(entity, false);
        }
    }

    fn show_message(&self, text: &str, detail: Option<&str>) {
        let row = adw::ActionRow::builder()
            .title(glib::markup_escape_text(text).as_str())
            .build();
        if let Some(detail) = detail {
            row.set_subtitle(&glib::markup_escape_text(detail));
        }
        self.imp().unchecked_list.append(&row);
    }

    fn append_row(&self, entity: &Entity, checked: bool) {
        let row = EntityRow::new(entity, checked);
        let entity = entity.clone();
        row.connect_checked(clone!(@weak self as page => move |row, checked| {
            page.on_toggle(&entity, row, checked);
        }));

        if checked {
            self.attach_drag(&row);
            self.imp().checked_list.append(&row);
        } else {
            self.imp().unchecked_list.append(&row);
        }
    }

    fn on_toggle(&self, entity: &Entity, row: &EntityRow, checked: bool) {
        let category = self.category();
        debug!(
            "{} {} ({}) as panel entry",
            if checked { "Check" } else { "Uncheck" },
            entity.name,
            entity.entity_id
        );

        let was_enabled = self.state().enabled.is_enabled(category, &entity.entity_id);
        if was_enabled == checked {
            return;
        }

        match self.state().enabled.toggle(category, &entity.entity_id, checked) {
            Ok(_) => {
                let from = if checked { &self.imp().unchecked_list } else { &self.imp().checked_list };
                from.remove(row);
                self.append_row(entity, checked);
            }
            Err(e) => {
                error!("Could not {} {}: {}", if checked { "enable" } else { "disable" }, entity.entity_id, e);
                row.set_checked(was_enabled);
            }
        }
    }

    fn attach_drag(&self, row: &EntityRow) {
        let list = self.imp().checked_list.get();
        let hotspot = Rc::new(Cell::new((0, 0)));

        let drag_source = gtk::DragSource::builder()
            .actions(gdk::DragAction::MOVE)
            .build();
        drag_source.connect_prepare(
            clone!(@weak row, @strong hotspot => @default-return None, move |_, x, y| {
                hotspot.set((x as i32, y as i32));
                Some(gdk::ContentProvider::for_value(&row.to_value()))
            }),
        );
        drag_source.connect_drag_begin(clone!(@weak row, @strong hotspot => move |source, _| {
            let (x, y) = hotspot.get();
            let icon = gtk::WidgetPaintable::new(Some(&row));
            source.set_icon(Some(&icon), x, y);
        }));
        row.add_controller(&drag_source);

        let motion = gtk::DropControllerMotion::new();
        motion.connect_enter(clone!(@weak list, @weak row => move |_, _, _| {
            list.drag_highlight_row(&row);
        }));
        motion.connect_leave(clone!(@weak list => move |_| {
            list.drag_unhighlight_row();
        }));
        row.add_controller(&motion);
    }

    fn on_drop(&self, value: &glib::Value, y: f64) -> bool {
        debug!("Drop!");
        let list = self.imp().checked_list.get();
        let row = match value.get::<EntityRow>() {
            Ok(row) => row,
            Err(_) => return false,
        };
        // Rows dragged in from another page are not ours to reorder.
        if row.parent().as_ref() != Some(list.upcast_ref::<gtk::Widget>()) {
            return false;
        }
        let target = match list.row_at_y(y as i32) {
            Some(target) => target,
            None => return false,
        };

        let index = target.index();
        list.drag_unhighlight_row();
        list.remove(&row);
        list.insert(&row, index);
        target.set_state_flags(gtk::StateFlags::NORMAL, true);

        let category = self.category();
        match self.state().enabled.reorder_visible(category, &self.checked_ids()) {
            Ok(order) => debug!("{} order: {}", category, order.join(", ")),
            Err(e) => {
                error!("Could not reorder {} entities: {}", category, e);
                self.refresh();
            }
        }

        true
    }

    fn checked_ids(&self) -> Vec<String> {
        let list = self.imp().checked_list.get();
        let mut ids = Vec::new();
        let mut index = 0;
        while let Some(row) = list.row_at_index(index) {
            if let Some(row) = row.downcast_ref::<EntityRow>() {
                ids.push(row.entity_id());
            }
            index += 1;
        }
        ids
    }
}
