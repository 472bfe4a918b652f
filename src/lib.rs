#[macro_use]
extern crate lazy_static;

pub mod cache;
pub mod config;
pub mod enabled;
pub mod entity;
pub mod hass;
pub mod icons;
pub mod secret;
pub mod settings;
pub mod source;
pub mod task;

pub use enabled::{EnabledEntities, EnabledError};
pub use entity::{Category, Entity};
pub use hass::FetchError;
