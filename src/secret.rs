//! Access token storage in the freedesktop Secret Service.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use log::{debug, info};
use thiserror::Error;
use zbus::blocking::Connection;
use zbus::dbus_proxy;
use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

pub const SCHEMA_NAME: &str = "org.gnome.hass-data.Password";
pub const TOKEN_ATTRIBUTE: (&str, &str) = ("token_string", "user_token");

#[derive(Debug, Error)]
pub enum SecretError {
	#[error("Secret service error: {0}")]
	DBus(#[from] zbus::Error),
	#[error("No default keyring collection")]
	NoDefaultCollection,
	#[error("Keyring prompt was dismissed")]
	Dismissed,
	#[error("Stored access token is not valid UTF-8")]
	InvalidToken,
	#[error("Refusing to store an empty access token")]
	EmptyToken,
}

pub trait SecretStore: Send + Sync + fmt::Debug {
	fn store_token(&self, token: &str) -> Result<(), SecretError>;
	fn lookup_token(&self) -> Result<Option<String>, SecretError>;
}

#[dbus_proxy(
	interface = "org.freedesktop.Secret.Service",
	default_service = "org.freedesktop.secrets",
	default_path = "/org/freedesktop/secrets"
)]
trait Service {
	fn open_session(&self, algorithm: &str, input: &Value<'_>) -> zbus::Result<(OwnedValue, OwnedObjectPath)>;

	fn read_alias(&self, name: &str) -> zbus::Result<OwnedObjectPath>;

	fn search_items(&self, attributes: HashMap<&str, &str>) -> zbus::Result<(Vec<OwnedObjectPath>, Vec<OwnedObjectPath>)>;

	fn unlock(&self, objects: &[OwnedObjectPath]) -> zbus::Result<(Vec<OwnedObjectPath>, OwnedObjectPath)>;

	fn get_secrets(
		&self,
		items: &[OwnedObjectPath],
		session: &ObjectPath<'_>,
	) -> zbus::Result<HashMap<OwnedObjectPath, (OwnedObjectPath, Vec<u8>, Vec<u8>, String)>>;
}

#[dbus_proxy(
	interface = "org.freedesktop.Secret.Collection",
	default_service = "org.freedesktop.secrets"
)]
trait Collection {
	fn create_item(
		&self,
		properties: HashMap<&str, Value<'_>>,
		secret: &(ObjectPath<'_>, Vec<u8>, Vec<u8>, &str),
		replace: bool,
	) -> zbus::Result<(OwnedObjectPath, OwnedObjectPath)>;
}

#[dbus_proxy(
	interface = "org.freedesktop.Secret.Prompt",
	default_service = "org.freedesktop.secrets"
)]
trait Prompt {
	fn prompt(&self, window_id: &str) -> zbus::Result<()>;

	#[dbus_proxy(signal)]
	fn completed(&self, dismissed: bool, result: Value<'_>) -> zbus::Result<()>;
}

/// Token storage over the session bus, compatible with libsecret's
/// password schema for the same attributes.
#[derive(Debug, Clone)]
pub struct SecretService {
	label: String,
}

impl SecretService {
	pub fn new(label: &str) -> Self {
		Self { label: label.to_string() }
	}

	fn attributes() -> HashMap<&'static str, &'static str> {
		HashMap::from([("xdg:schema", SCHEMA_NAME), TOKEN_ATTRIBUTE])
	}

	fn open_session(service: &ServiceProxyBlocking<'_>) -> Result<OwnedObjectPath, SecretError> {
		let (_, session) = service.open_session("plain", &Value::from(""))?;
		Ok(session)
	}

	/// Waits for a prompt to complete. `/` means no prompt is needed.
	fn complete_prompt(connection: &Connection, prompt: &OwnedObjectPath) -> Result<(), SecretError> {
		if prompt.as_str() == "/" {
			return Ok(());
		}

		debug!("Waiting for keyring prompt {}", prompt.as_str());
		let proxy = PromptProxyBlocking::builder(connection)
			.path(prompt.as_str())?
			.build()?;
		let mut completed = proxy.receive_completed()?;
		proxy.prompt("")?;
		if let Some(signal) = completed.next() {
			if *signal.args()?.dismissed() {
				return Err(SecretError::Dismissed);
			}
		}
		Ok(())
	}
}

impl SecretStore for SecretService {
	fn store_token(&self, token: &str) -> Result<(), SecretError> {
		if token.is_empty() {
			return Err(SecretError::EmptyToken);
		}

		let connection = Connection::session()?;
		let service = ServiceProxyBlocking::new(&connection)?;
		let session = Self::open_session(&service)?;

		let collection_path = service.read_alias("default")?;
		if collection_path.as_str() == "/" {
			return Err(SecretError::NoDefaultCollection);
		}
		let (_, prompt) = service.unlock(&[collection_path.clone()])?;
		Self::complete_prompt(&connection, &prompt)?;

		let collection = CollectionProxyBlocking::builder(&connection)
			.path(collection_path.as_str())?
			.build()?;
		let mut properties: HashMap<&str, Value<'_>> = HashMap::new();
		properties.insert("org.freedesktop.Secret.Item.Label", Value::from(self.label.as_str()));
		properties.insert("org.freedesktop.Secret.Item.Attributes", Value::from(Self::attributes()));
		let secret = (session.clone().into_inner(), Vec::new(), token.as_bytes().to_vec(), "text/plain");

		let (_, prompt) = collection.create_item(properties, &secret, true)?;
		Self::complete_prompt(&connection, &prompt)?;
		info!("Stored access token in the default keyring");
		Ok(())
	}

	fn lookup_token(&self) -> Result<Option<String>, SecretError> {
		let connection = Connection::session()?;
		let service = ServiceProxyBlocking::new(&connection)?;

		let attributes = HashMap::from([TOKEN_ATTRIBUTE]);
		let (unlocked, locked) = service.search_items(attributes)?;
		let items = if !unlocked.is_empty() {
			unlocked
		} else if !locked.is_empty() {
			let (unlocked, prompt) = service.unlock(&locked)?;
			Self::complete_prompt(&connection, &prompt)?;
			if unlocked.is_empty() { locked } else { unlocked }
		} else {
			debug!("No access token stored");
			return Ok(None);
		};

		let session = Self::open_session(&service)?;
		let first = items[..1].to_vec();
		let secrets = service.get_secrets(&first, &session)?;
		match secrets.into_values().next() {
			Some((_, _, value, _)) => String::from_utf8(value).map(Some).map_err(|_| SecretError::InvalidToken),
			None => Ok(None),
		}
	}
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
	token: Mutex<Option<String>>,
}

impl MemorySecretStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl SecretStore for MemorySecretStore {
	fn store_token(&self, token: &str) -> Result<(), SecretError> {
		if token.is_empty() {
			return Err(SecretError::EmptyToken);
		}
		if let Ok(mut stored) = self.token.lock() {
			*stored = Some(token.to_string());
		}
		Ok(())
	}

	fn lookup_token(&self) -> Result<Option<String>, SecretError> {
		Ok(self.token.lock().ok().and_then(|stored| stored.clone()))
	}
}
