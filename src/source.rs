//! Entity lists per category, served from the settings cache or fetched from
//! Home-Assistant.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cache::EntityCache;
use crate::config::Config;
use crate::entity::{Category, Entity};
use crate::hass::{Client, FetchError};
use crate::secret::SecretStore;
use crate::settings::{self, SettingsStore};
use crate::task;

pub type FetchResult = Result<Vec<Entity>, FetchError>;
type Waiter = Box<dyn FnOnce(Result<EntityCache, FetchError>)>;

#[derive(Default)]
struct InFlight {
	// Served by the fetch running now.
	waiters: Vec<Waiter>,
	// Reloads requested while it runs. They need a fetch of their own, since
	// the running one may have read an outdated URL or token.
	reloads: Vec<Waiter>,
}

#[derive(Clone)]
pub struct EntitySource {
	store: Rc<dyn SettingsStore>,
	secrets: Arc<dyn SecretStore>,
	config: Config,
	in_flight: Rc<RefCell<Option<InFlight>>>,
}

impl fmt::Debug for EntitySource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntitySource")
			.field("store", &self.store)
			.field("secrets", &self.secrets)
			.field("fetching", &self.is_fetching())
			.finish()
	}
}

impl EntitySource {
	pub fn new(store: Rc<dyn SettingsStore>, secrets: Arc<dyn SecretStore>, config: Config) -> Self {
		Self {
			store,
			secrets,
			config,
			in_flight: Rc::new(RefCell::new(None)),
		}
	}

	pub fn cached(&self) -> Option<EntityCache> {
		EntityCache::parse(&self.store.string(settings::ENTITIES_CACHE))
	}

	pub fn is_fetching(&self) -> bool {
		self.in_flight.borrow().is_some()
	}

	/// Delivers the entities of `category`. Runs `on_done` right away on a
	/// cache hit, otherwise once the fetch completes on the main loop.
	pub fn entities_by_type<F>(&self, category: Category, on_done: F)
	where
		F: FnOnce(FetchResult) + 'static,
	{
		let domains = self.config.categories.clone();
		if let Some(cache) = self.cached() {
			debug!("Serving {} entities from cache fetched at {}", category, cache.fetched_at);
			on_done(Ok(cache.by_category(category, &domains)));
			return;
		}

		self.fetch(false, Box::new(move |result: Result<EntityCache, FetchError>| {
			on_done(result.map(|cache| cache.by_category(category, &domains)));
		}));
	}

	/// Fetches again regardless of the cache. On failure the cache is cleared.
	///
	/// A reload never joins a fetch already running: it gets a fresh one once
	/// that fetch is done.
	pub fn reload<F>(&self, on_done: F)
	where
		F: FnOnce(Result<usize, FetchError>) + 'static,
	{
		let store = self.store.clone();
		self.fetch(true, Box::new(move |result: Result<EntityCache, FetchError>| {
			if result.is_err() {
				invalidate(store.as_ref());
			}
			on_done(result.map(|cache| cache.entities.len()));
		}));
	}

	pub fn invalidate(&self) {
		invalidate(self.store.as_ref());
	}

	fn fetch(&self, reload: bool, waiter: Waiter) {
		if let Some(in_flight) = self.in_flight.borrow_mut().as_mut() {
			if reload {
				debug!("Fetch in flight, reloading once it is done");
				in_flight.reloads.push(waiter);
			} else {
				debug!("Fetch already in flight, queueing");
				in_flight.waiters.push(waiter);
			}
			return;
		}
		self.start(vec![waiter]);
	}

	fn start(&self, waiters: Vec<Waiter>) {
		*self.in_flight.borrow_mut() = Some(InFlight { waiters, reloads: Vec::new() });

		let url = self.store.string(settings::HASS_URL);
		let secrets = self.secrets.clone();
		let timeout = self.config.http.timeout();
		let source = self.clone();

		task::spawn_blocking("hass-fetch", move || -> FetchResult {
			let token = secrets.lookup_token()
				.map_err(|e| FetchError::Secret(e.to_string()))?
				.ok_or(FetchError::MissingToken)?;
			Client::new(&url, &token, timeout)?.states()
		}, move |result: FetchResult| {
			let result = result.map(EntityCache::new);
			match &result {
				Ok(cache) => {
					info!("Fetched {} entities", cache.entities.len());
					if let Err(e) = source.store.set_string(settings::ENTITIES_CACHE, &cache.to_json()) {
						warn!("Could not write entities cache: {}", e);
					}
				}
				Err(e) => warn!("Could not fetch entities: {}", e),
			}
			source.complete(result);
		});
	}

	// Hands `result` to everyone waiting on the fetch that just finished and
	// starts the fetch owed to reloads queued meanwhile.
	fn complete(&self, result: Result<EntityCache, FetchError>) {
		let in_flight = self.in_flight.borrow_mut().take().unwrap_or_default();
		if !in_flight.reloads.is_empty() {
			self.start(in_flight.reloads);
		}
		for waiter in in_flight.waiters {
			waiter(result.clone());
		}
	}
}

fn invalidate(store: &dyn SettingsStore) {
	debug!("Invalidating entities cache");
	if let Err(e) = store.set_string(settings::ENTITIES_CACHE, "") {
		warn!("Could not invalidate entities cache: {}", e);
	}
}
