use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicBool, Ordering},
	},
};

use time::{Duration, OffsetDateTime, macros::datetime};

use idlink_storage::{
	BoxFuture, Contact, ContactStore, Error, IdentityLock, LinkPrecedence, NewContact, Result,
};

const EPOCH: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

/// In-process [`ContactStore`] with a deterministic clock.
///
/// Each insert is stamped one second after the previous one, so creation order and `created_at`
/// order agree unless a test seeds explicit timestamps. Identity locks are taken per key, so
/// requests with disjoint keys run concurrently the same way they do against Postgres.
pub struct MemoryContactStore {
	state: Mutex<MemoryState>,
	key_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
	unavailable: AtomicBool,
}

struct MemoryState {
	contacts: Vec<Contact>,
	next_id: i64,
	clock: OffsetDateTime,
	inserts: usize,
	updates: usize,
	lock_requests: Vec<Vec<String>>,
}

impl MemoryContactStore {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(MemoryState {
				contacts: Vec::new(),
				next_id: 1,
				clock: EPOCH,
				inserts: 0,
				updates: 0,
				lock_requests: Vec::new(),
			}),
			key_locks: Mutex::new(HashMap::new()),
			unavailable: AtomicBool::new(false),
		}
	}

	/// Stores a contact with an explicit creation time without counting it as a write.
	pub fn seed(&self, contact: NewContact, created_at: OffsetDateTime) -> Contact {
		let mut state = self.state();
		let contact = state.push(contact, created_at);

		if created_at > state.clock {
			state.clock = created_at;
		}

		contact
	}

	/// Stores a contact stamped by the store clock without counting it as a write.
	pub fn seed_now(&self, contact: NewContact) -> Contact {
		let mut state = self.state();
		let created_at = state.tick();

		state.push(contact, created_at)
	}

	pub fn soft_delete(&self, contact_id: i64) {
		let mut state = self.state();
		let now = state.tick();

		if let Some(contact) = state.contacts.iter_mut().find(|contact| contact.id == contact_id) {
			contact.deleted_at = Some(now);
		}
	}

	pub fn contacts(&self) -> Vec<Contact> {
		self.state().contacts.clone()
	}

	pub fn contact(&self, contact_id: i64) -> Option<Contact> {
		self.state().contacts.iter().find(|contact| contact.id == contact_id).cloned()
	}

	pub fn insert_count(&self) -> usize {
		self.state().inserts
	}

	pub fn update_count(&self) -> usize {
		self.state().updates
	}

	/// Key sets passed to `lock_identity`, in call order.
	pub fn lock_requests(&self) -> Vec<Vec<String>> {
		self.state().lock_requests.clone()
	}

	/// While set, every store operation fails with a pool timeout.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	fn state(&self) -> MutexGuard<'_, MemoryState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
		let mut locks = self.key_locks.lock().unwrap_or_else(|err| err.into_inner());

		locks.entry(key.to_string()).or_default().clone()
	}

	fn check_available(&self) -> Result<()> {
		if self.unavailable.load(Ordering::SeqCst) {
			return Err(Error::Sqlx(sqlx::Error::PoolTimedOut));
		}

		Ok(())
	}
}
impl Default for MemoryContactStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryState {
	fn tick(&mut self) -> OffsetDateTime {
		self.clock += Duration::seconds(1);

		self.clock
	}

	fn push(&mut self, contact: NewContact, created_at: OffsetDateTime) -> Contact {
		let NewContact { email, phone_number, link_precedence, linked_id } = contact;
		let contact = Contact {
			id: self.next_id,
			email,
			phone_number,
			link_precedence,
			linked_id,
			created_at,
			updated_at: created_at,
			deleted_at: None,
		};

		self.next_id += 1;
		self.contacts.push(contact.clone());

		contact
	}

	fn live(&self) -> impl Iterator<Item = &Contact> {
		self.contacts.iter().filter(|contact| contact.deleted_at.is_none())
	}
}

impl ContactStore for MemoryContactStore {
	fn find_matching<'a>(
		&'a self,
		email: Option<&'a str>,
		phone_number: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<Contact>>> {
		Box::pin(async move {
			self.check_available()?;

			let state = self.state();
			let matches = state
				.live()
				.filter(|contact| {
					let email_hit = email.is_some() && contact.email.as_deref() == email;
					let phone_hit =
						phone_number.is_some() && contact.phone_number.as_deref() == phone_number;

					email_hit || phone_hit
				})
				.cloned()
				.collect();

			Ok(matches)
		})
	}

	fn find_by_ids_or_links<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Contact>>> {
		Box::pin(async move {
			self.check_available()?;

			let ids = ids.iter().copied().collect::<HashSet<_>>();
			let state = self.state();
			let matches = state
				.live()
				.filter(|contact| {
					ids.contains(&contact.id)
						|| contact.linked_id.map(|linked| ids.contains(&linked)).unwrap_or(false)
				})
				.cloned()
				.collect();

			Ok(matches)
		})
	}

	fn insert<'a>(&'a self, contact: NewContact) -> BoxFuture<'a, Result<Contact>> {
		Box::pin(async move {
			self.check_available()?;
			contact.validate()?;

			let mut state = self.state();
			let created_at = state.tick();
			let contact = state.push(contact, created_at);

			state.inserts += 1;

			Ok(contact)
		})
	}

	fn update_precedence<'a>(
		&'a self,
		contact_id: i64,
		precedence: LinkPrecedence,
		linked_id: Option<i64>,
		updated_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.check_available()?;

			let mut state = self.state();
			let contact = state
				.contacts
				.iter_mut()
				.find(|contact| contact.id == contact_id && contact.deleted_at.is_none())
				.ok_or_else(|| Error::NotFound(format!("Contact {contact_id} does not exist.")))?;

			contact.link_precedence = precedence;
			contact.linked_id = linked_id;
			contact.updated_at = updated_at;
			state.updates += 1;

			Ok(())
		})
	}

	fn lock_identity<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<IdentityLock>> {
		Box::pin(async move {
			self.check_available()?;
			self.state().lock_requests.push(keys.to_vec());

			let mut keys = keys.to_vec();

			keys.sort();
			keys.dedup();

			let mut guards = Vec::with_capacity(keys.len());

			for key in &keys {
				guards.push(self.key_lock(key).lock_owned().await);
			}

			Ok(IdentityLock::new(guards))
		})
	}
}
