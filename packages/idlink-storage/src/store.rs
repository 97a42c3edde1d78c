use std::{future::Future, pin::Pin};

use time::OffsetDateTime;

use crate::{
	Error, Result, contacts,
	db::Db,
	models::{Contact, LinkPrecedence, NewContact},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence primitives the identity resolver needs.
///
/// Every read excludes soft-deleted rows.
pub trait ContactStore
where
	Self: Send + Sync,
{
	/// Contacts whose email equals `email` or whose phone number equals `phone_number`. An absent
	/// argument disables its side of the predicate.
	fn find_matching<'a>(
		&'a self,
		email: Option<&'a str>,
		phone_number: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<Contact>>>;

	/// Contacts whose own id or `linked_id` is in `ids`.
	fn find_by_ids_or_links<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Contact>>>;

	fn insert<'a>(&'a self, contact: NewContact) -> BoxFuture<'a, Result<Contact>>;

	fn update_precedence<'a>(
		&'a self,
		contact_id: i64,
		precedence: LinkPrecedence,
		linked_id: Option<i64>,
		updated_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>>;

	/// Blocks until no other holder owns any of `keys`. The lock lasts until the guard is dropped.
	fn lock_identity<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<IdentityLock>>;
}

/// Guard returned by [`ContactStore::lock_identity`].
pub struct IdentityLock {
	_guard: Box<dyn Send>,
}
impl IdentityLock {
	pub fn new<G>(guard: G) -> Self
	where
		G: Send + 'static,
	{
		Self { _guard: Box::new(guard) }
	}
}

impl ContactStore for Db {
	fn find_matching<'a>(
		&'a self,
		email: Option<&'a str>,
		phone_number: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<Contact>>> {
		Box::pin(contacts::find_matching(&self.pool, email, phone_number))
	}

	fn find_by_ids_or_links<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Contact>>> {
		Box::pin(contacts::find_by_ids_or_links(&self.pool, ids))
	}

	fn insert<'a>(&'a self, contact: NewContact) -> BoxFuture<'a, Result<Contact>> {
		Box::pin(async move { contacts::insert_contact(&self.pool, &contact).await })
	}

	fn update_precedence<'a>(
		&'a self,
		contact_id: i64,
		precedence: LinkPrecedence,
		linked_id: Option<i64>,
		updated_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(contacts::update_precedence(
			&self.pool,
			contact_id,
			precedence,
			linked_id,
			updated_at,
		))
	}

	fn lock_identity<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<IdentityLock>> {
		Box::pin(async move {
			let mut keys = keys.to_vec();

			keys.sort();
			keys.dedup();

			let permit = self
				.lock_slots
				.clone()
				.acquire_owned()
				.await
				.map_err(|err| Error::Lock(err.to_string()))?;
			// Transaction-scoped advisory locks pin this connection until the guard drops, at which
			// point the rollback releases them.
			let mut tx = self.pool.begin().await?;

			for key in &keys {
				sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
					.bind(key.as_str())
					.execute(&mut *tx)
					.await?;
			}

			Ok(IdentityLock::new((tx, permit)))
		})
	}
}
