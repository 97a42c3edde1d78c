use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;

use idlink_storage::{Contact, ContactStore, IdentityLock, LinkPrecedence, NewContact};

use crate::{Error, Result, fragment::Fragment, locate::locate};

const MAX_LOCK_ROUNDS: usize = 8;

/// Outcome of reconciling one fragment against the store.
#[derive(Clone, Debug)]
pub struct Resolution {
	/// Canonical primary of the final cluster.
	pub primary: Contact,
	/// Final cluster, re-read after any writes, ordered by `(created_at, id)`.
	pub cluster: Vec<Contact>,
	/// Contact inserted for this fragment, if it carried new information.
	pub created: Option<Contact>,
	/// Contacts whose link was rewritten to point at the canonical primary.
	pub relinked: Vec<i64>,
}

/// Reconciles `fragment` with the stored clusters.
///
/// Locating, merging, inserting and the final re-read all run under an identity lock that covers
/// the fragment's own keys and the primary of every contact in its cluster.
pub async fn resolve(store: &dyn ContactStore, fragment: &Fragment) -> Result<Resolution> {
	let (lock, cluster) = lock_cluster(store, fragment).await?;

	if cluster.is_empty() {
		let contact = store
			.insert(NewContact::primary(
				fragment.email().map(str::to_string),
				fragment.phone_number().map(str::to_string),
			))
			.await?;

		drop(lock);

		tracing::info!(contact_id = contact.id, "Created primary contact.");

		return Ok(Resolution {
			primary: contact.clone(),
			cluster: vec![contact.clone()],
			created: Some(contact),
			relinked: Vec::new(),
		});
	}

	check_links(&cluster)?;

	let canonical = canonical_primary(&cluster)?.clone();
	let relinked = merge_into(store, &canonical, &cluster).await?;
	let created = if is_novel(fragment, &cluster) {
		let contact = store
			.insert(NewContact::secondary(
				fragment.email().map(str::to_string),
				fragment.phone_number().map(str::to_string),
				canonical.id,
			))
			.await?;

		tracing::info!(
			contact_id = contact.id,
			primary_id = canonical.id,
			"Created secondary contact."
		);

		Some(contact)
	} else {
		None
	};
	let cluster = locate(store, fragment.email(), fragment.phone_number()).await?;

	drop(lock);
	check_links(&cluster)?;

	let primary = sole_primary(&cluster)?.clone();

	Ok(Resolution { primary, cluster, created, relinked })
}

/// Earliest-created primary, ties broken by the smaller id.
pub fn canonical_primary(cluster: &[Contact]) -> Result<&Contact> {
	cluster
		.iter()
		.filter(|contact| contact.is_primary())
		.min_by_key(|contact| contact.chronological_key())
		.ok_or_else(|| Error::consistency("Located cluster has no primary contact."))
}

/// The only primary of a resolved cluster.
pub fn sole_primary(cluster: &[Contact]) -> Result<&Contact> {
	let primaries = cluster.iter().filter(|contact| contact.is_primary()).count();

	if primaries > 1 {
		let message = format!("Resolved cluster still has {primaries} primary contacts.");

		tracing::error!(%message, "Contact links are inconsistent.");

		return Err(Error::consistency(message));
	}

	canonical_primary(cluster)
}

/// True when the fragment carries an email or phone number the cluster does not know yet.
pub fn is_novel(fragment: &Fragment, cluster: &[Contact]) -> bool {
	let emails = cluster.iter().filter_map(|contact| contact.email.as_deref()).collect::<HashSet<_>>();
	let phone_numbers =
		cluster.iter().filter_map(|contact| contact.phone_number.as_deref()).collect::<HashSet<_>>();

	fragment.email().is_some_and(|email| !emails.contains(email))
		|| fragment.phone_number().is_some_and(|phone| !phone_numbers.contains(phone))
}

/// Locks the fragment keys plus one `contact:<id>` key per primary reachable from the cluster.
///
/// Every write to a contact happens while its primary's key is held, so once the located cluster
/// is covered by the held keys it cannot change under us. When it is not covered the lock is
/// released and re-taken over the wider key set; keys are always acquired in one sorted pass.
async fn lock_cluster(
	store: &dyn ContactStore,
	fragment: &Fragment,
) -> Result<(IdentityLock, Vec<Contact>)> {
	let base = fragment.lock_keys();
	let mut keys = base.clone();

	for _ in 0..MAX_LOCK_ROUNDS {
		let lock = store.lock_identity(&keys).await?;
		let cluster = locate(store, fragment.email(), fragment.phone_number()).await?;
		let wanted = cluster_lock_keys(&base, &cluster);

		if wanted.iter().all(|key| keys.contains(key)) {
			return Ok((lock, cluster));
		}

		drop(lock);

		keys = wanted;
	}

	tracing::warn!(keys = ?keys, "Cluster kept changing while it was being locked.");

	Err(Error::Storage {
		message: format!("Cluster kept changing after {MAX_LOCK_ROUNDS} lock attempts."),
	})
}

fn cluster_lock_keys(base: &[String], cluster: &[Contact]) -> Vec<String> {
	let mut keys = base.to_vec();

	keys.extend(
		cluster
			.iter()
			.map(|contact| format!("contact:{}", contact.linked_id.unwrap_or(contact.id))),
	);
	keys.sort();
	keys.dedup();

	keys
}

/// Demotes every primary other than `canonical` and points its secondaries at `canonical`.
///
/// Secondaries are re-linked before their primary is demoted, so an interrupted merge leaves
/// extra primaries (collapsed by the next resolve) rather than chained links.
async fn merge_into(
	store: &dyn ContactStore,
	canonical: &Contact,
	cluster: &[Contact],
) -> Result<Vec<i64>> {
	let demoted = cluster
		.iter()
		.filter(|contact| contact.is_primary() && contact.id != canonical.id)
		.map(|contact| contact.id)
		.collect::<HashSet<_>>();

	if demoted.is_empty() {
		return Ok(Vec::new());
	}

	let now = OffsetDateTime::now_utc();
	let orphans = cluster.iter().filter(|contact| {
		contact.linked_id.map(|linked_id| demoted.contains(&linked_id)).unwrap_or(false)
	});
	let primaries = cluster.iter().filter(|contact| demoted.contains(&contact.id));
	let mut relinked = Vec::new();

	for contact in orphans.chain(primaries) {
		store
			.update_precedence(contact.id, LinkPrecedence::Secondary, Some(canonical.id), now)
			.await?;
		relinked.push(contact.id);
	}

	tracing::info!(
		primary_id = canonical.id,
		demoted = ?demoted,
		relinked = relinked.len(),
		"Merged contact clusters."
	);

	Ok(relinked)
}

/// Rejects clusters that break the flat primary/secondary link structure.
fn check_links(cluster: &[Contact]) -> Result<()> {
	let by_id = cluster.iter().map(|contact| (contact.id, contact)).collect::<HashMap<_, _>>();

	for contact in cluster {
		let violation = match (contact.link_precedence, contact.linked_id) {
			(LinkPrecedence::Primary, None) => None,
			(LinkPrecedence::Primary, Some(linked_id)) =>
				Some(format!("Primary contact {} is linked to {linked_id}.", contact.id)),
			(LinkPrecedence::Secondary, None) =>
				Some(format!("Secondary contact {} has no linked_id.", contact.id)),
			(LinkPrecedence::Secondary, Some(linked_id)) => match by_id.get(&linked_id) {
				Some(target) if target.is_primary() => None,
				Some(_) => Some(format!(
					"Secondary contact {} is linked to secondary contact {linked_id}.",
					contact.id
				)),
				None => Some(format!(
					"Secondary contact {} is linked to {linked_id}, which is not in its cluster.",
					contact.id
				)),
			},
		};

		if let Some(message) = violation {
			tracing::error!(contact_id = contact.id, %message, "Contact links are inconsistent.");

			return Err(Error::consistency(message));
		}
	}

	Ok(())
}
