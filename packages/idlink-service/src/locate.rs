use std::collections::BTreeSet;

use idlink_storage::{Contact, ContactStore};

use crate::Result;

/// Returns every live contact connected to `email` or `phone_number`, ordered by
/// `(created_at, id)`.
///
/// Links are flat (a secondary always points at a primary), so the direct matches plus one hop
/// through `id`/`linked_id` covers the whole cluster. The result may hold several primaries when
/// the pair bridges clusters that grew independently.
pub async fn locate(
	store: &dyn ContactStore,
	email: Option<&str>,
	phone_number: Option<&str>,
) -> Result<Vec<Contact>> {
	let direct = store.find_matching(email, phone_number).await?;

	if direct.is_empty() {
		return Ok(Vec::new());
	}

	let seeds = direct
		.iter()
		.flat_map(|contact| std::iter::once(contact.id).chain(contact.linked_id))
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	let mut cluster = store.find_by_ids_or_links(&seeds).await?;

	cluster.sort_by_key(Contact::chronological_key);
	cluster.dedup_by_key(|contact| contact.id);

	Ok(cluster)
}
