use serde::{Deserialize, Serialize};

use idlink_storage::Contact;

/// Consolidated identity returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
	pub primary_contact_id: i64,
	pub emails: Vec<String>,
	pub phone_numbers: Vec<String>,
	pub secondary_contact_ids: Vec<i64>,
}

/// Shapes a resolved cluster for the response.
///
/// The primary's own email and phone come first; the rest follow in `(created_at, id)` order with
/// repeats dropped. Every member other than `primary` is reported as secondary.
pub fn build_view(primary: &Contact, cluster: &[Contact]) -> IdentityView {
	let mut members = cluster.iter().filter(|contact| contact.id != primary.id).collect::<Vec<_>>();

	members.sort_by_key(|contact| contact.chronological_key());

	let mut emails = Vec::new();
	let mut phone_numbers = Vec::new();
	let mut secondary_contact_ids = Vec::with_capacity(members.len());

	push_unique(&mut emails, primary.email.as_deref());
	push_unique(&mut phone_numbers, primary.phone_number.as_deref());

	for contact in members {
		push_unique(&mut emails, contact.email.as_deref());
		push_unique(&mut phone_numbers, contact.phone_number.as_deref());
		secondary_contact_ids.push(contact.id);
	}

	IdentityView { primary_contact_id: primary.id, emails, phone_numbers, secondary_contact_ids }
}

fn push_unique(values: &mut Vec<String>, value: Option<&str>) {
	if let Some(value) = value
		&& !values.iter().any(|existing| existing == value)
	{
		values.push(value.to_string());
	}
}
