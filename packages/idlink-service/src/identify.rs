use serde::{Deserialize, Serialize};

use crate::{
	IdentityService, Result,
	fragment::Fragment,
	resolve,
	view::{self, IdentityView},
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default, deserialize_with = "crate::phone_serde::deserialize")]
	pub phone_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyResponse {
	pub contact: IdentityView,
}

impl IdentityService {
	/// Reconciles a partial identity and returns the consolidated view of its cluster.
	pub async fn identify(&self, req: IdentifyRequest) -> Result<IdentifyResponse> {
		let fragment = Fragment::new(
			req.email.as_deref(),
			req.phone_number.as_deref(),
			self.cfg.identity.max_field_chars,
		)?;
		let resolution = resolve::resolve(self.store.as_ref(), &fragment).await?;
		let contact = view::build_view(&resolution.primary, &resolution.cluster);

		tracing::debug!(
			primary_id = contact.primary_contact_id,
			secondaries = contact.secondary_contact_ids.len(),
			created = ?resolution.created.as_ref().map(|created| created.id),
			"Identity reconciled."
		);

		Ok(IdentifyResponse { contact })
	}
}
