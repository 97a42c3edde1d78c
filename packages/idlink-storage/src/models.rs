use std::{fmt, str::FromStr};

use time::OffsetDateTime;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPrecedence {
	Primary,
	Secondary,
}
impl LinkPrecedence {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Primary => "primary",
			Self::Secondary => "secondary",
		}
	}
}
impl fmt::Display for LinkPrecedence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for LinkPrecedence {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"primary" => Ok(Self::Primary),
			"secondary" => Ok(Self::Secondary),
			other => Err(Error::InvalidArgument(format!("Unknown link precedence {other:?}."))),
		}
	}
}
impl TryFrom<String> for LinkPrecedence {
	type Error = Error;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		raw.parse()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Contact {
	pub id: i64,
	pub email: Option<String>,
	pub phone_number: Option<String>,
	#[sqlx(try_from = "String")]
	pub link_precedence: LinkPrecedence,
	pub linked_id: Option<i64>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub deleted_at: Option<OffsetDateTime>,
}
impl Contact {
	pub fn is_primary(&self) -> bool {
		self.link_precedence == LinkPrecedence::Primary
	}

	/// Total order used for canonical selection and response ordering.
	pub fn chronological_key(&self) -> (OffsetDateTime, i64) {
		(self.created_at, self.id)
	}
}

/// Caller-supplied fields of a contact; the store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
	pub email: Option<String>,
	pub phone_number: Option<String>,
	pub link_precedence: LinkPrecedence,
	pub linked_id: Option<i64>,
}
impl NewContact {
	pub fn primary(email: Option<String>, phone_number: Option<String>) -> Self {
		Self { email, phone_number, link_precedence: LinkPrecedence::Primary, linked_id: None }
	}

	pub fn secondary(email: Option<String>, phone_number: Option<String>, primary_id: i64) -> Self {
		Self {
			email,
			phone_number,
			link_precedence: LinkPrecedence::Secondary,
			linked_id: Some(primary_id),
		}
	}

	pub fn validate(&self) -> crate::Result<()> {
		if self.email.is_none() && self.phone_number.is_none() {
			return Err(Error::InvalidArgument(
				"A contact needs an email or a phone number.".to_string(),
			));
		}

		match (self.link_precedence, self.linked_id) {
			(LinkPrecedence::Primary, None) | (LinkPrecedence::Secondary, Some(_)) => Ok(()),
			(LinkPrecedence::Primary, Some(_)) => Err(Error::InvalidArgument(
				"A primary contact cannot carry a linked_id.".to_string(),
			)),
			(LinkPrecedence::Secondary, None) => Err(Error::InvalidArgument(
				"A secondary contact requires a linked_id.".to_string(),
			)),
		}
	}
}
