use sqlx::{Executor, Postgres};
use time::OffsetDateTime;

use crate::{
	Error, Result,
	models::{Contact, LinkPrecedence, NewContact},
};

pub async fn find_matching<'e, E>(
	executor: E,
	email: Option<&str>,
	phone_number: Option<&str>,
) -> Result<Vec<Contact>>
where
	E: Executor<'e, Database = Postgres>,
{
	if email.is_none() && phone_number.is_none() {
		return Ok(Vec::new());
	}

	let contacts = sqlx::query_as::<_, Contact>(
		"\
SELECT *
FROM contacts
WHERE deleted_at IS NULL
	AND (
		($1::text IS NOT NULL AND email = $1)
		OR ($2::text IS NOT NULL AND phone_number = $2)
	)
ORDER BY created_at, id",
	)
	.bind(email)
	.bind(phone_number)
	.fetch_all(executor)
	.await?;

	Ok(contacts)
}

pub async fn find_by_ids_or_links<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Contact>>
where
	E: Executor<'e, Database = Postgres>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let contacts = sqlx::query_as::<_, Contact>(
		"\
SELECT *
FROM contacts
WHERE deleted_at IS NULL
	AND (id = ANY($1) OR linked_id = ANY($1))
ORDER BY created_at, id",
	)
	.bind(ids)
	.fetch_all(executor)
	.await?;

	Ok(contacts)
}

pub async fn insert_contact<'e, E>(executor: E, contact: &NewContact) -> Result<Contact>
where
	E: Executor<'e, Database = Postgres>,
{
	contact.validate()?;

	let inserted = sqlx::query_as::<_, Contact>(
		"\
INSERT INTO contacts (email, phone_number, link_precedence, linked_id)
VALUES ($1, $2, $3, $4)
RETURNING *",
	)
	.bind(contact.email.as_deref())
	.bind(contact.phone_number.as_deref())
	.bind(contact.link_precedence.as_str())
	.bind(contact.linked_id)
	.fetch_one(executor)
	.await?;

	Ok(inserted)
}

pub async fn update_precedence<'e, E>(
	executor: E,
	contact_id: i64,
	precedence: LinkPrecedence,
	linked_id: Option<i64>,
	updated_at: OffsetDateTime,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query(
		"\
UPDATE contacts
SET
	link_precedence = $1,
	linked_id = $2,
	updated_at = $3
WHERE id = $4 AND deleted_at IS NULL",
	)
	.bind(precedence.as_str())
	.bind(linked_id)
	.bind(updated_at)
	.bind(contact_id)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Contact {contact_id} does not exist.")));
	}

	Ok(())
}
