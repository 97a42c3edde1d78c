pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, fields: Vec<String> },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Consistency violation: {message}")]
	Consistency { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>, fields: &[&str]) -> Self {
		Self::InvalidRequest {
			message: message.into(),
			fields: fields.iter().map(|field| field.to_string()).collect(),
		}
	}

	pub(crate) fn consistency(message: impl Into<String>) -> Self {
		Self::Consistency { message: message.into() }
	}
}

impl From<idlink_storage::Error> for Error {
	fn from(err: idlink_storage::Error) -> Self {
		match err {
			idlink_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			idlink_storage::Error::Lock(message) => Self::Storage { message },
			idlink_storage::Error::NotFound(message) => Self::NotFound { message },
			// The resolver only builds contacts that satisfy the table invariants.
			idlink_storage::Error::InvalidArgument(message) => Self::Consistency { message },
		}
	}
}
