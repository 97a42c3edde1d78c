use crate::{Error, Result};

/// A normalized `(email, phone number)` pair with at least one side present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
	email: Option<String>,
	phone_number: Option<String>,
}
impl Fragment {
	/// Trims both values and treats blank ones as absent.
	pub fn new(email: Option<&str>, phone_number: Option<&str>, max_chars: usize) -> Result<Self> {
		let email = normalize("email", email, max_chars)?;
		let phone_number = normalize("phoneNumber", phone_number, max_chars)?;

		if email.is_none() && phone_number.is_none() {
			return Err(Error::invalid(
				"At least one of email or phoneNumber is required.",
				&["email", "phoneNumber"],
			));
		}

		Ok(Self { email, phone_number })
	}

	pub fn email(&self) -> Option<&str> {
		self.email.as_deref()
	}

	pub fn phone_number(&self) -> Option<&str> {
		self.phone_number.as_deref()
	}

	/// Sorted identity-lock keys, one per present side.
	pub fn lock_keys(&self) -> Vec<String> {
		let mut keys = Vec::with_capacity(2);

		if let Some(email) = self.email() {
			keys.push(format!("email:{email}"));
		}
		if let Some(phone_number) = self.phone_number() {
			keys.push(format!("phone:{phone_number}"));
		}

		keys.sort();

		keys
	}
}

fn normalize(field: &str, value: Option<&str>, max_chars: usize) -> Result<Option<String>> {
	let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
		return Ok(None);
	};

	if value.chars().count() > max_chars {
		return Err(Error::invalid(
			format!("{field} must be at most {max_chars} characters."),
			&[field],
		));
	}

	Ok(Some(value.to_string()))
}
