//! Accepts `phoneNumber` as a JSON string or a JSON number.

use serde::{Deserialize, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPhoneNumber {
	Text(String),
	Number(Number),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<RawPhoneNumber>::deserialize(deserializer)?;

	Ok(raw.map(|raw| match raw {
		RawPhoneNumber::Text(text) => text,
		RawPhoneNumber::Number(number) => number.to_string(),
	}))
}
