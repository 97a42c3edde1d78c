use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub identity: Identity,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	/// One connection is pinned by every in-flight identity lock.
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
	/// Upper bound, in characters, for a submitted email or phone number.
	#[serde(default = "default_max_field_chars")]
	pub max_field_chars: usize,
}
impl Default for Identity {
	fn default() -> Self {
		Self { max_field_chars: default_max_field_chars() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

pub(crate) fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_field_chars() -> usize {
	320
}

fn default_true() -> bool {
	true
}
