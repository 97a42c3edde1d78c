mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Identity, Postgres, Security, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns < 2 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be at least 2.".to_string(),
		});
	}
	if cfg.identity.max_field_chars == 0 {
		return Err(Error::Validation {
			message: "identity.max_field_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let level = cfg.service.log_level.trim();

	cfg.service.log_level =
		if level.is_empty() { types::default_log_level() } else { level.to_string() };
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
}
