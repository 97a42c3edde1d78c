use std::sync::Arc;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::Semaphore;

use crate::{Result, schema};

const SCHEMA_LOCK_ID: i64 = 4_318_271;

pub struct Db {
	pub pool: PgPool,
	/// Caps connections pinned by identity locks (held or waiting) so queries always find one.
	pub(crate) lock_slots: Arc<Semaphore>,
}
impl Db {
	pub async fn connect(cfg: &idlink_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;
		let slots = cfg.pool_max_conns.saturating_sub(1).max(1) as usize;

		Ok(Self { pool, lock_slots: Arc::new(Semaphore::new(slots)) })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(SCHEMA_LOCK_ID).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		tracing::debug!("Contact schema is up to date.");

		Ok(())
	}
}
