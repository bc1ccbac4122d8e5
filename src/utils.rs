use std::error::Error;

use actix_web::web;
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::{Pool, PooledConnection};

use crate::{configuration::DatabaseSettings, error::ApiError, telemetry::spawn_blocking_with_tracing};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Writes every cause below an error, one `Caused By` block per level.
/// Used by the `Debug` impls of the error enums so logs carry the whole chain.
pub fn error_fmt_chain(f: &mut std::fmt::Formatter<'_>, source: Option<&(dyn Error + 'static)>) -> std::fmt::Result{
    for cause in std::iter::successors(source, |&e| e.source()) {
        write!(f, "\n\tCaused By:\n\t{}", cause)?;
    }
    Ok(())
}

// Connections are opened lazily, so startup does not wait on the database
pub fn build_pool(settings: &DatabaseSettings) -> DbPool{
    let manager = ConnectionManager::<PgConnection>::new(settings.get_database_table_url());
    Pool::builder().build_unchecked(manager)
}

// r2d2 blocks while the pool is exhausted, so the wait runs off the async workers
pub async fn get_pooled_connection(
    pool: &web::Data<DbPool>
) -> Result<DbConnection, ApiError>{
    let pool = pool.clone();

    let conn = spawn_blocking_with_tracing(move || pool.get())
        .await
        .context("Failed due to threadpool error")?
        .context("Failed to get connection from pool")?;

    Ok(conn)
}
