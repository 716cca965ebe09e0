//! Database configuration module for the stock control store.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Creation is idempotent: existing tables and indexes are left alone.
//! Every sequenced document table also gets a unique index on
//! `(code_year, code_counter)`.

use crate::core::SequencedEntity;
use crate::entities::{
    CodeSequenceLock, IngoingAlbaran, LineIngoingAlbaran, LineOutgoingAlbaran, LineRequestStock,
    OutgoingAlbaran, RequestStock,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::env::VarError;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/stockcontrol.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a local `SQLite` file, created on first use, if not set. A value that is not
/// valid unicode is an [`Error::EnvVar`](crate::errors::Error::EnvVar).
pub fn get_database_url() -> Result<String> {
    database_url_from(std::env::var("DATABASE_URL"))
}

fn database_url_from(value: std::result::Result<String, VarError>) -> Result<String> {
    match value {
        Ok(url) => Ok(url),
        Err(VarError::NotPresent) => Ok(DEFAULT_DATABASE_URL.to_string()),
        Err(err) => Err(err.into()),
    }
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url()?;
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and the code uniqueness indexes if they do not exist.
///
/// Parents are created before the tables whose foreign keys reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, RequestStock).await?;
    create_table(db, LineRequestStock).await?;
    create_table(db, OutgoingAlbaran).await?;
    create_table(db, LineOutgoingAlbaran).await?;
    create_table(db, IngoingAlbaran).await?;
    create_table(db, LineIngoingAlbaran).await?;
    create_table(db, CodeSequenceLock).await?;

    let builder = db.get_database_backend();
    db.execute(builder.build(&code_index::<RequestStock>())).await?;
    db.execute(builder.build(&code_index::<OutgoingAlbaran>())).await?;
    db.execute(builder.build(&code_index::<IngoingAlbaran>())).await?;

    info!("Database schema is ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Unique `(code_year, code_counter)` index for a sequenced document table.
fn code_index<E>() -> IndexCreateStatement
where
    E: SequencedEntity,
{
    let entity = E::default();
    Index::create()
        .name(format!("idx_{}_code_year_counter", entity.table_name()))
        .table(entity)
        .col(E::code_year_column())
        .col(E::code_counter_column())
        .unique()
        .if_not_exists()
        .to_owned()
}
