//! Sequenced store - Assigns year-scoped, gap-free document codes.
//!
//! A document's counter is derived from the rows already stored for its kind:
//! the highest `code_counter` created in the same calendar year plus one, or 1
//! for the first document of the year. Deriving the counter this way is a
//! read-then-write, so every assignment runs inside one transaction that first
//! takes the `(kind, year)` row of `code_sequence_locks`, then reads the
//! maximum, then inserts the new document. Within a process an advisory mutex
//! per `(kind, year)` queues creations before they reach the database, and the
//! unique index on `(code_year, code_counter)` rejects anything that still
//! slips through. Conflicts are retried a bounded number of times.

use crate::{
    config::codes::Config,
    core::{CodeFormat, DocumentKind},
    entities::{CodeSequenceLock, code_sequence_lock},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::OnConflict,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, info, instrument, warn};

/// A document table whose rows carry a year-scoped code counter.
///
/// Implemented by each sequenced entity so the sequencing logic can query the
/// right table and columns without knowing the concrete document type.
pub trait SequencedEntity: EntityTrait {
    /// Kind whose sequence this table holds
    const KIND: DocumentKind;

    /// Creation timestamp column, used for the year window
    fn created_at_column() -> Self::Column;

    /// Counter column, ordered descending to find the current maximum
    fn code_counter_column() -> Self::Column;

    /// Year column backing the `(code_year, code_counter)` unique index
    fn code_year_column() -> Self::Column;

    /// Reads the counter of a stored row
    fn code_counter(model: &Self::Model) -> i32;
}

/// Counter and code assigned to a document about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedCode {
    /// Position in the `(kind, year)` sequence, starting at 1
    pub counter: i32,
    /// Calendar year the counter is scoped to
    pub year: i32,
    /// Rendered document code
    pub code: String,
}

/// Returns `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
pub fn year_window(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(Error::Config {
            message: format!("year {year} is out of range for code sequences"),
        }),
    }
}

/// Computes the next counter and code for a document of `E` created at
/// `created_at`.
///
/// This only reads. Run it inside the transaction that inserts the document,
/// after [`lock_sequence`], or two callers can compute the same counter.
pub async fn assign_code<E, C>(
    db: &C,
    format: &CodeFormat,
    created_at: DateTime<Utc>,
) -> Result<AssignedCode>
where
    E: SequencedEntity,
    C: ConnectionTrait,
{
    let year = created_at.year();
    let (start, end) = year_window(year)?;

    let last = E::find()
        .filter(E::created_at_column().gte(start))
        .filter(E::created_at_column().lt(end))
        .order_by_desc(E::code_counter_column())
        .one(db)
        .await?;

    let counter = last.as_ref().map_or(1, |model| E::code_counter(model) + 1);

    Ok(AssignedCode {
        counter,
        year,
        code: recompute_code(format, &created_at, counter),
    })
}

/// Renders the code a document with these stored fields must carry.
#[must_use]
pub fn recompute_code(format: &CodeFormat, created_at: &DateTime<Utc>, counter: i32) -> String {
    format.render(created_at, counter)
}

/// Takes the `(kind, year)` sequence lock for the current transaction.
///
/// The upsert writes the lock row, so the transaction holds a row lock on
/// PostgreSQL and the database write lock on SQLite until it commits or rolls
/// back. A competing transaction blocks here or fails with a retryable error.
pub async fn lock_sequence<C>(db: &C, kind: DocumentKind, year: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = code_sequence_lock::ActiveModel {
        variant: Set(kind.as_str().to_string()),
        year: Set(year),
        acquired_at: Set(Utc::now()),
    };

    CodeSequenceLock::insert(row)
        .on_conflict(
            OnConflict::columns([
                code_sequence_lock::Column::Variant,
                code_sequence_lock::Column::Year,
            ])
            .update_column(code_sequence_lock::Column::AcquiredAt)
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Compiled code templates, one per document kind.
#[derive(Debug, Clone)]
pub struct CodeFormats {
    request_stock: CodeFormat,
    outgoing_albaran: CodeFormat,
    ingoing_albaran: CodeFormat,
}

impl CodeFormats {
    /// Parses the templates of a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let parse = |kind| CodeFormat::parse(config.codes.get(kind));
        Ok(Self {
            request_stock: parse(DocumentKind::RequestStock)?,
            outgoing_albaran: parse(DocumentKind::OutgoingAlbaran)?,
            ingoing_albaran: parse(DocumentKind::IngoingAlbaran)?,
        })
    }

    /// Template for the given kind.
    #[must_use]
    pub const fn get(&self, kind: DocumentKind) -> &CodeFormat {
        match kind {
            DocumentKind::RequestStock => &self.request_stock,
            DocumentKind::OutgoingAlbaran => &self.outgoing_albaran,
            DocumentKind::IngoingAlbaran => &self.ingoing_albaran,
        }
    }
}

/// In-process advisory locks keyed by `(kind, year)`.
#[derive(Debug, Default)]
struct SequenceLocks {
    handles: Mutex<HashMap<(DocumentKind, i32), Arc<tokio::sync::Mutex<()>>>>,
}

impl SequenceLocks {
    fn handle(&self, kind: DocumentKind, year: i32) -> Arc<tokio::sync::Mutex<()>> {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(handles.entry((kind, year)).or_default())
    }
}

/// Creates sequenced documents with unique, gap-free codes.
///
/// Cloning is cheap; clones share the connection pool and the advisory locks,
/// so every task creating documents in a process should use clones of one store.
#[derive(Clone)]
pub struct SequenceStore {
    db: DatabaseConnection,
    formats: Arc<CodeFormats>,
    max_attempts: u32,
    locks: Arc<SequenceLocks>,
}

impl SequenceStore {
    /// Builds a store from a connection and a loaded configuration.
    ///
    /// Fails with [`Error::Config`] if a template does not parse or the retry
    /// budget is zero.
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self> {
        if config.sequence.max_attempts == 0 {
            return Err(Error::Config {
                message: "sequence.max_attempts must be at least 1".to_string(),
            });
        }

        let formats = CodeFormats::from_config(config)?;
        for kind in DocumentKind::ALL {
            if !formats.get(kind).uses_counter() {
                warn!(
                    "Code format '{}' for {} has no {{number}} placeholder; codes may repeat",
                    formats.get(kind),
                    kind
                );
            }
        }

        Ok(Self {
            db,
            formats: Arc::new(formats),
            max_attempts: config.sequence.max_attempts,
            locks: Arc::new(SequenceLocks::default()),
        })
    }

    /// Database connection the store writes through.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Compiled template for `kind`.
    #[must_use]
    pub fn format(&self, kind: DocumentKind) -> &CodeFormat {
        self.formats.get(kind)
    }

    /// Previews the code the next `E` document created at `at` would get.
    ///
    /// Nothing is reserved; a concurrent creation can take this code first.
    pub async fn peek_next_code<E>(&self, at: DateTime<Utc>) -> Result<AssignedCode>
    where
        E: SequencedEntity,
    {
        assign_code::<E, _>(&self.db, self.format(E::KIND), at).await
    }

    /// Inserts a new `E` document created at `created_at`.
    ///
    /// `build` receives the assigned code and returns the row to insert; it may
    /// be called more than once if an attempt conflicts and is retried, and it
    /// must set `code`, `code_counter`, `code_year` and `created_at` from its
    /// arguments. After `max_attempts` conflicting attempts the creation fails
    /// with [`Error::Conflict`] and nothing is persisted.
    #[instrument(skip(self, build), fields(kind = %E::KIND))]
    pub async fn create<E, A, F>(&self, created_at: DateTime<Utc>, build: F) -> Result<E::Model>
    where
        E: SequencedEntity,
        E::Model: IntoActiveModel<A>,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        F: Fn(&AssignedCode) -> A,
    {
        let kind = E::KIND;
        let year = created_at.year();

        let handle = self.locks.handle(kind, year);
        let _guard = handle.lock().await;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_create::<E, A, F>(created_at, &build).await {
                Ok(model) => return Ok(model),
                Err(err) if err.is_retryable() && attempts < self.max_attempts => {
                    warn!(
                        "Code assignment for {} in {} conflicted (attempt {}/{}): {}",
                        kind, year, attempts, self.max_attempts, err
                    );
                    tokio::task::yield_now().await;
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        "Giving up on code assignment for {} in {} after {} attempts: {}",
                        kind, year, attempts, err
                    );
                    return Err(Error::Conflict {
                        kind,
                        year,
                        attempts,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create<E, A, F>(&self, created_at: DateTime<Utc>, build: &F) -> Result<E::Model>
    where
        E: SequencedEntity,
        E::Model: IntoActiveModel<A>,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        F: Fn(&AssignedCode) -> A,
    {
        let txn = self.db.begin().await?;

        lock_sequence(&txn, E::KIND, created_at.year()).await?;
        debug!("Holding {} sequence lock for {}", E::KIND, created_at.year());
        let assigned = assign_code::<E, _>(&txn, self.format(E::KIND), created_at).await?;
        let model = build(&assigned).insert(&txn).await?;

        txn.commit().await?;

        info!(
            "Assigned code {} (counter {}) to new {}",
            assigned.code,
            assigned.counter,
            E::KIND
        );
        Ok(model)
    }
}
