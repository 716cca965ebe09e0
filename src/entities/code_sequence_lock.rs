//! Code sequence lock entity - One row per (document kind, year).
//!
//! Code counters are derived from the document tables, not stored here. The row
//! is only written at the start of every code assignment so that concurrent
//! assignments for the same kind and year queue behind the same row lock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sequence lock database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "code_sequence_locks")]
pub struct Model {
    /// Storage key of the document kind (`DocumentKind::as_str`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub variant: String,
    /// Calendar year of the sequence
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Last time an assignment took this lock
    pub acquired_at: DateTimeUtc,
}

/// `CodeSequenceLock` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
