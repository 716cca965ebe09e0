//! Ingoing albaran entity - Delivery note for goods received into a storage.

use crate::core::{DocumentKind, SequencedEntity};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingoing albaran database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingoing_albarans")]
pub struct Model {
    /// Unique identifier for the albaran
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable document code, fixed at creation
    pub code: String,
    /// Position of this albaran in its year's sequence, starting at 1
    pub code_counter: i32,
    /// Calendar year of `created_at`, the scope of `code_counter`
    pub code_year: i32,
    /// Outgoing albaran whose goods are being received
    pub outgoing_albaran_id: i64,
    /// User who received the goods
    pub reception_user_id: i64,
    /// When the goods were received, if they have been
    pub reception_date: Option<DateTimeUtc>,
    /// When the albaran was created
    pub created_at: DateTimeUtc,
    /// When the albaran was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between IngoingAlbaran and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ingoing albaran receives one outgoing albaran
    #[sea_orm(
        belongs_to = "super::outgoing_albaran::Entity",
        from = "Column::OutgoingAlbaranId",
        to = "super::outgoing_albaran::Column::Id"
    )]
    OutgoingAlbaran,
    /// One albaran has many received product lines
    #[sea_orm(has_many = "super::line_ingoing_albaran::Entity")]
    Lines,
}

impl Related<super::outgoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutgoingAlbaran.def()
    }
}

impl Related<super::line_ingoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SequencedEntity for Entity {
    const KIND: DocumentKind = DocumentKind::IngoingAlbaran;

    fn created_at_column() -> Column {
        Column::CreatedAt
    }

    fn code_counter_column() -> Column {
        Column::CodeCounter
    }

    fn code_year_column() -> Column {
        Column::CodeYear
    }

    fn code_counter(model: &Model) -> i32 {
        model.code_counter
    }
}
