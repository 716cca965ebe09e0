//! Request stock entity - A request to move stock from one storage to another.
//!
//! Request stocks are sequenced documents: each one carries a year-scoped
//! `code_counter` and the `code` rendered from it at creation time.

use crate::core::{DocumentKind, SequencedEntity};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request stock database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_stocks")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable document code, fixed at creation
    pub code: String,
    /// Position of this request in its year's sequence, starting at 1
    pub code_counter: i32,
    /// Calendar year of `created_at`, the scope of `code_counter`
    pub code_year: i32,
    /// Storage the goods are taken from
    pub storage_source_id: i64,
    /// Storage the goods are sent to
    pub storage_destination_id: i64,
    /// User who made the request
    pub request_user_id: i64,
    /// When the request was made
    pub request_date: DateTimeUtc,
    /// When the goods are wanted at the destination
    pub desired_date: DateTimeUtc,
    /// When the request was created
    pub created_at: DateTimeUtc,
    /// When the request was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between RequestStock and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One request has many requested product lines
    #[sea_orm(has_many = "super::line_request_stock::Entity")]
    Lines,
    /// One request is served by many outgoing albarans
    #[sea_orm(has_many = "super::outgoing_albaran::Entity")]
    OutgoingAlbarans,
}

impl Related<super::line_request_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::outgoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutgoingAlbarans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SequencedEntity for Entity {
    const KIND: DocumentKind = DocumentKind::RequestStock;

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
