//! Outgoing albaran entity - Delivery note for goods leaving a storage.
//!
//! Each outgoing albaran serves a request stock and may later be received by
//! one or more ingoing albarans.

use crate::core::{DocumentKind, SequencedEntity};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outgoing albaran database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outgoing_albarans")]
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
    /// Request stock this albaran serves
    pub request_stock_id: i64,
    /// User who prepared the shipment
    pub prepare_user_id: i64,
    /// When the shipment was prepared
    pub prepare_date: DateTimeUtc,
    /// When the goods actually left, if they have
    pub outgoing_date: Option<DateTimeUtc>,
    /// Expected arrival at the destination
    pub estimated_date: Option<DateTimeUtc>,
    /// When the albaran was created
    pub created_at: DateTimeUtc,
    /// When the albaran was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between OutgoingAlbaran and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each outgoing albaran belongs to one request stock
    #[sea_orm(
        belongs_to = "super::request_stock::Entity",
        from = "Column::RequestStockId",
        to = "super::request_stock::Column::Id"
    )]
    RequestStock,
    /// One albaran has many shipped product lines
    #[sea_orm(has_many = "super::line_outgoing_albaran::Entity")]
    Lines,
    /// One outgoing albaran is received by many ingoing albarans
    #[sea_orm(has_many = "super::ingoing_albaran::Entity")]
    IngoingAlbarans,
}

impl Related<super::request_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestStock.def()
    }
}

impl Related<super::line_outgoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::ingoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngoingAlbarans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SequencedEntity for Entity {
    const KIND: DocumentKind = DocumentKind::OutgoingAlbaran;

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
