//! Line outgoing albaran entity - One unique product shipped on an outgoing albaran.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outgoing albaran line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_outgoing_albarans")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Albaran this line belongs to
    pub outgoing_albaran_id: i64,
    /// Shipped product unit
    pub product_unique_id: i64,
    /// User who prepared the line
    pub prepare_user_id: i64,
    /// User who validated the line
    pub validator_user_id: i64,
    /// When the line was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between LineOutgoingAlbaran and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one outgoing albaran
    #[sea_orm(
        belongs_to = "super::outgoing_albaran::Entity",
        from = "Column::OutgoingAlbaranId",
        to = "super::outgoing_albaran::Column::Id"
    )]
    OutgoingAlbaran,
}

impl Related<super::outgoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutgoingAlbaran.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
