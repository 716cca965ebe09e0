//! Line ingoing albaran entity - Product received into a storage box.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingoing albaran line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_ingoing_albarans")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Albaran this line belongs to
    pub ingoing_albaran_id: i64,
    /// Storage box the product was put in
    pub box_id: i64,
    /// Received product unit
    pub product_unique_id: i64,
    /// Received quantity
    pub quantity: f64,
    /// User who validated the reception
    pub validator_user_id: i64,
    /// When the line was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between LineIngoingAlbaran and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one ingoing albaran
    #[sea_orm(
        belongs_to = "super::ingoing_albaran::Entity",
        from = "Column::IngoingAlbaranId",
        to = "super::ingoing_albaran::Column::Id"
    )]
    IngoingAlbaran,
}

impl Related<super::ingoing_albaran::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngoingAlbaran.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
