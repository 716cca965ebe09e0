//! Line request stock entity - One requested product and quantity of a request stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request stock line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_request_stocks")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Request this line belongs to
    pub request_stock_id: i64,
    /// Requested product
    pub product_final_id: i64,
    /// Requested quantity
    pub quantity: f64,
    /// When the line was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between LineRequestStock and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one request stock
    #[sea_orm(
        belongs_to = "super::request_stock::Entity",
        from = "Column::RequestStockId",
        to = "super::request_stock::Column::Id"
    )]
    RequestStock,
}

impl Related<super::request_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestStock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
