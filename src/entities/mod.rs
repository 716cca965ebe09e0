//! Entity module - Contains all SeaORM entity definitions for the database.
//! The three sequenced documents each have a line table, and the lock table
//! serializes code assignment per (kind, year).

pub mod code_sequence_lock;
pub mod ingoing_albaran;
pub mod line_ingoing_albaran;
pub mod line_outgoing_albaran;
pub mod line_request_stock;
pub mod outgoing_albaran;
pub mod request_stock;

// Re-export specific types to avoid conflicts
pub use code_sequence_lock::{
    Column as CodeSequenceLockColumn, Entity as CodeSequenceLock, Model as CodeSequenceLockModel,
};
pub use ingoing_albaran::{
    Column as IngoingAlbaranColumn, Entity as IngoingAlbaran, Model as IngoingAlbaranModel,
};
pub use line_ingoing_albaran::{
    Column as LineIngoingAlbaranColumn, Entity as LineIngoingAlbaran,
    Model as LineIngoingAlbaranModel,
};
pub use line_outgoing_albaran::{
    Column as LineOutgoingAlbaranColumn, Entity as LineOutgoingAlbaran,
    Model as LineOutgoingAlbaranModel,
};
pub use line_request_stock::{
    Column as LineRequestStockColumn, Entity as LineRequestStock, Model as LineRequestStockModel,
};
pub use outgoing_albaran::{
    Column as OutgoingAlbaranColumn, Entity as OutgoingAlbaran, Model as OutgoingAlbaranModel,
};
pub use request_stock::{
    Column as RequestStockColumn, Entity as RequestStock, Model as RequestStockModel,
};
