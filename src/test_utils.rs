//! Shared test utilities for the stock control crate.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test documents with sensible defaults.

use crate::{
    config::codes::Config,
    core::{
        AssignedCode, SequenceStore,
        documents::{
            self, NewIngoingAlbaran, NewIngoingLine, NewOutgoingAlbaran, NewRequestStock,
        },
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a store over a fresh in-memory database with the default templates.
pub async fn setup_test_store() -> Result<SequenceStore> {
    let db = setup_test_db().await?;
    SequenceStore::new(db, &Config::default())
}

/// Midnight UTC on the given date.
///
/// # Panics
/// Panics if the date does not exist.
#[allow(clippy::unwrap_used)]
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Request stock fields with sensible defaults.
///
/// # Defaults
/// * storages: 1 -> 2
/// * `request_user_id`: 1
/// * `request_date` and `desired_date`: the creation time
pub fn test_new_request_stock(created_at: DateTime<Utc>) -> NewRequestStock {
    NewRequestStock {
        storage_source_id: 1,
        storage_destination_id: 2,
        request_user_id: 1,
        request_date: created_at,
        desired_date: created_at,
        created_at: Some(created_at),
    }
}

/// Creates a request stock created at `created_at`.
pub async fn create_test_request_stock(
    store: &SequenceStore,
    created_at: DateTime<Utc>,
) -> Result<entities::request_stock::Model> {
    documents::create_request_stock(store, test_new_request_stock(created_at)).await
}

/// Creates an outgoing albaran for `request_stock_id`, prepared by user 1.
pub async fn create_test_outgoing_albaran(
    store: &SequenceStore,
    request_stock_id: i64,
    created_at: DateTime<Utc>,
) -> Result<entities::outgoing_albaran::Model> {
    documents::create_outgoing_albaran(
        store,
        NewOutgoingAlbaran {
            request_stock_id,
            prepare_user_id: 1,
            prepare_date: created_at,
            outgoing_date: None,
            estimated_date: None,
            created_at: Some(created_at),
        },
    )
    .await
}

/// Creates an ingoing albaran for `outgoing_albaran_id`, received by user 2.
pub async fn create_test_ingoing_albaran(
    store: &SequenceStore,
    outgoing_albaran_id: i64,
    created_at: DateTime<Utc>,
) -> Result<entities::ingoing_albaran::Model> {
    documents::create_ingoing_albaran(
        store,
        NewIngoingAlbaran {
            outgoing_albaran_id,
            reception_user_id: 2,
            reception_date: None,
            created_at: Some(created_at),
        },
    )
    .await
}

/// Adds one line of product 1, quantity 1.0, to a request stock.
pub async fn add_test_request_stock_line(
    db: &DatabaseConnection,
    request_stock_id: i64,
) -> Result<entities::line_request_stock::Model> {
    documents::add_request_stock_line(db, request_stock_id, 1, 1.0).await
}

/// Adds one line of product unit 1 to an outgoing albaran.
pub async fn add_test_outgoing_albaran_line(
    db: &DatabaseConnection,
    outgoing_albaran_id: i64,
) -> Result<entities::line_outgoing_albaran::Model> {
    documents::add_outgoing_albaran_line(db, outgoing_albaran_id, 1, 1, 2).await
}

/// Adds one line of product unit 1 in box 1 to an ingoing albaran.
pub async fn add_test_ingoing_albaran_line(
    db: &DatabaseConnection,
    ingoing_albaran_id: i64,
) -> Result<entities::line_ingoing_albaran::Model> {
    documents::add_ingoing_albaran_line(
        db,
        ingoing_albaran_id,
        NewIngoingLine {
            box_id: 1,
            product_unique_id: 1,
            quantity: 1.0,
            validator_user_id: 2,
        },
    )
    .await
}

/// Builds a request stock row from an already assigned code, bypassing the
/// store. Used to simulate writers that skip the sequence lock.
pub fn test_request_stock_row(
    assigned: &AssignedCode,
    created_at: DateTime<Utc>,
) -> entities::request_stock::ActiveModel {
    entities::request_stock::ActiveModel {
        code: Set(assigned.code.clone()),
        code_counter: Set(assigned.counter),
        code_year: Set(assigned.year),
        storage_source_id: Set(1),
        storage_destination_id: Set(2),
        request_user_id: Set(1),
        request_date: Set(created_at),
        desired_date: Set(created_at),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
}
