//! Document business logic - Creates, reads, updates and deletes stock documents.
//!
//! Creation always goes through [`SequenceStore::create`] so every document gets
//! its code exactly once. Updates only touch business fields and `updated_at`;
//! the code, counter, year and creation time are never rewritten. Deletion runs
//! the delete guards first, in the same transaction as the delete.

use crate::{
    core::{DocumentKind, SequenceStore, SequencedEntity, can_delete},
    entities::{
        IngoingAlbaran, LineIngoingAlbaran, LineOutgoingAlbaran, LineRequestStock,
        OutgoingAlbaran, RequestStock, ingoing_albaran, line_ingoing_albaran,
        line_outgoing_albaran, line_request_stock, outgoing_albaran, request_stock,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Fields of a new request stock.
#[derive(Debug, Clone)]
pub struct NewRequestStock {
    /// Storage the goods are taken from
    pub storage_source_id: i64,
    /// Storage the goods are sent to
    pub storage_destination_id: i64,
    /// User making the request
    pub request_user_id: i64,
    /// When the request was made
    pub request_date: DateTime<Utc>,
    /// When the goods are wanted
    pub desired_date: DateTime<Utc>,
    /// Creation time; defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a new outgoing albaran.
#[derive(Debug, Clone)]
pub struct NewOutgoingAlbaran {
    /// Request stock being served
    pub request_stock_id: i64,
    /// User preparing the shipment
    pub prepare_user_id: i64,
    /// When the shipment was prepared
    pub prepare_date: DateTime<Utc>,
    /// When the goods left, if already known
    pub outgoing_date: Option<DateTime<Utc>>,
    /// Expected arrival, if known
    pub estimated_date: Option<DateTime<Utc>>,
    /// Creation time; defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a new ingoing albaran.
#[derive(Debug, Clone)]
pub struct NewIngoingAlbaran {
    /// Outgoing albaran being received
    pub outgoing_albaran_id: i64,
    /// User receiving the goods
    pub reception_user_id: i64,
    /// When the goods arrived, if already known
    pub reception_date: Option<DateTime<Utc>>,
    /// Creation time; defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a new ingoing albaran line.
#[derive(Debug, Clone)]
pub struct NewIngoingLine {
    /// Storage box the product goes into
    pub box_id: i64,
    /// Received product unit
    pub product_unique_id: i64,
    /// Received quantity
    pub quantity: f64,
    /// User validating the reception
    pub validator_user_id: i64,
}

/// Creates a request stock with the next request stock code of its year.
pub async fn create_request_stock(
    store: &SequenceStore,
    new: NewRequestStock,
) -> Result<request_stock::Model> {
    let created_at = new.created_at.unwrap_or_else(Utc::now);

    store
        .create::<RequestStock, _, _>(created_at, |assigned| request_stock::ActiveModel {
            code: Set(assigned.code.clone()),
            code_counter: Set(assigned.counter),
            code_year: Set(assigned.year),
            storage_source_id: Set(new.storage_source_id),
            storage_destination_id: Set(new.storage_destination_id),
            request_user_id: Set(new.request_user_id),
            request_date: Set(new.request_date),
            desired_date: Set(new.desired_date),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        })
        .await
}

/// Creates an outgoing albaran for an existing request stock.
pub async fn create_outgoing_albaran(
    store: &SequenceStore,
    new: NewOutgoingAlbaran,
) -> Result<outgoing_albaran::Model> {
    ensure_exists::<RequestStock, _>(store.connection(), new.request_stock_id).await?;
    let created_at = new.created_at.unwrap_or_else(Utc::now);

    store
        .create::<OutgoingAlbaran, _, _>(created_at, |assigned| outgoing_albaran::ActiveModel {
            code: Set(assigned.code.clone()),
            code_counter: Set(assigned.counter),
            code_year: Set(assigned.year),
            request_stock_id: Set(new.request_stock_id),
            prepare_user_id: Set(new.prepare_user_id),
            prepare_date: Set(new.prepare_date),
            outgoing_date: Set(new.outgoing_date),
            estimated_date: Set(new.estimated_date),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        })
        .await
}

/// Creates an ingoing albaran receiving an existing outgoing albaran.
pub async fn create_ingoing_albaran(
    store: &SequenceStore,
    new: NewIngoingAlbaran,
) -> Result<ingoing_albaran::Model> {
    ensure_exists::<OutgoingAlbaran, _>(store.connection(), new.outgoing_albaran_id).await?;
    let created_at = new.created_at.unwrap_or_else(Utc::now);

    store
        .create::<IngoingAlbaran, _, _>(created_at, |assigned| ingoing_albaran::ActiveModel {
            code: Set(assigned.code.clone()),
            code_counter: Set(assigned.counter),
            code_year: Set(assigned.year),
            outgoing_albaran_id: Set(new.outgoing_albaran_id),
            reception_user_id: Set(new.reception_user_id),
            reception_date: Set(new.reception_date),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        })
        .await
}

/// Lists the documents of `E` whose code belongs to `year`, in code order.
pub async fn list_for_year<E, C>(db: &C, year: i32) -> Result<Vec<E::Model>>
where
    E: SequencedEntity,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::code_year_column().eq(year))
        .order_by_asc(E::code_counter_column())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a request stock by id.
pub async fn get_request_stock(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<request_stock::Model>> {
    RequestStock::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds an outgoing albaran by id.
pub async fn get_outgoing_albaran(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<outgoing_albaran::Model>> {
    OutgoingAlbaran::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds an ingoing albaran by id.
pub async fn get_ingoing_albaran(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<ingoing_albaran::Model>> {
    IngoingAlbaran::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Moves the desired delivery date of a request stock.
pub async fn update_request_stock_desired_date(
    db: &DatabaseConnection,
    id: i64,
    desired_date: DateTime<Utc>,
) -> Result<request_stock::Model> {
    let model = get_request_stock(db, id)
        .await?
        .ok_or(Error::DocumentNotFound {
            kind: DocumentKind::RequestStock,
            id,
        })?;

    let mut active: request_stock::ActiveModel = model.into();
    active.desired_date = Set(desired_date);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Records when an outgoing albaran left and when it should arrive.
pub async fn update_outgoing_albaran_dates(
    db: &DatabaseConnection,
    id: i64,
    outgoing_date: Option<DateTime<Utc>>,
    estimated_date: Option<DateTime<Utc>>,
) -> Result<outgoing_albaran::Model> {
    let model = get_outgoing_albaran(db, id)
        .await?
        .ok_or(Error::DocumentNotFound {
            kind: DocumentKind::OutgoingAlbaran,
            id,
        })?;

    let mut active: outgoing_albaran::ActiveModel = model.into();
    active.outgoing_date = Set(outgoing_date);
    active.estimated_date = Set(estimated_date);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Records when the goods of an ingoing albaran were received.
pub async fn record_ingoing_reception(
    db: &DatabaseConnection,
    id: i64,
    reception_date: DateTime<Utc>,
) -> Result<ingoing_albaran::Model> {
    let model = get_ingoing_albaran(db, id)
        .await?
        .ok_or(Error::DocumentNotFound {
            kind: DocumentKind::IngoingAlbaran,
            id,
        })?;

    let mut active: ingoing_albaran::ActiveModel = model.into();
    active.reception_date = Set(Some(reception_date));
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Adds a requested product line to a request stock.
pub async fn add_request_stock_line(
    db: &DatabaseConnection,
    request_stock_id: i64,
    product_final_id: i64,
    quantity: f64,
) -> Result<line_request_stock::Model> {
    validate_quantity(quantity)?;
    ensure_exists::<RequestStock, _>(db, request_stock_id).await?;

    let line = line_request_stock::ActiveModel {
        request_stock_id: Set(request_stock_id),
        product_final_id: Set(product_final_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    line.insert(db).await.map_err(Into::into)
}

/// Adds a shipped product line to an outgoing albaran.
pub async fn add_outgoing_albaran_line(
    db: &DatabaseConnection,
    outgoing_albaran_id: i64,
    product_unique_id: i64,
    prepare_user_id: i64,
    validator_user_id: i64,
) -> Result<line_outgoing_albaran::Model> {
    ensure_exists::<OutgoingAlbaran, _>(db, outgoing_albaran_id).await?;

    let line = line_outgoing_albaran::ActiveModel {
        outgoing_albaran_id: Set(outgoing_albaran_id),
        product_unique_id: Set(product_unique_id),
        prepare_user_id: Set(prepare_user_id),
        validator_user_id: Set(validator_user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    line.insert(db).await.map_err(Into::into)
}

/// Adds a received product line to an ingoing albaran.
pub async fn add_ingoing_albaran_line(
    db: &DatabaseConnection,
    ingoing_albaran_id: i64,
    new: NewIngoingLine,
) -> Result<line_ingoing_albaran::Model> {
    validate_quantity(new.quantity)?;
    ensure_exists::<IngoingAlbaran, _>(db, ingoing_albaran_id).await?;

    let line = line_ingoing_albaran::ActiveModel {
        ingoing_albaran_id: Set(ingoing_albaran_id),
        box_id: Set(new.box_id),
        product_unique_id: Set(new.product_unique_id),
        quantity: Set(new.quantity),
        validator_user_id: Set(new.validator_user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    line.insert(db).await.map_err(Into::into)
}

/// Lines of a request stock, oldest first.
pub async fn get_request_stock_lines(
    db: &DatabaseConnection,
    request_stock_id: i64,
) -> Result<Vec<line_request_stock::Model>> {
    LineRequestStock::find()
        .filter(line_request_stock::Column::RequestStockId.eq(request_stock_id))
        .order_by_asc(line_request_stock::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lines of an outgoing albaran, oldest first.
pub async fn get_outgoing_albaran_lines(
    db: &DatabaseConnection,
    outgoing_albaran_id: i64,
) -> Result<Vec<line_outgoing_albaran::Model>> {
    LineOutgoingAlbaran::find()
        .filter(line_outgoing_albaran::Column::OutgoingAlbaranId.eq(outgoing_albaran_id))
        .order_by_asc(line_outgoing_albaran::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lines of an ingoing albaran, oldest first.
pub async fn get_ingoing_albaran_lines(
    db: &DatabaseConnection,
    ingoing_albaran_id: i64,
) -> Result<Vec<line_ingoing_albaran::Model>> {
    LineIngoingAlbaran::find()
        .filter(line_ingoing_albaran::Column::IngoingAlbaranId.eq(ingoing_albaran_id))
        .order_by_asc(line_ingoing_albaran::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a document if no guarded child collection references it.
///
/// The guards and the delete share one transaction. A [`Error::Locked`]
/// result leaves the document in place.
#[instrument(skip(db))]
pub async fn delete_document(db: &DatabaseConnection, kind: DocumentKind, id: i64) -> Result<()> {
    let txn = db.begin().await?;

    can_delete(&txn, kind, id).await?;

    let result = match kind {
        DocumentKind::RequestStock => RequestStock::delete_by_id(id).exec(&txn).await?,
        DocumentKind::OutgoingAlbaran => OutgoingAlbaran::delete_by_id(id).exec(&txn).await?,
        DocumentKind::IngoingAlbaran => IngoingAlbaran::delete_by_id(id).exec(&txn).await?,
    };

    if result.rows_affected == 0 {
        return Err(Error::DocumentNotFound { kind, id });
    }

    txn.commit().await?;
    info!("Deleted {} {}", kind, id);
    Ok(())
}

async fn ensure_exists<E, C>(db: &C, id: i64) -> Result<()>
where
    E: SequencedEntity,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    match E::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(Error::DocumentNotFound { kind: E::KIND, id }),
    }
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(Error::Config {
            message: format!("line quantity must be a positive number, got {quantity}"),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_request_stock_sets_code_fields() -> Result<()> {
        let store = setup_test_store().await?;
        let at = utc(2024, 5, 6);

        let request = create_test_request_stock(&store, at).await?;
        assert_eq!(request.code_counter, 1);
        assert_eq!(request.code_year, 2024);
        assert_eq!(request.created_at, at);
        assert_eq!(request.updated_at, at);
        assert_eq!(request.code, "RS202465-00--1");

        let fetched = get_request_stock(store.connection(), request.id).await?;
        assert_eq!(fetched, Some(request));
        Ok(())
    }

    #[tokio::test]
    async fn test_albaran_requires_existing_parent() -> Result<()> {
        let store = setup_test_store().await?;

        let result = create_test_outgoing_albaran(&store, 999, utc(2024, 1, 1)).await;
        assert!(matches!(
            result,
            Err(Error::DocumentNotFound {
                kind: DocumentKind::RequestStock,
                id: 999
            })
        ));

        let result = create_test_ingoing_albaran(&store, 999, utc(2024, 1, 1)).await;
        assert!(matches!(
            result,
            Err(Error::DocumentNotFound {
                kind: DocumentKind::OutgoingAlbaran,
                id: 999
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_updates_never_touch_code() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        let request = create_test_request_stock(&store, utc(2024, 2, 2)).await?;
        let outgoing = create_test_outgoing_albaran(&store, request.id, utc(2024, 2, 3)).await?;
        let ingoing = create_test_ingoing_albaran(&store, outgoing.id, utc(2024, 2, 4)).await?;

        let moved = update_request_stock_desired_date(db, request.id, utc(2024, 3, 1)).await?;
        assert_eq!(moved.desired_date, utc(2024, 3, 1));
        assert_eq!(moved.code, request.code);
        assert_eq!(moved.code_counter, request.code_counter);
        assert_eq!(moved.created_at, request.created_at);
        assert!(moved.updated_at > request.updated_at);

        let shipped =
            update_outgoing_albaran_dates(db, outgoing.id, Some(utc(2024, 2, 5)), None).await?;
        assert_eq!(shipped.outgoing_date, Some(utc(2024, 2, 5)));
        assert_eq!(shipped.estimated_date, None);
        assert_eq!(shipped.code, outgoing.code);

        let received = record_ingoing_reception(db, ingoing.id, utc(2024, 2, 6)).await?;
        assert_eq!(received.reception_date, Some(utc(2024, 2, 6)));
        assert_eq!(received.code, ingoing.code);

        let missing = update_request_stock_desired_date(db, 999, utc(2024, 3, 1)).await;
        assert!(matches!(missing, Err(Error::DocumentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_lines_are_listed_per_parent() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        let request = create_test_request_stock(&store, utc(2024, 1, 1)).await?;
        let other = create_test_request_stock(&store, utc(2024, 1, 2)).await?;

        add_request_stock_line(db, request.id, 10, 2.5).await?;
        add_request_stock_line(db, request.id, 11, 1.0).await?;
        add_request_stock_line(db, other.id, 12, 4.0).await?;

        let lines = get_request_stock_lines(db, request.id).await?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_final_id, 10);
        assert_eq!(lines[0].quantity, 2.5);

        let outgoing = create_test_outgoing_albaran(&store, request.id, utc(2024, 1, 3)).await?;
        add_outgoing_albaran_line(db, outgoing.id, 77, 1, 2).await?;
        assert_eq!(get_outgoing_albaran_lines(db, outgoing.id).await?.len(), 1);

        let ingoing = create_test_ingoing_albaran(&store, outgoing.id, utc(2024, 1, 4)).await?;
        let line = add_ingoing_albaran_line(
            db,
            ingoing.id,
            NewIngoingLine {
                box_id: 5,
                product_unique_id: 77,
                quantity: 1.0,
                validator_user_id: 3,
            },
        )
        .await?;
        assert_eq!(line.box_id, 5);
        assert_eq!(get_ingoing_albaran_lines(db, ingoing.id).await?, vec![line]);
        Ok(())
    }

    #[tokio::test]
    async fn test_line_quantity_validation() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        let request = create_test_request_stock(&store, utc(2024, 1, 1)).await?;

        for quantity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = add_request_stock_line(db, request.id, 1, quantity).await;
            assert!(matches!(result, Err(Error::Config { .. })));
        }
        assert!(get_request_stock_lines(db, request.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_year_in_code_order() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        create_test_request_stock(&store, utc(2023, 12, 31)).await?;
        create_test_request_stock(&store, utc(2024, 1, 1)).await?;
        create_test_request_stock(&store, utc(2024, 1, 2)).await?;

        let listed = list_for_year::<RequestStock, _>(db, 2024).await?;
        let counters: Vec<i32> = listed.iter().map(|r| r.code_counter).collect();
        assert_eq!(counters, vec![1, 2]);
        assert_eq!(list_for_year::<RequestStock, _>(db, 2023).await?.len(), 1);
        assert!(list_for_year::<OutgoingAlbaran, _>(db, 2024).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_request_stock_respects_guards() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        let request = create_test_request_stock(&store, utc(2024, 1, 1)).await?;
        add_request_stock_line(db, request.id, 1, 1.0).await?;

        let result = delete_document(db, DocumentKind::RequestStock, request.id).await;
        assert!(matches!(result, Err(Error::Locked { .. })));
        assert!(get_request_stock(db, request.id).await?.is_some());

        LineRequestStock::delete_many()
            .filter(line_request_stock::Column::RequestStockId.eq(request.id))
            .exec(db)
            .await?;

        delete_document(db, DocumentKind::RequestStock, request.id).await?;
        assert!(get_request_stock(db, request.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_chain_bottom_up() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();
        let request = create_test_request_stock(&store, utc(2024, 1, 1)).await?;
        let outgoing = create_test_outgoing_albaran(&store, request.id, utc(2024, 1, 2)).await?;
        let ingoing = create_test_ingoing_albaran(&store, outgoing.id, utc(2024, 1, 3)).await?;

        assert!(delete_document(db, DocumentKind::RequestStock, request.id).await.is_err());
        assert!(delete_document(db, DocumentKind::OutgoingAlbaran, outgoing.id).await.is_err());

        delete_document(db, DocumentKind::IngoingAlbaran, ingoing.id).await?;
        delete_document(db, DocumentKind::OutgoingAlbaran, outgoing.id).await?;
        delete_document(db, DocumentKind::RequestStock, request.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_document() -> Result<()> {
        let store = setup_test_store().await?;

        let result = delete_document(store.connection(), DocumentKind::IngoingAlbaran, 42).await;
        assert!(matches!(
            result,
            Err(Error::DocumentNotFound {
                kind: DocumentKind::IngoingAlbaran,
                id: 42
            })
        ));
        Ok(())
    }
}
