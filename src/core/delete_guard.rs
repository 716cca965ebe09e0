//! Delete guards - Refuse to delete documents that other records still reference.
//!
//! Each document kind has an ordered list of child collections. A document may
//! only be deleted once every collection is empty; the first non-empty one, in
//! list order, is reported as the reason. Guards only read, they never delete.

use crate::{
    core::DocumentKind,
    entities::{
        IngoingAlbaran, LineIngoingAlbaran, LineOutgoingAlbaran, LineRequestStock,
        OutgoingAlbaran, ingoing_albaran, line_ingoing_albaran, line_outgoing_albaran,
        line_request_stock, outgoing_albaran,
    },
    errors::{Error, Result},
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument};

/// A child collection whose existence locks its parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildCollection {
    /// Product lines of a request stock
    RequestStockLines,
    /// Outgoing albarans serving a request stock
    OutgoingAlbaransOfRequest,
    /// Product lines of an outgoing albaran
    OutgoingAlbaranLines,
    /// Ingoing albarans receiving an outgoing albaran
    IngoingAlbaransOfOutgoing,
    /// Product lines of an ingoing albaran
    IngoingAlbaranLines,
}

impl ChildCollection {
    /// Relationship name used in the lock message.
    #[must_use]
    pub const fn relation(self) -> &'static str {
        match self {
            Self::RequestStockLines | Self::OutgoingAlbaranLines | Self::IngoingAlbaranLines => {
                "lines"
            }
            Self::OutgoingAlbaransOfRequest => "outgoing albaran",
            Self::IngoingAlbaransOfOutgoing => "ingoing albaran",
        }
    }

    /// Returns true if the document `parent_id` has at least one child here.
    pub async fn is_non_empty<C>(self, db: &C, parent_id: i64) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let found = match self {
            Self::RequestStockLines => LineRequestStock::find()
                .filter(line_request_stock::Column::RequestStockId.eq(parent_id))
                .one(db)
                .await?
                .is_some(),
            Self::OutgoingAlbaransOfRequest => OutgoingAlbaran::find()
                .filter(outgoing_albaran::Column::RequestStockId.eq(parent_id))
                .one(db)
                .await?
                .is_some(),
            Self::OutgoingAlbaranLines => LineOutgoingAlbaran::find()
                .filter(line_outgoing_albaran::Column::OutgoingAlbaranId.eq(parent_id))
                .one(db)
                .await?
                .is_some(),
            Self::IngoingAlbaransOfOutgoing => IngoingAlbaran::find()
                .filter(ingoing_albaran::Column::OutgoingAlbaranId.eq(parent_id))
                .one(db)
                .await?
                .is_some(),
            Self::IngoingAlbaranLines => LineIngoingAlbaran::find()
                .filter(line_ingoing_albaran::Column::IngoingAlbaranId.eq(parent_id))
                .one(db)
                .await?
                .is_some(),
        };
        Ok(found)
    }
}

/// Guards for `kind`, in the order they are checked.
#[must_use]
pub const fn guards_for(kind: DocumentKind) -> &'static [ChildCollection] {
    match kind {
        DocumentKind::RequestStock => &[
            ChildCollection::RequestStockLines,
            ChildCollection::OutgoingAlbaransOfRequest,
        ],
        DocumentKind::OutgoingAlbaran => &[
            ChildCollection::OutgoingAlbaranLines,
            ChildCollection::IngoingAlbaransOfOutgoing,
        ],
        DocumentKind::IngoingAlbaran => &[ChildCollection::IngoingAlbaranLines],
    }
}

/// Message shown when `collection` blocks deleting a document of `kind`.
#[must_use]
pub fn lock_reason(kind: DocumentKind, collection: ChildCollection) -> String {
    format!(
        "Cannot delete {kind} model, relationship between {kind} model and {}",
        collection.relation()
    )
}

/// Checks whether document `id` of `kind` may be deleted.
///
/// Returns [`Error::Locked`] naming the first guarded relationship that still
/// has children. Success only means these guards pass; the caller still owns
/// the delete itself.
#[instrument(skip(db))]
pub async fn can_delete<C>(db: &C, kind: DocumentKind, id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    for &collection in guards_for(kind) {
        if collection.is_non_empty(db, id).await? {
            debug!("{} {} is locked by its {}", kind, id, collection.relation());
            return Err(Error::Locked {
                kind,
                id,
                reason: lock_reason(kind, collection),
            });
        }
    }
    Ok(())
}
