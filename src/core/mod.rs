//! Core business logic - framework-agnostic sequencing, guards and document operations.

/// Code template parsing and rendering
pub mod code_format;
/// Delete guards over dependent child collections
pub mod delete_guard;
/// Document kinds with their own code sequences
pub mod document_kind;
/// Document creation, updates, lines and deletion
pub mod documents;
/// Year-scoped code counter assignment
pub mod sequence;

pub use code_format::{CodeFormat, quarter};
pub use delete_guard::{ChildCollection, can_delete, guards_for, lock_reason};
pub use document_kind::DocumentKind;
pub use sequence::{
    AssignedCode, CodeFormats, SequenceStore, SequencedEntity, assign_code, lock_sequence,
    recompute_code, year_window,
};
