//! Document kinds that draw codes from their own year-scoped sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three sequenced document kinds of the stock control module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Stock transfer request between two storages
    RequestStock,
    /// Delivery note for goods leaving a storage
    OutgoingAlbaran,
    /// Delivery note for goods received into a storage
    IngoingAlbaran,
}

impl DocumentKind {
    /// All kinds, in dependency order (a request precedes its albarans).
    pub const ALL: [Self; 3] = [
        Self::RequestStock,
        Self::OutgoingAlbaran,
        Self::IngoingAlbaran,
    ];

    /// Stable key stored in the `code_sequence_locks` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestStock => "request_stock",
            Self::OutgoingAlbaran => "outgoing_albaran",
            Self::IngoingAlbaran => "ingoing_albaran",
        }
    }

    /// Human-readable name used in user-facing messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RequestStock => "request stock",
            Self::OutgoingAlbaran => "outgoing albaran",
            Self::IngoingAlbaran => "ingoing albaran",
        }
    }

    /// Template used when neither `config.toml` nor the environment sets one.
    #[must_use]
    pub const fn default_code_format(self) -> &'static str {
        match self {
            Self::RequestStock => "RS{year}{day}{month}-{hour}{minute}--{number}",
            Self::OutgoingAlbaran => "OA{year}{day}{month}-{hour}{minute}--{number}",
            Self::IngoingAlbaran => "OI{year}{day}{month}-{hour}{minute}--{number}",
        }
    }

    /// Environment variable that overrides this kind's template.
    #[must_use]
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::RequestStock => "STORAGE_CODE_REQUEST_STOCK",
            Self::OutgoingAlbaran => "STORAGE_CODE_OUTGOING_ALBARAN",
            Self::IngoingAlbaran => "STORAGE_CODE_INGOING_ALBARAN",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_are_distinct() {
        let keys: std::collections::HashSet<_> =
            DocumentKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_default_formats_carry_kind_prefix() {
        assert!(DocumentKind::RequestStock.default_code_format().starts_with("RS"));
        assert!(DocumentKind::OutgoingAlbaran.default_code_format().starts_with("OA"));
        assert!(DocumentKind::IngoingAlbaran.default_code_format().starts_with("OI"));
    }
}
