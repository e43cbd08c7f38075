//! Family member model.

use serde::{Deserialize, Serialize};

use super::{require_text, RecordId, ValidationError};

/// Members created by `seed_defaults` on an empty store, in insertion order.
pub const DEFAULT_MEMBERS: [(&str, &str); 3] =
    [("Mom", "\u{1F469}"), ("Dad", "\u{1F468}"), ("Child", "\u{1F9D2}")];

/// One household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: RecordId,
    pub name: String,
    /// Emoji or short glyph label.
    pub icon: String,
    /// Set once by the store, ISO-8601.
    pub created_at: String,
}

/// Validates the writable member fields.
pub fn validate_member(name: &str) -> Result<(), ValidationError> {
    require_text("name", name)
}
