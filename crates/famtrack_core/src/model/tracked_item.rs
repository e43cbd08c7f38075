//! Tracked item model.
//!
//! # Invariants
//! - Absent optionals are stored as SQL `NULL`, never as `""` or `0`.
//! - `family_member_id` is advisory and not checked for existence.

use serde::{Deserialize, Serialize};

use super::{require_text, RecordId, ValidationError};

/// Generic time-stamped measurement or note owned by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: RecordId,
    pub family_member_id: RecordId,
    pub name: String,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub notes: Option<String>,
    pub tracked_at: String,
}

/// Input for creating a tracked item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewTrackedItem {
    pub family_member_id: RecordId,
    pub name: String,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub notes: Option<String>,
    /// Defaults to the store's current instant when absent.
    pub tracked_at: Option<String>,
}

/// Full-replace update: every `None` clears the column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedItemUpdate {
    pub name: String,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub notes: Option<String>,
}

impl NewTrackedItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.value)?;
        if let Some(tracked_at) = self.tracked_at.as_deref() {
            require_text("tracked_at", tracked_at)?;
        }
        Ok(())
    }
}

impl TrackedItemUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.value)
    }
}

fn validate_fields(name: &str, value: Option<f64>) -> Result<(), ValidationError> {
    require_text("name", name)?;
    if value.is_some_and(|value| !value.is_finite()) {
        return Err(ValidationError::NonFiniteValue("value"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewTrackedItem, TrackedItemUpdate};
    use crate::model::ValidationError;

    #[test]
    fn non_finite_value_is_rejected() {
        let update = TrackedItemUpdate {
            name: "Weight".to_string(),
            value: Some(f64::NAN),
            ..TrackedItemUpdate::default()
        };
        assert_eq!(
            update.validate(),
            Err(ValidationError::NonFiniteValue("value"))
        );
    }

    #[test]
    fn blank_tracked_at_is_rejected_but_absent_is_fine() {
        let mut item = NewTrackedItem {
            family_member_id: 1,
            name: "Height".to_string(),
            ..NewTrackedItem::default()
        };
        assert!(item.validate().is_ok());

        item.tracked_at = Some(String::new());
        assert_eq!(
            item.validate(),
            Err(ValidationError::EmptyField("tracked_at"))
        );
    }
}
