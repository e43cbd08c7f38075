//! Household record models.
//!
//! # Responsibility
//! - Define the three persisted record shapes and their write inputs.
//! - Own input validation shared by every repository write path.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Validation runs before any SQL mutation; a rejected input writes nothing.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diet_entry;
pub mod family_member;
pub mod tracked_item;

/// Store-assigned surrogate identifier shared by all record kinds.
pub type RecordId = i64;

/// Malformed input rejected before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only.
    EmptyField(&'static str),
    /// Meal type literal outside the closed enumeration.
    UnknownMealType(String),
    /// Calories must be zero or greater.
    NegativeCalories(i64),
    /// Numeric measurement is NaN or infinite.
    NonFiniteValue(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::UnknownMealType(value) => write!(
                f,
                "unknown meal type `{value}`; expected Breakfast|Lunch|Dinner|Snack|Other"
            ),
            Self::NegativeCalories(value) => {
                write!(f, "calories must be non-negative, got {value}")
            }
            Self::NonFiniteValue(field) => write!(f, "{field} must be a finite number"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
