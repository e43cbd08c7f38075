//! Diet entry model and the closed meal type enumeration.
//!
//! # Responsibility
//! - Define structured meal records and their create/patch/filter inputs.
//! - Parse meal type literals exactly, rejecting anything outside the set.
//!
//! # Invariants
//! - `meal_type` is always one of the five `MealType` variants.
//! - `calories`, when present, is non-negative.
//! - A patch only touches fields it carries; everything else keeps its value.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{require_text, RecordId, ValidationError};

/// Meal category. Crosses every boundary as its exact, case-sensitive name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Other,
}

impl MealType {
    pub const ALL: [Self; 5] = [
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::Snack,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
            Self::Other => "Other",
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownMealType(value.to_string()))
    }
}

/// Stored meal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietEntry {
    pub id: RecordId,
    pub member_id: RecordId,
    /// ISO-8601 instant; primary ordering key.
    pub timestamp: String,
    pub meal_type: MealType,
    pub description: String,
    pub calories: Option<i64>,
    pub notes: Option<String>,
}

/// Input for creating a diet entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDietEntry {
    pub member_id: RecordId,
    pub timestamp: String,
    pub meal_type: MealType,
    pub description: String,
    pub calories: Option<i64>,
    pub notes: Option<String>,
}

/// Partial update. `None` keeps the stored value.
///
/// For nullable columns the inner option distinguishes clearing
/// (`Some(None)`) from setting (`Some(Some(v))`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DietEntryPatch {
    pub member_id: Option<RecordId>,
    pub timestamp: Option<String>,
    pub meal_type: Option<MealType>,
    pub description: Option<String>,
    pub calories: Option<Option<i64>>,
    pub notes: Option<Option<String>>,
}

/// Conjunctive list filter; absent fields do not constrain the result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DietEntryFilter {
    pub member_id: Option<RecordId>,
    /// Inclusive lower bound on `timestamp`.
    pub start: Option<String>,
    /// Inclusive upper bound on `timestamp`.
    pub end: Option<String>,
}

impl NewDietEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.timestamp, &self.description, self.calories)
    }
}

impl DietEntryPatch {
    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges this patch over `current`, leaving omitted fields untouched.
    pub fn apply_to(&self, current: &DietEntry) -> DietEntry {
        DietEntry {
            id: current.id,
            member_id: self.member_id.unwrap_or(current.member_id),
            timestamp: self
                .timestamp
                .clone()
                .unwrap_or_else(|| current.timestamp.clone()),
            meal_type: self.meal_type.unwrap_or(current.meal_type),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            calories: self.calories.unwrap_or(current.calories),
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
        }
    }
}

impl DietEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.timestamp, &self.description, self.calories)
    }
}

fn validate_fields(
    timestamp: &str,
    description: &str,
    calories: Option<i64>,
) -> Result<(), ValidationError> {
    require_text("timestamp", timestamp)?;
    require_text("description", description)?;
    match calories {
        Some(value) if value < 0 => Err(ValidationError::NegativeCalories(value)),
        _ => Ok(()),
    }
}
