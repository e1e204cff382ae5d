use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::TrekDate;
use crate::prelude::*;

/// Opaque identifier of a trek day, as assigned by the entity store.
/// Never empty or all-whitespace.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deref, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct DayId(String);

/// Position of a day within its trek, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct DayNumber(NonZeroU16);

/// Difficulty grade shown on a day card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[display(fmt = "easy")]
    Easy,
    #[display(fmt = "moderate")]
    Moderate,
    #[display(fmt = "hard")]
    Hard,
    #[display(fmt = "extreme")]
    Extreme,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DayError {
    #[error("Day id must not be empty")]
    EmptyId,

    #[error("Invalid day number: {0} (must be at least 1)")]
    InvalidDayNumber(u16),

    #[error("Duplicate day id in catalog: {0}")]
    DuplicateId(DayId),
}

impl DayId {
    /// Creates a day id from any non-blank string.
    ///
    /// # Errors
    /// Returns `DayError::EmptyId` if the id is empty or whitespace only.
    pub fn new(id: impl Into<String>) -> Result<Self, DayError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DayError::EmptyId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DayId {
    type Err = DayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DayId {
    type Error = DayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayId> for String {
    fn from(id: DayId) -> Self {
        id.0
    }
}

impl DayNumber {
    /// # Errors
    /// Returns `DayError::InvalidDayNumber` for 0.
    pub fn new(value: u16) -> Result<Self, DayError> {
        NonZeroU16::new(value)
            .map(Self)
            .ok_or(DayError::InvalidDayNumber(value))
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }
}

impl TryFrom<u16> for DayNumber {
    type Error = DayError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayNumber> for u16 {
    fn from(number: DayNumber) -> Self {
        number.get()
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable day of a multi-day trek.
///
/// Only `id` takes part in selection rules; `day_number` and `date` order the
/// catalog, and the remaining fields are carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub id:         DayId,
    pub day_number: DayNumber,
    pub date:       TrekDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty:  Option<Difficulty>,
}

impl Day {
    pub const fn new(id: DayId, day_number: DayNumber, date: TrekDate) -> Self {
        Self {
            id,
            day_number,
            date,
            title: None,
            distance_km: None,
            difficulty: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// Read-only set of a trek's days, ordered by day number then date.
#[derive(Debug, Clone, Default)]
pub struct DayCatalog {
    days:  Vec<Day>,
    index: HashMap<DayId, usize>,
}

impl DayCatalog {
    /// Builds a catalog from the trek's days.
    ///
    /// # Errors
    /// Returns `DayError::DuplicateId` if two days share an id.
    pub fn new(mut days: Vec<Day>) -> Result<Self, DayError> {
        days.sort_by_key(|day| (day.day_number, day.date));

        let mut index = HashMap::with_capacity(days.len());
        for (position, day) in days.iter().enumerate() {
            if index.insert(day.id.clone(), position).is_some() {
                return Err(DayError::DuplicateId(day.id.clone()));
            }
        }

        Ok(Self { days, index })
    }

    pub fn get(&self, id: &DayId) -> Option<&Day> {
        self.index.get(id).map(|&position| &self.days[position])
    }

    pub fn contains(&self, id: &DayId) -> bool {
        self.index.contains_key(id)
    }

    /// Catalog position of a day; selections list added days in this order.
    pub fn position(&self, id: &DayId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = &Day> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
