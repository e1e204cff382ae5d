use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Day, DayCatalog, LinkGraph, LinkMode, LinkedPair, SelectionError, SelectionSession};

/// The part of a trip record that drives day selection.
///
/// Read once per editing session. `maxDays` falls back to the number of days
/// when the trip sets no limit, and `linkMode` to [`LinkMode::Pairs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDays {
    pub days:         Vec<Day>,
    #[serde(default)]
    pub linked_pairs: Vec<LinkedPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days:     Option<usize>,
    #[serde(default)]
    pub link_mode:    LinkMode,
}

impl TripDays {
    /// # Errors
    /// Returns `SelectionError::Json` if the record is malformed, including
    /// invalid dates, blank ids or self-linked pairs.
    pub fn from_json(json: &str) -> Result<Self, SelectionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn effective_max_days(&self) -> usize {
        self.max_days.unwrap_or(self.days.len())
    }

    /// Builds an empty, validated selection session for this trip.
    ///
    /// # Errors
    /// - `SelectionError::Day` if two days share an id.
    /// - `SelectionError::Link` if a pair references a missing day.
    pub fn into_session(self) -> Result<SelectionSession, SelectionError> {
        let max_days = self.effective_max_days();
        let catalog = DayCatalog::new(self.days)?;
        let links = LinkGraph::new(self.linked_pairs, self.link_mode);
        SelectionSession::new(catalog, links, max_days)
    }
}

impl FromStr for TripDays {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
