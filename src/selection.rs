use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::{
    Day, DayCatalog, DayError, DayId, LinkError, LinkGraph, LinkedPair, TrekDate,
    resolve_linked_days,
};

/// Error type for selection operations.
///
/// A toggle that would exceed `max_days` is not an error; see
/// [`ToggleOutcome::RejectedCapExceeded`].
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// The id is not part of the day catalog.
    #[error("Unknown day: {0}")]
    UnknownDay(DayId),

    /// The same day appears twice in a selection.
    #[error("Day {0} is selected more than once")]
    DuplicateDay(DayId),

    /// A pre-populated selection is larger than the cap.
    #[error("Selection of {selected} days exceeds the limit of {max_days}")]
    CapExceeded { selected: usize, max_days: usize },

    /// A pre-populated selection holds a day without one of its linked days.
    #[error("Day {day} is selected without its linked day {missing}")]
    SplitLinkGroup { day: DayId, missing: DayId },

    #[error(transparent)]
    Day(#[from] DayError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What a toggle did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The target and its linked days were added, in catalog order.
    Selected { added: Vec<DayId> },
    /// The target and its linked days were removed, in selection order.
    Deselected { removed: Vec<DayId> },
    /// Adding the target's linked days would have exceeded the cap; the
    /// selection is unchanged.
    RejectedCapExceeded { requested: usize, max_days: usize },
}

impl ToggleOutcome {
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::RejectedCapExceeded { .. })
    }
}

/// Result of [`toggle_day_selection`]: the new selection and how it came about.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggled {
    pub selection: Vec<Day>,
    pub outcome:   ToggleOutcome,
}

enum Decision {
    /// Catalog positions of the days to add, ascending.
    Select(Vec<usize>),
    Deselect(BTreeSet<DayId>),
    Reject { requested: usize },
}

fn decide(
    target: &DayId,
    linked: BTreeSet<DayId>,
    selected: &HashSet<&DayId>,
    max_days: usize,
    position: impl Fn(&DayId) -> Option<usize>,
) -> Result<Decision, SelectionError> {
    let mut positions = Vec::with_capacity(linked.len());
    for id in &linked {
        let pos = position(id).ok_or_else(|| SelectionError::UnknownDay(id.clone()))?;
        if !selected.contains(id) {
            positions.push(pos);
        }
    }

    if selected.contains(target) {
        return Ok(Decision::Deselect(linked));
    }

    let requested = selected.len() + positions.len();
    if requested > max_days {
        return Ok(Decision::Reject { requested });
    }

    positions.sort_unstable();
    Ok(Decision::Select(positions))
}

fn index_selection<'a>(
    ids: impl IntoIterator<Item = &'a DayId>,
    known: impl Fn(&DayId) -> bool,
) -> Result<HashSet<&'a DayId>, SelectionError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !known(id) {
            return Err(SelectionError::UnknownDay(id.clone()));
        }
        if !seen.insert(id) {
            return Err(SelectionError::DuplicateDay(id.clone()));
        }
    }
    Ok(seen)
}

/// Toggles `target` in `current`, moving its linked days with it.
///
/// Selecting adds the target and every day paired with it that is not
/// already selected, appended in `all_days` order; if that would push the
/// selection past `max_days` the selection comes back unchanged with
/// [`ToggleOutcome::RejectedCapExceeded`]. Deselecting removes the target
/// and its paired days.
///
/// # Errors
/// - `SelectionError::UnknownDay` if the target, a paired day, or a day in
///   `current` is missing from `all_days`.
/// - `SelectionError::DuplicateDay` if `current` lists a day twice.
/// - `SelectionError::Day` if `all_days` holds two days with the same id.
pub fn toggle_day_selection(
    current: &[Day],
    target: &Day,
    all_days: &[Day],
    linked_pairs: &[LinkedPair],
    max_days: usize,
) -> Result<Toggled, SelectionError> {
    let mut positions: HashMap<&DayId, usize> = HashMap::with_capacity(all_days.len());
    for (pos, day) in all_days.iter().enumerate() {
        if positions.insert(&day.id, pos).is_some() {
            return Err(DayError::DuplicateId(day.id.clone()).into());
        }
    }

    let selected = index_selection(current.iter().map(|d| &d.id), |id| {
        positions.contains_key(id)
    })?;
    let linked = resolve_linked_days(&target.id, linked_pairs);
    let decision = decide(&target.id, linked, &selected, max_days, |id| {
        positions.get(id).copied()
    })?;

    let toggled = match decision {
        Decision::Select(added) => {
            let mut selection = current.to_vec();
            selection.extend(added.iter().map(|&pos| all_days[pos].clone()));
            Toggled {
                outcome: ToggleOutcome::Selected {
                    added: added.iter().map(|&pos| all_days[pos].id.clone()).collect(),
                },
                selection,
            }
        },
        Decision::Deselect(linked) => {
            let (removed, kept): (Vec<&Day>, Vec<&Day>) =
                current.iter().partition(|d| linked.contains(&d.id));
            Toggled {
                selection: kept.into_iter().cloned().collect(),
                outcome:   ToggleOutcome::Deselected {
                    removed: removed.into_iter().map(|d| d.id.clone()).collect(),
                },
            }
        },
        Decision::Reject { requested } => {
            tracing::debug!(day = %target.id, requested, max_days, "day selection rejected by cap");
            Toggled {
                selection: current.to_vec(),
                outcome:   ToggleOutcome::RejectedCapExceeded {
                    requested,
                    max_days,
                },
            }
        },
    };

    tracing::debug!(
        day = %target.id,
        outcome = ?toggled.outcome,
        selected = toggled.selection.len(),
        "day selection toggled"
    );
    Ok(toggled)
}

/// Totals over a set of selected days, for confirmation screens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub day_count:         usize,
    pub total_distance_km: f64,
    pub first_date:        Option<TrekDate>,
    pub last_date:         Option<TrekDate>,
}

impl SelectionSummary {
    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a Day>) -> Self {
        let mut summary = Self {
            day_count:         0,
            total_distance_km: 0.0,
            first_date:        None,
            last_date:         None,
        };
        for day in days {
            summary.day_count += 1;
            summary.total_distance_km += day.distance_km.unwrap_or_default();
            summary.first_date = Some(summary.first_date.map_or(day.date, |d| d.min(day.date)));
            summary.last_date = Some(summary.last_date.map_or(day.date, |d| d.max(day.date)));
        }
        summary
    }
}

/// A selection held as day ids against a fixed catalog and link graph.
///
/// Every mutation goes through [`SelectionSession::toggle`], so the
/// selection never exceeds `max_days`, never splits a link group, and never
/// holds a day twice.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    catalog:  DayCatalog,
    links:    LinkGraph,
    max_days: usize,
    selected: Vec<DayId>,
}

impl SelectionSession {
    /// Starts an empty selection.
    ///
    /// # Errors
    /// Returns `SelectionError::Link` if a pair references a day missing from
    /// the catalog.
    pub fn new(
        catalog: DayCatalog,
        links: LinkGraph,
        max_days: usize,
    ) -> Result<Self, SelectionError> {
        if let Err(err) = links.validate(&catalog) {
            tracing::warn!(%err, "link graph does not match day catalog");
            return Err(err.into());
        }
        Ok(Self {
            catalog,
            links,
            max_days,
            selected: Vec::new(),
        })
    }

    /// Pre-populates the selection, e.g. from a prior registration.
    ///
    /// # Errors
    /// Fails with `UnknownDay`, `DuplicateDay`, `CapExceeded` or
    /// `SplitLinkGroup` if `ids` names a missing or repeated day, is over the
    /// cap, or splits days that toggling always keeps together (see
    /// [`LinkGraph::atomic_group`]). Any selection produced by
    /// [`toggle`](Self::toggle) under the same cap is accepted.
    pub fn with_selection(
        mut self,
        ids: impl IntoIterator<Item = DayId>,
    ) -> Result<Self, SelectionError> {
        let ids: Vec<DayId> = ids.into_iter().collect();
        let seen = index_selection(&ids, |id| self.catalog.contains(id))?;

        if ids.len() > self.max_days {
            return Err(SelectionError::CapExceeded {
                selected: ids.len(),
                max_days: self.max_days,
            });
        }

        for id in &ids {
            if let Some(missing) = self
                .links
                .atomic_group(id)
                .into_iter()
                .find(|linked| !seen.contains(linked))
            {
                return Err(SelectionError::SplitLinkGroup {
                    day: id.clone(),
                    missing,
                });
            }
        }

        self.selected = ids;
        Ok(self)
    }

    /// Same as [`with_selection`](Self::with_selection) for full day records.
    ///
    /// # Errors
    /// See [`with_selection`](Self::with_selection).
    pub fn with_selected_days(self, days: &[Day]) -> Result<Self, SelectionError> {
        self.with_selection(days.iter().map(|d| d.id.clone()))
    }

    /// Toggles `id` together with its linked days.
    ///
    /// # Errors
    /// Returns `SelectionError::UnknownDay` if `id` is not in the catalog.
    pub fn toggle(&mut self, id: &DayId) -> Result<ToggleOutcome, SelectionError> {
        if !self.catalog.contains(id) {
            return Err(SelectionError::UnknownDay(id.clone()));
        }

        let linked = self.links.linked_days(id);
        let selected: HashSet<&DayId> = self.selected.iter().collect();
        let decision = decide(id, linked, &selected, self.max_days, |d| {
            self.catalog.position(d)
        })?;

        let outcome = match decision {
            Decision::Select(added) => {
                let added: Vec<DayId> = added
                    .into_iter()
                    .map(|pos| self.catalog.days()[pos].id.clone())
                    .collect();
                self.selected.extend(added.iter().cloned());
                ToggleOutcome::Selected { added }
            },
            Decision::Deselect(linked) => {
                let mut removed = Vec::new();
                self.selected.retain(|d| {
                    let drop = linked.contains(d);
                    if drop {
                        removed.push(d.clone());
                    }
                    !drop
                });
                ToggleOutcome::Deselected { removed }
            },
            Decision::Reject { requested } => ToggleOutcome::RejectedCapExceeded {
                requested,
                max_days: self.max_days,
            },
        };

        tracing::debug!(
            day = %id,
            outcome = ?outcome,
            selected = self.selected.len(),
            max_days = self.max_days,
            "day selection toggled"
        );
        Ok(outcome)
    }

    /// Whether toggling `id` would change the selection. Deselecting always
    /// can; selecting can if the linked days fit under the cap.
    pub fn can_toggle(&self, id: &DayId) -> bool {
        if !self.catalog.contains(id) {
            return false;
        }
        if self.is_selected(id) {
            return true;
        }
        let missing = self
            .links
            .linked_days(id)
            .iter()
            .filter(|linked| !self.is_selected(linked))
            .count();
        self.selected.len() + missing <= self.max_days
    }

    pub fn is_selected(&self, id: &DayId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> &[DayId] {
        &self.selected
    }

    /// Selected days resolved from the catalog, in selection order.
    pub fn selected_days(&self) -> Vec<&Day> {
        self.selected
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub const fn max_days(&self) -> usize {
        self.max_days
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_days.saturating_sub(self.selected.len())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub const fn catalog(&self) -> &DayCatalog {
        &self.catalog
    }

    pub const fn links(&self) -> &LinkGraph {
        &self.links
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary::from_days(self.selected_days())
    }
}
