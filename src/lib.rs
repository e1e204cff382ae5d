//! Day selection for multi-day trek registrations.
//!
//! A trek is a catalog of [`Day`]s. Some days are tied together by
//! [`LinkedPair`]s and must be selected or deselected as a unit, and a
//! registration may hold at most `max_days` days. [`toggle_day_selection`]
//! applies one click to a selection and keeps all three rules:
//!
//! - the selection never grows past `max_days`;
//! - linked days are selected and deselected together;
//! - no day is selected twice.
//!
//! [`SelectionSession`] wraps the same rules around a selection of ids held
//! against a [`DayCatalog`], and [`TripDays`] loads everything from a trip
//! record.

mod consts;
mod date;
mod day;
mod link;
mod prelude;
mod selection;
mod trip;

pub use consts::*;
pub use date::{DateError, TrekDate, days_in_month, is_leap_year};
pub use day::{Day, DayCatalog, DayError, DayId, DayNumber, Difficulty};
pub use link::{LinkError, LinkGraph, LinkMode, LinkedPair, resolve_linked_days};
pub use selection::{
    SelectionError, SelectionSession, SelectionSummary, ToggleOutcome, Toggled,
    toggle_day_selection,
};
pub use trip::TripDays;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::tests::day;

    fn abc() -> Vec<Day> {
        vec![day("A", 1), day("B", 2), day("C", 3)]
    }

    fn ab_linked(days: &[Day]) -> Vec<LinkedPair> {
        vec![LinkedPair::new(days[0].id.clone(), days[1].id.clone()).unwrap()]
    }

    fn ids(days: &[Day]) -> Vec<&str> {
        days.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_linked_pair_fills_cap() {
        let all = abc();
        let pairs = ab_linked(&all);

        let step = toggle_day_selection(&[], &all[0], &all, &pairs, 2).unwrap();
        assert_eq!(ids(&step.selection), ["A", "B"]);

        let step = toggle_day_selection(&step.selection, &all[2], &all, &pairs, 2).unwrap();
        assert_eq!(ids(&step.selection), ["A", "B"]);
        assert_eq!(
            step.outcome,
            ToggleOutcome::RejectedCapExceeded {
                requested: 3,
                max_days:  2,
            }
        );
    }

    #[test]
    fn test_deselecting_partner_drops_pair() {
        let all = abc();
        let pairs = ab_linked(&all);

        let step = toggle_day_selection(&[], &all[0], &all, &pairs, 3).unwrap();
        assert_eq!(ids(&step.selection), ["A", "B"]);

        let step = toggle_day_selection(&step.selection, &all[2], &all, &pairs, 3).unwrap();
        assert_eq!(ids(&step.selection), ["A", "B", "C"]);

        let step = toggle_day_selection(&step.selection, &all[1], &all, &pairs, 3).unwrap();
        assert_eq!(ids(&step.selection), ["C"]);
    }

    #[test]
    fn test_unlinked_cap_of_one() {
        let all = abc();

        let step = toggle_day_selection(&[], &all[0], &all, &[], 1).unwrap();
        assert_eq!(ids(&step.selection), ["A"]);

        let step = toggle_day_selection(&step.selection, &all[1], &all, &[], 1).unwrap();
        assert_eq!(ids(&step.selection), ["A"]);
        assert!(!step.outcome.changed());
    }

    #[test]
    fn test_session_matches_free_function() {
        let all = abc();
        let pairs = ab_linked(&all);
        let mut session = SelectionSession::new(
            DayCatalog::new(all.clone()).unwrap(),
            LinkGraph::new(pairs.clone(), LinkMode::Pairs),
            3,
        )
        .unwrap();

        let mut selection = Vec::new();
        for target in [&all[0], &all[2], &all[1], &all[1], &all[2]] {
            let step = toggle_day_selection(&selection, target, &all, &pairs, 3).unwrap();
            let outcome = session.toggle(&target.id).unwrap();
            assert_eq!(outcome, step.outcome);
            selection = step.selection;
            let session_days: Vec<Day> = session.selected_days().into_iter().cloned().collect();
            assert_eq!(session_days, selection);
        }
    }
}
