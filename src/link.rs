use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{DayCatalog, DayId, PAIR_SEPARATOR, prelude::*};

/// Two days that must be selected or deselected together.
///
/// The pair is unordered: `[a, b]` and `[b, a]` compare equal, and the
/// endpoints are stored sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deserialize)]
#[display(fmt = "{}{}{}", "a", "PAIR_SEPARATOR", "b")]
#[serde(try_from = "RawLinkedPair")]
pub struct LinkedPair {
    a: DayId,
    b: DayId,
}

/// Error type for linked pair construction and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Both endpoints name the same day.
    #[error("Day {0} cannot be linked to itself")]
    SelfLink(DayId),

    /// A pair endpoint is missing from the day catalog.
    #[error("Linked pair {pair} references unknown day {day}")]
    UnknownDay { pair: LinkedPair, day: DayId },
}

/// How far a toggle reaches through the pair graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Only the direct partners of a day move with it.
    #[default]
    #[display(fmt = "pairs")]
    Pairs,
    /// The whole connected component of a day moves with it.
    #[display(fmt = "groups")]
    Groups,
}

// Trip records store pairs either as `["a", "b"]` or as an object with two
// named id fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLinkedPair {
    Ids([DayId; 2]),
    Named {
        #[serde(alias = "day1", alias = "first")]
        a: DayId,
        #[serde(alias = "day2", alias = "second")]
        b: DayId,
    },
}

impl TryFrom<RawLinkedPair> for LinkedPair {
    type Error = LinkError;

    fn try_from(raw: RawLinkedPair) -> Result<Self, Self::Error> {
        match raw {
            RawLinkedPair::Ids([a, b]) | RawLinkedPair::Named { a, b } => Self::new(a, b),
        }
    }
}

impl Serialize for LinkedPair {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        [&self.a, &self.b].serialize(serializer)
    }
}

impl LinkedPair {
    /// Links two distinct days.
    ///
    /// # Errors
    /// Returns `LinkError::SelfLink` if both ids are equal.
    pub fn new(first: DayId, second: DayId) -> Result<Self, LinkError> {
        match first.cmp(&second) {
            std::cmp::Ordering::Less => Ok(Self { a: first, b: second }),
            std::cmp::Ordering::Greater => Ok(Self { a: second, b: first }),
            std::cmp::Ordering::Equal => Err(LinkError::SelfLink(first)),
        }
    }

    pub const fn a(&self) -> &DayId {
        &self.a
    }

    pub const fn b(&self) -> &DayId {
        &self.b
    }

    pub const fn ids(&self) -> [&DayId; 2] {
        [&self.a, &self.b]
    }

    pub fn contains(&self, id: &DayId) -> bool {
        self.a == *id || self.b == *id
    }

    /// The other endpoint, if `id` is part of this pair.
    pub fn partner(&self, id: &DayId) -> Option<&DayId> {
        if self.a == *id {
            Some(&self.b)
        } else if self.b == *id {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Returns `target` together with every day directly paired with it.
///
/// Only direct pair membership counts: with pairs `A+B` and `B+C`, resolving
/// `A` yields `{A, B}`. The target is always part of the result, even when no
/// pair mentions it.
pub fn resolve_linked_days(target: &DayId, linked_pairs: &[LinkedPair]) -> BTreeSet<DayId> {
    let mut linked: BTreeSet<DayId> = linked_pairs
        .iter()
        .filter_map(|pair| pair.partner(target))
        .cloned()
        .collect();
    linked.insert(target.clone());
    tracing::trace!(day = %target, linked = linked.len(), "resolved linked days");
    linked
}

/// The linked pairs of a trip, indexed for lookups in either direction.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pairs:     Vec<LinkedPair>,
    mode:      LinkMode,
    adjacency: BTreeMap<DayId, BTreeSet<DayId>>,
}

impl LinkGraph {
    /// Builds the graph; repeated pairs are kept once.
    pub fn new(pairs: impl IntoIterator<Item = LinkedPair>, mode: LinkMode) -> Self {
        let unique: BTreeSet<LinkedPair> = pairs.into_iter().collect();

        let mut adjacency: BTreeMap<DayId, BTreeSet<DayId>> = BTreeMap::new();
        for pair in &unique {
            adjacency
                .entry(pair.a.clone())
                .or_default()
                .insert(pair.b.clone());
            adjacency
                .entry(pair.b.clone())
                .or_default()
                .insert(pair.a.clone());
        }

        Self {
            pairs: unique.into_iter().collect(),
            mode,
            adjacency,
        }
    }

    pub fn pairs(&self) -> &[LinkedPair] {
        &self.pairs
    }

    pub const fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Whether any pair mentions `id`.
    pub fn is_linked(&self, id: &DayId) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Days that move together with `target`, including `target` itself.
    pub fn linked_days(&self, target: &DayId) -> BTreeSet<DayId> {
        match self.mode {
            LinkMode::Pairs => resolve_linked_days(target, &self.pairs),
            LinkMode::Groups => self.component_of(target),
        }
    }

    /// Days that every toggle keeps in the same state as `target`, including
    /// `target` itself.
    ///
    /// In `Groups` mode this is the whole component. In `Pairs` mode only an
    /// isolated pair holds together: once a day sits in two pairs, toggling a
    /// neighbour can leave part of a pair selected.
    pub fn atomic_group(&self, target: &DayId) -> BTreeSet<DayId> {
        match self.mode {
            LinkMode::Groups => self.component_of(target),
            LinkMode::Pairs => {
                let mut group = BTreeSet::from([target.clone()]);
                let partner = self
                    .adjacency
                    .get(target)
                    .filter(|partners| partners.len() == 1)
                    .and_then(BTreeSet::first)
                    .filter(|partner| {
                        self.adjacency
                            .get(*partner)
                            .is_some_and(|back| back.len() == 1)
                    });
                if let Some(partner) = partner {
                    group.insert(partner.clone());
                }
                group
            },
        }
    }

    fn component_of(&self, target: &DayId) -> BTreeSet<DayId> {
        let mut component = BTreeSet::from([target.clone()]);
        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            for next in self.adjacency.get(id).into_iter().flatten() {
                if component.insert(next.clone()) {
                    stack.push(next);
                }
            }
        }
        component
    }

    /// Checks that every pair endpoint exists in `catalog`.
    ///
    /// # Errors
    /// Returns `LinkError::UnknownDay` for the first dangling endpoint.
    pub fn validate(&self, catalog: &DayCatalog) -> Result<(), LinkError> {
        for pair in &self.pairs {
            if let Some(missing) = pair.ids().into_iter().find(|id| !catalog.contains(id)) {
                return Err(LinkError::UnknownDay {
                    pair: pair.clone(),
                    day:  missing.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::tests::day;

    fn id(s: &str) -> DayId {
        DayId::new(s).unwrap()
    }

    fn pair(a: &str, b: &str) -> LinkedPair {
        LinkedPair::new(id(a), id(b)).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<DayId> {
        ids.iter().map(|s| id(s)).collect()
    }

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(pair("a", "b"), pair("b", "a"));
        let p = pair("z", "m");
        assert_eq!(p.a().as_str(), "m");
        assert_eq!(p.b().as_str(), "z");
    }

    #[test]
    fn test_self_link_rejected() {
        assert_eq!(
            LinkedPair::new(id("a"), id("a")),
            Err(LinkError::SelfLink(id("a")))
        );
    }

    #[test]
    fn test_partner() {
        let p = pair("a", "b");
        assert_eq!(p.partner(&id("a")), Some(&id("b")));
        assert_eq!(p.partner(&id("b")), Some(&id("a")));
        assert_eq!(p.partner(&id("c")), None);
        assert!(p.contains(&id("b")));
        assert!(!p.contains(&id("c")));
    }

    #[test]
    fn test_display() {
        assert_eq!(pair("d2", "d1").to_string(), "d1+d2");
    }

    #[test]
    fn test_deserialize_array_form() {
        let p: LinkedPair = serde_json::from_str(r#"["b", "a"]"#).unwrap();
        assert_eq!(p, pair("a", "b"));
    }

    #[test]
    fn test_deserialize_object_forms() {
        for json in [
            r#"{"a": "x", "b": "y"}"#,
            r#"{"day1": "y", "day2": "x"}"#,
            r#"{"first": "x", "second": "y"}"#,
        ] {
            let p: LinkedPair = serde_json::from_str(json).unwrap();
            assert_eq!(p, pair("x", "y"), "{json}");
        }
    }

    #[test]
    fn test_deserialize_rejects_bad_pairs() {
        assert!(serde_json::from_str::<LinkedPair>(r#"["a", "a"]"#).is_err());
        assert!(serde_json::from_str::<LinkedPair>(r#"["a"]"#).is_err());
        assert!(serde_json::from_str::<LinkedPair>(r#"["a", "b", "c"]"#).is_err());
        assert!(serde_json::from_str::<LinkedPair>(r#"{"a": "x"}"#).is_err());
        assert!(serde_json::from_str::<LinkedPair>(r#"["a", ""]"#).is_err());
    }

    #[test]
    fn test_serialize_canonical_array() {
        let json = serde_json::to_string(&pair("b", "a")).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }

    #[test]
    fn test_resolve_includes_target() {
        assert_eq!(resolve_linked_days(&id("a"), &[]), set(&["a"]));
        assert_eq!(
            resolve_linked_days(&id("a"), &[pair("b", "c")]),
            set(&["a"])
        );
    }

    #[test]
    fn test_resolve_direct_partners() {
        let pairs = [pair("a", "b"), pair("c", "d")];
        assert_eq!(resolve_linked_days(&id("a"), &pairs), set(&["a", "b"]));
        assert_eq!(resolve_linked_days(&id("b"), &pairs), set(&["a", "b"]));
        assert_eq!(resolve_linked_days(&id("d"), &pairs), set(&["c", "d"]));
    }

    #[test]
    fn test_resolve_is_not_transitive() {
        let pairs = [pair("a", "b"), pair("b", "c")];
        assert_eq!(resolve_linked_days(&id("a"), &pairs), set(&["a", "b"]));
        assert_eq!(
            resolve_linked_days(&id("b"), &pairs),
            set(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_graph_pairs_mode_matches_resolver() {
        let graph = LinkGraph::new([pair("a", "b"), pair("b", "c")], LinkMode::Pairs);
        assert_eq!(graph.linked_days(&id("a")), set(&["a", "b"]));
        assert_eq!(graph.linked_days(&id("c")), set(&["b", "c"]));
        assert_eq!(graph.linked_days(&id("q")), set(&["q"]));
    }

    #[test]
    fn test_graph_groups_mode_follows_chains() {
        let graph = LinkGraph::new(
            [pair("a", "b"), pair("b", "c"), pair("x", "y")],
            LinkMode::Groups,
        );
        assert_eq!(graph.linked_days(&id("a")), set(&["a", "b", "c"]));
        assert_eq!(graph.linked_days(&id("c")), set(&["a", "b", "c"]));
        assert_eq!(graph.linked_days(&id("y")), set(&["x", "y"]));
        assert_eq!(graph.linked_days(&id("q")), set(&["q"]));
    }

    #[test]
    fn test_atomic_group_pairs_mode_only_isolated_pairs() {
        let graph = LinkGraph::new(
            [pair("a", "b"), pair("b", "c"), pair("x", "y")],
            LinkMode::Pairs,
        );
        assert_eq!(graph.atomic_group(&id("x")), set(&["x", "y"]));
        assert_eq!(graph.atomic_group(&id("y")), set(&["x", "y"]));
        // a's only partner b is also paired with c
        assert_eq!(graph.atomic_group(&id("a")), set(&["a"]));
        assert_eq!(graph.atomic_group(&id("b")), set(&["b"]));
        assert_eq!(graph.atomic_group(&id("c")), set(&["c"]));
        assert_eq!(graph.atomic_group(&id("q")), set(&["q"]));
    }

    #[test]
    fn test_atomic_group_groups_mode_is_component() {
        let graph = LinkGraph::new(
            [pair("a", "b"), pair("b", "c"), pair("x", "y")],
            LinkMode::Groups,
        );
        assert_eq!(graph.atomic_group(&id("a")), set(&["a", "b", "c"]));
        assert_eq!(graph.atomic_group(&id("y")), set(&["x", "y"]));
        assert_eq!(graph.atomic_group(&id("q")), set(&["q"]));
    }

    #[test]
    fn test_graph_dedups_pairs() {
        let graph = LinkGraph::new(
            [pair("a", "b"), pair("b", "a"), pair("a", "b")],
            LinkMode::Pairs,
        );
        assert_eq!(graph.pairs().len(), 1);
        assert!(graph.is_linked(&id("a")));
        assert!(!graph.is_linked(&id("c")));
    }

    #[test]
    fn test_validate_against_catalog() {
        let catalog = DayCatalog::new(vec![day("a", 1), day("b", 2)]).unwrap();

        let graph = LinkGraph::new([pair("a", "b")], LinkMode::Pairs);
        assert!(graph.validate(&catalog).is_ok());

        let graph = LinkGraph::new([pair("a", "zz")], LinkMode::Pairs);
        assert_eq!(
            graph.validate(&catalog),
            Err(LinkError::UnknownDay {
                pair: pair("a", "zz"),
                day:  id("zz"),
            })
        );
    }

    #[test]
    fn test_link_mode_serde() {
        assert_eq!(LinkMode::default(), LinkMode::Pairs);
        let mode: LinkMode = serde_json::from_str(r#""groups""#).unwrap();
        assert_eq!(mode, LinkMode::Groups);
        assert_eq!(serde_json::to_string(&LinkMode::Pairs).unwrap(), r#""pairs""#);
    }
}
